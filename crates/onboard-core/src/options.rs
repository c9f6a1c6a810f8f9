#![forbid(unsafe_code)]

//! Per-step options carried in a hint's `data-options` attribute.
//!
//! Reading a step is two-phase: [`RawOptions::parse`] only checks that the
//! attribute is a JSON object, [`RawOptions::resolve`] validates each field
//! and fills documented defaults. The controller resolves a step completely
//! before it mutates the page, so a bad option never leaves a half-applied
//! step behind.
//!
//! | field           | absent / null        | accepted                         |
//! |-----------------|----------------------|----------------------------------|
//! | `sequenceOrder` | unordered            | number, numeric string           |
//! | `type`          | `"timed"`            | `"timed"`, `"confirm"`           |
//! | `timer`         | 2500 ms              | positive integer (0 = default)   |
//! | `highlighting`  | `false`              | boolean                          |
//! | `position`      | `{top:0px,right:0px}`| object of string/number offsets  |

use std::cmp::Ordering;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{OnboardError, Result};

/// Display time of a timed step when `timer` is absent or zero.
pub const DEFAULT_TIMER: Duration = Duration::from_millis(2500);

const UNITS: [&str; 4] = ["%", "px", "rem", "em"];

// ── Ordering ────────────────────────────────────────────────────────────

/// Sort key derived from `sequenceOrder`.
///
/// Keys that are missing or non-numeric are unordered (`NaN`). The total
/// order places every numeric key before every unordered key; two unordered
/// keys compare equal so a stable sort keeps them in discovery order.
#[derive(Debug, Clone, Copy)]
pub struct OrderKey(f64);

impl OrderKey {
    /// The key of a step without a usable `sequenceOrder`.
    pub const UNORDERED: Self = Self(f64::NAN);

    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_ordered(self) -> bool {
        !self.0.is_nan()
    }

    /// Coerce a JSON value the way a numeric cast would: numbers as-is,
    /// numeric strings parsed, everything else unordered.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n.as_f64().map_or(Self::UNORDERED, Self),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Self(0.0)
                } else {
                    trimmed.parse::<f64>().map_or(Self::UNORDERED, Self)
                }
            }
            _ => Self::UNORDERED,
        }
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

// ── Step kind ───────────────────────────────────────────────────────────

/// How a step advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Advances on its own after `timer`.
    Timed { timer: Duration },
    /// Waits for an explicit confirmation.
    Confirm,
}

impl StepKind {
    /// A timed step with the default display time.
    #[must_use]
    pub const fn timed() -> Self {
        Self::Timed {
            timer: DEFAULT_TIMER,
        }
    }

    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Timed { .. })
    }

    /// The `type` tag used in serialized options.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Timed { .. } => "timed",
            Self::Confirm => "confirm",
        }
    }
}

impl Default for StepKind {
    fn default() -> Self {
        Self::timed()
    }
}

// ── Position ────────────────────────────────────────────────────────────

/// One side of a step's absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// CSS property and JSON key for this side.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    const fn field(self) -> &'static str {
        match self {
            Self::Top => "position.top",
            Self::Right => "position.right",
            Self::Bottom => "position.bottom",
            Self::Left => "position.left",
        }
    }
}

/// A normalized CSS length: whitespace stripped, `px` appended when no
/// recognized unit is present.
///
/// ```
/// use onboard_core::Offset;
///
/// assert_eq!(Offset::parse("10 px").as_str(), "10px");
/// assert_eq!(Offset::parse("20").as_str(), "20px");
/// assert_eq!(Offset::parse("5rem").as_str(), "5rem");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Offset(String);

impl Offset {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut value: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if !UNITS.iter().any(|unit| value.contains(unit)) {
            value.push_str("px");
        }
        Self(value)
    }

    /// Normalize a JSON number (`20` becomes `"20px"`).
    #[must_use]
    pub fn from_number(n: &Number) -> Self {
        Self::parse(&n.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Offsets for the four sides of a step; unset sides stay unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    top: Option<Offset>,
    right: Option<Offset>,
    bottom: Option<Offset>,
    left: Option<Offset>,
}

impl Position {
    /// No sides set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            top: None,
            right: None,
            bottom: None,
            left: None,
        }
    }

    /// Used when a step declares no position: pinned to the top-right corner.
    #[must_use]
    pub fn corner() -> Self {
        Self::empty()
            .with(Side::Top, Offset::parse("0px"))
            .with(Side::Right, Offset::parse("0px"))
    }

    #[must_use]
    pub fn with(mut self, side: Side, offset: Offset) -> Self {
        *self.slot_mut(side) = Some(offset);
        self
    }

    #[must_use]
    pub fn get(&self, side: Side) -> Option<&Offset> {
        match side {
            Side::Top => self.top.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
        }
    }

    /// Set sides in `top, right, bottom, left` order.
    pub fn sides(&self) -> impl Iterator<Item = (Side, &Offset)> {
        Side::ALL
            .into_iter()
            .filter_map(|side| self.get(side).map(|offset| (side, offset)))
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<Offset> {
        match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        }
    }

    fn from_object(map: &Map<String, Value>) -> Result<Self> {
        let mut position = Self::empty();
        for side in Side::ALL {
            let offset = match map.get(side.name()) {
                None => continue,
                Some(Value::String(s)) => Offset::parse(s),
                Some(Value::Number(n)) => Offset::from_number(n),
                Some(other) => {
                    return Err(OnboardError::invalid_option(
                        side.field(),
                        "a string or number",
                        other,
                    ));
                }
            };
            *position.slot_mut(side) = Some(offset);
        }
        Ok(position)
    }
}

// ── Raw and resolved options ────────────────────────────────────────────

/// The `data-options` payload as a JSON object, not yet validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOptions {
    fields: Map<String, Value>,
}

impl RawOptions {
    /// Parse an attribute value. An absent or blank attribute yields an
    /// empty object; anything that is not a JSON object is an error.
    pub fn parse(attribute: Option<&str>) -> std::result::Result<Self, serde_json::Error> {
        match attribute.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => Ok(Self {
                fields: serde_json::from_str(text)?,
            }),
        }
    }

    /// Sort key of the step; never fails.
    #[must_use]
    pub fn order_key(&self) -> OrderKey {
        OrderKey::from_value(self.fields.get("sequenceOrder"))
    }

    /// Validate every field and fill defaults.
    pub fn resolve(&self) -> Result<StepOptions> {
        let highlighting = match self.field("highlighting") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(OnboardError::invalid_option(
                    "highlighting",
                    "a boolean",
                    other,
                ));
            }
        };

        let is_timed = match self.field("type") {
            None => true,
            Some(Value::String(tag)) if tag == "timed" => true,
            Some(Value::String(tag)) if tag == "confirm" => false,
            Some(other) => {
                return Err(OnboardError::invalid_option(
                    "type",
                    "a string containing either \"timed\" or \"confirm\"",
                    other,
                ));
            }
        };

        let position = match self.field("position") {
            None => Position::corner(),
            Some(Value::Object(map)) => Position::from_object(map)?,
            Some(other) => {
                return Err(OnboardError::invalid_option("position", "an object", other));
            }
        };

        let kind = if is_timed {
            StepKind::Timed {
                timer: self.timer()?,
            }
        } else {
            StepKind::Confirm
        };

        Ok(StepOptions {
            order: self.order_key(),
            kind,
            position,
            highlighting,
        })
    }

    /// A field, treating JSON `null` as absent.
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    fn timer(&self) -> Result<Duration> {
        let Some(value) = self.field("timer") else {
            return Ok(DEFAULT_TIMER);
        };
        let millis = match value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            _ => None,
        };
        match millis {
            Some(0) => Ok(DEFAULT_TIMER),
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Err(OnboardError::invalid_option(
                "timer",
                "a positive integer of milliseconds",
                value,
            )),
        }
    }
}

/// Validated options of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOptions {
    pub order: OrderKey,
    pub kind: StepKind,
    pub position: Position,
    pub highlighting: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            order: OrderKey::UNORDERED,
            kind: StepKind::default(),
            position: Position::corner(),
            highlighting: false,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence_order: Option<Number>,
    highlighting: bool,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timer: Option<u64>,
    position: Map<String, Value>,
}

impl StepOptions {
    /// Serialize into the `data-options` attribute format.
    ///
    /// Integral sort keys are written as JSON integers; unordered keys are
    /// omitted.
    #[must_use]
    pub fn to_attribute(&self) -> String {
        let order = self.order.value();
        let sequence_order = if !self.order.is_ordered() {
            None
        } else if order.fract() == 0.0 && order.abs() < i64::MAX as f64 {
            Some(Number::from(order as i64))
        } else {
            Number::from_f64(order)
        };
        let timer = match self.kind {
            StepKind::Timed { timer } => Some(u64::try_from(timer.as_millis()).unwrap_or(u64::MAX)),
            StepKind::Confirm => None,
        };
        let position = self
            .position
            .sides()
            .map(|(side, offset)| (side.name().to_owned(), Value::String(offset.to_string())))
            .collect();
        let wire = WireOptions {
            sequence_order,
            highlighting: self.highlighting,
            kind: self.kind.tag(),
            timer,
            position,
        };
        serde_json::to_string(&wire).unwrap_or_else(|_| "{}".to_owned())
    }
}
