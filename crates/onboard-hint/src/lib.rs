#![forbid(unsafe_code)]

//! Presentational hint containers.
//!
//! A [`HintDescriptor`] has no behavior of its own. Rendering it produces a
//! `div` carrying the hint marker class and the step's options serialized
//! into the `data-options` attribute; the tour controller discovers and
//! drives those containers later.
//!
//! # Example
//!
//! ```
//! use onboard_hint::HintDescriptor;
//! use onboard_page::{Document, Page};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let hint = HintDescriptor::new()
//!     .sequence_order(2)
//!     .confirm()
//!     .content("Click here to continue")
//!     .render(&mut doc, body)
//!     .unwrap();
//!
//! assert!(doc.has_class(hint, "onboard-hint"));
//! assert!(doc.attribute(hint, "data-options").unwrap().contains("\"confirm\""));
//! ```

use std::time::Duration;

use onboard_core::{
    HINT_CLASS, OPTIONS_ATTRIBUTE, Offset, OrderKey, Position, Side, StepKind, StepOptions,
};
use onboard_page::{ElementId, Page, PageError};

/// Configuration and content of one hint container.
#[derive(Debug, Clone, PartialEq)]
pub struct HintDescriptor {
    options: StepOptions,
    classes: Vec<String>,
    content: String,
}

impl Default for HintDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl HintDescriptor {
    /// A highlighted, timed hint ordered first and pinned to the top-left corner.
    #[must_use]
    pub fn new() -> Self {
        Self::from_options(StepOptions {
            order: OrderKey::new(1.0),
            kind: StepKind::timed(),
            position: Position::empty()
                .with(Side::Top, Offset::parse("0"))
                .with(Side::Left, Offset::parse("0")),
            highlighting: true,
        })
    }

    /// Wrap already-built options.
    #[must_use]
    pub fn from_options(options: StepOptions) -> Self {
        Self {
            options,
            classes: Vec::new(),
            content: String::new(),
        }
    }

    /// Set the sort key.
    #[must_use]
    pub fn sequence_order(mut self, order: i64) -> Self {
        self.options.order = OrderKey::new(order as f64);
        self
    }

    /// Advance automatically after `timer`.
    #[must_use]
    pub fn timed(mut self, timer: Duration) -> Self {
        self.options.kind = StepKind::Timed { timer };
        self
    }

    /// Wait for explicit confirmation.
    #[must_use]
    pub fn confirm(mut self) -> Self {
        self.options.kind = StepKind::Confirm;
        self
    }

    /// Set whether the hint's container is raised above the backdrop.
    #[must_use]
    pub fn highlighting(mut self, highlighting: bool) -> Self {
        self.options.highlighting = highlighting;
        self
    }

    /// Replace every side of the position.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.options.position = position;
        self
    }

    /// Set one side of the position (`"10"` is stored as `"10px"`).
    #[must_use]
    pub fn offset(mut self, side: Side, value: &str) -> Self {
        self.options.position = self.options.position.with(side, Offset::parse(value));
        self
    }

    /// Add an extra class next to the marker class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the text shown inside the container.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub const fn options(&self) -> &StepOptions {
        &self.options
    }

    /// Create the container under `parent` and return its handle.
    pub fn render<P: Page>(&self, page: &mut P, parent: ElementId) -> Result<ElementId, PageError> {
        let el = page.create_element("div")?;
        page.add_class(el, HINT_CLASS)?;
        for class in &self.classes {
            page.add_class(el, class)?;
        }
        page.set_attribute(el, OPTIONS_ATTRIBUTE, &self.options.to_attribute())?;
        if !self.content.is_empty() {
            page.set_text(el, &self.content)?;
        }
        page.append_child(parent, el)?;
        Ok(el)
    }
}
