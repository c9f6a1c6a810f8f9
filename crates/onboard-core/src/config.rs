#![forbid(unsafe_code)]

//! Tour-wide configuration.
//!
//! Every constructor produces a fresh value; there is no shared default
//! instance for callers to mutate.

use serde::{Deserialize, Serialize};

/// Default backdrop mount point.
pub const DEFAULT_BACKDROP_PARENT: &str = "body";
/// Default backdrop color (semi-transparent black).
pub const DEFAULT_BACKDROP_COLOR: &str = "rgba( 0, 0, 0, .5)";

/// Tour configuration handed to `init()`.
///
/// Deserializes from camelCase JSON; missing fields take their defaults.
///
/// ```
/// use onboard_core::TourConfig;
///
/// let config = TourConfig::from_json(r#"{"hasBackdrop": false}"#).unwrap();
/// assert!(!config.has_backdrop);
/// assert_eq!(config.backdrop_parent, "body");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourConfig {
    /// Whether a dimming backdrop is shown behind the active step.
    #[serde(alias = "hasBackground")]
    pub has_backdrop: bool,
    /// Selector of the element the backdrop is mounted under.
    #[serde(alias = "backgroundParentWrapper")]
    pub backdrop_parent: String,
    /// CSS color of the backdrop.
    #[serde(alias = "backgroundColor")]
    pub backdrop_color: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            has_backdrop: true,
            backdrop_parent: DEFAULT_BACKDROP_PARENT.to_owned(),
            backdrop_color: DEFAULT_BACKDROP_COLOR.to_owned(),
        }
    }
}

impl TourConfig {
    /// Parse a configuration from JSON, filling absent fields with defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set whether a backdrop is shown.
    #[must_use]
    pub fn has_backdrop(mut self, has_backdrop: bool) -> Self {
        self.has_backdrop = has_backdrop;
        self
    }

    /// Set the backdrop mount point.
    #[must_use]
    pub fn backdrop_parent(mut self, selector: impl Into<String>) -> Self {
        self.backdrop_parent = selector.into();
        self
    }

    /// Set the backdrop color.
    #[must_use]
    pub fn backdrop_color(mut self, color: impl Into<String>) -> Self {
        self.backdrop_color = color.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = TourConfig::default();
        assert!(config.has_backdrop);
        assert_eq!(config.backdrop_parent, "body");
        assert_eq!(config.backdrop_color, "rgba( 0, 0, 0, .5)");
    }

    #[test]
    fn builder_does_not_touch_fresh_defaults() {
        let custom = TourConfig::default()
            .has_backdrop(false)
            .backdrop_parent("#app")
            .backdrop_color("black");
        assert_eq!(custom.backdrop_parent, "#app");
        assert_eq!(TourConfig::default().backdrop_parent, "body");
        assert!(TourConfig::default().has_backdrop);
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = TourConfig::from_json(r##"{"backdropParent": "#root"}"##).unwrap();
        assert_eq!(
            config,
            TourConfig {
                has_backdrop: true,
                backdrop_parent: "#root".to_owned(),
                backdrop_color: DEFAULT_BACKDROP_COLOR.to_owned(),
            }
        );
        assert_eq!(TourConfig::from_json("{}").unwrap(), TourConfig::default());
    }

    #[test]
    fn json_accepts_legacy_names() {
        let config = TourConfig::from_json(
            r##"{"hasBackground": false, "backgroundParentWrapper": "main", "backgroundColor": "red"}"##,
        )
        .unwrap();
        assert!(!config.has_backdrop);
        assert_eq!(config.backdrop_parent, "main");
        assert_eq!(config.backdrop_color, "red");
    }

    #[test]
    fn json_rejects_wrong_types() {
        assert!(TourConfig::from_json(r#"{"hasBackdrop": "yes"}"#).is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let text = serde_json::to_string(&TourConfig::default()).unwrap();
        assert!(text.contains("\"hasBackdrop\":true"));
        assert!(text.contains("\"backdropParent\":\"body\""));
    }
}
