#![forbid(unsafe_code)]

//! Error taxonomy for onboard tours.
//!
//! Every variant is a synchronous usage error: nothing is retried or
//! recovered internally. A malformed step halts the tour at that step.

use onboard_page::PageError;
use thiserror::Error;

/// Standard result type for onboard APIs.
pub type Result<T> = std::result::Result<T, OnboardError>;

#[derive(Debug, Error)]
pub enum OnboardError {
    /// A sequencing operation ran before `init()`.
    #[error("onboard controller is not initialized; run init() before starting the sequencer")]
    NotInitialized,

    /// `start()` found no hint containers to drive.
    #[error("no onboard hints were discovered on the page")]
    EmptyTour,

    /// A step option carries a value of the wrong type.
    #[error("incorrect type passed to `{field}` option: expected {expected}, found {found}")]
    InvalidOptionType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A controller helper was invoked in a state it does not support.
    #[error("improper usage of {method}: {detail}")]
    InvalidMethodUsage {
        method: &'static str,
        detail: String,
    },

    /// The `data-options` attribute of a step is not a JSON object.
    #[error("step {index} carries malformed options: {source}")]
    MalformedOptions {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The configured backdrop mount point does not exist.
    #[error("backdrop parent `{selector}` was not found on the page")]
    MissingBackdropParent { selector: String },

    /// A step has no parent container to anchor against.
    #[error("step {index} is not attached to a parent container")]
    Detached { index: usize },

    #[error(transparent)]
    Page(#[from] PageError),
}

impl OnboardError {
    #[must_use]
    pub fn invalid_option(
        field: &'static str,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::InvalidOptionType {
            field,
            expected,
            found: describe(found),
        }
    }

    #[must_use]
    pub fn misuse(method: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidMethodUsage {
            method,
            detail: detail.into(),
        }
    }
}

fn describe(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_owned(),
        Value::Object(_) => "object".to_owned(),
    }
}
