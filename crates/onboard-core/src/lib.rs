#![forbid(unsafe_code)]

//! Shared vocabulary for onboard tours.
//!
//! # Key Components
//!
//! - [`TourConfig`] - process-wide tour settings (backdrop on/off, mount point, color)
//! - [`RawOptions`] / [`StepOptions`] - the per-step `data-options` payload, raw and validated
//! - [`StepKind`] - how a step advances: on a timer or on explicit confirmation
//! - [`Position`] / [`Offset`] - normalized CSS offsets for a step
//! - [`OnboardError`] - the error taxonomy shared by every crate in the workspace
//!
//! # Role in onboard
//! `onboard-core` sits between the page boundary (`onboard-page`) and the
//! two consumers of step options: the presentational hint (`onboard-hint`),
//! which serializes them, and the controller (`onboard-runtime`), which reads
//! them back.

pub mod config;
pub mod error;
pub mod options;

pub use config::TourConfig;
pub use error::{OnboardError, Result};
pub use options::{
    DEFAULT_TIMER, Offset, OrderKey, Position, RawOptions, Side, StepKind, StepOptions,
};

/// Marker class identifying hint containers on the page.
pub const HINT_CLASS: &str = "onboard-hint";
/// Marker class carried by the step currently on display.
pub const ACTIVE_CLASS: &str = "active-sequence";
/// Marker class identifying the backdrop element.
pub const BACKDROP_CLASS: &str = "onboard-background";
/// Marker class hiding the backdrop.
pub const INACTIVE_CLASS: &str = "inactive";
/// Attribute holding a step's serialized options.
pub const OPTIONS_ATTRIBUTE: &str = "data-options";
/// Stacking order that lifts a highlighted container above the backdrop.
pub const HIGHLIGHT_Z_INDEX: &str = "100000";
