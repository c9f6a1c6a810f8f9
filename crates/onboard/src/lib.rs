#![forbid(unsafe_code)]

//! Onboard public facade crate.
//!
//! Re-exports the types a host needs to render hints and run a tour, plus a
//! prelude for day-to-day usage.
//!
//! ```
//! use std::time::Duration;
//!
//! use onboard::prelude::*;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! HintDescriptor::new()
//!     .sequence_order(1)
//!     .timed(Duration::from_millis(500))
//!     .content("Welcome!")
//!     .render(&mut doc, body)?;
//!
//! let mut tour = OnboardController::with_clock(doc, ManualClock::new());
//! tour.init(TourConfig::default(), None)?;
//! tour.start()?;
//! tour.advance_by(Duration::from_millis(500))?;
//! assert!(!tour.is_running());
//! # Ok::<(), onboard::Error>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use onboard_core::{
    ACTIVE_CLASS, BACKDROP_CLASS, DEFAULT_TIMER, HIGHLIGHT_Z_INDEX, HINT_CLASS, INACTIVE_CLASS,
    OPTIONS_ATTRIBUTE, Offset, OrderKey, Position, RawOptions, Side, StepKind, StepOptions,
    TourConfig,
};

// --- Page re-exports -------------------------------------------------------

pub use onboard_page::{Document, ElementId, Page, PageError, Selector};
#[cfg(target_arch = "wasm32")]
pub use onboard_page::WebPage;

// --- Hint re-exports -------------------------------------------------------

#[cfg(feature = "hint")]
pub use onboard_hint::HintDescriptor;

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use onboard_runtime::{
    AdvanceReason, CompletionCallback, ManualClock, OnboardController, PendingTimer,
    SystemClock, TourClock, TourEvent, TourTransition,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for onboard tours.
pub use onboard_core::OnboardError as Error;

/// Standard result type for onboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, ElementId, Error, Page, Result, Side, StepKind, TourConfig,
    };

    #[cfg(feature = "hint")]
    pub use crate::HintDescriptor;

    #[cfg(feature = "runtime")]
    pub use crate::{ManualClock, OnboardController, SystemClock, TourTransition};

    pub use crate::{core, page};

    #[cfg(feature = "hint")]
    pub use crate::hint;

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use onboard_core as core;
#[cfg(feature = "hint")]
pub use onboard_hint as hint;
pub use onboard_page as page;
#[cfg(feature = "runtime")]
pub use onboard_runtime as runtime;
