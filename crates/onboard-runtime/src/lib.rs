#![forbid(unsafe_code)]

//! Sequencing runtime for onboard tours.
//!
//! [`OnboardController`] discovers hint containers through a
//! [`Page`](onboard_page::Page), orders them and shows them one at a time.
//! Timed steps expire against a [`TourClock`]; confirm steps wait for
//! [`OnboardController::confirm_advance`]. The controller never sleeps or
//! spawns: the host calls [`OnboardController::poll`] from its own loop
//! (a frame callback, an interval, a test) and due timers fire there.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use onboard_core::{HINT_CLASS, OPTIONS_ATTRIBUTE, TourConfig};
//! use onboard_page::{Document, Page};
//! use onboard_runtime::{ManualClock, OnboardController};
//!
//! let mut doc = Document::new();
//! let hint = doc.create_element("div").unwrap();
//! doc.add_class(hint, HINT_CLASS).unwrap();
//! doc.set_attribute(hint, OPTIONS_ATTRIBUTE, r#"{"timer": 100}"#).unwrap();
//! doc.append_child(doc.body(), hint).unwrap();
//!
//! let mut tour = OnboardController::with_clock(doc, ManualClock::new());
//! tour.init(TourConfig::default(), None).unwrap();
//! tour.start().unwrap();
//! assert!(tour.is_running());
//!
//! tour.advance_by(Duration::from_millis(100)).unwrap();
//! assert!(!tour.is_running());
//! ```

pub mod clock;
pub mod controller;
pub mod event;

pub use clock::{ManualClock, SystemClock, TourClock};
pub use controller::{CompletionCallback, OnboardController};
pub use event::{AdvanceReason, PendingTimer, TourEvent, TourTransition};
