#![forbid(unsafe_code)]

//! End-to-end tour scenarios against the in-memory page.
//!
//! Run:
//!   cargo test -p onboard-runtime --test tour_scenarios

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use onboard_core::{
    ACTIVE_CLASS, INACTIVE_CLASS, OnboardError, OrderKey, Side, StepKind, TourConfig,
};
use onboard_hint::HintDescriptor;
use onboard_page::{Document, ElementId, Page};
use onboard_runtime::{
    AdvanceReason, CompletionCallback, ManualClock, OnboardController, TourTransition,
};
use pretty_assertions::assert_eq;

type Tour = OnboardController<Document, ManualClock>;

const MS: Duration = Duration::from_millis(1);

// ============================================================================
// Fixtures
// ============================================================================

/// Render each hint into its own `<section>` under `<body>`.
fn render(hints: &[HintDescriptor]) -> (Document, Vec<ElementId>) {
    let mut doc = Document::new();
    let body = doc.body();
    let ids = hints
        .iter()
        .map(|hint| {
            let section = doc.create_element("section").unwrap();
            doc.append_child(body, section).unwrap();
            hint.render(&mut doc, section).unwrap()
        })
        .collect();
    (doc, ids)
}

fn tour(hints: &[HintDescriptor]) -> (Tour, Vec<ElementId>) {
    let (doc, ids) = render(hints);
    (OnboardController::with_clock(doc, ManualClock::new()), ids)
}

fn counter() -> (Rc<Cell<u32>>, CompletionCallback) {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    (calls, Box::new(move || seen.set(seen.get() + 1)))
}

fn timed(order: i64, ms: u64) -> HintDescriptor {
    HintDescriptor::new()
        .sequence_order(order)
        .timed(Duration::from_millis(ms))
}

fn active(tour: &Tour) -> Vec<ElementId> {
    tour.steps()
        .iter()
        .copied()
        .filter(|id| tour.page().has_class(*id, ACTIVE_CLASS))
        .collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn steps_sorted_by_sequence_order() {
    let (mut tour, ids) = tour(&[timed(2, 100), timed(1, 100), timed(3, 100)]);
    tour.init(TourConfig::default(), None).unwrap();
    assert_eq!(tour.steps(), &[ids[1], ids[0], ids[2]]);
}

// ============================================================================
// Timed tours
// ============================================================================

#[test]
fn three_timed_steps_complete_after_300ms() {
    let (mut tour, ids) = tour(&[timed(2, 100), timed(1, 100), timed(3, 100)]);
    let (calls, callback) = counter();
    tour.init(TourConfig::default(), Some(callback)).unwrap();
    tour.start().unwrap();
    assert_eq!(active(&tour), vec![ids[1]]);

    tour.advance_by(Duration::from_millis(300)).unwrap();

    assert!(!tour.is_initialized());
    assert!(!tour.is_running());
    assert_eq!(tour.current_index(), 0);
    assert_eq!(tour.final_index(), None);
    assert!(active(&tour).is_empty());
    assert_eq!(calls.get(), 1);
    assert_eq!(
        tour.take_transitions(),
        vec![
            TourTransition::Advanced {
                from: 0,
                to: 1,
                reason: AdvanceReason::Timer,
            },
            TourTransition::Advanced {
                from: 1,
                to: 2,
                reason: AdvanceReason::Timer,
            },
            TourTransition::Finished {
                last: 2,
                reason: AdvanceReason::Timer,
            },
        ]
    );
}

#[test]
fn timed_step_marker_spans_its_timer() {
    let (mut tour, ids) = tour(&[timed(1, 250), timed(2, 250)]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();

    for _ in 0..249 {
        tour.advance_by(MS).unwrap();
        assert!(tour.page().has_class(ids[0], ACTIVE_CLASS));
        assert_eq!(tour.current_index(), 0);
    }
    tour.advance_by(MS).unwrap();
    assert!(!tour.page().has_class(ids[0], ACTIVE_CLASS));
    assert!(tour.page().has_class(ids[1], ACTIVE_CLASS));
    assert_eq!(tour.current_index(), 1);
}

#[test]
fn late_poll_catches_up_on_every_due_step() {
    let (mut tour, _) = tour(&[timed(1, 100), timed(2, 100), timed(3, 100)]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();

    tour.advance_by(Duration::from_millis(250)).unwrap();
    assert_eq!(tour.current_index(), 2);
    assert_eq!(
        tour.pending_timer().map(|t| t.deadline),
        Some(Duration::from_millis(300))
    );
}

#[test]
fn zero_timer_uses_default_display_time() {
    let hint = HintDescriptor::from_options(onboard_core::StepOptions {
        order: OrderKey::new(1.0),
        kind: StepKind::Timed {
            timer: Duration::ZERO,
        },
        ..Default::default()
    });
    let (mut tour, _) = tour(&[hint]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();
    assert_eq!(
        tour.pending_timer().map(|t| t.deadline),
        Some(onboard_core::DEFAULT_TIMER)
    );
}

// ============================================================================
// Confirm tours
// ============================================================================

#[test]
fn confirm_step_with_backdrop_and_highlighting() {
    let (mut tour, ids) = tour(&[HintDescriptor::new().confirm().highlighting(true)]);
    let (calls, callback) = counter();
    tour.init(TourConfig::default(), Some(callback)).unwrap();
    tour.start().unwrap();

    let backdrop = tour.backdrop().unwrap();
    let section = tour.page().parent(ids[0]).unwrap();
    assert!(tour.page().has_class(ids[0], ACTIVE_CLASS));
    assert!(!tour.page().has_class(backdrop, INACTIVE_CLASS));
    assert_eq!(tour.page().style(section, "z-index").as_deref(), Some("100000"));

    tour.confirm_advance().unwrap();

    assert!(!tour.is_initialized());
    assert!(tour.page().has_class(backdrop, INACTIVE_CLASS));
    assert!(!tour.page().has_class(ids[0], ACTIVE_CLASS));
    assert_eq!(tour.page().style(section, "z-index"), None);
    assert_eq!(calls.get(), 1);
    assert_eq!(
        tour.take_transitions(),
        vec![TourTransition::Finished {
            last: 0,
            reason: AdvanceReason::Confirm,
        }]
    );
}

#[test]
fn confirm_on_timed_step_is_noop() {
    let (mut tour, ids) = tour(&[timed(1, 100), timed(2, 100)]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();
    let page_before = tour.page().clone();
    let timer_before = tour.pending_timer();

    tour.confirm_advance().unwrap();

    assert_eq!(tour.page(), &page_before);
    assert_eq!(tour.pending_timer(), timer_before);
    assert_eq!(tour.current_index(), 0);
    assert!(tour.page().has_class(ids[0], ACTIVE_CLASS));
    assert!(tour.take_transitions().is_empty());
}

#[test]
fn confirm_before_start_is_noop() {
    let (mut tour, _) = tour(&[HintDescriptor::new().confirm()]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.confirm_advance().unwrap();
    assert_eq!(tour.current_index(), 0);
    assert!(!tour.is_running());
}

#[test]
fn mixed_tour_alternates_timer_and_confirm() {
    let (mut tour, ids) = tour(&[
        timed(1, 100),
        HintDescriptor::new().sequence_order(2).confirm(),
        timed(3, 100),
    ]);
    let (calls, callback) = counter();
    tour.init(TourConfig::default(), Some(callback)).unwrap();
    tour.start().unwrap();

    tour.advance_by(Duration::from_millis(100)).unwrap();
    assert_eq!(active(&tour), vec![ids[1]]);
    assert_eq!(tour.pending_timer(), None);

    // Waiting does nothing on a confirm step.
    tour.advance_by(Duration::from_secs(10)).unwrap();
    assert_eq!(active(&tour), vec![ids[1]]);

    tour.confirm_advance().unwrap();
    assert_eq!(active(&tour), vec![ids[2]]);
    tour.advance_by(Duration::from_millis(100)).unwrap();
    assert!(!tour.is_running());
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn start_before_init_fails() {
    let (mut tour, _) = tour(&[timed(1, 100)]);
    assert!(matches!(tour.start(), Err(OnboardError::NotInitialized)));
}

#[test]
fn invalid_highlighting_fails_before_any_mutation() {
    let (mut doc, ids) = render(&[HintDescriptor::new()]);
    doc.set_attribute(ids[0], "data-options", r#"{"highlighting": "yes"}"#)
        .unwrap();
    let mut tour = OnboardController::with_clock(doc, ManualClock::new());
    tour.init(TourConfig::default(), None).unwrap();
    let before = tour.page().clone();

    let err = tour.start().unwrap_err();

    assert!(matches!(
        err,
        OnboardError::InvalidOptionType {
            field: "highlighting",
            ..
        }
    ));
    assert_eq!(tour.page(), &before);
    assert_eq!(tour.pending_timer(), None);
}

#[test]
fn invalid_later_step_halts_the_tour() {
    let (mut doc, ids) = render(&[timed(1, 100), timed(2, 100)]);
    doc.set_attribute(
        ids[1],
        "data-options",
        r#"{"sequenceOrder": 2, "position": {"top": false}}"#,
    )
    .unwrap();
    let mut tour = OnboardController::with_clock(doc, ManualClock::new());
    let (calls, callback) = counter();
    tour.init(TourConfig::default(), Some(callback)).unwrap();
    tour.start().unwrap();

    let err = tour.advance_by(Duration::from_millis(100)).unwrap_err();
    assert!(matches!(
        err,
        OnboardError::InvalidOptionType {
            field: "position.top",
            ..
        }
    ));
    assert!(active(&tour).is_empty());
    assert_eq!(calls.get(), 0);
    assert_eq!(tour.pending_timer(), None);
}

#[test]
fn invalid_step_after_confirm_cannot_be_confirmed_past() {
    let (mut doc, ids) = render(&[
        HintDescriptor::new().sequence_order(1).confirm(),
        HintDescriptor::new().sequence_order(2).confirm(),
    ]);
    doc.set_attribute(
        ids[1],
        "data-options",
        r#"{"sequenceOrder": 2, "highlighting": "yes"}"#,
    )
    .unwrap();
    let mut tour = OnboardController::with_clock(doc, ManualClock::new());
    let (calls, callback) = counter();
    tour.init(TourConfig::default(), Some(callback)).unwrap();
    tour.start().unwrap();

    let err = tour.confirm_advance().unwrap_err();
    assert!(matches!(
        err,
        OnboardError::InvalidOptionType {
            field: "highlighting",
            ..
        }
    ));
    assert_eq!(tour.current_kind(), None);

    // The halted step is not skipped by further confirmations.
    tour.confirm_advance().unwrap();
    assert!(tour.is_initialized());
    assert_eq!(tour.current_index(), 1);
    assert!(active(&tour).is_empty());
    assert_eq!(calls.get(), 0);
    assert_eq!(
        tour.take_transitions(),
        vec![TourTransition::Advanced {
            from: 0,
            to: 1,
            reason: AdvanceReason::Confirm,
        }]
    );

    tour.abort().unwrap();
    assert_eq!(calls.get(), 0);
}

// ============================================================================
// Completion callback
// ============================================================================

#[test]
fn callback_runs_once_per_tour_and_is_kept_across_init() {
    let (mut tour, _) = tour(&[timed(1, 50)]);
    let (calls, callback) = counter();
    tour.init(TourConfig::default(), Some(callback)).unwrap();
    tour.start().unwrap();
    tour.advance_by(Duration::from_millis(500)).unwrap();
    assert_eq!(calls.get(), 1);

    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();
    tour.advance_by(Duration::from_millis(500)).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn tour_without_callback_finishes_cleanly() {
    let (mut tour, _) = tour(&[HintDescriptor::new().confirm()]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();
    tour.confirm_advance().unwrap();
    assert!(!tour.is_initialized());
}

// ============================================================================
// Backdrop
// ============================================================================

#[test]
fn backdrop_removed_mid_tour_is_recreated() {
    let (mut tour, _) = tour(&[
        HintDescriptor::new().sequence_order(1).confirm(),
        HintDescriptor::new().sequence_order(2).confirm(),
    ]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();
    let first = tour.backdrop().unwrap();
    tour.page_mut().remove(first);

    tour.confirm_advance().unwrap();
    let second = tour.backdrop().unwrap();
    assert_ne!(first, second);
    assert!(tour.page().contains(second));
    assert!(!tour.page().has_class(second, INACTIVE_CLASS));
}

#[test]
fn backdrop_mounts_under_configured_parent() {
    let (mut doc, _) = render(&[HintDescriptor::new().confirm()]);
    let app = doc.create_element("main").unwrap();
    doc.set_attribute(app, "id", "app").unwrap();
    doc.append_child(doc.body(), app).unwrap();

    let mut tour = OnboardController::with_clock(doc, ManualClock::new());
    let config = TourConfig::default()
        .backdrop_parent("#app")
        .backdrop_color("black");
    tour.init(config, None).unwrap();
    let backdrop = tour.backdrop().unwrap();
    assert_eq!(tour.page().parent(backdrop), Some(app));
    assert_eq!(tour.page().style(backdrop, "background").as_deref(), Some("black"));
}

#[test]
fn no_backdrop_tour_runs_without_one() {
    let (mut tour, ids) = tour(&[HintDescriptor::new().confirm().highlighting(true)]);
    tour.init(TourConfig::default().has_backdrop(false), None).unwrap();
    tour.start().unwrap();
    assert_eq!(tour.backdrop(), None);
    assert!(tour.page().has_class(ids[0], ACTIVE_CLASS));
    tour.confirm_advance().unwrap();
    assert!(!tour.is_initialized());
}

// ============================================================================
// Positioning
// ============================================================================

#[test]
fn each_step_gets_its_own_offsets() {
    let (mut tour, ids) = tour(&[
        timed(1, 10).offset(Side::Bottom, "1 em"),
        timed(2, 10),
    ]);
    tour.init(TourConfig::default(), None).unwrap();
    tour.start().unwrap();
    assert_eq!(tour.page().style(ids[0], "bottom").as_deref(), Some("1em"));
    assert_eq!(tour.page().style(ids[0], "top").as_deref(), Some("0px"));
    assert_eq!(tour.page().style(ids[0], "left").as_deref(), Some("0px"));

    tour.advance_by(Duration::from_millis(10)).unwrap();
    assert_eq!(tour.page().style(ids[1], "top").as_deref(), Some("0px"));
    assert_eq!(tour.page().style(ids[1], "bottom"), None);
}
