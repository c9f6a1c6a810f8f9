//! Property-based invariant tests for tour sequencing.
//!
//! ## Invariants
//!
//! 1. After `init()`, steps with unique keys are sorted strictly ascending.
//! 2. At most one step carries the active marker at any time.
//! 3. `current_index` never exceeds `final_index + 1` while running.
//! 4. A timed tour with durations `d_0..d_n` finishes exactly at `sum(d_i)`,
//!    records one transition per step, and runs the completion callback once.
//! 5. Confirmation never moves a timed step.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use onboard_core::{ACTIVE_CLASS, OnboardError, TourConfig};
use onboard_hint::HintDescriptor;
use onboard_page::{Document, ElementId, Page};
use onboard_runtime::{ManualClock, OnboardController, TourTransition};
use proptest::prelude::*;

type Tour = OnboardController<Document, ManualClock>;

#[derive(Debug, Clone, Copy)]
enum Action {
    Tick(u64),
    Confirm,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (1u64..150).prop_map(Action::Tick),
        1 => Just(Action::Confirm),
    ]
}

/// `(sequence order, timer ms or None for confirm)` per step.
fn arb_steps() -> impl Strategy<Value = Vec<(i64, Option<u64>)>> {
    prop::collection::vec((-50i64..50, prop::option::weighted(0.7, 1u64..200)), 1..8)
}

fn build(steps: &[(i64, Option<u64>)]) -> (Tour, Vec<ElementId>) {
    let mut doc = Document::new();
    let body = doc.body();
    let ids = steps
        .iter()
        .map(|&(order, timer)| {
            let hint = HintDescriptor::new().sequence_order(order);
            let hint = match timer {
                Some(ms) => hint.timed(Duration::from_millis(ms)),
                None => hint.confirm(),
            };
            let section = doc.create_element("section").unwrap();
            doc.append_child(body, section).unwrap();
            hint.render(&mut doc, section).unwrap()
        })
        .collect();
    (OnboardController::with_clock(doc, ManualClock::new()), ids)
}

fn active_count(tour: &Tour) -> usize {
    tour.steps()
        .iter()
        .filter(|id| tour.page().has_class(**id, ACTIVE_CLASS))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn unique_keys_sort_ascending(orders in prop::collection::hash_set(-1000i64..1000, 0..20)) {
        let orders: Vec<_> = orders.into_iter().collect();
        let steps: Vec<_> = orders.iter().map(|&o| (o, Some(100))).collect();
        let (mut tour, ids) = build(&steps);
        tour.init(TourConfig::default(), None).unwrap();

        let sorted: Vec<i64> = tour
            .steps()
            .iter()
            .map(|id| orders[ids.iter().position(|x| x == id).unwrap()])
            .collect();
        prop_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(sorted.len(), orders.len());
    }

    #[test]
    fn marker_and_index_stay_consistent(
        steps in arb_steps(),
        actions in prop::collection::vec(arb_action(), 0..60),
    ) {
        let (mut tour, _) = build(&steps);
        tour.init(TourConfig::default(), None).unwrap();
        tour.start().unwrap();

        for action in actions {
            match action {
                Action::Tick(ms) => tour.advance_by(Duration::from_millis(ms)).unwrap(),
                Action::Confirm => match tour.confirm_advance() {
                    Ok(()) | Err(OnboardError::NotInitialized) => {}
                    Err(other) => panic!("unexpected error {other}"),
                },
            }
            prop_assert!(active_count(&tour) <= 1);
            if tour.is_running() {
                prop_assert_eq!(active_count(&tour), 1);
                let last = tour.final_index().unwrap();
                prop_assert!(tour.current_index() <= last + 1);
            } else {
                prop_assert_eq!(active_count(&tour), 0);
            }
        }
    }

    #[test]
    fn timed_tour_finishes_at_total_duration(
        timers in prop::collection::vec(1u64..200, 1..8),
    ) {
        let steps: Vec<_> = timers
            .iter()
            .enumerate()
            .map(|(i, &t)| (i as i64, Some(t)))
            .collect();
        let total: u64 = timers.iter().sum();
        let (mut tour, _) = build(&steps);
        let calls = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&calls);
        tour.init(TourConfig::default(), Some(Box::new(move || seen.set(seen.get() + 1))))
            .unwrap();
        tour.start().unwrap();

        tour.advance_by(Duration::from_millis(total - 1)).unwrap();
        prop_assert!(tour.is_running());
        prop_assert_eq!(tour.current_index(), timers.len() - 1);
        prop_assert_eq!(calls.get(), 0);

        tour.advance_by(Duration::from_millis(1)).unwrap();
        prop_assert!(!tour.is_running());
        prop_assert_eq!(calls.get(), 1);

        let transitions = tour.take_transitions();
        prop_assert_eq!(transitions.len(), timers.len());
        let finished = matches!(transitions.last(), Some(TourTransition::Finished { .. }));
        prop_assert!(finished);
    }

    #[test]
    fn confirm_never_moves_timed_steps(timers in prop::collection::vec(1u64..200, 1..6)) {
        let steps: Vec<_> = timers.iter().map(|&t| (0, Some(t))).collect();
        let (mut tour, _) = build(&steps);
        tour.init(TourConfig::default(), None).unwrap();
        tour.start().unwrap();
        for _ in 0..timers.len() {
            tour.confirm_advance().unwrap();
        }
        prop_assert_eq!(tour.current_index(), 0);
        prop_assert!(tour.take_transitions().is_empty());
    }
}
