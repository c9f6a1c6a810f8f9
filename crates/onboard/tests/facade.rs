#![forbid(unsafe_code)]

//! The facade exposes a complete tour without reaching into member crates.

use std::time::Duration;

use onboard::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn prelude_runs_a_confirm_then_timed_tour() -> Result<()> {
    let mut doc = Document::new();
    let body = doc.body();
    let first = HintDescriptor::new()
        .sequence_order(1)
        .confirm()
        .render(&mut doc, body)?;
    let second = HintDescriptor::new()
        .sequence_order(2)
        .timed(Duration::from_millis(40))
        .render(&mut doc, body)?;

    let mut tour = OnboardController::with_clock(doc, ManualClock::new());
    tour.init(TourConfig::default(), None)?;
    assert_eq!(tour.steps(), &[first, second]);

    tour.start()?;
    assert_eq!(tour.current_kind(), Some(StepKind::Confirm));
    tour.confirm_advance()?;
    assert!(tour.page().has_class(second, onboard::ACTIVE_CLASS));

    tour.advance_by(Duration::from_millis(40))?;
    assert!(!tour.is_initialized());
    assert_eq!(tour.take_transitions().len(), 2);
    Ok(())
}

#[test]
fn page_errors_lift_into_facade_error() {
    fn render_into_removed(doc: &mut Document) -> Result<ElementId> {
        let body = doc.body();
        let section = doc.create_element("section")?;
        doc.append_child(body, section)?;
        doc.remove(section);
        Ok(HintDescriptor::new().render(doc, section)?)
    }

    let mut doc = Document::new();
    let err = render_into_removed(&mut doc).unwrap_err();
    assert!(matches!(err, Error::Page(onboard::PageError::StaleElement(_))));
}
