#![forbid(unsafe_code)]

//! The tour state machine.
//!
//! # Lifecycle
//!
//! ```text
//!  idle ──init()──▶ initialized ──start()──▶ running(step i)
//!                                              │      │
//!                        TimerExpired / ConfirmReceived
//!                                              │      │
//!                           i < final ◀────────┘      └──▶ i == final
//!                         show step i+1                 reset() ──▶ idle
//! ```
//!
//! Advancement never recurses. Timer expiries and confirmations become
//! [`TourEvent`]s in a queue that [`OnboardController::poll`] drains, so a
//! tour of any length runs with bounded stack depth.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use onboard_core::{
    ACTIVE_CLASS, BACKDROP_CLASS, HIGHLIGHT_Z_INDEX, HINT_CLASS, INACTIVE_CLASS,
    OPTIONS_ATTRIBUTE, OnboardError, OrderKey, RawOptions, Result, Side, StepKind, TourConfig,
};
use onboard_page::{ElementId, Page};

use crate::clock::{ManualClock, SystemClock, TourClock};
use crate::event::{AdvanceReason, PendingTimer, TourEvent, TourTransition};

const TARGET: &str = "onboard.controller";

/// Invoked once each time the tour resets.
pub type CompletionCallback = Box<dyn FnMut()>;

/// Drives the hint containers of a [`Page`] through a tour.
pub struct OnboardController<P: Page, C: TourClock = SystemClock> {
    page: P,
    clock: C,
    config: TourConfig,
    initialized: bool,
    running: bool,
    steps: Vec<ElementId>,
    current_index: usize,
    final_index: Option<usize>,
    current_kind: Option<StepKind>,
    backdrop: Option<ElementId>,
    timer: Option<PendingTimer>,
    queue: VecDeque<TourEvent>,
    transitions: Vec<TourTransition>,
    on_complete: Option<CompletionCallback>,
}

impl<P: Page> OnboardController<P, SystemClock> {
    /// Controller over `page` timed by the system monotonic clock.
    #[must_use]
    pub fn new(page: P) -> Self {
        Self::with_clock(page, SystemClock::new())
    }
}

impl<P: Page> OnboardController<P, ManualClock> {
    /// Advance the deterministic clock by `dt` and fire whatever came due.
    pub fn advance_by(&mut self, dt: Duration) -> Result<()> {
        self.clock.advance(dt);
        self.poll()
    }
}

impl<P: Page, C: TourClock> OnboardController<P, C> {
    #[must_use]
    pub fn with_clock(page: P, clock: C) -> Self {
        Self {
            page,
            clock,
            config: TourConfig::default(),
            initialized: false,
            running: false,
            steps: Vec::new(),
            current_index: 0,
            final_index: None,
            current_kind: None,
            backdrop: None,
            timer: None,
            queue: VecDeque::new(),
            transitions: Vec::new(),
            on_complete: None,
        }
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Discover and order the page's hint containers.
    ///
    /// A given callback replaces the registered one; `None` keeps it.
    /// Re-initializing a running tour aborts it first.
    pub fn init(
        &mut self,
        config: TourConfig,
        on_complete: Option<CompletionCallback>,
    ) -> Result<()> {
        let _span = tracing::debug_span!(
            target: TARGET,
            "onboard.init",
            has_backdrop = config.has_backdrop,
            steps = tracing::field::Empty,
        )
        .entered();

        if self.running {
            self.abort()?;
        }
        if let Some(callback) = on_complete {
            self.on_complete = Some(callback);
        }
        self.initialized = false;
        let previous = std::mem::replace(&mut self.config, config);
        if self.config.has_backdrop
            && let Err(err) = self.ensure_backdrop()
        {
            self.config = previous;
            return Err(err);
        }

        let mut keyed: Vec<(OrderKey, ElementId)> = self
            .page
            .query_class(HINT_CLASS)
            .into_iter()
            .map(|id| {
                let attribute = self.page.attribute(id, OPTIONS_ATTRIBUTE);
                let key = RawOptions::parse(attribute.as_deref())
                    .map_or(OrderKey::UNORDERED, |raw| raw.order_key());
                (key, id)
            })
            .collect();
        keyed.sort_by_key(|(key, _)| *key);

        for (_, id) in &keyed {
            self.page.set_style(*id, "position", "absolute")?;
        }
        self.steps = keyed.into_iter().map(|(_, id)| id).collect();
        self.current_index = 0;
        self.final_index = None;
        self.current_kind = None;
        self.initialized = true;

        tracing::Span::current().record("steps", self.steps.len());
        tracing::debug!(target: TARGET, steps = self.steps.len(), "tour initialized");
        Ok(())
    }

    /// Show the current step.
    pub fn start(&mut self) -> Result<()> {
        self.check_initialized()?;
        let now = self.clock.now_mono();
        self.show_step(now)
    }

    /// Advance past the current confirm step. No-op on a timed step.
    pub fn confirm_advance(&mut self) -> Result<()> {
        self.check_initialized()?;
        if self.current_kind != Some(StepKind::Confirm) {
            tracing::debug!(
                target: TARGET,
                index = self.current_index,
                "confirmation ignored; current step is not a confirm step"
            );
            return Ok(());
        }
        let at = self.clock.now_mono();
        self.queue.push_back(TourEvent::ConfirmReceived { at });
        self.drive(at)
    }

    /// Fire the pending timer if the clock has reached its deadline.
    pub fn poll(&mut self) -> Result<()> {
        let now = self.clock.now_mono();
        self.drive(now)
    }

    /// Raise (`true`) or lower (`false`) the current step's container.
    ///
    /// Lowering wipes every inline style on the container and reinstates
    /// `position: relative`.
    pub fn set_highlighting(&mut self, active: bool) -> Result<()> {
        let container = self.current_container("set_highlighting")?;
        if active {
            self.page.set_style(container, "z-index", HIGHLIGHT_Z_INDEX)?;
        } else {
            self.page.clear_inline_style(container)?;
            self.page.set_style(container, "position", "relative")?;
        }
        Ok(())
    }

    /// Hide (`true`) or show (`false`) the backdrop.
    pub fn set_backdrop_active(&mut self, inactive: bool) -> Result<()> {
        if !self.config.has_backdrop {
            tracing::debug!(target: TARGET, "no backdrop configured");
            return Ok(());
        }
        let backdrop = self.ensure_backdrop()?;
        if inactive {
            self.page.add_class(backdrop, INACTIVE_CLASS)?;
        } else {
            self.page.remove_class(backdrop, INACTIVE_CLASS)?;
        }
        Ok(())
    }

    /// Return to the idle state, hide the backdrop and run the completion
    /// callback. Steps and the backdrop element are kept; `init()` must run
    /// again before the next tour.
    pub fn reset(&mut self) -> Result<()> {
        self.clear_state();
        let hidden = self.set_backdrop_active(true);
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
        hidden
    }

    /// Stop the tour mid-run without running the completion callback.
    pub fn abort(&mut self) -> Result<()> {
        let _span = tracing::debug_span!(target: TARGET, "onboard.abort").entered();
        let was_running = self.running;
        let mut result = Ok(());
        if was_running && self.current_index < self.steps.len() {
            result = self
                .remove_active_marker(self.current_index)
                .and_then(|()| self.set_highlighting(false));
        }
        self.clear_state();
        let hidden = self.set_backdrop_active(true);
        if was_running {
            tracing::info!(target: TARGET, "tour aborted");
        }
        result.and(hidden)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn final_index(&self) -> Option<usize> {
        self.final_index
    }

    /// Resolved kind of the step on display.
    #[must_use]
    pub const fn current_kind(&self) -> Option<StepKind> {
        self.current_kind
    }

    /// Discovered steps in tour order.
    #[must_use]
    pub fn steps(&self) -> &[ElementId] {
        &self.steps
    }

    #[must_use]
    pub const fn backdrop(&self) -> Option<ElementId> {
        self.backdrop
    }

    /// The outstanding timer, for hosts that schedule their own wake-ups.
    #[must_use]
    pub const fn pending_timer(&self) -> Option<PendingTimer> {
        self.timer
    }

    #[must_use]
    pub const fn config(&self) -> &TourConfig {
        &self.config
    }

    #[must_use]
    pub const fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Drain the transitions recorded since the last call.
    pub fn take_transitions(&mut self) -> Vec<TourTransition> {
        std::mem::take(&mut self.transitions)
    }

    // ── Event loop ──────────────────────────────────────────────────────

    fn drive(&mut self, now: Duration) -> Result<()> {
        let result = self.drain(now);
        if result.is_err() {
            self.queue.clear();
        }
        result
    }

    fn drain(&mut self, now: Duration) -> Result<()> {
        loop {
            while let Some(event) = self.queue.pop_front() {
                self.handle(event)?;
            }
            match self.timer {
                Some(timer) if timer.is_due(now) => {
                    self.timer = None;
                    tracing::debug!(target: TARGET, step = timer.step, deadline = ?timer.deadline, "timer fired");
                    self.queue.push_back(TourEvent::TimerExpired {
                        step: timer.step,
                        at: timer.deadline,
                    });
                }
                _ => return Ok(()),
            }
        }
    }

    fn handle(&mut self, event: TourEvent) -> Result<()> {
        let _span =
            tracing::debug_span!(target: TARGET, "onboard.event", ?event).entered();
        match event {
            TourEvent::TimerExpired { step, at } => {
                if !self.running || step != self.current_index {
                    tracing::warn!(
                        target: TARGET,
                        step,
                        current = self.current_index,
                        "ignoring stale timer"
                    );
                    return Ok(());
                }
                self.advance(AdvanceReason::Timer, at)
            }
            TourEvent::ConfirmReceived { at } => {
                if !self.running || self.current_kind != Some(StepKind::Confirm) {
                    tracing::debug!(target: TARGET, "ignoring confirmation outside a confirm step");
                    return Ok(());
                }
                self.advance(AdvanceReason::Confirm, at)
            }
        }
    }

    fn advance(&mut self, reason: AdvanceReason, at: Duration) -> Result<()> {
        let from = self.current_index;
        self.remove_active_marker(from)?;
        self.set_highlighting(false)?;
        self.current_index += 1;

        if self.final_index.is_none_or(|last| self.current_index > last) {
            self.transitions.push(TourTransition::Finished { last: from, reason });
            tracing::info!(target: TARGET, last = from, ?reason, "tour finished");
            return self.reset();
        }

        let to = self.current_index;
        self.transitions.push(TourTransition::Advanced { from, to, reason });
        tracing::debug!(target: TARGET, from, to, ?reason, "step advanced");
        self.show_step(at)
    }

    // ── Steps ───────────────────────────────────────────────────────────

    /// Validate the current step completely, then apply it to the page.
    fn show_step(&mut self, at: Duration) -> Result<()> {
        let index = self.current_index;
        let _span = tracing::debug_span!(target: TARGET, "onboard.step", index).entered();
        let Some(&step) = self.steps.get(index) else {
            return Err(if self.steps.is_empty() {
                OnboardError::EmptyTour
            } else {
                OnboardError::misuse("start", format!("no step at index {index}"))
            });
        };
        self.running = true;
        // Confirmation stays refused until this step resolves.
        self.current_kind = None;

        let attribute = self.page.attribute(step, OPTIONS_ATTRIBUTE);
        let options = RawOptions::parse(attribute.as_deref())
            .map_err(|source| OnboardError::MalformedOptions { index, source })?
            .resolve()?;
        let container = self
            .page
            .parent(step)
            .ok_or(OnboardError::Detached { index })?;
        let backdrop = if self.config.has_backdrop {
            Some(self.ensure_backdrop()?)
        } else {
            None
        };
        self.current_kind = Some(options.kind);

        for side in Side::ALL {
            self.page.remove_style(step, side.name())?;
        }
        for (side, offset) in options.position.sides() {
            self.page.set_style(step, side.name(), offset.as_str())?;
        }
        self.page.set_style(container, "position", "relative")?;
        if options.highlighting && self.config.has_backdrop {
            self.set_highlighting(true)?;
        }
        self.final_index = Some(self.steps.len() - 1);
        if let Some(backdrop) = backdrop {
            self.page.remove_class(backdrop, INACTIVE_CLASS)?;
        }
        self.page.add_class(step, ACTIVE_CLASS)?;
        tracing::debug!(target: TARGET, index, kind = options.kind.tag(), "step shown");

        match options.kind {
            StepKind::Timed { timer } => self.arm_timer(index, at, timer),
            StepKind::Confirm => {
                if let Some(previous) = self.timer.take() {
                    tracing::debug!(target: TARGET, step = previous.step, "dropping pending timer");
                }
            }
        }
        Ok(())
    }

    fn arm_timer(&mut self, step: usize, at: Duration, timer: Duration) {
        if let Some(previous) = self.timer.take() {
            tracing::debug!(target: TARGET, step = previous.step, "replacing pending timer");
        }
        let deadline = at.saturating_add(timer);
        self.timer = Some(PendingTimer { step, deadline });
        tracing::debug!(target: TARGET, step, ?deadline, "timer armed");
    }

    fn remove_active_marker(&mut self, index: usize) -> Result<()> {
        let step = self.steps.get(index).copied().ok_or_else(|| {
            OnboardError::misuse("remove_active_marker", format!("no step at index {index}"))
        })?;
        self.page.remove_class(step, ACTIVE_CLASS)?;
        Ok(())
    }

    fn current_container(&self, method: &'static str) -> Result<ElementId> {
        let index = self.current_index;
        let step = self
            .steps
            .get(index)
            .copied()
            .ok_or_else(|| OnboardError::misuse(method, format!("no current step at index {index}")))?;
        self.page
            .parent(step)
            .ok_or(OnboardError::Detached { index })
    }

    // ── Backdrop ────────────────────────────────────────────────────────

    /// The owned backdrop, re-resolved when the page no longer contains it.
    fn ensure_backdrop(&mut self) -> Result<ElementId> {
        if let Some(id) = self.backdrop
            && self.page.contains(id)
        {
            return Ok(id);
        }
        if let Some(stale) = self.backdrop.take() {
            tracing::warn!(target: TARGET, ?stale, "backdrop left the page; re-resolving");
        }
        let id = match self.page.query_selector(&format!(".{BACKDROP_CLASS}")) {
            Some(existing) => existing,
            None => self.create_backdrop()?,
        };
        self.backdrop = Some(id);
        Ok(id)
    }

    fn create_backdrop(&mut self) -> Result<ElementId> {
        let selector = &self.config.backdrop_parent;
        let parent = self.page.query_selector(selector).ok_or_else(|| {
            OnboardError::MissingBackdropParent {
                selector: selector.clone(),
            }
        })?;
        let id = self.page.create_element("div")?;
        self.page.set_style(id, "background", &self.config.backdrop_color)?;
        self.page.add_class(id, BACKDROP_CLASS)?;
        self.page.add_class(id, INACTIVE_CLASS)?;
        self.page.append_child(parent, id)?;
        tracing::debug!(target: TARGET, parent = %self.config.backdrop_parent, "backdrop created");
        Ok(id)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn check_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(OnboardError::NotInitialized)
        }
    }

    fn clear_state(&mut self) {
        self.initialized = false;
        self.running = false;
        self.current_index = 0;
        self.final_index = None;
        self.current_kind = None;
        self.timer = None;
        self.queue.clear();
    }
}

impl<P, C> fmt::Debug for OnboardController<P, C>
where
    P: Page + fmt::Debug,
    C: TourClock + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnboardController")
            .field("page", &self.page)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .field("initialized", &self.initialized)
            .field("running", &self.running)
            .field("steps", &self.steps)
            .field("current_index", &self.current_index)
            .field("final_index", &self.final_index)
            .field("current_kind", &self.current_kind)
            .field("backdrop", &self.backdrop)
            .field("timer", &self.timer)
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}
