//! Step wizard controller.
//!
//! Holds the current step and per-step completion flags. Forward movement is
//! only possible into the step right after the current one, and only when the
//! current step is complete. Backward movement never validates.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::analytics::{Analytics, AnalyticsEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("step {requested} is not reachable from step {current}")]
    Unreachable { current: usize, requested: usize },

    #[error("step {0} is not complete")]
    Incomplete(usize),

    #[error("backward navigation is disabled")]
    BackwardDisabled,

    #[error("step navigation is disabled")]
    NavigationDisabled,

    #[error("already at the first step")]
    AtFirstStep,
}

#[derive(Debug, Clone)]
pub struct WizardConfig {
    pub labels: Vec<&'static str>,
    /// `false` hides the back control entirely.
    pub can_prev: bool,
    /// Enables jumping through the step header.
    pub navigation_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
}

impl Transition {
    pub fn is_forward(&self) -> bool {
        self.to > self.from
    }
}

/// Emits one event per forward transition, tagged with the destination step.
pub struct StepTracker {
    pub analytics: Arc<dyn Analytics>,
    pub event: &'static str,
    pub user_id: String,
}

pub struct StepWizard {
    config: WizardConfig,
    current_step: usize,
    step_flags: Vec<bool>,
    tracker: Option<StepTracker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub index: usize,
    pub label: &'static str,
    pub complete: bool,
    pub reachable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub current_step: usize,
    pub current_label: &'static str,
    pub can_next: bool,
    pub can_prev: bool,
    pub navigation_enabled: bool,
    pub steps: Vec<StepView>,
}

impl StepWizard {
    pub fn new(config: WizardConfig) -> Self {
        let step_flags = vec![false; config.labels.len()];
        Self {
            config,
            current_step: 0,
            step_flags,
            tracker: None,
        }
    }

    pub fn with_tracker(mut self, tracker: StepTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.step_flags.len()
    }

    /// Records whether `step` satisfies its local validation.
    pub fn set_complete(&mut self, step: usize, complete: bool) {
        if let Some(flag) = self.step_flags.get_mut(step) {
            *flag = complete;
        }
    }

    pub fn is_complete(&self, step: usize) -> bool {
        self.step_flags.get(step).copied().unwrap_or(false)
    }

    /// A step can be left forwards when it is complete and is not the last one.
    pub fn can_advance(&self, step: usize) -> bool {
        self.is_complete(step) && step + 1 < self.step_count()
    }

    /// `{0..=current} ∪ {current + 1 if can_advance(current)}`
    pub fn is_reachable(&self, step: usize) -> bool {
        step <= self.current_step
            || (step == self.current_step + 1 && self.can_advance(self.current_step))
    }

    pub fn can_prev(&self) -> bool {
        self.config.can_prev && self.current_step > 0
    }

    /// Header navigation. Rejected requests leave the state unchanged.
    pub fn go_to(&mut self, step: usize) -> Result<Transition, TransitionError> {
        if !self.config.navigation_enabled {
            return Err(TransitionError::NavigationDisabled);
        }
        self.move_to(step)
    }

    pub fn next(&mut self) -> Result<Transition, TransitionError> {
        if !self.can_advance(self.current_step) {
            return Err(TransitionError::Incomplete(self.current_step));
        }
        self.move_to(self.current_step + 1)
    }

    pub fn prev(&mut self) -> Result<Transition, TransitionError> {
        if !self.config.can_prev {
            return Err(TransitionError::BackwardDisabled);
        }
        if self.current_step == 0 {
            return Err(TransitionError::AtFirstStep);
        }
        self.move_to(self.current_step - 1)
    }

    fn move_to(&mut self, step: usize) -> Result<Transition, TransitionError> {
        if step >= self.step_count() || !self.is_reachable(step) {
            return Err(TransitionError::Unreachable {
                current: self.current_step,
                requested: step,
            });
        }

        let transition = Transition {
            from: self.current_step,
            to: step,
        };
        self.current_step = step;
        debug!("wizard moved {} -> {}", transition.from, transition.to);

        if transition.is_forward() {
            self.emit_step_event(step);
        }
        Ok(transition)
    }

    fn emit_step_event(&self, step: usize) {
        if let Some(tracker) = &self.tracker {
            tracker.analytics.track(
                AnalyticsEvent::new(tracker.event)
                    .for_user(&tracker.user_id)
                    .with("step", step)
                    .with("label", self.label(step)),
            );
        }
    }

    pub fn label(&self, step: usize) -> &'static str {
        self.config.labels.get(step).copied().unwrap_or("")
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            current_step: self.current_step,
            current_label: self.label(self.current_step),
            can_next: self.can_advance(self.current_step),
            can_prev: self.can_prev(),
            navigation_enabled: self.config.navigation_enabled,
            steps: (0..self.step_count())
                .map(|index| StepView {
                    index,
                    label: self.label(index),
                    complete: self.is_complete(index),
                    reachable: self.is_reachable(index),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::RecordingAnalytics;

    fn wizard(can_prev: bool, navigation_enabled: bool) -> StepWizard {
        StepWizard::new(WizardConfig {
            labels: vec!["One", "Two", "Three", "Four"],
            can_prev,
            navigation_enabled,
        })
    }

    #[test]
    fn test_starts_at_step_zero_with_nothing_complete() {
        let w = wizard(true, true);
        assert_eq!(w.current_step(), 0);
        assert!(!w.can_advance(0));
        assert!(w.is_reachable(0));
        assert!(!w.is_reachable(1));
    }

    #[test]
    fn test_go_to_succeeds_iff_reachable() {
        let mut w = wizard(true, true);
        w.set_complete(0, true);
        w.next().unwrap();
        // current = 1, step 1 incomplete
        for step in 0..6 {
            let mut fresh = wizard(true, true);
            fresh.set_complete(0, true);
            fresh.next().unwrap();
            let expected = fresh.is_reachable(step) && step < fresh.step_count();
            let before = fresh.current_step();
            let result = fresh.go_to(step);
            assert_eq!(result.is_ok(), expected, "step {step}");
            if result.is_err() {
                assert_eq!(fresh.current_step(), before);
            }
        }
        assert!(w.go_to(2).is_err());
        w.set_complete(1, true);
        assert_eq!(w.go_to(2).unwrap(), Transition { from: 1, to: 2 });
    }

    #[test]
    fn test_go_to_never_skips_a_step() {
        let mut w = wizard(true, true);
        w.set_complete(0, true);
        w.set_complete(1, true);
        assert_eq!(
            w.go_to(2),
            Err(TransitionError::Unreachable {
                current: 0,
                requested: 2
            })
        );
        assert_eq!(w.current_step(), 0);
    }

    #[test]
    fn test_next_rejected_on_incomplete_step() {
        let mut w = wizard(true, false);
        assert_eq!(w.next(), Err(TransitionError::Incomplete(0)));
        assert_eq!(w.current_step(), 0);
    }

    #[test]
    fn test_next_works_without_header_navigation() {
        let mut w = wizard(false, false);
        w.set_complete(0, true);
        assert!(w.next().is_ok());
        assert_eq!(w.go_to(0), Err(TransitionError::NavigationDisabled));
    }

    #[test]
    fn test_last_step_cannot_advance() {
        let mut w = wizard(true, true);
        for step in 0..4 {
            w.set_complete(step, true);
        }
        w.next().unwrap();
        w.next().unwrap();
        w.next().unwrap();
        assert_eq!(w.current_step(), w.step_count() - 1);
        assert_eq!(w.next(), Err(TransitionError::Incomplete(3)));
    }

    #[test]
    fn test_prev_ignores_flags_but_respects_can_prev() {
        let mut w = wizard(true, true);
        w.set_complete(0, true);
        w.next().unwrap();
        w.set_complete(0, false);
        assert_eq!(w.prev().unwrap(), Transition { from: 1, to: 0 });
        assert_eq!(w.prev(), Err(TransitionError::AtFirstStep));

        let mut locked = wizard(false, true);
        locked.set_complete(0, true);
        locked.next().unwrap();
        assert_eq!(locked.prev(), Err(TransitionError::BackwardDisabled));
        assert_eq!(locked.current_step(), 1);
    }

    #[test]
    fn test_forward_transitions_emit_destination_step() {
        let analytics = Arc::new(RecordingAnalytics::default());
        let mut w = wizard(true, true).with_tracker(StepTracker {
            analytics: analytics.clone(),
            event: "Wizard > Step",
            user_id: "u1".to_string(),
        });
        w.set_complete(0, true);
        w.next().unwrap();
        w.prev().unwrap();

        let events = analytics.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].properties["step"], 1);
        assert_eq!(events[0].properties["label"], "Two");
        assert_eq!(events[0].distinct_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_view_reports_affordances() {
        let mut w = wizard(false, false);
        w.set_complete(0, true);
        let view = w.view();
        assert!(view.can_next);
        assert!(!view.can_prev);
        assert!(view.steps[1].reachable);
        assert!(!view.steps[2].reachable);
    }
}
