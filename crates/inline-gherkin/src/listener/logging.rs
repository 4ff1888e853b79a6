//! Listener that narrates the run through the `log` facade.

use super::{Listener, ScenarioEvent, StepEvent, StoryEvent};
use crate::error::StepFailure;
use crate::story::Narrative;

/// Writes every lifecycle event to the `log` facade.
///
/// Story and scenario boundaries log at info level, step progress at debug
/// level, failures and skips at warn level. The listener keeps no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogListener;

impl LogListener {
    /// Creates the listener.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Listener for LogListener {
    fn story_started(&self, event: &StoryEvent<'_>) {
        log::info!("story started: {}", event.story);
    }

    fn narrative(&self, event: &StoryEvent<'_>, narrative: &Narrative) {
        log::info!(
            "{}: in order to {}, as a {}, I want to {}",
            event.story.name(),
            narrative.in_order_to,
            narrative.as_a,
            narrative.i_want_to
        );
    }

    fn scenario_started(&self, event: &ScenarioEvent<'_>) {
        log::info!("scenario started: {}", event.title);
    }

    fn step_started(&self, event: &StepEvent<'_>) {
        log::debug!("{} {}", event.keyword, event.description);
    }

    fn step_succeeded(&self, event: &StepEvent<'_>) {
        log::debug!("{} {}: success", event.keyword, event.description);
    }

    fn step_failed(&self, event: &StepEvent<'_>, failure: &StepFailure) {
        log::warn!("{} {}: {}", event.keyword, event.description, failure.report());
    }

    fn step_skipped(&self, event: &StepEvent<'_>) {
        log::warn!("{} {}: skipped", event.keyword, event.description);
    }

    fn scenario_succeeded(&self, event: &ScenarioEvent<'_>) {
        log::info!("scenario succeeded: {}", event.title);
    }

    fn scenario_failed(&self, event: &ScenarioEvent<'_>, failure: &StepFailure) {
        log::warn!("scenario failed: {}: {failure}", event.title);
    }

    fn story_finished(&self, event: &StoryEvent<'_>) {
        log::info!("story finished: {}", event.story);
    }
}
