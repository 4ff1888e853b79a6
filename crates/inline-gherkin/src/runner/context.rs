//! Per-execution state for stories and scenarios.

use crate::config::FailureMode;
use crate::error::StepFailure;
use crate::keyword::StepKeyword;
use crate::story::{Narrative, StoryId};

/// State of one running story.
///
/// Returned by [`StepRunner::start_story`](super::StepRunner::start_story)
/// and consumed by [`StepRunner::end_story`](super::StepRunner::end_story).
#[derive(Debug)]
pub struct StoryContext {
    pub(crate) id: StoryId,
    pub(crate) narrative: Option<Narrative>,
    pub(crate) mode: FailureMode,
    pub(crate) passed: usize,
    pub(crate) failed: usize,
}

impl StoryContext {
    pub(crate) fn new(id: StoryId, narrative: Option<Narrative>, mode: FailureMode) -> Self {
        Self {
            id,
            narrative,
            mode,
            passed: 0,
            failed: 0,
        }
    }

    /// The story being run.
    #[must_use]
    pub fn id(&self) -> &StoryId {
        &self.id
    }

    /// The story's narrative, if one was declared.
    #[must_use]
    pub fn narrative(&self) -> Option<&Narrative> {
        self.narrative.as_ref()
    }

    /// Failure mode applied to the story's scenarios.
    #[must_use]
    pub fn failure_mode(&self) -> FailureMode {
        self.mode
    }

    /// Number of scenarios that finished without a failure.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Number of scenarios that finished with a failure.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }
}

/// State of one running scenario.
///
/// Holds the "And" marker and the pending failure slot, so concurrent
/// scenarios sharing a runner never see each other's state.
#[derive(Debug)]
pub struct ScenarioContext {
    pub(crate) story: StoryId,
    pub(crate) title: String,
    pub(crate) mode: FailureMode,
    pub(crate) last_keyword: Option<StepKeyword>,
    pub(crate) failure: Option<StepFailure>,
    pub(crate) steps: usize,
}

impl ScenarioContext {
    pub(crate) fn new(story: &StoryContext, title: String) -> Self {
        Self {
            story: story.id.clone(),
            title,
            mode: story.mode,
            last_keyword: None,
            failure: None,
            steps: 0,
        }
    }

    /// The enclosing story.
    #[must_use]
    pub fn story(&self) -> &StoryId {
        &self.story
    }

    /// Scenario title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The first failure recorded in this scenario.
    #[must_use]
    pub fn failure(&self) -> Option<&StepFailure> {
        self.failure.as_ref()
    }

    /// Returns `true` once a step failure has been recorded.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Number of steps executed or skipped so far.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Keeps `failure` unless an earlier one is already recorded.
    pub(crate) fn record(&mut self, failure: &StepFailure) {
        if self.failure.is_none() {
            self.failure = Some(failure.clone());
        }
    }
}
