//! Lifecycle listeners and the bus that drives them.
//!
//! Every event carries enough context to be rendered on its own: the story,
//! the scenario title and, for steps, the display keyword, description and
//! raw table. Listeners observe only; nothing they return reaches the
//! runner. A panicking listener aborts the run.

use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use inline_gherkin_table::{Row, Table};

use crate::config::ListenerKind;
use crate::error::{ConfigError, ReportError, StepFailure};
use crate::keyword::StepKeyword;
use crate::story::{Narrative, StoryId};

#[cfg(feature = "diagnostics")]
mod json;
mod logging;
mod report;
mod xml;

#[cfg(feature = "diagnostics")]
pub use json::{JsonFormat, JsonListener};
pub use logging::LogListener;
pub use report::{
    ReportFormat, ReportListener, ScenarioReport, StepReport, StepState, StoryReport,
};
pub use xml::{XmlFormat, XmlListener};

/// Story-level event payload.
#[derive(Debug, Clone, Copy)]
pub struct StoryEvent<'a> {
    /// The story.
    pub story: &'a StoryId,
}

/// Scenario-level event payload.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEvent<'a> {
    /// The enclosing story.
    pub story: &'a StoryId,
    /// Scenario title.
    pub title: &'a str,
}

/// Step-level event payload.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    /// The enclosing story.
    pub story: &'a StoryId,
    /// Title of the enclosing scenario.
    pub scenario: &'a str,
    /// Keyword to display, `And` for a repeated type.
    pub keyword: StepKeyword,
    /// Description with the inline table removed.
    pub description: &'a str,
    /// The parsed inline table, when the step declared one.
    pub table: Option<&'a Table<Row>>,
}

/// Observer of story, scenario and step lifecycle events.
///
/// All callbacks default to doing nothing. Implementations receive events
/// from every scenario the runner executes, possibly from several threads,
/// and synchronise their own state.
pub trait Listener: Send + Sync {
    /// A story started.
    fn story_started(&self, _event: &StoryEvent<'_>) {}
    /// The story declared a narrative.
    fn narrative(&self, _event: &StoryEvent<'_>, _narrative: &Narrative) {}
    /// A scenario started.
    fn scenario_started(&self, _event: &ScenarioEvent<'_>) {}
    /// A step is about to run.
    fn step_started(&self, _event: &StepEvent<'_>) {}
    /// A step passed, or its failure was absorbed.
    fn step_succeeded(&self, _event: &StepEvent<'_>) {}
    /// A step failed.
    fn step_failed(&self, _event: &StepEvent<'_>, _failure: &StepFailure) {}
    /// A step was skipped after an earlier failure.
    fn step_skipped(&self, _event: &StepEvent<'_>) {}
    /// A scenario finished without a recorded failure.
    fn scenario_succeeded(&self, _event: &ScenarioEvent<'_>) {}
    /// A scenario finished with a recorded failure.
    fn scenario_failed(&self, _event: &ScenarioEvent<'_>, _failure: &StepFailure) {}
    /// A story finished.
    fn story_finished(&self, _event: &StoryEvent<'_>) {}

    /// Exposes the report-file capability, if the listener has one.
    fn as_file_listener(&self) -> Option<&dyn FileListener> {
        None
    }
}

/// A listener that writes report files when a story ends.
pub trait FileListener {
    /// Writes every finished story not yet written into `base_dir`.
    ///
    /// Does nothing when no story has finished since the last flush.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when rendering or writing a report fails.
    fn flush_to_file(&self, base_dir: &Utf8Path) -> Result<(), ReportError>;
}

/// Fans events out to listeners in registration order.
#[derive(Clone, Default)]
pub struct ListenerBus {
    listeners: Vec<Arc<dyn Listener>>,
}

impl ListenerBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn register(&mut self, listener: Arc<dyn Listener>) {
        self.listeners.push(listener);
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` when no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn each(&self, mut emit: impl FnMut(&dyn Listener)) {
        for listener in &self.listeners {
            emit(listener.as_ref());
        }
    }

    pub(crate) fn story_started(&self, event: &StoryEvent<'_>, narrative: Option<&Narrative>) {
        self.each(|l| l.story_started(event));
        if let Some(narrative) = narrative {
            self.each(|l| l.narrative(event, narrative));
        }
    }

    pub(crate) fn scenario_started(&self, event: &ScenarioEvent<'_>) {
        self.each(|l| l.scenario_started(event));
    }

    pub(crate) fn step_started(&self, event: &StepEvent<'_>) {
        self.each(|l| l.step_started(event));
    }

    pub(crate) fn step_succeeded(&self, event: &StepEvent<'_>) {
        self.each(|l| l.step_succeeded(event));
    }

    pub(crate) fn step_failed(&self, event: &StepEvent<'_>, failure: &StepFailure) {
        self.each(|l| l.step_failed(event, failure));
    }

    pub(crate) fn step_skipped(&self, event: &StepEvent<'_>) {
        self.each(|l| l.step_skipped(event));
    }

    pub(crate) fn scenario_succeeded(&self, event: &ScenarioEvent<'_>) {
        self.each(|l| l.scenario_succeeded(event));
    }

    pub(crate) fn scenario_failed(&self, event: &ScenarioEvent<'_>, failure: &StepFailure) {
        self.each(|l| l.scenario_failed(event, failure));
    }

    pub(crate) fn story_finished(&self, event: &StoryEvent<'_>) {
        self.each(|l| l.story_finished(event));
    }

    /// Flushes every file-capable listener into `base_dir`.
    ///
    /// All listeners are attempted; the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReportError`] raised by a listener.
    pub fn flush(&self, base_dir: &Utf8Path) -> Result<(), ReportError> {
        let mut first_error = None;
        for file_listener in self
            .listeners
            .iter()
            .filter_map(|listener| listener.as_file_listener())
        {
            if let Err(err) = file_listener.flush_to_file(base_dir) {
                log::warn!("failed to write report into {base_dir}: {err}");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for ListenerBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Instantiates a built-in listener.
pub(crate) fn builtin(kind: ListenerKind) -> Result<Arc<dyn Listener>, ConfigError> {
    match kind {
        ListenerKind::Xml => Ok(Arc::new(XmlListener::new())),
        ListenerKind::Log => Ok(Arc::new(LogListener::new())),
        #[cfg(feature = "diagnostics")]
        ListenerKind::Json => Ok(Arc::new(JsonListener::new())),
        #[cfg(not(feature = "diagnostics"))]
        ListenerKind::Json => Err(ConfigError::FeatureDisabled {
            name: "json",
            feature: "diagnostics",
        }),
    }
}

#[cfg(test)]
mod tests;
