//! Story report model and the file listener that collects it.
//!
//! A [`ReportListener`] turns lifecycle events into a [`StoryReport`] per
//! story. When the story finishes the report is queued, and the next flush
//! renders it with the listener's [`ReportFormat`] into
//! `<base_dir>/<story name>.<extension>`.

use std::collections::HashMap;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::Utf8Path;
use inline_gherkin_table::{Row, Table};

use super::{FileListener, Listener, ScenarioEvent, StepEvent, StoryEvent};
use crate::error::{ReportError, StepFailure};
use crate::keyword::StepKeyword;
use crate::story::{Narrative, StoryId};

/// Terminal state of a reported step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// The step passed or its failure was absorbed.
    Success,
    /// The step failed.
    Failed,
    /// The step did not run.
    Skipped,
}

impl StepState {
    /// Lowercase label used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// One reported step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    name: String,
    keyword: StepKeyword,
    state: StepState,
    table: Option<Table<Row>>,
    failure: Option<String>,
}

impl StepReport {
    /// Step description without its table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display keyword.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// Terminal state.
    #[must_use]
    pub fn state(&self) -> StepState {
        self.state
    }

    /// Inline table, if the step declared one.
    #[must_use]
    pub fn table(&self) -> Option<&Table<Row>> {
        self.table.as_ref()
    }

    /// Rendered failure with its cause chain.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// One reported scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    title: String,
    steps: Vec<StepReport>,
    failure: Option<String>,
    finished: bool,
}

impl ScenarioReport {
    /// Scenario title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// Rendered scenario failure, when the scenario failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// Everything recorded for one story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryReport {
    id: StoryId,
    narrative: Option<Narrative>,
    scenarios: Vec<ScenarioReport>,
}

impl StoryReport {
    fn new(id: StoryId) -> Self {
        Self {
            id,
            narrative: None,
            scenarios: Vec::new(),
        }
    }

    /// Story identity.
    #[must_use]
    pub fn id(&self) -> &StoryId {
        &self.id
    }

    /// Narrative, if one was declared.
    #[must_use]
    pub fn narrative(&self) -> Option<&Narrative> {
        self.narrative.as_ref()
    }

    /// Scenarios in start order.
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioReport] {
        &self.scenarios
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "the index is found in or pushed onto the same vector"
    )]
    fn open_scenario(&mut self, title: &str) -> &mut ScenarioReport {
        let position = self
            .scenarios
            .iter()
            .rposition(|scenario| !scenario.finished && scenario.title == title);
        let index = position.unwrap_or_else(|| {
            self.scenarios.push(ScenarioReport {
                title: title.to_owned(),
                steps: Vec::new(),
                failure: None,
                finished: false,
            });
            self.scenarios.len() - 1
        });
        &mut self.scenarios[index]
    }
}

/// Renders a finished story into report text.
pub trait ReportFormat: Send + Sync {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Renders `story`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when rendering fails.
    fn render(&self, story: &StoryReport) -> Result<String, ReportError>;
}

#[derive(Debug, Default)]
struct Reports {
    open: HashMap<StoryId, StoryReport>,
    finished: Vec<StoryReport>,
}

impl Reports {
    fn story(&mut self, id: &StoryId) -> &mut StoryReport {
        self.open
            .entry(id.clone())
            .or_insert_with(|| StoryReport::new(id.clone()))
    }
}

/// Collects story reports and writes them with a [`ReportFormat`].
#[derive(Debug, Default)]
pub struct ReportListener<F> {
    format: F,
    reports: Mutex<Reports>,
}

impl<F: ReportFormat> ReportListener<F> {
    /// Creates a listener rendering with `format`.
    #[must_use]
    pub fn with_format(format: F) -> Self {
        Self {
            format,
            reports: Mutex::new(Reports::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Reports> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_step(&self, event: &StepEvent<'_>, state: StepState, failure: Option<&StepFailure>) {
        let mut reports = self.lock();
        reports
            .story(event.story)
            .open_scenario(event.scenario)
            .steps
            .push(StepReport {
                name: event.description.to_owned(),
                keyword: event.keyword,
                state,
                table: event.table.cloned(),
                failure: failure.map(StepFailure::report),
            });
    }

    fn finish_scenario(&self, event: &ScenarioEvent<'_>, failure: Option<&StepFailure>) {
        let mut reports = self.lock();
        let scenario = reports.story(event.story).open_scenario(event.title);
        scenario.failure = failure.map(StepFailure::report);
        scenario.finished = true;
    }

    /// Takes the stories finished since the last flush.
    pub fn take_finished(&self) -> Vec<StoryReport> {
        std::mem::take(&mut self.lock().finished)
    }
}

impl<F: ReportFormat + Default> ReportListener<F> {
    /// Creates a listener with the default format settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_format(F::default())
    }
}

impl<F: ReportFormat> Listener for ReportListener<F> {
    fn story_started(&self, event: &StoryEvent<'_>) {
        self.lock().story(event.story);
    }

    fn narrative(&self, event: &StoryEvent<'_>, narrative: &Narrative) {
        self.lock().story(event.story).narrative = Some(narrative.clone());
    }

    fn scenario_started(&self, event: &ScenarioEvent<'_>) {
        self.lock().story(event.story).open_scenario(event.title);
    }

    fn step_succeeded(&self, event: &StepEvent<'_>) {
        self.record_step(event, StepState::Success, None);
    }

    fn step_failed(&self, event: &StepEvent<'_>, failure: &StepFailure) {
        self.record_step(event, StepState::Failed, Some(failure));
    }

    fn step_skipped(&self, event: &StepEvent<'_>) {
        self.record_step(event, StepState::Skipped, None);
    }

    fn scenario_succeeded(&self, event: &ScenarioEvent<'_>) {
        self.finish_scenario(event, None);
    }

    fn scenario_failed(&self, event: &ScenarioEvent<'_>, failure: &StepFailure) {
        self.finish_scenario(event, Some(failure));
    }

    fn story_finished(&self, event: &StoryEvent<'_>) {
        let mut reports = self.lock();
        if let Some(story) = reports.open.remove(event.story) {
            reports.finished.push(story);
        }
    }

    fn as_file_listener(&self) -> Option<&dyn FileListener> {
        Some(self)
    }
}

impl<F: ReportFormat> FileListener for ReportListener<F> {
    fn flush_to_file(&self, base_dir: &Utf8Path) -> Result<(), ReportError> {
        let mut first_error = None;
        for story in self.take_finished() {
            let path = base_dir.join(format!("{}.{}", story.id.name(), self.format.extension()));
            let written = self.format.render(&story).and_then(|text| {
                fs::write(&path, text).map_err(|source| ReportError::Io {
                    path: path.clone(),
                    source,
                })
            });
            match written {
                Ok(()) => log::info!("wrote story report {path}"),
                Err(err) => {
                    log::warn!("failed to write story report {path}: {err}");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
