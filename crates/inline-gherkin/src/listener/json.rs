//! JSON story reports.
//!
//! The document mirrors the XML report. State labels are lowercase so
//! downstream tools can rely on consistent casing.

use serde::Serialize;

use super::report::{ReportFormat, ReportListener, ScenarioReport, StepReport, StoryReport};
use crate::error::ReportError;

#[derive(Serialize)]
struct JsonStory<'a> {
    name: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    narrative: Option<JsonNarrative<'a>>,
    scenarios: Vec<JsonScenario<'a>>,
}

#[derive(Serialize)]
struct JsonNarrative<'a> {
    in_order_to: &'a str,
    i_want_to: &'a str,
    as_a: &'a str,
}

#[derive(Serialize)]
struct JsonScenario<'a> {
    title: &'a str,
    steps: Vec<JsonStep<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonStep<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    keyword: &'static str,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<JsonTable<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    headers: &'a [String],
    rows: Vec<Vec<&'a str>>,
}

impl<'a> From<&'a StoryReport> for JsonStory<'a> {
    fn from(story: &'a StoryReport) -> Self {
        Self {
            name: story.id().name(),
            path: story.id().path(),
            narrative: story.narrative().map(|narrative| JsonNarrative {
                in_order_to: &narrative.in_order_to,
                i_want_to: &narrative.i_want_to,
                as_a: &narrative.as_a,
            }),
            scenarios: story.scenarios().iter().map(JsonScenario::from).collect(),
        }
    }
}

impl<'a> From<&'a ScenarioReport> for JsonScenario<'a> {
    fn from(scenario: &'a ScenarioReport) -> Self {
        Self {
            title: scenario.title(),
            steps: scenario.steps().iter().map(JsonStep::from).collect(),
            failure: scenario.failure(),
        }
    }
}

impl<'a> From<&'a StepReport> for JsonStep<'a> {
    fn from(step: &'a StepReport) -> Self {
        Self {
            name: step.name(),
            keyword: step.keyword().as_str(),
            state: step.state().as_str(),
            table: step.table().map(|table| JsonTable {
                headers: table.headers(),
                rows: table
                    .iter()
                    .map(|row| row.iter().map(|(_, value)| value).collect())
                    .collect(),
            }),
            failure: step.failure(),
        }
    }
}

/// Renders story reports as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

/// Writes one `<story name>.json` report per finished story.
pub type JsonListener = ReportListener<JsonFormat>;

impl ReportFormat for JsonFormat {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, story: &StoryReport) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&JsonStory::from(story))?)
    }
}
