//! Inline Gherkin steps for plain Rust tests.
//!
//! A test declares ordered `Given`/`When`/`Then` steps as closures. The
//! [`StepRunner`] executes them, retries the ones marked "eventually",
//! tracks the scenario's failure and reports every lifecycle event to the
//! registered [`Listener`]s. A step description may carry a pipe-delimited
//! table, which is parsed and projected onto a record type before the action
//! runs.
//!
//! ```
//! use inline_gherkin::{
//!     Narrative, Row, RunnerConfig, StepOptions, StepRunner, StoryId, TableMapper,
//!     RetryPolicy,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let runner = StepRunner::new(
//!     RunnerConfig::default().with_base_dir(dir.path().to_string_lossy().into_owned()),
//! )?;
//!
//! let mut story = runner.start_story(
//!     StoryId::new("LoginStory", "auth/LoginStory"),
//!     Some(Narrative::new("to keep accounts safe", "user", "log in")),
//! );
//! runner.scenario(&mut story, "known users log in", |s| {
//!     let mut users = Vec::new();
//!     s.given_table(
//!         "the users: |name|password||alice|secret|",
//!         &TableMapper::<Row>::raw(),
//!         |table| {
//!             users.extend(table.iter().filter_map(|row| row.get("name")).map(str::to_owned));
//!             Ok(())
//!         },
//!     )?;
//!     s.when("alice logs in", || Ok(()))?;
//!     s.then_with(
//!         "the session is open",
//!         &StepOptions::default().eventually(RetryPolicy::default().timeout_ms(200)),
//!         || {
//!             assert_eq!(users, ["alice"]);
//!             Ok(())
//!         },
//!     )?;
//!     Ok(())
//! })?;
//! runner.end_story(story)?;
//!
//! assert!(dir.path().join("LoginStory.xml").exists());
//! # Ok(())
//! # }
//! ```
//!
//! # Failure modes
//!
//! By default a failing step returns its [`StepFailure`] at once. Inside
//! [`StepRunner::scenario`] the `?` ends the body there, so later steps never
//! run and no skip events are emitted. A caller driving steps by hand that
//! keeps calling them after that `Err` gets [`StepOutcome::Skipped`] and a
//! `step_skipped` event for each. With [`FailureMode::CatchCompleteOutput`]
//! every step runs and the first failure is returned when the scenario ends.
//! See [`RunnerConfig`] for the environment overrides.
//!
//! # Features
//!
//! - `diagnostics` (default): the JSON report listener.

mod config;
mod error;
mod handler;
mod keyword;
mod listener;
mod panic;
mod retry;
mod runner;
mod story;

pub use config::{
    BASE_DIR_VAR, CATCH_COMPLETE_OUTPUT_VAR, FailureMode, LISTENERS_VAR, ListenerKind,
    RunnerConfig, StoryConfig,
};
pub use error::{
    ActionError, ActionResult, ConfigError, Fatal, ReportError, RunnerError, StepError,
    StepFailure,
};
pub use handler::{ErrorHandler, ErrorHandlerChain, ErrorStore};
pub use inline_gherkin_table as table;
pub use inline_gherkin_table::{
    Coerce, CoercionError, HeaderOverrides, MappingError, ParsedStep, Record, Row, RowFactory,
    RowSetter, Schema, Table, TableError, TableMapper, coerce_enum,
};
pub use keyword::{StepKeyword, StepKeywordParseError, StepType};
#[cfg(feature = "diagnostics")]
pub use listener::{JsonFormat, JsonListener};
pub use listener::{
    FileListener, Listener, ListenerBus, LogListener, ReportFormat, ReportListener,
    ScenarioEvent, ScenarioReport, StepEvent, StepReport, StepState, StoryEvent, StoryReport,
    XmlFormat, XmlListener,
};
pub use panic::panic_message;
pub use retry::{Attempts, RetryPolicy, run_eventually};
pub use runner::{
    Scenario, ScenarioContext, StepOptions, StepOutcome, StepRunner, StepRunnerBuilder,
    StoryContext,
};
pub use story::{Narrative, StoryId, scenario_title_from_fn};
