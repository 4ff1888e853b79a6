//! Story, scenario and step lifecycle.
//!
//! A [`StepRunner`] is built once from a [`RunnerConfig`] and shared by every
//! scenario of a story. All mutable state lives in the [`StoryContext`] and
//! [`ScenarioContext`] values it hands out, so a runner can serve several
//! scenarios at once.
//!
//! Each step follows the same sequence:
//!
//! 1. The inline table, if any, is split from the description and parsed.
//!    A malformed table, or a table step without one, fails here before any
//!    event is emitted. The failure is still recorded on the scenario.
//! 2. In fail-fast mode a scenario that already failed reports the step as
//!    skipped and stops.
//! 3. `step_started` is emitted, the table rows are projected and the action
//!    runs, retried under the step's [`RetryPolicy`](crate::RetryPolicy).
//! 4. A failure that is not [`Fatal`](crate::Fatal) is offered to the
//!    runner-level error handlers, then to the step's own. An absorbed
//!    failure is reported as a success.
//! 5. Otherwise `step_failed` is emitted and the failure recorded. Fail-fast
//!    mode returns it; accumulate mode returns [`StepOutcome::Failed`] and
//!    keeps going.

mod context;
mod options;
mod scenario;

use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use inline_gherkin_table::{HeaderOverrides, ParsedStep, Table, TableMapper, parse_step, strip_table};

use crate::config::{FailureMode, RunnerConfig, StoryConfig};
use crate::error::{ActionResult, ConfigError, RunnerError, StepError, StepFailure};
use crate::handler::{ErrorHandler, ErrorHandlerChain};
use crate::keyword::{StepKeyword, StepType};
use crate::listener::{self, Listener, ListenerBus, ScenarioEvent, StepEvent, StoryEvent};
use crate::panic::panic_message;
use crate::retry::{Attempts, run_eventually};
use crate::story::{Narrative, StoryId};

pub use context::{ScenarioContext, StoryContext};
pub use options::StepOptions;
pub use scenario::Scenario;

/// How a step ended, when it did not end the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action passed.
    Passed {
        /// Attempts made, including the passing one.
        attempts: u32,
    },
    /// The action failed and an error handler absorbed the failure.
    Absorbed {
        /// Attempts made.
        attempts: u32,
    },
    /// The action failed; the scenario records the failure and continues.
    Failed {
        /// Attempts made.
        attempts: u32,
    },
    /// The step did not run because the scenario already failed.
    Skipped,
}

impl StepOutcome {
    /// Returns `true` for passed and absorbed steps.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed { .. } | Self::Absorbed { .. })
    }
}

/// Executes stories, scenarios and steps, reporting to listeners.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{RunnerConfig, StepRunner, StoryId, scenario_title};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let config = RunnerConfig::default()
///     .with_base_dir(dir.path().to_string_lossy().into_owned())
///     .with_listeners(Vec::new());
/// let runner = StepRunner::new(config)?;
///
/// let mut story = runner.start_story(StoryId::new("Arithmetic", "demo/Arithmetic"), None);
/// runner.scenario(&mut story, "adding numbers", |s| {
///     let mut total = 0;
///     s.given("a total of 1", || {
///         total = 1;
///         Ok(())
///     })?;
///     s.when("2 is added", || {
///         total += 2;
///         Ok(())
///     })?;
///     s.then("the total is 3", || {
///         assert_eq!(total, 3);
///         Ok(())
///     })?;
///     Ok(())
/// })?;
/// assert_eq!(story.passed(), 1);
/// runner.end_story(story)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StepRunner {
    config: RunnerConfig,
    bus: ListenerBus,
    handlers: ErrorHandlerChain,
}

impl StepRunner {
    /// Builds a runner with the configured built-in listeners.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] when the report directory cannot be
    /// created or a listener is unavailable.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        Self::builder().config(config).build()
    }

    /// Resolves `story` against the environment and builds a runner.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] for invalid overrides or when the
    /// runner cannot be built.
    pub fn from_story_config(story: &StoryConfig) -> Result<Self, RunnerError> {
        Self::new(RunnerConfig::resolve(story)?)
    }

    /// Starts a builder for custom listeners and error handlers.
    #[must_use]
    pub fn builder() -> StepRunnerBuilder {
        StepRunnerBuilder::default()
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Starts a story, emitting `story_started` and `narrative`.
    #[must_use]
    pub fn start_story(&self, id: StoryId, narrative: Option<Narrative>) -> StoryContext {
        let story = StoryContext::new(id, narrative, self.config.failure_mode);
        log::debug!("starting story {}", story.id);
        self.bus
            .story_started(&StoryEvent { story: &story.id }, story.narrative.as_ref());
        story
    }

    /// Starts a scenario, emitting `scenario_started`.
    #[must_use]
    pub fn start_scenario(&self, story: &StoryContext, title: impl Into<String>) -> ScenarioContext {
        let scenario = ScenarioContext::new(story, title.into());
        log::debug!("starting scenario '{}'", scenario.title);
        self.bus.scenario_started(&ScenarioEvent {
            story: &scenario.story,
            title: &scenario.title,
        });
        scenario
    }

    /// Executes a step without a typed table.
    ///
    /// An inline table in `raw` is still parsed, validated and reported.
    ///
    /// # Errors
    ///
    /// Returns the [`StepFailure`] when the table is malformed, when the
    /// action raises a [`Fatal`](crate::Fatal) fault, or when the action
    /// fails in fail-fast mode and no handler absorbs it.
    pub fn execute_step(
        &self,
        ctx: &mut ScenarioContext,
        step_type: StepType,
        raw: &str,
        options: &StepOptions,
        mut action: impl FnMut() -> ActionResult,
    ) -> Result<StepOutcome, StepFailure> {
        let keyword = StepKeyword::from(step_type);
        let parsed = parse_step(raw, &HeaderOverrides::new()).map_err(|err| {
            rejected(ctx, StepFailure::new(keyword, strip_table(raw), 0, err.into()))
        })?;
        self.run(ctx, keyword, &parsed, options, || Ok(()), |_: &()| action())
    }

    /// Executes a step whose action receives the inline table projected
    /// through `mapper`.
    ///
    /// Mapping errors are step failures: listeners are told and handlers are
    /// consulted, but the projection is never retried.
    ///
    /// # Errors
    ///
    /// As [`execute_step`](Self::execute_step), and additionally when the
    /// description carries no table.
    pub fn execute_table_step<T>(
        &self,
        ctx: &mut ScenarioContext,
        step_type: StepType,
        raw: &str,
        mapper: &TableMapper<T>,
        options: &StepOptions,
        action: impl FnMut(&Table<T>) -> ActionResult,
    ) -> Result<StepOutcome, StepFailure> {
        let keyword = StepKeyword::from(step_type);
        let parsed = mapper.parse(raw).map_err(|err| {
            rejected(ctx, StepFailure::new(keyword, strip_table(raw), 0, err.into()))
        })?;
        let Some(table) = parsed.table.as_ref() else {
            return Err(rejected(
                ctx,
                StepFailure::new(keyword, parsed.description, 0, StepError::MissingTable),
            ));
        };
        self.run(
            ctx,
            keyword,
            &parsed,
            options,
            || mapper.project(table).map_err(StepError::from),
            action,
        )
    }

    fn run<P>(
        &self,
        ctx: &mut ScenarioContext,
        keyword: StepKeyword,
        parsed: &ParsedStep,
        options: &StepOptions,
        prepare: impl FnOnce() -> Result<P, StepError>,
        mut action: impl FnMut(&P) -> ActionResult,
    ) -> Result<StepOutcome, StepFailure> {
        let display = keyword.display_for(ctx.last_keyword);
        ctx.last_keyword = Some(keyword);
        ctx.steps += 1;
        let event = StepEvent {
            story: &ctx.story,
            scenario: &ctx.title,
            keyword: display,
            description: &parsed.description,
            table: parsed.table.as_ref(),
        };

        if ctx.mode == FailureMode::FailFast && ctx.failure.is_some() {
            self.bus.step_skipped(&event);
            return Ok(StepOutcome::Skipped);
        }

        self.bus.step_started(&event);
        let Attempts { result, attempts } = prepare().map_or_else(
            |err| Attempts {
                result: Err(err),
                attempts: 0,
            },
            |prepared| run_eventually(options.retry(), || attempt(&mut action, &prepared)),
        );
        let Err(error) = result else {
            log::debug!("{display} {} passed after {attempts} attempt(s)", parsed.description);
            self.bus.step_succeeded(&event);
            return Ok(StepOutcome::Passed { attempts });
        };

        let failure = StepFailure::new(keyword, &parsed.description, attempts, error);
        if failure.is_fatal() {
            self.bus.step_failed(&event, &failure);
            ctx.record(&failure);
            return Err(failure);
        }

        let Some(failure) = self
            .handlers
            .handle(failure)
            .and_then(|failure| options.handlers().handle(failure))
        else {
            self.bus.step_succeeded(&event);
            return Ok(StepOutcome::Absorbed { attempts });
        };

        self.bus.step_failed(&event, &failure);
        ctx.record(&failure);
        match ctx.mode {
            FailureMode::FailFast => Err(failure),
            FailureMode::CatchCompleteOutput => Ok(StepOutcome::Failed { attempts }),
        }
    }

    /// Ends a scenario, emitting `scenario_failed` or `scenario_succeeded`.
    ///
    /// # Errors
    ///
    /// Returns the first failure recorded in the scenario.
    pub fn end_scenario(
        &self,
        story: &mut StoryContext,
        scenario: ScenarioContext,
    ) -> Result<(), StepFailure> {
        let event = ScenarioEvent {
            story: &scenario.story,
            title: &scenario.title,
        };
        if let Some(failure) = scenario.failure {
            story.failed += 1;
            self.bus.scenario_failed(&event, &failure);
            return Err(failure);
        }
        story.passed += 1;
        self.bus.scenario_succeeded(&event);
        Ok(())
    }

    /// Runs `body` as one scenario between `start_scenario` and
    /// `end_scenario`.
    ///
    /// At most one failure is returned: the one `scenario_failed` reports,
    /// which is the first failure recorded in the scenario. A [`Fatal`]
    /// fault returned by `body` wins over an earlier recorded failure.
    ///
    /// [`Fatal`]: crate::Fatal
    ///
    /// # Errors
    ///
    /// Returns the scenario's failure, if any.
    pub fn scenario<F>(
        &self,
        story: &mut StoryContext,
        title: impl Into<String>,
        body: F,
    ) -> Result<(), StepFailure>
    where
        F: FnOnce(&mut Scenario<'_>) -> Result<(), StepFailure>,
    {
        let mut scenario = Scenario::new(self, self.start_scenario(story, title));
        let outcome = body(&mut scenario);
        let mut context = scenario.into_context();
        if let Err(failure) = &outcome {
            context.record(failure);
        }
        let ended = self.end_scenario(story, context);
        match outcome {
            Err(failure) if failure.is_fatal() => Err(failure),
            _ => ended,
        }
    }

    /// Ends a story, emitting `story_finished` and flushing report files.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Report`] when a report cannot be written.
    pub fn end_story(&self, story: StoryContext) -> Result<(), RunnerError> {
        let StoryContext {
            id, passed, failed, ..
        } = story;
        log::info!("story {id} finished: {passed} passed, {failed} failed");
        self.bus.story_finished(&StoryEvent { story: &id });
        self.bus.flush(&self.config.base_dir)?;
        Ok(())
    }
}

/// Records a failure raised before any step event and hands it back.
fn rejected(ctx: &mut ScenarioContext, failure: StepFailure) -> StepFailure {
    log::warn!("{}: {}", failure, failure.error());
    ctx.record(&failure);
    failure
}

fn attempt<P>(
    action: &mut impl FnMut(&P) -> ActionResult,
    prepared: &P,
) -> Result<(), StepError> {
    match panic::catch_unwind(AssertUnwindSafe(|| action(prepared))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(StepError::from_action(err)),
        Err(payload) => Err(StepError::Panic {
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Configures a [`StepRunner`] beyond what [`RunnerConfig`] covers.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{ErrorStore, LogListener, RunnerConfig, StepRunner};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let runner = StepRunner::builder()
///     .config(
///         RunnerConfig::default()
///             .with_base_dir(dir.path().to_string_lossy().into_owned())
///             .with_listeners(Vec::new()),
///     )
///     .listener(LogListener::new())
///     .error_handler(ErrorStore::new())
///     .build()?;
/// assert!(runner.config().listeners.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct StepRunnerBuilder {
    config: RunnerConfig,
    listeners: Vec<Arc<dyn Listener>>,
    handlers: ErrorHandlerChain,
}

impl StepRunnerBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a listener after the built-in ones.
    #[must_use]
    pub fn listener(self, listener: impl Listener + 'static) -> Self {
        self.shared_listener(Arc::new(listener))
    }

    /// Registers a listener the caller keeps a handle to.
    #[must_use]
    pub fn shared_listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Adds a runner-level error handler, consulted for every step.
    #[must_use]
    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Creates the report directory and instantiates the listeners.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] when the directory cannot be created
    /// or a configured listener is unavailable.
    pub fn build(self) -> Result<StepRunner, RunnerError> {
        let base_dir = &self.config.base_dir;
        fs::create_dir_all(base_dir).map_err(|source| ConfigError::BaseDir {
            path: base_dir.clone(),
            source,
        })?;
        let mut bus = ListenerBus::new();
        for kind in &self.config.listeners {
            bus.register(listener::builtin(*kind)?);
        }
        for custom in self.listeners {
            bus.register(custom);
        }
        log::debug!(
            "runner ready: {} listener(s), reports in {}",
            bus.len(),
            self.config.base_dir
        );
        Ok(StepRunner {
            config: self.config,
            bus,
            handlers: self.handlers,
        })
    }
}

impl fmt::Debug for StepRunnerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRunnerBuilder")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .field("handlers", &self.handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests;
