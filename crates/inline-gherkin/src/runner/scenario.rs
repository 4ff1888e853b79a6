//! Step-by-step driver for a single scenario.

use inline_gherkin_table::{Table, TableMapper};

use super::{ScenarioContext, StepOptions, StepOutcome, StepRunner};
use crate::error::{ActionResult, StepFailure};
use crate::keyword::StepType;

/// A running scenario, handed to the body of [`StepRunner::scenario`].
///
/// Every method returns `Result`, so a body can use `?` after each step. In
/// fail-fast mode the first failure ends the body; in accumulate mode steps
/// return [`StepOutcome::Failed`] and the body keeps going.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{
///     Record, RunnerConfig, Schema, StepRunner, StoryId, TableMapper,
/// };
///
/// #[derive(Default)]
/// struct Item {
///     name: String,
///     price: u8,
/// }
///
/// impl Record for Item {
///     fn schema() -> Schema<Self> {
///         Schema::new()
///             .field("name", |item: &mut Self, value: String| item.name = value)
///             .field("price", |item: &mut Self, value: u8| item.price = value)
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let runner = StepRunner::new(
///     RunnerConfig::default()
///         .with_base_dir(dir.path().to_string_lossy().into_owned())
///         .with_listeners(Vec::new()),
/// )?;
/// let mut story = runner.start_story(StoryId::new("Basket", "shop/Basket"), None);
/// runner.scenario(&mut story, "pricing a basket", |s| {
///     let mut total = 0_u32;
///     s.given_table(
///         "a basket: |name|price||tea|3||milk|2|",
///         &TableMapper::<Item>::new(),
///         |items| {
///             total = items.iter().map(|item| u32::from(item.price)).sum();
///             Ok(())
///         },
///     )?;
///     s.then("the total is 5", || {
///         assert_eq!(total, 5);
///         Ok(())
///     })?;
///     Ok(())
/// })?;
/// runner.end_story(story)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Scenario<'r> {
    runner: &'r StepRunner,
    context: ScenarioContext,
}

macro_rules! keyword_steps {
    ($step_type:ident, $plain:ident, $with:ident, $table:ident, $table_with:ident) => {
        #[doc = concat!("Runs a `", stringify!($step_type), "` step.")]
        ///
        /// # Errors
        ///
        /// See [`StepRunner::execute_step`].
        pub fn $plain(
            &mut self,
            description: &str,
            action: impl FnMut() -> ActionResult,
        ) -> Result<StepOutcome, StepFailure> {
            self.$with(description, &StepOptions::default(), action)
        }

        #[doc = concat!("Runs a `", stringify!($step_type), "` step with options.")]
        ///
        /// # Errors
        ///
        /// See [`StepRunner::execute_step`].
        pub fn $with(
            &mut self,
            description: &str,
            options: &StepOptions,
            action: impl FnMut() -> ActionResult,
        ) -> Result<StepOutcome, StepFailure> {
            self.step(StepType::$step_type, description, options, action)
        }

        #[doc = concat!("Runs a `", stringify!($step_type), "` step over its inline table.")]
        ///
        /// # Errors
        ///
        /// See [`StepRunner::execute_table_step`].
        pub fn $table<T>(
            &mut self,
            description: &str,
            mapper: &TableMapper<T>,
            action: impl FnMut(&Table<T>) -> ActionResult,
        ) -> Result<StepOutcome, StepFailure> {
            self.$table_with(description, mapper, &StepOptions::default(), action)
        }

        #[doc = concat!(
            "Runs a `",
            stringify!($step_type),
            "` step over its inline table with options."
        )]
        ///
        /// # Errors
        ///
        /// See [`StepRunner::execute_table_step`].
        pub fn $table_with<T>(
            &mut self,
            description: &str,
            mapper: &TableMapper<T>,
            options: &StepOptions,
            action: impl FnMut(&Table<T>) -> ActionResult,
        ) -> Result<StepOutcome, StepFailure> {
            self.table_step(StepType::$step_type, description, mapper, options, action)
        }
    };
}

impl<'r> Scenario<'r> {
    pub(crate) fn new(runner: &'r StepRunner, context: ScenarioContext) -> Self {
        Self { runner, context }
    }

    pub(crate) fn into_context(self) -> ScenarioContext {
        self.context
    }

    /// The scenario's execution state.
    #[must_use]
    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// Runs a step of any type.
    ///
    /// # Errors
    ///
    /// See [`StepRunner::execute_step`].
    pub fn step(
        &mut self,
        step_type: StepType,
        description: &str,
        options: &StepOptions,
        action: impl FnMut() -> ActionResult,
    ) -> Result<StepOutcome, StepFailure> {
        self.runner
            .execute_step(&mut self.context, step_type, description, options, action)
    }

    /// Runs a table step of any type.
    ///
    /// # Errors
    ///
    /// See [`StepRunner::execute_table_step`].
    pub fn table_step<T>(
        &mut self,
        step_type: StepType,
        description: &str,
        mapper: &TableMapper<T>,
        options: &StepOptions,
        action: impl FnMut(&Table<T>) -> ActionResult,
    ) -> Result<StepOutcome, StepFailure> {
        self.runner.execute_table_step(
            &mut self.context,
            step_type,
            description,
            mapper,
            options,
            action,
        )
    }

    keyword_steps!(Given, given, given_with, given_table, given_table_with);
    keyword_steps!(When, when, when_with, when_table, when_table_with);
    keyword_steps!(Then, then, then_with, then_table, then_table_with);
}
