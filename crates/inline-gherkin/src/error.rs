//! Error types for step execution, configuration and reporting.

use std::fmt;
use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use inline_gherkin_table::{MappingError, TableError};
use thiserror::Error;

use crate::StepKeyword;

/// Error type returned by step actions. Any error converts into it with `?`.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by step actions.
pub type ActionResult = Result<(), ActionError>;

/// An unrecoverable fault raised by an action.
///
/// Returning `Err(Fatal::new(..).into())` stops the step at once: the action
/// is not retried, error handlers are bypassed and the failure is returned
/// to the caller whatever the failure mode.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{ActionResult, Fatal};
///
/// fn connect() -> ActionResult {
///     Err(Fatal::new("database is gone").into())
/// }
///
/// assert!(connect().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fatal: {message}")]
pub struct Fatal {
    message: String,
}

impl Fatal {
    /// Creates a fatal error with a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Cause of a step failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    /// The action returned an error.
    #[error(transparent)]
    Action(ActionError),
    /// The action panicked, for example on a failed assertion.
    #[error("step panicked: {message}")]
    Panic {
        /// Rendered panic payload.
        message: String,
    },
    /// The action raised a [`Fatal`] error.
    #[error(transparent)]
    Fatal(Fatal),
    /// The inline table is malformed.
    #[error(transparent)]
    Parse(#[from] TableError),
    /// A table step was declared but the description has no table.
    #[error("step expects an inline table but none was found")]
    MissingTable,
    /// The table rows could not be projected onto the record type.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl StepError {
    /// Classifies an action error, unwrapping [`Fatal`] faults.
    #[must_use]
    pub fn from_action(error: ActionError) -> Self {
        match error.downcast::<Fatal>() {
            Ok(fatal) => Self::Fatal(*fatal),
            Err(other) => Self::Action(other),
        }
    }

    /// Returns `true` for unrecoverable faults.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns `true` when another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Action(_) | Self::Panic { .. })
    }
}

/// A failed step, as reported to listeners, handlers and the caller.
///
/// Cloning is cheap: the cause is shared.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{StepError, StepFailure, StepKeyword};
///
/// let failure = StepFailure::new(
///     StepKeyword::When,
///     "the user logs in",
///     2,
///     StepError::Panic { message: "boom".into() },
/// );
/// assert_eq!(failure.to_string(), "step failed: the user logs in");
/// assert_eq!(failure.attempts(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StepFailure {
    keyword: StepKeyword,
    step: String,
    attempts: u32,
    error: Arc<StepError>,
}

impl StepFailure {
    /// Wraps a cause with the step that produced it.
    #[must_use]
    pub fn new(keyword: StepKeyword, step: impl Into<String>, attempts: u32, error: StepError) -> Self {
        Self {
            keyword,
            step: step.into(),
            attempts,
            error: Arc::new(error),
        }
    }

    /// Keyword of the failed step.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// Display description of the failed step.
    #[must_use]
    pub fn step(&self) -> &str {
        &self.step
    }

    /// Number of attempts made; zero when the action never ran.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The underlying cause.
    #[must_use]
    pub fn error(&self) -> &StepError {
        &self.error
    }

    /// Returns `true` when the cause is a [`Fatal`] fault.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.error.is_fatal()
    }

    /// Renders the failure with its full cause chain, one cause per line.
    #[must_use]
    pub fn report(&self) -> String {
        let mut text = self.to_string();
        let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(self.error.as_ref());
        while let Some(err) = cause {
            text.push_str("\ncaused by: ");
            text.push_str(&err.to_string());
            cause = err.source();
        }
        text
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step failed: {}", self.step)
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// Invalid runner configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A boolean setting holds something other than a recognised flag.
    #[error("invalid value '{value}' for {setting}, expected true or false")]
    InvalidFlag {
        /// Name of the setting.
        setting: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A listener name is not recognised.
    #[error("unknown listener '{name}', expected one of: xml, log, json")]
    UnknownListener {
        /// The rejected name.
        name: String,
    },
    /// The listener exists but its cargo feature is disabled.
    #[error("listener '{name}' requires the '{feature}' feature")]
    FeatureDisabled {
        /// Listener name.
        name: &'static str,
        /// Feature that enables it.
        feature: &'static str,
    },
    /// The report directory could not be created.
    #[error("failed to create report directory {path}")]
    BaseDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failure writing a story report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// Rendering the report text failed.
    #[error("failed to render report")]
    Render(#[from] fmt::Error),
    /// Writing the report file failed.
    #[error("failed to write report {path}")]
    Io {
        /// Report file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Serializing the JSON report failed.
    #[cfg(feature = "diagnostics")]
    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`StepRunner`](crate::StepRunner) outside step execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A story report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}
