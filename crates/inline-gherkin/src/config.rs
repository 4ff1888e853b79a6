//! Runner configuration.
//!
//! Settings resolve in three layers: a per-run override read from the
//! environment, the story's declarative [`StoryConfig`], then the built-in
//! default.
//!
//! # Environment Variables
//!
//! - `INLINE_GHERKIN_BASE_DIR`: directory receiving report files
//! - `INLINE_GHERKIN_CATCH_COMPLETE_OUTPUT`: `true` keeps running steps after
//!   a failure
//! - `INLINE_GHERKIN_LISTENERS`: comma-separated listener names (`xml`,
//!   `log`, `json`)

use std::env;
use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;

use crate::error::ConfigError;

/// Environment variable overriding the report directory.
pub const BASE_DIR_VAR: &str = "INLINE_GHERKIN_BASE_DIR";
/// Environment variable overriding the failure mode.
pub const CATCH_COMPLETE_OUTPUT_VAR: &str = "INLINE_GHERKIN_CATCH_COMPLETE_OUTPUT";
/// Environment variable overriding the listener set.
pub const LISTENERS_VAR: &str = "INLINE_GHERKIN_LISTENERS";

const DEFAULT_BASE_DIR: &str = "./target/gherkin";

/// What happens to the remaining steps of a scenario after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Return the failure at once and skip the remaining steps.
    #[default]
    FailFast,
    /// Keep running steps and report the first failure at scenario end.
    CatchCompleteOutput,
}

impl FailureMode {
    /// Maps the "catch complete output" flag to a mode.
    #[must_use]
    pub fn from_catch_complete_output(catch: bool) -> Self {
        if catch {
            Self::CatchCompleteOutput
        } else {
            Self::FailFast
        }
    }
}

/// Built-in listener implementations selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Per-story XML report files.
    Xml,
    /// Events written through the `log` facade.
    Log,
    /// Per-story JSON report files.
    Json,
}

impl ListenerKind {
    /// Return the configuration name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Log => "log",
            Self::Json => "json",
        }
    }

    /// Parses a comma-separated list of names. Blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownListener`] for an unrecognised name.
    ///
    /// # Examples
    ///
    /// ```
    /// use inline_gherkin::ListenerKind;
    ///
    /// let kinds = ListenerKind::parse_list("xml, LOG,").unwrap();
    /// assert_eq!(kinds, [ListenerKind::Xml, ListenerKind::Log]);
    /// ```
    pub fn parse_list(value: &str) -> Result<Vec<Self>, ConfigError> {
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse::<Self>)
            .collect()
    }
}

impl FromStr for ListenerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "log" => Ok(Self::Log),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownListener { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative configuration attached to a story. Unset fields fall back to
/// the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryConfig {
    /// Directory receiving report files.
    pub base_dir: Option<Utf8PathBuf>,
    /// Whether steps keep running after a failure.
    pub catch_complete_output: Option<bool>,
    /// Listeners to instantiate.
    pub listeners: Option<Vec<ListenerKind>>,
}

impl StoryConfig {
    /// Sets the report directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Sets the "catch complete output" flag.
    #[must_use]
    pub fn with_catch_complete_output(mut self, catch: bool) -> Self {
        self.catch_complete_output = Some(catch);
        self
    }

    /// Sets the listener kinds.
    #[must_use]
    pub fn with_listeners(mut self, listeners: impl Into<Vec<ListenerKind>>) -> Self {
        self.listeners = Some(listeners.into());
        self
    }
}

/// Fully resolved runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Directory receiving report files, created when the runner is built.
    pub base_dir: Utf8PathBuf,
    /// Behaviour after a step failure.
    pub failure_mode: FailureMode,
    /// Built-in listeners to instantiate.
    pub listeners: Vec<ListenerKind>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_dir: Utf8PathBuf::from(DEFAULT_BASE_DIR),
            failure_mode: FailureMode::default(),
            listeners: vec![ListenerKind::Xml],
        }
    }
}

impl RunnerConfig {
    /// Resolves the configuration for a story using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment variable holds an invalid
    /// value.
    pub fn resolve(story: &StoryConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(story, |name| env::var(name).ok())
    }

    /// Resolves the configuration with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a looked-up value is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use inline_gherkin::{FailureMode, RunnerConfig, StoryConfig};
    ///
    /// let story = StoryConfig::default().with_catch_complete_output(false);
    /// let config = RunnerConfig::resolve_with(&story, |name| {
    ///     (name == "INLINE_GHERKIN_CATCH_COMPLETE_OUTPUT").then(|| "true".to_owned())
    /// })
    /// .unwrap();
    /// assert_eq!(config.failure_mode, FailureMode::CatchCompleteOutput);
    /// ```
    pub fn resolve_with(
        story: &StoryConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_dir = lookup(BASE_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from)
            .or_else(|| story.base_dir.clone())
            .unwrap_or(defaults.base_dir);

        let catch = match lookup(CATCH_COMPLETE_OUTPUT_VAR) {
            Some(value) => Some(parse_flag(CATCH_COMPLETE_OUTPUT_VAR, &value)?),
            None => story.catch_complete_output,
        };
        let failure_mode = catch.map_or(defaults.failure_mode, FailureMode::from_catch_complete_output);

        let listeners = match lookup(LISTENERS_VAR) {
            Some(value) => ListenerKind::parse_list(&value)?,
            None => story.listeners.clone().unwrap_or(defaults.listeners),
        };

        Ok(Self {
            base_dir,
            failure_mode,
            listeners,
        })
    }

    /// Sets the report directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Sets the failure mode.
    #[must_use]
    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    /// Sets the built-in listeners.
    #[must_use]
    pub fn with_listeners(mut self, listeners: impl Into<Vec<ListenerKind>>) -> Self {
        self.listeners = listeners.into();
        self
    }
}

fn parse_flag(setting: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            setting,
            value: value.to_owned(),
        }),
    }
}
