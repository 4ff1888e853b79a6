//! Per-step execution options.

use crate::handler::{ErrorHandler, ErrorHandlerChain};
use crate::retry::RetryPolicy;

/// Retry policy and extra error handlers for a single step.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{ErrorStore, RetryPolicy, StepOptions};
///
/// let options = StepOptions::default()
///     .eventually(RetryPolicy::default().timeout_ms(300).interval_ms(100))
///     .handle_errors(ErrorStore::new());
/// assert!(options.retry().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    retry: Option<RetryPolicy>,
    handlers: ErrorHandlerChain,
}

impl StepOptions {
    /// Retries the action under `policy` until it passes.
    #[must_use]
    pub fn eventually(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Consults `handler` after the runner-level handlers.
    #[must_use]
    pub fn handle_errors(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handlers.push(handler);
        self
    }

    /// The retry policy, if any.
    #[must_use]
    pub fn retry(&self) -> Option<&RetryPolicy> {
        self.retry.as_ref()
    }

    pub(crate) fn handlers(&self) -> &ErrorHandlerChain {
        &self.handlers
    }
}
