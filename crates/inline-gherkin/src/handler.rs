//! Error handlers that may absorb step failures.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StepFailure;

/// Decides whether a step failure propagates.
///
/// Returning `None` absorbs the failure: listeners see the step as a success
/// and the scenario continues. Returning `Some` passes the failure, possibly
/// replaced, to the next handler.
pub trait ErrorHandler: Send + Sync {
    /// Inspects a failure.
    fn handle(&self, failure: StepFailure) -> Option<StepFailure>;
}

impl<F> ErrorHandler for F
where
    F: Fn(StepFailure) -> Option<StepFailure> + Send + Sync,
{
    fn handle(&self, failure: StepFailure) -> Option<StepFailure> {
        self(failure)
    }
}

/// Ordered list of handlers, consulted until one absorbs the failure.
#[derive(Clone, Default)]
pub struct ErrorHandlerChain {
    handlers: Vec<Arc<dyn ErrorHandler>>,
}

impl ErrorHandlerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn push(&mut self, handler: impl ErrorHandler + 'static) {
        self.handlers.push(Arc::new(handler));
    }

    /// Appends a shared handler.
    pub fn push_shared(&mut self, handler: Arc<dyn ErrorHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl ErrorHandler for ErrorHandlerChain {
    fn handle(&self, failure: StepFailure) -> Option<StepFailure> {
        self.handlers
            .iter()
            .try_fold(failure, |failure, handler| handler.handle(failure))
    }
}

impl fmt::Debug for ErrorHandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlerChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Absorbs every failure and keeps the most recent one.
///
/// Clones share storage, so a test can hand one clone to a step and assert
/// on the captured failure afterwards.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{ErrorHandler, ErrorStore, StepError, StepFailure, StepKeyword};
///
/// let store = ErrorStore::new();
/// let failure = StepFailure::new(
///     StepKeyword::When,
///     "the payment is declined",
///     1,
///     StepError::Panic { message: "declined".into() },
/// );
/// assert!(store.clone().handle(failure).is_none());
/// assert_eq!(
///     store.last_failure().map(|f| f.step().to_owned()),
///     Some("the payment is declined".to_owned())
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorStore {
    last: Arc<Mutex<Option<StepFailure>>>,
}

impl ErrorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<StepFailure>> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the most recent failure without clearing it.
    #[must_use]
    pub fn last_failure(&self) -> Option<StepFailure> {
        self.lock().clone()
    }

    /// Removes and returns the most recent failure.
    #[must_use]
    pub fn take(&self) -> Option<StepFailure> {
        self.lock().take()
    }

    /// Returns `true` when a failure has been captured.
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.lock().is_some()
    }
}

impl ErrorHandler for ErrorStore {
    fn handle(&self, failure: StepFailure) -> Option<StepFailure> {
        log::warn!("absorbed {failure}");
        *self.lock() = Some(failure);
        None
    }
}
