//! Bounded polling retry for step actions.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::StepError;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// How long a step action may be retried, and how often.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use inline_gherkin::RetryPolicy;
///
/// let policy = RetryPolicy::default().timeout_ms(300).interval_ms(50);
/// assert_eq!(policy.timeout(), Duration::from_millis(300));
/// assert_eq!(policy.interval(), Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    timeout: Duration,
    interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_INTERVAL)
    }
}

impl RetryPolicy {
    /// Creates a policy from explicit durations.
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(mut self, millis: u64) -> Self {
        self.timeout = Duration::from_millis(millis);
        self
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the pause between attempts in milliseconds.
    #[must_use]
    pub const fn interval_ms(mut self, millis: u64) -> Self {
        self.interval = Duration::from_millis(millis);
        self
    }

    /// Sets the pause between attempts in seconds.
    #[must_use]
    pub const fn interval_secs(mut self, secs: u64) -> Self {
        self.interval = Duration::from_secs(secs);
        self
    }

    /// Window in which new attempts may start.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

/// Result of running an action under a retry policy.
#[derive(Debug)]
pub struct Attempts {
    /// Outcome of the last attempt.
    pub result: Result<(), StepError>,
    /// Number of attempts made, at least one.
    pub attempts: u32,
}

/// Runs `attempt` until it succeeds or the policy's window closes.
///
/// Without a policy the action runs exactly once. With one, a new attempt
/// starts only while the elapsed time is below the timeout, and the thread
/// sleeps for the interval between attempts. Only the last failure is
/// returned; earlier ones are logged at debug level. Errors that are not
/// retryable end the loop at once.
///
/// # Examples
///
/// ```
/// use inline_gherkin::{run_eventually, RetryPolicy, StepError};
///
/// let policy = RetryPolicy::default().timeout_ms(500).interval_ms(1);
/// let mut calls = 0;
/// let outcome = run_eventually(Some(&policy), || {
///     calls += 1;
///     if calls < 3 {
///         Err(StepError::Panic { message: "not yet".into() })
///     } else {
///         Ok(())
///     }
/// });
/// assert!(outcome.result.is_ok());
/// assert_eq!(outcome.attempts, 3);
/// ```
pub fn run_eventually(
    policy: Option<&RetryPolicy>,
    mut attempt: impl FnMut() -> Result<(), StepError>,
) -> Attempts {
    let start = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        let error = match attempt() {
            Ok(()) => {
                return Attempts {
                    result: Ok(()),
                    attempts,
                };
            }
            Err(error) => error,
        };
        let Some(policy) = policy.filter(|_| error.is_retryable()) else {
            return Attempts {
                result: Err(error),
                attempts,
            };
        };
        if start.elapsed() >= policy.timeout {
            return Attempts {
                result: Err(error),
                attempts,
            };
        }
        thread::sleep(policy.interval);
        if start.elapsed() >= policy.timeout {
            log::debug!("retry window of {:?} closed after {attempts} attempts", policy.timeout);
            return Attempts {
                result: Err(error),
                attempts,
            };
        }
        log::debug!("attempt {attempts} failed, retrying: {error}");
    }
}
