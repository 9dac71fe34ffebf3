use std::time::Duration;

/// Retry policy for transient request failures
///
/// Applied uniformly to every operation of both client variants. An attempt
/// qualifies for retry when the transport itself failed (connect, DNS,
/// timeout); server-side 5xx responses only qualify when
/// [`retry_server_errors`](RetryPolicy::retry_server_errors) is enabled.
/// Application errors (402/409/500-with-body classification happens after
/// the retry loop) and other statuses never retry.
///
/// The default curve doubles from 1 second up to a 60 second ceiling and
/// gives up after 5 attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (0 or 1 both mean "no retry")
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_backoff: Duration,

    /// Ceiling on the backoff delay
    pub max_backoff: Duration,

    /// Whether HTTP 5xx responses qualify for retry in addition to
    /// transport failures
    pub retry_server_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            retry_server_errors: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the retry following attempt number `attempt` (0-based).
    ///
    /// Doubles per attempt, capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Whether another attempt should follow attempt number `attempt`.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}
