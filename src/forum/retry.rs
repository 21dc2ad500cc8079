use std::thread;
use std::time::Duration;

use crate::config::ControllerConfig;
use crate::error::ForumError;

/// How often and how patiently to repeat a failed forum request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Retry without sleeping between attempts.
    pub fn immediate(attempts: u32) -> Self {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ControllerConfig::default())
    }
}

impl From<&ControllerConfig> for RetryPolicy {
    fn from(config: &ControllerConfig) -> Self {
        RetryPolicy {
            attempts: config.retry_attempts,
            delay: config.retry_delay(),
        }
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts. Always makes at least one attempt.
pub fn with_retry<T, F>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, ForumError>
where
    F: FnMut() -> Result<T, ForumError>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < attempts => {
                log::warn!("{what} failed (attempt {attempt}/{attempts}): {e}");
                attempt += 1;
                if !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::PostId;

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = with_retry(&RetryPolicy::immediate(3), "fetch", || {
            calls += 1;
            if calls < 3 {
                Err(ForumError::Transient("busy".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn test_gives_up_after_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(2), "fetch", || {
            calls += 1;
            Err(ForumError::Transient("busy".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_does_not_retry_permanent_errors() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(5), "fetch", || {
            calls += 1;
            Err(ForumError::PostNotFound(PostId(1)))
        });
        assert_eq!(result, Err(ForumError::PostNotFound(PostId(1))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(1000));
    }
}
