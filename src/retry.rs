use log::{error, info};
use std::num::NonZeroU32;
use std::result::Result as StdResult;
use std::{thread, time::Duration};

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    total: NonZeroU32,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(total: NonZeroU32, max_backoff: Duration) -> Self {
        Self { total, max_backoff }
    }

    /// Policy with `attempts` tries and the default backoff cap.
    pub fn with_attempts(attempts: NonZeroU32) -> Self {
        Self::new(attempts, DEFAULT_MAX_BACKOFF)
    }

    fn get_backoff_time(&self, retry_count: u32) -> Duration {
        let backoff_value = Duration::from_secs(2u64.saturating_pow(retry_count));
        if backoff_value > self.max_backoff {
            self.max_backoff
        } else {
            backoff_value
        }
    }

    // Client errors come back the same on every attempt.
    fn is_transient(error: &ureq::Error) -> bool {
        match error {
            ureq::Error::Status(status, _) => *status >= 500,
            ureq::Error::Transport(_) => true,
        }
    }

    pub fn retry<F>(&self, request: F) -> StdResult<ureq::Response, ureq::Error>
    where
        F: Fn() -> StdResult<ureq::Response, ureq::Error>,
    {
        let mut retry_count = 0;
        loop {
            let error = match request() {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            if !Self::is_transient(&error) {
                error!("Request failed with non-retryable error {}", error);
                return Err(error);
            }

            if retry_count + 1 >= self.total.get() {
                error!(
                    "Failed request after {} retries, giving up due to error {}",
                    retry_count, error
                );
                return Err(error);
            }

            let sleep_time = self.get_backoff_time(retry_count);
            info!(
                "Retrying request after {} seconds due to error {}",
                sleep_time.as_secs(),
                error
            );
            thread::sleep(sleep_time);
            retry_count += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            NonZeroU32::new(DEFAULT_ATTEMPTS).expect("non-zero constant"),
            DEFAULT_MAX_BACKOFF,
        )
    }
}

#[cfg(test)]
mod test_retry {
    use super::*;

    fn policy(total: u32) -> RetryPolicy {
        RetryPolicy {
            total: NonZeroU32::new(total).unwrap(),
            max_backoff: Duration::from_secs(0),
        }
    }

    fn status(code: u16, text: &str) -> StdResult<ureq::Response, ureq::Error> {
        Err(ureq::Error::Status(code, ureq::Response::new(code, text, "")?))
    }

    #[test]
    fn test_no_retry() {
        let retry_counter = std::cell::RefCell::new(0);
        let result = policy(1)
            .retry(|| {
                *retry_counter.borrow_mut() += 1;
                ureq::Response::new(200, "OK", "")
            })
            .unwrap();
        assert_eq!(result.status(), 200);
        assert_eq!(retry_counter.into_inner(), 1);
    }

    #[test]
    fn test_retry_once() {
        let retry_counter = std::cell::RefCell::new(0);
        let result = policy(2)
            .retry(|| {
                let mut retry_counter_ref = retry_counter.borrow_mut();
                *retry_counter_ref += 1;
                if *retry_counter_ref == 1 {
                    status(500, "Internal Server Error")
                } else {
                    ureq::Response::new(200, "OK", "")
                }
            })
            .unwrap();
        assert_eq!(result.status(), 200);
        assert_eq!(retry_counter.into_inner(), 2);
    }

    #[test]
    fn test_retry_fail() {
        let retry_counter = std::cell::RefCell::new(0);
        let err = policy(3)
            .retry(|| {
                *retry_counter.borrow_mut() += 1;
                status(503, "Service Unavailable")
            })
            .unwrap_err();
        let code = match err {
            ureq::Error::Status(code, _) => code,
            _ => panic!("Unexpected error invariant"),
        };
        assert_eq!(code, 503);
        assert_eq!(retry_counter.into_inner(), 3);
    }

    #[test]
    fn test_client_error_not_retried() {
        let retry_counter = std::cell::RefCell::new(0);
        let err = policy(5)
            .retry(|| {
                *retry_counter.borrow_mut() += 1;
                status(404, "Not Found")
            })
            .unwrap_err();
        assert!(matches!(err, ureq::Error::Status(404, _)));
        assert_eq!(retry_counter.into_inner(), 1);
    }

    #[test]
    fn test_backoff_capped() {
        let policy = RetryPolicy::new(NonZeroU32::new(10).unwrap(), Duration::from_secs(5));
        assert_eq!(policy.get_backoff_time(0), Duration::from_secs(1));
        assert_eq!(policy.get_backoff_time(2), Duration::from_secs(4));
        assert_eq!(policy.get_backoff_time(3), Duration::from_secs(5));
        assert_eq!(policy.get_backoff_time(64), Duration::from_secs(5));
    }
}
