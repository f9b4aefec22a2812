use crate::data::store::{DataSnafu, RetryExhaustedSnafu, StoreError};
use futures::future::BoxFuture;
use snafu::IntoError;
use std::time::{Duration, Instant};

/// SQLSTATEs that are worth another go. Class `08` (connection exceptions) is matched separately.
const TRANSIENT_SQLSTATES: [&str; 6] = ["40001", "40P01", "53300", "57P01", "57P02", "57P03"];

/// Retry/backoff strategy owned by the store. Callers above the store never loop themselves,
/// they only see the terminal [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Delay before the attempt following `failed_attempt` (1-based).
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(failed_attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `command` against `target` until it succeeds, fails with a non-transient error,
    /// or the attempt budget runs out.
    pub async fn run<C, T, F>(
        &self,
        command: &'static str,
        target: &mut C,
        mut op: F,
    ) -> Result<T, StoreError>
    where
        C: ?Sized,
        F: for<'c> FnMut(&'c mut C) -> BoxFuture<'c, Result<T, sqlx::Error>>,
    {
        let mut attempt = 1;
        loop {
            let start = Instant::now();
            let result = op(&mut *target).await;
            debug!(command, attempt, elapsed = ?start.elapsed(), ok = result.is_ok(), "store command");

            match result {
                Ok(value) => return Ok(value),
                Err(error) if !is_transient(&error) => {
                    return Err(DataSnafu.into_error(error));
                }
                Err(error) if attempt >= self.max_attempts => {
                    return Err(RetryExhaustedSnafu { attempts: attempt }.into_error(error));
                }
                Err(error) => {
                    let delay = self.delay_after(attempt);
                    warn!(command, attempt, ?delay, ?error, "transient store failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

pub fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_error) => db_error.code().is_some_and(|code| {
            code.starts_with("08") || TRANSIENT_SQLSTATES.contains(&&*code)
        }),
        _ => false,
    }
}
