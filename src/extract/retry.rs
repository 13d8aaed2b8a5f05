use std::{future::Future, time::Duration};

use log::warn;

/// Result of a single try, as classified by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Done(T),
    /// The remote answered that there is nothing to return.
    Empty,
    /// Worth trying again: network failure, bad status, unreadable body, rate limit.
    Retry(String),
    /// The remote rejected the request, retrying will not help.
    Fail(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Done(T),
    Empty,
    Exhausted(String),
    Failed(String),
}

/// Bounded retries with linear backoff: the n-th retry waits `n * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let max_attempts = self.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match operation(attempt).await {
                Attempt::Done(value) => return RetryOutcome::Done(value),
                Attempt::Empty => return RetryOutcome::Empty,
                Attempt::Fail(reason) => return RetryOutcome::Failed(reason),
                Attempt::Retry(reason) => {
                    if attempt == max_attempts {
                        warn!(
                            "{}: giving up after {} attempts: {}",
                            label, max_attempts, reason
                        );
                        return RetryOutcome::Exhausted(reason);
                    }

                    let delay = self.delay_for(attempt);

                    warn!(
                        "{}: {} (retry {}/{} in {:?})",
                        label, reason, attempt, max_attempts, delay
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }

        RetryOutcome::Exhausted(format!("{}: no attempts made", label))
    }
}
