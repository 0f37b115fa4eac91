//! Fixed-interval status polling

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::common::{Error, Result};

/// Call `check` until `is_terminal` accepts its result
///
/// Sleeps `interval` between two checks. With `max_attempts` unset the loop
/// only ends when a terminal value is seen or `check` fails; errors from
/// `check` are returned immediately, never retried.
pub async fn poll_until<T, F, Fut, P>(
    mut check: F,
    interval: Duration,
    is_terminal: P,
    max_attempts: Option<u32>,
) -> Result<T>
where
    T: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let mut attempts: u32 = 0;
    loop {
        let value = check().await?;
        attempts += 1;

        if is_terminal(&value) {
            return Ok(value);
        }

        if let Some(max) = max_attempts {
            if attempts >= max {
                return Err(Error::PollLimitExceeded {
                    status: value.to_string(),
                    attempts,
                });
            }
        }

        tracing::info!("run state is {}, let's wait", value);
        tokio::time::sleep(interval).await;
    }
}
