use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("condition not met within {timeout:?}")]
pub struct TimeoutError {
    pub timeout: Duration,
}

/// Re-evaluates `probe` every `interval` until it yields a value or `timeout` elapses.
///
/// The probe always runs at least once, and once more right at the deadline, so a
/// condition that becomes true during the final interval is still observed.
pub async fn await_condition<T, F>(
    mut probe: F,
    interval: Duration,
    timeout: Duration,
) -> Result<T, TimeoutError>
where
    F: FnMut() -> Option<T>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe() {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(TimeoutError { timeout });
        }
        let remaining = deadline - now;
        tokio::time::sleep(interval.min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{await_condition, TimeoutError};

    #[tokio::test]
    async fn returns_as_soon_as_probe_succeeds() {
        let mut calls = 0;
        let value = await_condition(
            || {
                calls += 1;
                (calls == 3).then_some(calls)
            },
            Duration::from_millis(1),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(value, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        let timeout = Duration::from_millis(30);
        let result = await_condition(|| None::<()>, Duration::from_millis(5), timeout).await;
        assert_eq!(result, Err(TimeoutError { timeout }));
    }
}
