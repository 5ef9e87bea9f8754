//! Timeout wrapper

use crate::error::{CompkitError, CompkitResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Race `future` against a timer.
///
/// The future runs as its own task; when the timer wins the task is left
/// running in the background and its eventual output is dropped.
pub async fn with_timeout<F, T>(
    future: F,
    after: Duration,
    message: impl Into<String>,
) -> CompkitResult<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(future);

    match tokio::time::timeout(after, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CompkitError::Internal(format!("task failed: {}", e))),
        Err(_) => {
            let message = message.into();
            debug!("{} timed out after {:?}", message, after);
            Err(CompkitError::Timeout { message, after })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn fast_future_wins() {
        let value = with_timeout(async { 42 }, Duration::from_secs(1), "fast")
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn slow_future_times_out() {
        let err = with_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
            },
            Duration::from_millis(10),
            "fetching button",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CompkitError::Timeout { .. }));
        assert!(err.to_string().contains("fetching button"));
    }

    #[tokio::test]
    async fn loser_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result = with_timeout(
            async move {
                tokio::time::sleep(Duration::from_millis(40)).await;
                flag.store(true, Ordering::SeqCst);
            },
            Duration::from_millis(5),
            "slow",
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}
