use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};

/// Run a single remote call under a deadline, giving up early if the run is
/// cancelled. Every collaborator call in the pipeline goes through here.
pub async fn bounded<T, F>(cancel: &CancellationToken, deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        outcome = tokio::time::timeout(deadline, call) => match outcome {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(deadline)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_passes_through_result() {
        let cancel = CancellationToken::new();
        let value = bounded(&cancel, Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let polled = AtomicBool::new(false);
        let result: Result<()> = bounded(&cancel, Duration::from_secs(1), async {
            polled.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_times_out_slow_call() {
        let cancel = CancellationToken::new();
        let deadline = Duration::from_millis(20);
        let result: Result<()> = bounded(&cancel, deadline, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Timeout(d)) if d == deadline));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: Result<()> = bounded(&cancel, Duration::from_secs(30), async {
            std::future::pending::<()>().await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
