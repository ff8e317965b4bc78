use std::future::Future;
use std::time::Duration;

/// Coarse failure categories for calls to outside services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    NotFound,
    InvalidArgument,
    Unavailable,
    DeadlineExceeded,
    Other,
}

impl FailureKind {
    /// Retrying cannot fix a rejected credential, a missing resource or a bad payload.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            FailureKind::PermissionDenied | FailureKind::NotFound | FailureKind::InvalidArgument
        )
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::PermissionDenied => "You do not have permission to perform this action.",
            FailureKind::NotFound => "The requested resource was not found.",
            FailureKind::InvalidArgument => "Invalid data provided. Please check your input.",
            FailureKind::Unavailable => {
                "You appear to be offline. Please check your internet connection and try again."
            }
            FailureKind::DeadlineExceeded => "Operation timed out. Please try again.",
            FailureKind::Other => "An error occurred while performing the operation.",
        }
    }
}

pub trait Classify {
    fn kind(&self) -> FailureKind;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Pause after the zero-based `attempt` failed: base, 2×base, 4×base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned unchanged.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let kind = e.kind();
                if !kind.is_retryable() || attempt + 1 >= policy.max_attempts {
                    return Err(e);
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    ?kind,
                    delay_ms = delay.as_millis() as u64,
                    "operation failed, retrying: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Failure(FailureKind);

    impl std::fmt::Display for Failure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl Classify for Failure {
        fn kind(&self) -> FailureKind {
            self.0
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(!FailureKind::PermissionDenied.is_retryable());
        assert!(!FailureKind::NotFound.is_retryable());
        assert!(!FailureKind::InvalidArgument.is_retryable());
        assert!(FailureKind::Unavailable.is_retryable());
        assert!(FailureKind::DeadlineExceeded.is_retryable());
        assert!(FailureKind::Other.is_retryable());
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<&str, Failure> = retry(&fast_policy(), || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Failure(FailureKind::Unavailable))
                } else {
                    Ok("sent")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "sent");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), Failure> = retry(&fast_policy(), || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Failure(FailureKind::DeadlineExceeded))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().0, FailureKind::DeadlineExceeded);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), Failure> = retry(&fast_policy(), || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Failure(FailureKind::PermissionDenied))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_schedule() {
        let start = tokio::time::Instant::now();
        let policy = RetryPolicy::default();

        let result: Result<(), Failure> =
            retry(&policy, || async { Err(Failure(FailureKind::Other)) }).await;

        assert!(result.is_err());
        // two pauses between three attempts: 1s + 2s
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < Duration::from_millis(4000));
    }
}
