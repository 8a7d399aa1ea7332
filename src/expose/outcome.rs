//! # Sync Outcome
//!
//! Tri-state result of converging one desired object (or one endpoint).

use crate::expose::ExposeError;

/// Result of one convergence attempt
///
/// `Pending` is a normal, non-terminal state: the object was just created or
/// updated and has not been observed as ready yet. It is never an error.
#[derive(Debug)]
#[must_use]
pub enum SyncOutcome<T = ()> {
    /// Live state matches desired state
    Ready(T),
    /// Changes were submitted; retry on a later pass
    Pending,
    /// The attempt itself failed; retry on a later pass
    Failed(ExposeError),
}

impl<T> SyncOutcome<T> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Short label used for metrics and logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::Pending => "pending",
            Self::Failed(_) => "failed",
        }
    }

    /// The ready value, if any
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_not_an_error() {
        let outcome: SyncOutcome<String> = SyncOutcome::Pending;
        assert!(outcome.is_pending());
        assert!(!outcome.is_ready());
        assert_eq!(outcome.as_str(), "pending");
        assert_eq!(outcome.ready(), None);
    }

    #[test]
    fn test_failed_carries_cause() {
        let outcome: SyncOutcome = SyncOutcome::Failed(ExposeError::Probe(anyhow::anyhow!("boom")));
        assert_eq!(outcome.as_str(), "failed");
        match outcome {
            SyncOutcome::Failed(err) => assert!(err.to_string().contains("boom")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_ready_value() {
        let ready = SyncOutcome::Ready("che.example.com".to_string());
        assert!(ready.is_ready());
        assert_eq!(ready.as_str(), "ready");
        assert_eq!(ready.ready().as_deref(), Some("che.example.com"));
    }
}
