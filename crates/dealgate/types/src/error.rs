//! Error types for the dealgate core.
//!
//! Expected business outcomes ("transition blocked", "condition not
//! met", "playbook not found") are values carried in decision
//! results, not errors. These variants cover publish-time rejection
//! and infrastructure faults at the core's own boundary.

use crate::PlaybookId;
use thiserror::Error;

pub type DealgateResult<T> = Result<T, DealgateError>;

#[derive(Debug, Error)]
pub enum DealgateError {
    #[error("playbook failed validation: {0:?}")]
    InvalidPlaybook(Vec<String>),

    #[error("playbook version already published: {0}")]
    VersionAlreadyPublished(PlaybookId),

    #[error("pipeline configuration invalid: {0}")]
    InvalidPipeline(String),

    #[error("audit channel closed")]
    AuditChannelClosed,

    #[error("audit queue full, event dropped")]
    AuditQueueFull,

    #[error("registry lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DealgateError::VersionAlreadyPublished(PlaybookId::new("sales_default"));
        assert_eq!(
            err.to_string(),
            "playbook version already published: sales_default"
        );

        let err = DealgateError::InvalidPlaybook(vec!["entry stage missing".into()]);
        assert!(err.to_string().contains("entry stage missing"));
    }
}
