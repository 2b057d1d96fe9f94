use thiserror::Error;

/// Terminal failure of a single audit request.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{0} is required")]
    MissingParameter(&'static str),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("investigation failed: {0:#}")]
    Investigation(anyhow::Error),

    #[error("policy evaluation failed: {0:#}")]
    Evaluation(anyhow::Error),
}

impl AuditError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True when the caller supplied bad input rather than the pipeline failing.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidParameter { .. }
        )
    }
}
