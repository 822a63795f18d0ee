use thiserror::Error;

/// Every failure here is an input problem the caller can correct.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("break-even not reached within {horizon_months} months")]
    BreakEvenNotReached { horizon_months: u32 },
}

impl ProjectionError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
