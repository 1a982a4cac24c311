//! Configuration/domain error model.

use thiserror::Error;

/// Result type used when building claimgate configuration objects.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Raised while *constructing* requirements, policies and registries. Runtime
/// authorization outcomes are never reported through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. a non-positive probation threshold).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Two definitions claimed the same unique key.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            DomainError::validation("threshold_months must be positive").to_string(),
            "validation failed: threshold_months must be positive"
        );
        assert_eq!(
            DomainError::conflict("policy 'AdminOnly' registered twice").to_string(),
            "conflict: policy 'AdminOnly' registered twice"
        );
    }
}
