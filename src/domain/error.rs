use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Insufficient funds: balance {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    #[error("Already subscribed: {message}")]
    AlreadySubscribed { message: String },

    #[error("No balance: {message}")]
    NoBalance { message: String },

    /// A stored balance violates the non-negative invariant
    #[error("Corrupted balance: {message}")]
    CorruptedBalance { message: String },

    #[error("Authentication required: {message}")]
    Unauthenticated { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn insufficient_funds(available: i64, required: i64) -> Self {
        Self::InsufficientFunds {
            available,
            required,
        }
    }

    pub fn already_subscribed(message: impl Into<String>) -> Self {
        Self::AlreadySubscribed {
            message: message.into(),
        }
    }

    pub fn no_balance(message: impl Into<String>) -> Self {
        Self::NoBalance {
            message: message.into(),
        }
    }

    pub fn corrupted_balance(message: impl Into<String>) -> Self {
        Self::CorruptedBalance {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Short label used for purchase outcome metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
            Self::InvalidId { .. } => "invalid_id",
            Self::Conflict { .. } => "conflict",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::AlreadySubscribed { .. } => "already_subscribed",
            Self::NoBalance { .. } => "no_balance",
            Self::CorruptedBalance { .. } => "corrupted_balance",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Internal { .. } => "internal",
            Self::Storage { .. } => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Course 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Course 'abc' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_insufficient_funds_error() {
        let error = DomainError::insufficient_funds(1000, 1200);
        assert_eq!(
            error.to_string(),
            "Insufficient funds: balance 1000, required 1200"
        );
        assert_eq!(error.kind(), "insufficient_funds");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(DomainError::already_subscribed("x").kind(), "already_subscribed");
        assert_eq!(DomainError::no_balance("x").kind(), "no_balance");
        assert_eq!(DomainError::corrupted_balance("x").kind(), "corrupted_balance");
    }
}
