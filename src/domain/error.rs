//! Account domain errors.
//!
//! Business rule violations form a closed set of [`AccountErrorKind`]s.
//! Everything else (storage, hashing) is carried by [`AccountError`] without
//! a kind, so callers can tell a known rule violation from an unexpected
//! failure with a single match.

use thiserror::Error;

/// Named business-rule violations reported by the account service.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountErrorKind {
    #[error("account already exists")]
    AlreadyExists,

    #[error("account is not registered")]
    NotRegistered,

    #[error("username cannot be empty")]
    UsernameEmpty,

    #[error("password cannot be empty")]
    PasswordEmpty,

    #[error("username already exists")]
    UsernameExists,

    #[error("email already exists")]
    EmailExists,

    #[error("national ID number already exists")]
    NationalIdExists,

    #[error("phone number already exists")]
    PhoneNumberExists,

    #[error("invalid date of birth format, expected YYYY-MM-DD")]
    InvalidDateOfBirth,
}

/// Errors returned by account use cases.
#[derive(Error, Debug)]
pub enum AccountError {
    /// A known business rule was violated
    #[error(transparent)]
    Rule(#[from] AccountErrorKind),

    /// Persistence layer failure
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// Any other unexpected failure
    #[error("{0}")]
    Internal(String),
}

impl AccountError {
    /// The rule violation behind this error, if it is one.
    pub fn kind(&self) -> Option<AccountErrorKind> {
        match self {
            AccountError::Rule(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AccountError::Internal(msg.into())
    }
}

/// Result type alias for account operations
pub type AccountResult<T> = Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_expose_kind() {
        let err = AccountError::from(AccountErrorKind::EmailExists);
        assert_eq!(err.kind(), Some(AccountErrorKind::EmailExists));
        assert_eq!(err.to_string(), "email already exists");
    }

    #[test]
    fn test_unexpected_errors_have_no_kind() {
        let storage = AccountError::from(sea_orm::DbErr::Custom("boom".to_string()));
        assert_eq!(storage.kind(), None);
        assert_eq!(AccountError::internal("hash failed").kind(), None);
    }

    #[test]
    fn test_exists_messages_are_distinct() {
        assert_ne!(
            AccountErrorKind::UsernameExists.to_string(),
            AccountErrorKind::EmailExists.to_string()
        );
    }
}
