use thiserror::Error;

/// Errors related to member operations.
#[derive(Debug, Error)]
pub enum MemberError {
    #[error("invalid member request: {0}")]
    Validation(String),

    /// Also returned when the member exists but belongs to another owner.
    #[error("member not found")]
    NotFound,

    #[error("member conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to account and session operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid account request: {0}")]
    Validation(String),

    #[error("account not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in memberlink-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the chat gateway.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("chat transport error: {0}")]
    Transport(String),
}

impl From<RepositoryError> for MemberError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => MemberError::NotFound,
            RepositoryError::Conflict(msg) => MemberError::Conflict(msg),
            other => MemberError::StorageError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AccountError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AccountError::NotFound,
            RepositoryError::Conflict(msg) => AccountError::Conflict(msg),
            other => AccountError::StorageError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_error_display() {
        let err = MemberError::Validation("unexpected field 'extraField'".to_string());
        assert_eq!(
            err.to_string(),
            "invalid member request: unexpected field 'extraField'"
        );
    }

    #[test]
    fn test_repository_error_maps_into_member_error() {
        let err: MemberError = RepositoryError::Conflict("username 'bob'".to_string()).into();
        assert!(matches!(err, MemberError::Conflict(_)));

        let err: MemberError = RepositoryError::Connection.into();
        assert!(matches!(err, MemberError::StorageError(_)));

        let err: MemberError = RepositoryError::NotFound.into();
        assert!(matches!(err, MemberError::NotFound));
    }

    #[test]
    fn test_repository_error_maps_into_account_error() {
        let err: AccountError = RepositoryError::Query("syntax error".to_string()).into();
        assert_eq!(err.to_string(), "storage error: query error: syntax error");
    }
}
