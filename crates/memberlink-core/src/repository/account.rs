//! Account repository trait definition.

use memberlink_types::account::{Account, AccountId, AccountStatus};
use memberlink_types::error::RepositoryError;

/// Filter criteria for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub status: Option<AccountStatus>,
    pub username: Option<String>,
}

/// Repository trait for account persistence.
pub trait AccountRepository: Send + Sync {
    /// Insert a new account. Username, email and chat user id are unique.
    fn create(
        &self,
        account: &Account,
    ) -> impl std::future::Future<Output = Result<Account, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    /// List accounts, oldest first.
    fn list(
        &self,
        filter: &AccountFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Overwrite an existing account. Returns `RepositoryError::NotFound`
    /// if it no longer exists.
    fn update(
        &self,
        account: &Account,
    ) -> impl std::future::Future<Output = Result<Account, RepositoryError>> + Send;

    fn delete(
        &self,
        id: &AccountId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
