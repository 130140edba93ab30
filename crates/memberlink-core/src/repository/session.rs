//! Session repository trait definition.

use memberlink_types::account::{AccountId, Session};
use memberlink_types::error::RepositoryError;

/// Repository trait for login sessions, keyed by token hash.
pub trait SessionRepository: Send + Sync {
    fn create(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Remove every session of an account. Returns how many were removed.
    fn delete_for_account(
        &self,
        account_id: &AccountId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
