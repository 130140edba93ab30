//! Member repository trait definition.

use memberlink_types::account::AccountId;
use memberlink_types::error::RepositoryError;
use memberlink_types::member::{Member, MemberId};

/// Equality filter over member fields. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub id: Option<MemberId>,
    pub external_user_id: Option<String>,
    pub username: Option<String>,
    pub owner_account_id: Option<AccountId>,
}

impl MemberFilter {
    /// All members owned by `owner`.
    pub fn owned_by(owner: AccountId) -> Self {
        Self {
            owner_account_id: Some(owner),
            ..Default::default()
        }
    }

    /// Returns true if `member` satisfies every set field.
    pub fn matches(&self, member: &Member) -> bool {
        self.id.as_ref().is_none_or(|id| &member.id == id)
            && self
                .external_user_id
                .as_deref()
                .is_none_or(|ext| member.external_user_id == ext)
            && self
                .username
                .as_deref()
                .is_none_or(|username| member.username == username)
            && self
                .owner_account_id
                .as_ref()
                .is_none_or(|owner| &member.owner_account_id == owner)
    }
}

/// Repository trait for member persistence.
///
/// Implementations live in memberlink-infra (e.g., SqliteMemberRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MemberRepository: Send + Sync {
    /// Insert a new member. Returns `RepositoryError::Conflict` when the
    /// username or external user id is already taken.
    fn create(
        &self,
        member: &Member,
    ) -> impl std::future::Future<Output = Result<Member, RepositoryError>> + Send;

    /// First member matching the filter, if any.
    fn find(
        &self,
        filter: &MemberFilter,
    ) -> impl std::future::Future<Output = Result<Option<Member>, RepositoryError>> + Send;

    /// All members matching the filter, oldest first.
    fn list(
        &self,
        filter: &MemberFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Member>, RepositoryError>> + Send;

    /// Permanently delete a member by ID.
    fn delete(
        &self,
        id: &MemberId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
