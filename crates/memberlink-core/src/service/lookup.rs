//! Read side of the member directory.
//!
//! `resolve_owner` answers "which account should receive messages from this
//! chat identity?" and is called for every inbound chat message. It never
//! writes to the store or the cache.

use std::sync::Arc;

use memberlink_types::account::AccountId;
use memberlink_types::error::MemberError;
use memberlink_types::member::Member;

use crate::cache::MemberDirectoryCache;
use crate::repository::member::{MemberFilter, MemberRepository};

/// Cache-first owner resolution and owner-scoped listing.
pub struct MemberLookupService<M: MemberRepository> {
    repo: Arc<M>,
    cache: Arc<MemberDirectoryCache>,
}

impl<M: MemberRepository> Clone for MemberLookupService<M> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<M: MemberRepository> MemberLookupService<M> {
    pub fn new(repo: Arc<M>, cache: Arc<MemberDirectoryCache>) -> Self {
        Self { repo, cache }
    }

    /// Find the owner of the member with this exact chat id and username.
    ///
    /// Checks the cache first. On a miss, queries the store by chat id and
    /// applies the same username check, so a renamed identity is never
    /// relayed. `None` means no live member matches.
    pub async fn resolve_owner(
        &self,
        external_user_id: &str,
        username: &str,
    ) -> Result<Option<AccountId>, MemberError> {
        if let Some(owner) = self.cache.find_owner(external_user_id, username) {
            tracing::trace!(external_user_id, "owner resolved from cache");
            return Ok(Some(owner));
        }

        let filter = MemberFilter {
            external_user_id: Some(external_user_id.to_string()),
            ..Default::default()
        };
        match self.repo.find(&filter).await? {
            Some(member) if member.matches_identity(external_user_id, username) => {
                tracing::debug!(
                    external_user_id,
                    owner = %member.owner_account_id,
                    "owner resolved from store"
                );
                Ok(Some(member.owner_account_id))
            }
            Some(_) => {
                tracing::debug!(external_user_id, "username mismatch, not relaying");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Every member owned by `owner`, oldest first.
    ///
    /// Served from the owner's cache slot when present and non-empty. The
    /// store is only read on a miss; this method does not fill the slot.
    pub async fn list_members(&self, owner: &AccountId) -> Result<Vec<Member>, MemberError> {
        if let Some(members) = self.cache.get(owner).filter(|m| !m.is_empty()) {
            return Ok(members.as_ref().clone());
        }
        Ok(self.repo.list(&MemberFilter::owned_by(owner.clone())).await?)
    }
}
