//! Write side of the member directory.
//!
//! Every write goes to the store first and is acknowledged to the caller
//! before the owner's cache slot is rebuilt. The rebuild runs on a
//! [`TaskTracker`]; its failures are logged and never reach the caller.
//! Deletes additionally patch the cache in place before returning, so a
//! deleted identity stops resolving immediately.
//!
//! Refills can overlap. Two creates for the same owner schedule two refills
//! that may finish in either order; the cache keeps whichever snapshot was
//! read last, never the older one. A refill that overlaps any delete is
//! thrown away together with the owner's slot, and the next read for that
//! owner goes to the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use memberlink_types::account::AccountId;
use memberlink_types::error::MemberError;
use memberlink_types::member::{CreateMemberRequest, Member, MemberId};
use tokio_util::task::TaskTracker;

use crate::cache::MemberDirectoryCache;
use crate::repository::member::{MemberFilter, MemberRepository};

/// Creates and deletes members and keeps the directory cache in step.
pub struct MemberWriteService<M: MemberRepository + 'static> {
    repo: Arc<M>,
    cache: Arc<MemberDirectoryCache>,
    tasks: TaskTracker,
}

impl<M: MemberRepository + 'static> MemberWriteService<M> {
    pub fn new(repo: Arc<M>, cache: Arc<MemberDirectoryCache>) -> Self {
        Self {
            repo,
            cache,
            tasks: TaskTracker::new(),
        }
    }

    /// Create a member owned by `owner` from a raw JSON body.
    ///
    /// Unknown keys are rejected. An `owner` key in the body is ignored.
    pub async fn create_member(
        &self,
        owner: &AccountId,
        body: serde_json::Value,
    ) -> Result<Member, MemberError> {
        let new_member = CreateMemberRequest::from_body(body)?.validate()?;
        let member = self.repo.create(&new_member.into_member(owner.clone())).await?;

        tracing::info!(
            member_id = %member.id,
            owner = %owner,
            external_user_id = %member.external_user_id,
            "member created"
        );

        self.spawn_refill(owner.clone(), "create");
        Ok(member)
    }

    /// Delete the member `id` if it is owned by `caller`.
    ///
    /// Returns `MemberError::NotFound` both when the member does not exist
    /// and when it belongs to someone else.
    pub async fn delete_member(&self, id: &MemberId, caller: &AccountId) -> Result<(), MemberError> {
        let filter = MemberFilter {
            id: Some(id.clone()),
            owner_account_id: Some(caller.clone()),
            ..Default::default()
        };
        let member = self.repo.find(&filter).await?.ok_or(MemberError::NotFound)?;

        self.repo.delete(&member.id).await?;
        tracing::info!(member_id = %member.id, owner = %caller, "member deleted");

        match self.cache.remove_member(caller, &member.id) {
            Some(remaining) if remaining > 0 => {}
            _ => self.spawn_refill(caller.clone(), "delete"),
        }
        Ok(())
    }

    /// Load every member from the store into the cache, one slot per owner.
    ///
    /// Returns the number of owners loaded. Owners beyond the cache capacity
    /// are evicted as usual.
    pub async fn warm_cache(&self) -> Result<usize, MemberError> {
        let members = self.repo.list(&MemberFilter::default()).await?;

        let mut by_owner: BTreeMap<AccountId, Vec<Member>> = BTreeMap::new();
        for member in members {
            by_owner
                .entry(member.owner_account_id.clone())
                .or_default()
                .push(member);
        }

        let owners = by_owner.len();
        for (owner, members) in by_owner {
            self.cache.set(owner, members);
        }
        tracing::info!(owners, "member directory cache warmed");
        Ok(owners)
    }

    /// Wait until every background refill scheduled so far has finished.
    pub async fn reconciliation_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    fn spawn_refill(&self, owner: AccountId, reason: &'static str) {
        let repo = Arc::clone(&self.repo);
        let cache = Arc::clone(&self.cache);
        let ticket = cache.begin_refill();

        self.tasks.spawn(async move {
            match repo.list(&MemberFilter::owned_by(owner.clone())).await {
                Ok(members) => {
                    let count = members.len();
                    if cache.complete_refill(ticket, owner.clone(), members) {
                        tracing::debug!(owner = %owner, count, reason, "member cache refilled");
                    } else {
                        tracing::debug!(
                            owner = %owner,
                            reason,
                            "member cache refill superseded, slot left to the store"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(owner = %owner, reason, error = %e, "member cache refill failed");
                }
            }
        });
    }
}
