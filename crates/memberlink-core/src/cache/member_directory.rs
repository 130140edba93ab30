//! Per-owner member directory cache.
//!
//! Each owner account gets a slot holding an immutable snapshot of its
//! members. Readers clone the `Arc` and never block writers; writers swap a
//! whole snapshot at once, so a reader sees either the old list or the new
//! one, never a half-written list.
//!
//! The number of slots is bounded. When a new slot would exceed
//! `max_owners`, the least recently used slot is dropped. Lookups that miss
//! fall back to the store, so eviction only costs latency.
//!
//! Background refills race with deletes and with each other:
//!
//! - A refill that read the store before a delete finished could put the
//!   deleted member back. Every invalidating write bumps an epoch. A refill
//!   whose epoch is out of date is discarded and the owner's slot is dropped,
//!   so the next read goes to the store instead of a snapshot that may be
//!   missing writes made in the meantime.
//! - Two creates for the same owner each schedule a refill, and they can
//!   finish in either order. Each slot remembers when the read behind its
//!   snapshot started. A refill that started before the installed snapshot
//!   is discarded, so the older read never overwrites the newer one.
//!
//! See [`RefillTicket`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use memberlink_types::account::AccountId;
use memberlink_types::member::{Member, MemberId};

struct Slot {
    members: Arc<Vec<Member>>,
    last_used: AtomicU64,
    /// Clock value taken before the snapshot was read.
    read_at: u64,
}

/// Captured before a background refill reads the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefillTicket {
    epoch: u64,
    read_at: u64,
}

/// Shared, bounded, per-owner member cache.
pub struct MemberDirectoryCache {
    slots: DashMap<AccountId, Slot>,
    max_owners: usize,
    clock: AtomicU64,
    epoch: Mutex<u64>,
}

impl MemberDirectoryCache {
    /// Create an empty cache holding at most `max_owners` slots (minimum 1).
    pub fn new(max_owners: usize) -> Self {
        Self {
            slots: DashMap::new(),
            max_owners: max_owners.max(1),
            clock: AtomicU64::new(0),
            epoch: Mutex::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        // The guarded value is a plain counter, so a poisoned lock is still usable.
        self.epoch.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of an owner's members, if the owner has a slot.
    pub fn get(&self, owner: &AccountId) -> Option<Arc<Vec<Member>>> {
        self.slots.get(owner).map(|slot| {
            slot.last_used.store(self.tick(), Ordering::Relaxed);
            Arc::clone(&slot.members)
        })
    }

    /// Replace an owner's snapshot, evicting the least recently used slot if
    /// the cache is full.
    pub fn set(&self, owner: AccountId, members: Vec<Member>) {
        let now = self.tick();
        self.install(owner, members, now);
    }

    fn install(&self, owner: AccountId, members: Vec<Member>, read_at: u64) {
        let slot = Slot {
            members: Arc::new(members),
            last_used: AtomicU64::new(self.tick()),
            read_at,
        };
        let is_new = self.slots.insert(owner.clone(), slot).is_none();
        if is_new {
            self.evict_over_capacity(&owner);
        }
    }

    fn evict_over_capacity(&self, keep: &AccountId) {
        while self.slots.len() > self.max_owners {
            // Collect the victim first: removing while an iterator holds a
            // shard lock would deadlock.
            let victim = self
                .slots
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_used.load(Ordering::Relaxed))
                .map(|entry| entry.key().clone());

            match victim {
                Some(owner) => {
                    self.slots.remove(&owner);
                    tracing::debug!(owner = %owner, "evicted member directory slot");
                }
                None => break,
            }
        }
    }

    /// Owner of the member whose chat id and username both match.
    ///
    /// Scans every slot; returns `None` on a miss so the caller can fall
    /// back to the store.
    pub fn find_owner(&self, external_user_id: &str, username: &str) -> Option<AccountId> {
        let tick = self.tick();
        self.slots.iter().find_map(|entry| {
            let slot = entry.value();
            slot.members
                .iter()
                .find(|m| m.matches_identity(external_user_id, username))
                .map(|m| {
                    slot.last_used.store(tick, Ordering::Relaxed);
                    m.owner_account_id.clone()
                })
        })
    }

    /// Drop one member from an owner's snapshot.
    ///
    /// Returns the number of members left in the slot, or `None` if the
    /// owner has no slot.
    pub fn remove_member(&self, owner: &AccountId, id: &MemberId) -> Option<usize> {
        let mut epoch = self.lock_epoch();
        *epoch += 1;

        let mut slot = self.slots.get_mut(owner)?;
        if slot.members.iter().any(|m| &m.id == id) {
            let remaining: Vec<Member> = slot
                .members
                .iter()
                .filter(|m| &m.id != id)
                .cloned()
                .collect();
            slot.members = Arc::new(remaining);
        }
        Some(slot.members.len())
    }

    /// Drop an owner's slot entirely.
    pub fn invalidate(&self, owner: &AccountId) {
        let mut epoch = self.lock_epoch();
        *epoch += 1;
        self.slots.remove(owner);
    }

    /// Start a refill. Pass the ticket to [`Self::complete_refill`].
    pub fn begin_refill(&self) -> RefillTicket {
        let epoch = self.lock_epoch();
        RefillTicket {
            epoch: *epoch,
            read_at: self.tick(),
        }
    }

    /// Install a refilled snapshot. An empty result removes the slot.
    ///
    /// If an invalidating write happened since `ticket` was taken, the
    /// snapshot is discarded and the owner's slot is dropped as well, so the
    /// owner is never left with a snapshot older than the store. If the slot
    /// already holds a snapshot read after this one started, it is kept.
    ///
    /// Returns whether the snapshot was applied.
    pub fn complete_refill(
        &self,
        ticket: RefillTicket,
        owner: AccountId,
        members: Vec<Member>,
    ) -> bool {
        let epoch = self.lock_epoch();
        if *epoch != ticket.epoch {
            self.slots.remove(&owner);
            return false;
        }
        let newer_installed = self
            .slots
            .get(&owner)
            .is_some_and(|slot| slot.read_at > ticket.read_at);
        if newer_installed {
            return false;
        }

        if members.is_empty() {
            self.slots.remove(&owner);
        } else {
            self.install(owner, members, ticket.read_at);
        }
        drop(epoch);
        true
    }

    /// Remove every slot.
    pub fn clear(&self) {
        let mut epoch = self.lock_epoch();
        *epoch += 1;
        self.slots.clear();
    }

    /// Number of owner slots currently held.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for MemberDirectoryCache {
    fn default() -> Self {
        Self::new(1024)
    }
}
