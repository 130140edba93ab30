use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::account::AccountId;
use crate::error::MemberError;
use crate::fields;

/// Unique identifier for a member, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub Uuid);

impl MemberId {
    /// Create a new MemberId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A chat identity registered by an account.
///
/// Messages sent by this identity to the bot are relayed to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Chat username, unique across members.
    pub username: String,
    /// Chat-gateway user id, unique across members.
    pub external_user_id: String,
    /// Account that receives relayed messages.
    pub owner_account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Exact match on both the chat id and the username.
    ///
    /// Matching on the id alone would accept a renamed or reassigned identity.
    pub fn matches_identity(&self, external_user_id: &str, username: &str) -> bool {
        self.external_user_id == external_user_id && self.username == username
    }
}

/// Body of `POST /member/create`.
///
/// Only these keys are accepted. `owner` is tolerated for compatibility with
/// existing clients but ignored: the owner is always the authenticated caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMemberRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub external_user_id: Option<String>,
    pub owner: Option<serde_json::Value>,
}

/// A validated member ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub username: String,
    pub external_user_id: String,
}

impl CreateMemberRequest {
    /// Parse and whitelist-check a raw JSON body.
    pub fn from_body(body: serde_json::Value) -> Result<Self, MemberError> {
        fields::parse_body(body).map_err(MemberError::Validation)
    }

    /// Apply field rules: all three identity fields are required and trimmed.
    pub fn validate(self) -> Result<NewMember, MemberError> {
        let external_user_id = fields::required(self.external_user_id, "externalUserId")
            .map_err(MemberError::Validation)?;
        let name = fields::required(self.name, "name").map_err(MemberError::Validation)?;
        let username =
            fields::required(self.username, "username").map_err(MemberError::Validation)?;

        Ok(NewMember {
            name,
            username,
            external_user_id,
        })
    }
}

impl NewMember {
    /// Build the stored member for `owner`.
    pub fn into_member(self, owner: AccountId) -> Member {
        let now = Utc::now();
        Member {
            id: MemberId::new(),
            name: self.name,
            username: self.username,
            external_user_id: self.external_user_id,
            owner_account_id: owner,
            created_at: now,
            updated_at: now,
        }
    }
}
