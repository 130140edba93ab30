use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::AccountError;
use crate::fields;

/// Unique identifier for an account, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create a new AccountId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A registered user of the service.
///
/// Members created by this account relay their messages to `chat_user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
    pub email: String,
    pub link: String,
    /// The account holder's own chat-gateway id (relay destination).
    pub chat_user_id: String,
    pub status: AccountStatus,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Account lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Deactive,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Deactive => write!(f, "deactive"),
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "deactive" => Ok(AccountStatus::Deactive),
            other => Err(format!("invalid account status: '{other}'")),
        }
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Deactive
    }
}

/// Body of `POST /user/register`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub link: Option<String>,
    pub password: Option<String>,
    pub status: Option<AccountStatus>,
    pub chat_user_id: Option<String>,
}

/// A validated registration. The password is still in plaintext here and
/// must be hashed before the account is stored.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
    pub email: String,
    pub link: String,
    pub password: String,
    pub status: AccountStatus,
    pub chat_user_id: String,
}

impl RegisterRequest {
    pub fn from_body(body: serde_json::Value) -> Result<Self, AccountError> {
        fields::parse_body(body).map_err(AccountError::Validation)
    }

    pub fn validate(self) -> Result<NewAccount, AccountError> {
        // Email and password are checked first so the error names them.
        let email = fields::required(self.email, "email").map_err(AccountError::Validation)?;
        let password = self
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AccountError::Validation("'password' is required".to_string()))?;

        Ok(NewAccount {
            first_name: fields::required(self.first_name, "firstName")
                .map_err(AccountError::Validation)?,
            last_name: fields::optional(self.last_name),
            username: fields::required(self.username, "username")
                .map_err(AccountError::Validation)?,
            email,
            link: fields::required(self.link, "link").map_err(AccountError::Validation)?,
            password: password.trim().to_string(),
            status: self.status.unwrap_or_default(),
            chat_user_id: fields::required(self.chat_user_id, "chatUserId")
                .map_err(AccountError::Validation)?,
        })
    }
}

/// Body of `PATCH /user/me`.
///
/// `status` is deliberately absent: accounts cannot reactivate themselves.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub link: Option<String>,
    pub chat_user_id: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

impl UpdateAccountRequest {
    pub fn from_body(body: serde_json::Value) -> Result<Self, AccountError> {
        fields::parse_body(body).map_err(AccountError::Validation)
    }
}

/// Body of `POST /user/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A login session. Only the SHA-256 hash of the bearer token is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token_hash: String,
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
