//! Account and session management.
//!
//! Registration, password login with opaque bearer tokens, profile updates,
//! and account removal. Removing an account also removes its sessions, its
//! members, and its member directory slot.

use std::sync::Arc;

use chrono::{Duration, Utc};
use memberlink_types::account::{
    Account, AccountId, LoginRequest, RegisterRequest, Session, UpdateAccountRequest,
};
use memberlink_types::error::AccountError;
use memberlink_types::fields;

use crate::cache::MemberDirectoryCache;
use crate::repository::account::{AccountFilter, AccountRepository};
use crate::repository::member::{MemberFilter, MemberRepository};
use crate::repository::session::SessionRepository;
use crate::service::credentials::{PasswordHasher, TokenIssuer};

/// How long a login session stays valid.
pub const SESSION_TTL_DAYS: i64 = 3;

/// Reject deactivated accounts.
pub fn require_active(account: Account) -> Result<Account, AccountError> {
    if account.is_active() {
        Ok(account)
    } else {
        Err(AccountError::Unauthorized)
    }
}

/// Service orchestrating the account lifecycle.
pub struct AccountService<A, S, M, P, T>
where
    A: AccountRepository,
    S: SessionRepository,
    M: MemberRepository,
    P: PasswordHasher,
    T: TokenIssuer,
{
    accounts: Arc<A>,
    sessions: S,
    members: Arc<M>,
    cache: Arc<MemberDirectoryCache>,
    hasher: P,
    tokens: T,
}

impl<A, S, M, P, T> AccountService<A, S, M, P, T>
where
    A: AccountRepository,
    S: SessionRepository,
    M: MemberRepository,
    P: PasswordHasher,
    T: TokenIssuer,
{
    pub fn new(
        accounts: Arc<A>,
        sessions: S,
        members: Arc<M>,
        cache: Arc<MemberDirectoryCache>,
        hasher: P,
        tokens: T,
    ) -> Self {
        Self {
            accounts,
            sessions,
            members,
            cache,
            hasher,
            tokens,
        }
    }

    /// Register a new account from a raw JSON body.
    pub async fn register(&self, body: serde_json::Value) -> Result<Account, AccountError> {
        let new_account = RegisterRequest::from_body(body)?.validate()?;
        let password_hash = self
            .hasher
            .hash_password(&new_account.password)
            .map_err(AccountError::StorageError)?;

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            first_name: new_account.first_name,
            last_name: new_account.last_name,
            username: new_account.username,
            email: new_account.email,
            link: new_account.link,
            chat_user_id: new_account.chat_user_id,
            status: new_account.status,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let account = self.accounts.create(&account).await?;
        tracing::info!(account_id = %account.id, username = %account.username, "account registered");
        Ok(account)
    }

    /// Check credentials and open a session.
    ///
    /// Returns the account and the plaintext token. Only the token's hash is
    /// stored. Unknown email and wrong password are indistinguishable.
    pub async fn login(&self, request: LoginRequest) -> Result<(Account, String), AccountError> {
        let email = fields::required(request.email, "email").map_err(AccountError::Validation)?;
        let password =
            fields::required(request.password, "password").map_err(AccountError::Validation)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;
        if !self.hasher.verify_password(&password, &account.password_hash) {
            tracing::debug!(account_id = %account.id, "login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.generate_token();
        let now = Utc::now();
        let session = Session {
            token_hash: self.tokens.hash_token(&token),
            account_id: account.id.clone(),
            created_at: now,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
        };
        self.sessions.create(&session).await?;

        tracing::info!(account_id = %account.id, "session opened");
        Ok((account, token))
    }

    /// Resolve a bearer token to its account, whatever the account status.
    ///
    /// Unknown or expired tokens and deleted accounts yield
    /// `AccountError::Unauthorized`. Use [`require_active`] for endpoints
    /// closed to deactivated accounts.
    pub async fn authenticate(&self, token: &str) -> Result<Account, AccountError> {
        let token_hash = self.tokens.hash_token(token);
        let session = self
            .sessions
            .get_by_token_hash(&token_hash)
            .await?
            .ok_or(AccountError::Unauthorized)?;
        if session.is_expired(Utc::now()) {
            return Err(AccountError::Unauthorized);
        }

        self.accounts
            .get_by_id(&session.account_id)
            .await?
            .ok_or(AccountError::Unauthorized)
    }

    /// Apply a partial profile update to the caller's own account.
    ///
    /// Changing the password requires both `oldPassword` and `newPassword`.
    pub async fn update_own(
        &self,
        caller: &Account,
        body: serde_json::Value,
    ) -> Result<Account, AccountError> {
        let request = UpdateAccountRequest::from_body(body)?;
        let mut account = caller.clone();

        if let Some(first_name) = fields::optional(request.first_name) {
            account.first_name = first_name;
        }
        if let Some(last_name) = fields::optional(request.last_name) {
            account.last_name = Some(last_name);
        }
        if let Some(username) = fields::optional(request.username) {
            account.username = username;
        }
        if let Some(email) = fields::optional(request.email) {
            account.email = email;
        }
        if let Some(link) = fields::optional(request.link) {
            account.link = link;
        }
        if let Some(chat_user_id) = fields::optional(request.chat_user_id) {
            account.chat_user_id = chat_user_id;
        }

        match (request.old_password, request.new_password) {
            (None, None) => {}
            (Some(old), Some(new)) if !new.trim().is_empty() => {
                if !self.hasher.verify_password(&old, &caller.password_hash) {
                    return Err(AccountError::InvalidCredentials);
                }
                account.password_hash = self
                    .hasher
                    .hash_password(new.trim())
                    .map_err(AccountError::StorageError)?;
            }
            _ => {
                return Err(AccountError::Validation(
                    "'oldPassword' and 'newPassword' are both required to change the password"
                        .to_string(),
                ));
            }
        }

        account.updated_at = Utc::now();
        let account = self.accounts.update(&account).await?;
        tracing::info!(account_id = %account.id, "account updated");
        Ok(account)
    }

    pub async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.accounts
            .get_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, AccountError> {
        Ok(self.accounts.list(filter).await?)
    }

    /// Delete the caller's own account together with its sessions and
    /// members. Deleting anyone else's account is `NotFound`.
    pub async fn delete_account(
        &self,
        caller: &Account,
        id: &AccountId,
    ) -> Result<(), AccountError> {
        if &caller.id != id {
            return Err(AccountError::NotFound);
        }

        let members = self.members.list(&MemberFilter::owned_by(id.clone())).await?;
        for member in &members {
            self.members.delete(&member.id).await?;
        }
        self.cache.invalidate(id);

        let sessions = self.sessions.delete_for_account(id).await?;
        if !self.accounts.delete(id).await? {
            return Err(AccountError::NotFound);
        }

        tracing::info!(
            account_id = %id,
            members = members.len(),
            sessions,
            "account deleted"
        );
        Ok(())
    }
}
