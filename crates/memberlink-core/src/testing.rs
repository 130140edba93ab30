//! In-memory fakes shared by the service and relay tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use memberlink_types::account::{Account, AccountId, AccountStatus, Session};
use memberlink_types::chat::{ChannelId, ChatUserId};
use memberlink_types::error::{ChatError, RepositoryError};
use memberlink_types::member::{Member, MemberId};

use crate::relay::gateway::ChatGateway;
use crate::repository::account::{AccountFilter, AccountRepository};
use crate::repository::member::{MemberFilter, MemberRepository};
use crate::repository::session::SessionRepository;
use crate::service::credentials::{PasswordHasher, TokenIssuer};

#[derive(Default)]
pub struct InMemoryMemberRepository {
    members: Mutex<Vec<Member>>,
    pub fail_reads: AtomicBool,
    pub list_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
}

impl InMemoryMemberRepository {
    pub fn with_members(members: Vec<Member>) -> Self {
        let repo = Self::default();
        *repo.members.lock().unwrap() = members;
        repo
    }

    pub fn len(&self) -> usize {
        self.members.lock().unwrap().len()
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(RepositoryError::Query("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl MemberRepository for InMemoryMemberRepository {
    async fn create(&self, member: &Member) -> Result<Member, RepositoryError> {
        let mut members = self.members.lock().unwrap();
        if members.iter().any(|m| m.username == member.username) {
            return Err(RepositoryError::Conflict(format!(
                "username '{}' is already registered",
                member.username
            )));
        }
        if members
            .iter()
            .any(|m| m.external_user_id == member.external_user_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "externalUserId '{}' is already registered",
                member.external_user_id
            )));
        }
        members.push(member.clone());
        Ok(member.clone())
    }

    async fn find(&self, filter: &MemberFilter) -> Result<Option<Member>, RepositoryError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        let members = self.members.lock().unwrap();
        Ok(members.iter().find(|m| filter.matches(m)).cloned())
    }

    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        let members = self.members.lock().unwrap();
        Ok(members.iter().filter(|m| filter.matches(m)).cloned().collect())
    }

    async fn delete(&self, id: &MemberId) -> Result<bool, RepositoryError> {
        let mut members = self.members.lock().unwrap();
        let before = members.len();
        members.retain(|m| &m.id != id);
        Ok(members.len() != before)
    }
}

/// Username, email and chat user id are unique among other accounts.
fn check_account_unique(existing: &[Account], account: &Account) -> Result<(), RepositoryError> {
    let others = existing.iter().filter(|a| a.id != account.id);
    for other in others {
        let field = if other.email == account.email {
            "email"
        } else if other.username == account.username {
            "username"
        } else if other.chat_user_id == account.chat_user_id {
            "chatUserId"
        } else {
            continue;
        };
        return Err(RepositoryError::Conflict(format!("{field} is already taken")));
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<Vec<Account>>,
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        check_account_unique(&accounts, account)?;
        accounts.push(account.clone());
        Ok(account.clone())
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| &a.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, RepositoryError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .filter(|a| filter.username.as_deref().is_none_or(|u| a.username == u))
            .cloned()
            .collect())
    }

    async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        check_account_unique(&accounts, account)?;
        let slot = accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = account.clone();
        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, RepositoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| &a.id != id);
        Ok(accounts.len() != before)
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<Vec<Session>>,
}

impl InMemorySessionRepository {
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, RepositoryError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.iter().find(|s| s.token_hash == token_hash).cloned())
    }

    async fn delete_for_account(&self, account_id: &AccountId) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| &s.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }
}

/// Reversible "hash" so tests can assert on stored values.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String, String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash == format!("hashed:{password}")
    }
}

/// Issues `token-0`, `token-1`, ...
#[derive(Default)]
pub struct CountingTokens {
    next: AtomicUsize,
}

impl TokenIssuer for CountingTokens {
    fn generate_token(&self) -> String {
        format!("token-{}", self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn hash_token(&self, token: &str) -> String {
        format!("sha:{token}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Direct(String, String),
    Channel(String, String),
}

/// Records every outbound message instead of sending it.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
    pub fail: AtomicBool,
}

impl RecordingGateway {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) -> Result<(), ChatError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChatError::Transport("gateway offline".to_string()));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

impl ChatGateway for RecordingGateway {
    async fn send_direct_message(&self, recipient: &ChatUserId, text: &str) -> Result<(), ChatError> {
        self.record(Sent::Direct(recipient.0.clone(), text.to_string()))
    }

    async fn send_to_channel(&self, channel: &ChannelId, text: &str) -> Result<(), ChatError> {
        self.record(Sent::Channel(channel.0.clone(), text.to_string()))
    }
}

/// An active account with the given chat id.
pub fn active_account(username: &str, chat_user_id: &str) -> Account {
    let now = chrono::Utc::now();
    Account {
        id: AccountId::new(),
        first_name: username.to_string(),
        last_name: None,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        link: format!("https://example.com/{username}"),
        chat_user_id: chat_user_id.to_string(),
        status: AccountStatus::Active,
        password_hash: "hashed:secret".to_string(),
        created_at: now,
        updated_at: now,
    }
}
