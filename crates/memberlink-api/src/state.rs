//! Application state wiring all services together.
//!
//! Services are generic over repository and credential traits; AppState pins
//! them to the concrete infra implementations and shares one member
//! directory cache between the HTTP handlers and the chat relay.

use std::path::PathBuf;
use std::sync::Arc;

use memberlink_core::cache::MemberDirectoryCache;
use memberlink_core::relay::ChatRelay;
use memberlink_core::service::account::AccountService;
use memberlink_core::service::lookup::MemberLookupService;
use memberlink_core::service::member::MemberWriteService;
use memberlink_infra::config::{load_global_config, resolve_data_dir};
use memberlink_infra::crypto::password::Argon2PasswordHasher;
use memberlink_infra::crypto::token::Sha256TokenIssuer;
use memberlink_infra::sqlite::account::SqliteAccountRepository;
use memberlink_infra::sqlite::member::SqliteMemberRepository;
use memberlink_infra::sqlite::pool::{DatabasePool, database_url};
use memberlink_infra::sqlite::session::SqliteSessionRepository;
use memberlink_infra::telegram::TelegramGateway;
use memberlink_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteLookupService = MemberLookupService<SqliteMemberRepository>;

pub type ConcreteWriteService = MemberWriteService<SqliteMemberRepository>;

pub type ConcreteAccountService = AccountService<
    SqliteAccountRepository,
    SqliteSessionRepository,
    SqliteMemberRepository,
    Argon2PasswordHasher,
    Sha256TokenIssuer,
>;

pub type ConcreteChatRelay =
    ChatRelay<SqliteMemberRepository, SqliteAccountRepository, TelegramGateway>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub member_lookup: ConcreteLookupService,
    pub member_writer: Arc<ConcreteWriteService>,
    pub account_service: Arc<ConcreteAccountService>,
    pub accounts: Arc<SqliteAccountRepository>,
    pub cache: Arc<MemberDirectoryCache>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, and open the database.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        let config = load_global_config(&data_dir).await;
        Self::open(data_dir, config).await
    }

    /// Open the database under `data_dir` and wire every service.
    pub async fn open(data_dir: PathBuf, config: GlobalConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let members = Arc::new(SqliteMemberRepository::new(db_pool.clone()));
        let accounts = Arc::new(SqliteAccountRepository::new(db_pool.clone()));
        let cache = Arc::new(MemberDirectoryCache::new(config.cache.max_owners));

        let member_lookup = MemberLookupService::new(Arc::clone(&members), Arc::clone(&cache));
        let member_writer = Arc::new(MemberWriteService::new(
            Arc::clone(&members),
            Arc::clone(&cache),
        ));
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            SqliteSessionRepository::new(db_pool),
            members,
            Arc::clone(&cache),
            Argon2PasswordHasher::new(),
            Sha256TokenIssuer::new(),
        ));

        if config.cache.warm_on_start {
            if let Err(e) = member_writer.warm_cache().await {
                tracing::warn!(error = %e, "could not warm member directory cache");
            }
        }

        Ok(Self {
            member_lookup,
            member_writer,
            account_service,
            accounts,
            cache,
            config: Arc::new(config),
            data_dir,
        })
    }

    /// Build the chat relay on top of this state's lookup service and cache.
    pub fn chat_relay(&self, gateway: TelegramGateway) -> ConcreteChatRelay {
        ChatRelay::new(
            self.member_lookup.clone(),
            Arc::clone(&self.accounts),
            Arc::new(gateway),
            self.config.relay.greetings.clone(),
        )
    }
}
