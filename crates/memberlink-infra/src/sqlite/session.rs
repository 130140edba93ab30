//! SQLite session repository implementation.

use memberlink_core::repository::session::SessionRepository;
use memberlink_types::account::{AccountId, Session};
use memberlink_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, account_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token_hash)
        .bind(session.account_id.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.expires_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let get = |col: &str| -> Result<String, RepositoryError> {
            row.try_get(col)
                .map_err(|e| RepositoryError::Query(e.to_string()))
        };

        Ok(Some(Session {
            token_hash: get("token_hash")?,
            account_id: get("account_id")?
                .parse::<AccountId>()
                .map_err(|e| RepositoryError::Query(format!("invalid account id: {e}")))?,
            created_at: parse_datetime(&get("created_at")?)?,
            expires_at: parse_datetime(&get("expires_at")?)?,
        }))
    }

    async fn delete_for_account(&self, account_id: &AccountId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE account_id = ?")
            .bind(account_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::account::{SqliteAccountRepository, make_account};
    use crate::sqlite::pool::test_pool;
    use chrono::{Duration, Utc};
    use memberlink_core::repository::account::AccountRepository;
    use memberlink_types::account::AccountStatus;

    #[tokio::test]
    async fn test_session_roundtrip_and_delete() {
        let (pool, _dir) = test_pool().await;
        let accounts = SqliteAccountRepository::new(pool.clone());
        let sessions = SqliteSessionRepository::new(pool);

        let account = make_account("ada", AccountStatus::Active);
        accounts.create(&account).await.unwrap();

        let now = Utc::now();
        let session = Session {
            token_hash: "abc123".to_string(),
            account_id: account.id.clone(),
            created_at: now,
            expires_at: now + Duration::days(3),
        };
        sessions.create(&session).await.unwrap();

        let stored = sessions.get_by_token_hash("abc123").await.unwrap().unwrap();
        assert_eq!(stored.account_id, account.id);
        assert!(!stored.is_expired(now));
        assert!(sessions.get_by_token_hash("other").await.unwrap().is_none());

        assert_eq!(sessions.delete_for_account(&account.id).await.unwrap(), 1);
        assert!(sessions.get_by_token_hash("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_requires_existing_account() {
        let (pool, _dir) = test_pool().await;
        let sessions = SqliteSessionRepository::new(pool);
        let now = Utc::now();
        let orphan = Session {
            token_hash: "orphan".to_string(),
            account_id: AccountId::new(),
            created_at: now,
            expires_at: now,
        };
        assert!(sessions.create(&orphan).await.is_err());
    }
}
