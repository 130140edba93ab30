//! SQLite account repository implementation.

use memberlink_core::repository::account::{AccountFilter, AccountRepository};
use memberlink_types::account::{Account, AccountId, AccountStatus};
use memberlink_types::error::RepositoryError;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::pool::DatabasePool;
use super::{format_datetime, map_write_error, parse_datetime};

/// SQLite-backed implementation of `AccountRepository`.
pub struct SqliteAccountRepository {
    pool: DatabasePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct AccountRow {
    id: String,
    first_name: String,
    last_name: Option<String>,
    username: String,
    email: String,
    link: String,
    chat_user_id: String,
    status: String,
    password_hash: String,
    created_at: String,
    updated_at: String,
}

impl AccountRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            link: row.try_get("link")?,
            chat_user_id: row.try_get("chat_user_id")?,
            status: row.try_get("status")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_account(self) -> Result<Account, RepositoryError> {
        let id = self
            .id
            .parse::<AccountId>()
            .map_err(|e| RepositoryError::Query(format!("invalid account id: {e}")))?;
        let status: AccountStatus = self.status.parse().map_err(RepositoryError::Query)?;

        Ok(Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            link: self.link,
            chat_user_id: self.chat_user_id,
            status,
            password_hash: self.password_hash,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn conflict_message(msg: &str) -> String {
    if msg.contains("accounts.email") {
        "email is already registered".to_string()
    } else if msg.contains("accounts.chat_user_id") {
        "chatUserId is already linked to another account".to_string()
    } else {
        "username is already taken".to_string()
    }
}

impl SqliteAccountRepository {
    async fn fetch_one_where(
        &self,
        column: &str,
        value: String,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT * FROM accounts WHERE {column} = ?"))
            .bind(value)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let account_row =
                    AccountRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(account_row.into_account()?))
            }
            None => Ok(None),
        }
    }
}

impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
        sqlx::query(
            "INSERT INTO accounts (id, first_name, last_name, username, email, link, chat_user_id, status, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(account.id.to_string())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.link)
        .bind(&account.chat_user_id)
        .bind(account.status.to_string())
        .bind(&account.password_hash)
        .bind(format_datetime(&account.created_at))
        .bind(format_datetime(&account.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| map_write_error(e, conflict_message))?;

        Ok(account.clone())
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        self.fetch_one_where("id", id.to_string()).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        self.fetch_one_where("email", email.to_string()).await
    }

    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM accounts WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(ref username) = filter.username {
            qb.push(" AND username = ").push_bind(username.as_str());
        }
        qb.push(" ORDER BY created_at ASC, id ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            let account_row =
                AccountRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            accounts.push(account_row.into_account()?);
        }
        Ok(accounts)
    }

    async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
        let result = sqlx::query(
            "UPDATE accounts SET first_name = ?, last_name = ?, username = ?, email = ?, link = ?, chat_user_id = ?, status = ?, password_hash = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.link)
        .bind(&account.chat_user_id)
        .bind(account.status.to_string())
        .bind(&account.password_hash)
        .bind(format_datetime(&account.updated_at))
        .bind(account.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| map_write_error(e, conflict_message))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) fn make_account(username: &str, status: AccountStatus) -> Account {
    let now = chrono::Utc::now();
    Account {
        id: AccountId::new(),
        first_name: "Test".to_string(),
        last_name: None,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        link: format!("https://example.com/{username}"),
        chat_user_id: format!("chat-{username}"),
        status,
        password_hash: "$argon2id$placeholder".to_string(),
        created_at: now,
        updated_at: now,
    }
}
