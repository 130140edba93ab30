//! SQLite member repository implementation.
//!
//! Implements `MemberRepository` from `memberlink-core`. Filters are built
//! with bound parameters; only set filter fields become WHERE clauses.

use memberlink_core::repository::member::{MemberFilter, MemberRepository};
use memberlink_types::error::RepositoryError;
use memberlink_types::member::{Member, MemberId};
use sqlx::{QueryBuilder, Row, Sqlite};

use super::pool::DatabasePool;
use super::{format_datetime, map_write_error, parse_datetime};

/// SQLite-backed implementation of `MemberRepository`.
pub struct SqliteMemberRepository {
    pool: DatabasePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Member.
struct MemberRow {
    id: String,
    name: String,
    username: String,
    external_user_id: String,
    owner_account_id: String,
    created_at: String,
    updated_at: String,
}

impl MemberRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            username: row.try_get("username")?,
            external_user_id: row.try_get("external_user_id")?,
            owner_account_id: row.try_get("owner_account_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_member(self) -> Result<Member, RepositoryError> {
        Ok(Member {
            id: self
                .id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid member id: {e}")))?,
            name: self.name,
            username: self.username,
            external_user_id: self.external_user_id,
            owner_account_id: self
                .owner_account_id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid owner id: {e}")))?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn select_filtered<'a>(filter: &'a MemberFilter) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT * FROM members WHERE 1 = 1");
    if let Some(ref id) = filter.id {
        qb.push(" AND id = ").push_bind(id.to_string());
    }
    if let Some(ref ext) = filter.external_user_id {
        qb.push(" AND external_user_id = ").push_bind(ext.as_str());
    }
    if let Some(ref username) = filter.username {
        qb.push(" AND username = ").push_bind(username.as_str());
    }
    if let Some(ref owner) = filter.owner_account_id {
        qb.push(" AND owner_account_id = ").push_bind(owner.to_string());
    }
    qb.push(" ORDER BY created_at ASC, id ASC");
    qb
}

impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, member: &Member) -> Result<Member, RepositoryError> {
        sqlx::query(
            "INSERT INTO members (id, name, username, external_user_id, owner_account_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(member.id.to_string())
        .bind(&member.name)
        .bind(&member.username)
        .bind(&member.external_user_id)
        .bind(member.owner_account_id.to_string())
        .bind(format_datetime(&member.created_at))
        .bind(format_datetime(&member.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            map_write_error(e, |msg| {
                if msg.contains("members.external_user_id") {
                    format!(
                        "externalUserId '{}' is already registered",
                        member.external_user_id
                    )
                } else {
                    format!("username '{}' is already registered", member.username)
                }
            })
        })?;

        Ok(member.clone())
    }

    async fn find(&self, filter: &MemberFilter) -> Result<Option<Member>, RepositoryError> {
        let mut qb = select_filtered(filter);
        qb.push(" LIMIT 1");
        let row = qb
            .build()
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let member_row =
                    MemberRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(member_row.into_member()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>, RepositoryError> {
        let rows = select_filtered(filter)
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut members = Vec::with_capacity(rows.len());
        for row in &rows {
            let member_row =
                MemberRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            members.push(member_row.into_member()?);
        }
        Ok(members)
    }

    async fn delete(&self, id: &MemberId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
