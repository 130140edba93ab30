//! Query parameter types for list endpoints.

use serde::Deserialize;

use memberlink_core::repository::account::AccountFilter;
use memberlink_types::account::AccountStatus;

use crate::http::error::AppError;

/// Query parameters for `GET /users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// `active` or `deactive`.
    pub status: Option<String>,
    pub username: Option<String>,
}

impl UserListQuery {
    pub fn into_filter(self) -> Result<AccountFilter, AppError> {
        let status = self
            .status
            .map(|s| s.parse::<AccountStatus>())
            .transpose()
            .map_err(AppError::Validation)?;
        Ok(AccountFilter {
            status,
            username: self.username,
        })
    }
}
