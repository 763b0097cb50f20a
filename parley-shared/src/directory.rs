use std::collections::HashMap;

use async_trait::async_trait;

use crate::{error_chain_fmt, users::UserSearchHit};

///
/// Filters that narrow down a [`SearchUsersQuery`].
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    /// Only users whose id is part of the list.
    Ids(Vec<i64>),
}

impl UserFilter {
    pub fn matches(&self, user: &UserSearchHit) -> bool {
        match self {
            UserFilter::Ids(ids) => ids.contains(&user.id),
        }
    }
}

///
/// Query for [`UserDirectory::search_users`].
///
/// `page` is zero based, `limit` is the page size. A `limit` of zero returns no users.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchUsersQuery {
    /// Free text matched against login, name and email. Empty matches everyone.
    pub query: String,
    pub filters: Vec<UserFilter>,
    pub page: i64,
    pub limit: i64,
}

impl SearchUsersQuery {
    ///
    /// Query for exactly the given ids, ignoring the free text filter.
    ///
    pub fn by_ids(ids: &[i64], limit: i64) -> Self {
        Self {
            query: String::new(),
            filters: vec![UserFilter::Ids(ids.to_vec())],
            page: 0,
            limit,
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.max(0).saturating_mul(self.limit.max(0))
    }

    ///
    /// Check the free text and every filter against a user.
    ///
    pub fn matches(&self, user: &UserSearchHit) -> bool {
        let text_matches = self.query.is_empty() || {
            let needle = self.query.to_lowercase();

            [&user.login, &user.name, &user.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        };

        text_matches && self.filters.iter().all(|filter| filter.matches(user))
    }
}

///
/// Errors reported by a [`UserDirectory`].
///
#[derive(thiserror::Error)]
pub enum DirectoryError {
    #[error("Failed to search the user directory")]
    Database(#[from] sqlx::Error),
    #[error("The user directory is unavailable: {0}")]
    Unavailable(String),
}

impl std::fmt::Debug for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

///
/// Lookup of user records by id and free text.
///
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn search_users(&self, query: &SearchUsersQuery)
        -> Result<Vec<UserSearchHit>, DirectoryError>;

    ///
    /// Resolve a set of user ids to their records, keyed by id.
    ///
    /// Ids that do not exist are missing from the result.
    ///
    async fn resolve_users(
        &self,
        ids: &[i64],
        limit: i64,
    ) -> Result<HashMap<i64, UserSearchHit>, DirectoryError> {
        let users = self
            .search_users(&SearchUsersQuery::by_ids(ids, limit))
            .await?;

        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}
