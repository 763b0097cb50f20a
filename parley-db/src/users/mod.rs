pub mod models;
pub mod queries;

use async_trait::async_trait;
use parley_shared::{
    directory::{DirectoryError, SearchUsersQuery, UserDirectory},
    users::UserSearchHit,
};
use sqlx::PgPool;

///
/// [`UserDirectory`] backed by the `users` table.
///
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn search_users(
        &self,
        query: &SearchUsersQuery,
    ) -> Result<Vec<UserSearchHit>, DirectoryError> {
        let users = queries::search_users(&self.pool, query).await?;

        Ok(users.into_iter().map(UserSearchHit::from).collect())
    }
}
