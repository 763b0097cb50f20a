use parley_shared::directory::{SearchUsersQuery, UserFilter};
use sqlx::PgPool;

use super::models::UserModel;

///
/// Intersect all id filters of a query.
///
/// Returns `None` if the query is not restricted to a set of ids.
///
pub fn restricted_ids(query: &SearchUsersQuery) -> Option<Vec<i64>> {
    query.filters.iter().fold(None, |ids, filter| match filter {
        UserFilter::Ids(filter_ids) => Some(match ids {
            None => filter_ids.clone(),
            Some(ids) => ids
                .into_iter()
                .filter(|id| filter_ids.contains(id))
                .collect(),
        }),
    })
}

#[tracing::instrument(name = "Search users", skip(pool))]
pub async fn search_users(
    pool: &PgPool,
    query: &SearchUsersQuery,
) -> Result<Vec<UserModel>, sqlx::Error> {
    let pattern = format!("%{}%", query.query.to_lowercase());

    sqlx::query_as::<_, UserModel>(
        r#"
        SELECT id, name, login, email
        FROM users
        WHERE ($1 = '' OR LOWER(login) LIKE $2 OR LOWER(name) LIKE $2 OR LOWER(email) LIKE $2)
          AND ($3::BIGINT[] IS NULL OR id = ANY($3))
        ORDER BY login ASC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(&query.query)
    .bind(pattern)
    .bind(restricted_ids(query))
    .bind(query.limit.max(0))
    .bind(query.offset())
    .fetch_all(pool)
    .await
}
