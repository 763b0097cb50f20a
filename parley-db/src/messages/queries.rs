use sqlx::PgPool;

use super::models::MessageModel;

#[tracing::instrument(
    name = "Get messages of a chat thread",
    skip(pool, object_id),
    fields(object_id = %object_id)
)]
pub async fn get_messages_for_thread(
    pool: &PgPool,
    org_id: i64,
    content_type_id: i32,
    object_id: &str,
) -> Result<Vec<MessageModel>, sqlx::Error> {
    sqlx::query_as::<_, MessageModel>(
        r#"
        SELECT id, org_id, content_type_id, object_id, user_id, content, created_at
        FROM chat_messages
        WHERE org_id = $1 AND content_type_id = $2 AND object_id = $3
        "#,
    )
    .bind(org_id)
    .bind(content_type_id)
    .bind(object_id)
    .fetch_all(pool)
    .await
}

#[tracing::instrument(
    name = "Saving a new chat message to the database",
    skip(pool, object_id, content),
    fields(object_id = %object_id)
)]
pub async fn insert_message(
    pool: &PgPool,
    org_id: i64,
    content_type_id: i32,
    object_id: &str,
    user_id: i64,
    content: &str,
) -> Result<MessageModel, sqlx::Error> {
    sqlx::query_as::<_, MessageModel>(
        r#"
        INSERT INTO chat_messages (org_id, content_type_id, object_id, user_id, content)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, org_id, content_type_id, object_id, user_id, content, created_at
        "#,
    )
    .bind(org_id)
    .bind(content_type_id)
    .bind(object_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await
}
