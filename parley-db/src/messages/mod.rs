pub mod models;
pub mod queries;

use async_trait::async_trait;
use parley_shared::{
    messages::Message,
    store::{GetMessagesFilter, MessageStore, StoreError},
};
use sqlx::PgPool;

///
/// [`MessageStore`] backed by the `chat_messages` table.
///
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create_message(
        &self,
        org_id: i64,
        content_type_id: i32,
        object_id: &str,
        user_id: i64,
        content: &str,
    ) -> Result<Message, StoreError> {
        let message = queries::insert_message(
            &self.pool,
            org_id,
            content_type_id,
            object_id,
            user_id,
            content,
        )
        .await?;

        Ok(message.into())
    }

    async fn get_messages(
        &self,
        org_id: i64,
        content_type_id: i32,
        object_id: &str,
        _filter: &GetMessagesFilter,
    ) -> Result<Vec<Message>, StoreError> {
        let messages =
            queries::get_messages_for_thread(&self.pool, org_id, content_type_id, object_id)
                .await?;

        Ok(messages.into_iter().map(Message::from).collect())
    }
}
