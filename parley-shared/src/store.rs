use async_trait::async_trait;

use crate::{error_chain_fmt, messages::Message};

///
/// Additional constraints for [`MessageStore::get_messages`].
///
/// No constraints exist yet, the default value selects the whole thread.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct GetMessagesFilter {}

///
/// Errors reported by a [`MessageStore`].
///
#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access the message storage")]
    Database(#[from] sqlx::Error),
    #[error("The message storage is unavailable: {0}")]
    Unavailable(String),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

///
/// Durable, append only storage of chat messages.
///
/// Every operation is scoped to an organization and a thread, identified by the content type id
/// and the object id.
///
#[async_trait]
pub trait MessageStore: Send + Sync {
    ///
    /// Persist a new message.
    ///
    /// The store assigns a unique, strictly increasing id and the creation time. The message is
    /// durable once this returns successfully.
    ///
    async fn create_message(
        &self,
        org_id: i64,
        content_type_id: i32,
        object_id: &str,
        user_id: i64,
        content: &str,
    ) -> Result<Message, StoreError>;

    ///
    /// Get all messages of a thread.
    ///
    /// The order of the returned messages is unspecified.
    ///
    async fn get_messages(
        &self,
        org_id: i64,
        content_type_id: i32,
        object_id: &str,
        filter: &GetMessagesFilter,
    ) -> Result<Vec<Message>, StoreError>;
}
