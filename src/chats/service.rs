use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use parley_shared::{
    directory::{DirectoryError, UserDirectory},
    error_chain_fmt,
    live::{chat_channel, EventPublisher, PublishError},
    messages::{ChatEvent, Message, MessageDto},
    store::{GetMessagesFilter, MessageStore, StoreError},
    users::UserSearchHit,
};

#[derive(Debug, Clone)]
pub struct SendMessageCmd {
    pub content_type_id: i32,
    pub object_id: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct GetMessagesCmd {
    pub content_type_id: i32,
    pub object_id: String,
}

#[derive(thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("Author {user_id} was not found in the user directory")]
    AuthorNotFound { user_id: i64 },
}

impl std::fmt::Debug for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

///
/// Map a message to its response model, attaching the author from `authors`.
///
/// Fails with [`ChatError::AuthorNotFound`] if the message has an author that is not part of `authors`.
///
pub fn message_to_dto(
    message: &Message,
    authors: &HashMap<i64, UserSearchHit>,
) -> Result<MessageDto, ChatError> {
    if message.has_author() == false {
        return Ok(message.to_dto(None));
    }

    let author = authors
        .get(&message.user_id)
        .ok_or(ChatError::AuthorNotFound {
            user_id: message.user_id,
        })?;

    Ok(message.to_dto(Some(author.into())))
}

pub fn messages_to_dto(
    messages: &[Message],
    authors: &HashMap<i64, UserSearchHit>,
) -> Result<Vec<MessageDto>, ChatError> {
    messages
        .iter()
        .map(|message| message_to_dto(message, authors))
        .collect()
}

///
/// Stores chat messages, enriches them with their authors and broadcasts new messages to the
/// live subscribers of their thread.
///
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            directory,
            publisher,
        }
    }

    ///
    /// Store a new message and broadcast it on the channel of its thread.
    ///
    /// The message is queryable once this returns successfully. Broadcasting is best effort and
    /// never fails the call.
    ///
    #[tracing::instrument(
        name = "Store and broadcast a chat message",
        skip(self, cmd),
        fields(content_type_id = cmd.content_type_id, object_id = %cmd.object_id)
    )]
    pub async fn send_message(
        &self,
        org_id: i64,
        user_id: i64,
        cmd: SendMessageCmd,
    ) -> Result<MessageDto, ChatError> {
        let authors = if user_id > 0 {
            let authors = self.directory.resolve_users(&[user_id], 1).await?;

            // Refuse to store a message whose author could never be displayed
            if authors.contains_key(&user_id) == false {
                return Err(ChatError::AuthorNotFound { user_id });
            }

            authors
        } else {
            HashMap::new()
        };

        let message = self
            .store
            .create_message(
                org_id,
                cmd.content_type_id,
                &cmd.object_id,
                user_id,
                &cmd.content,
            )
            .await?;

        let message = message_to_dto(&message, &authors)?;

        self.broadcast(
            &chat_channel(org_id, cmd.content_type_id, &cmd.object_id),
            &ChatEvent::message_created(message.clone()),
        );

        Ok(message)
    }

    ///
    /// Get all messages of a thread, ordered by id.
    ///
    #[tracing::instrument(
        name = "Get the messages of a chat thread",
        skip(self, cmd),
        fields(content_type_id = cmd.content_type_id, object_id = %cmd.object_id)
    )]
    pub async fn get_messages(
        &self,
        org_id: i64,
        user_id: i64,
        cmd: GetMessagesCmd,
    ) -> Result<Vec<MessageDto>, ChatError> {
        let messages = self
            .store
            .get_messages(
                org_id,
                cmd.content_type_id,
                &cmd.object_id,
                &GetMessagesFilter::default(),
            )
            .await?;

        let author_ids: Vec<i64> = messages
            .iter()
            .filter(|message| message.has_author())
            .map(|message| message.user_id)
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .collect();

        let authors = self
            .directory
            .resolve_users(&author_ids, author_ids.len() as i64)
            .await?;

        let mut result = messages_to_dto(&messages, &authors)?;
        result.sort_by_key(|message| message.id);

        Ok(result)
    }

    ///
    /// Publish an event without waiting for its delivery.
    ///
    /// Failures are logged and discarded.
    ///
    fn broadcast(&self, channel: &str, event: &ChatEvent) {
        let result = serde_json::to_vec(event)
            .map_err(PublishError::from)
            .and_then(|data| self.publisher.publish(channel, &data));

        if let Err(error) = result {
            tracing::warn!(error = ?error, channel = %channel, "Failed to publish chat event");
        }
    }
}
