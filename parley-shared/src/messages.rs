use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

///
/// A chat message as it is persisted by a [`crate::store::MessageStore`].
///
/// Messages belong to a thread, which is identified by the organization together with
/// the content type id and the object id.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub org_id: i64,
    pub content_type_id: i32,
    pub object_id: String,
    /// Author of the message, `0` for messages without an author.
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn has_author(&self) -> bool {
        self.user_id > 0
    }

    pub fn to_dto(&self, user: Option<MessageUser>) -> MessageDto {
        MessageDto {
            id: self.id,
            content_type_id: self.content_type_id,
            object_id: self.object_id.to_owned(),
            user_id: self.user_id,
            content: self.content.to_owned(),
            created: self.created_at.timestamp(),
            user,
        }
    }
}

///
/// Model for messages that can be used for responses and live events.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub content_type_id: i32,
    pub object_id: String,
    pub user_id: i64,
    pub content: String,
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MessageUser>,
}

///
/// Author information attached to a [`MessageDto`].
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUser {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub email: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatEventType {
    #[serde(rename = "message-created")]
    MessageCreated,
}

///
/// Envelope for live events published on a chat channel.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    pub event: ChatEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_created: Option<MessageDto>,
}

impl ChatEvent {
    pub fn message_created(message: MessageDto) -> Self {
        Self {
            event: ChatEventType::MessageCreated,
            message_created: Some(message),
        }
    }
}
