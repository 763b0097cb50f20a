use chrono::{DateTime, Utc};
use parley_shared::messages::Message;

#[derive(Debug, sqlx::FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub org_id: i64,
    pub content_type_id: i32,
    pub object_id: String,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageModel> for Message {
    fn from(val: MessageModel) -> Self {
        Self {
            id: val.id,
            org_id: val.org_id,
            content_type_id: val.content_type_id,
            object_id: val.object_id,
            user_id: val.user_id,
            content: val.content,
            created_at: val.created_at,
        }
    }
}

///
/// Provides a validated message content.
///
/// The content is stored verbatim, only its length is restricted.
///
#[derive(Debug)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn parse(value: String) -> Result<MessageContent, String> {
        if validator::validate_length(&value, Some(1), Some(1000), None) {
            Ok(Self(value))
        } else {
            Err(format!("{} is not a valid message content!", value))
        }
    }
}

impl MessageContent {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for MessageContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

///
/// Provides a validated id of the object a chat thread is attached to.
///
#[derive(Debug)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn parse(value: String) -> Result<ObjectId, String> {
        if validator::validate_length(&value, Some(1), Some(40), None) {
            Ok(Self(value))
        } else {
            Err(format!("{} is not a valid object id!", value))
        }
    }
}

impl ObjectId {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

///
/// Provides a validated content type id.
///
#[derive(Debug, Clone, Copy)]
pub struct ContentTypeId(i32);

impl ContentTypeId {
    pub fn parse(value: i32) -> Result<ContentTypeId, String> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(format!("{} is not a valid content type id!", value))
        }
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}
