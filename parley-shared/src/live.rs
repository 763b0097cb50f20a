use crate::error_chain_fmt;

/// Namespace of all chat channels.
pub const CHAT_NAMESPACE: &str = "parley/chat";

///
/// Get the live channel of a chat thread.
///
pub fn chat_channel(org_id: i64, content_type_id: i32, object_id: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        CHAT_NAMESPACE, org_id, content_type_id, object_id
    )
}

///
/// Get the prefix shared by all chat channels of an organization.
///
pub fn org_channel_prefix(org_id: i64) -> String {
    format!("{}/{}/", CHAT_NAMESPACE, org_id)
}

///
/// Errors reported by an [`EventPublisher`].
///
#[derive(thiserror::Error)]
pub enum PublishError {
    #[error("Event payload is not valid JSON")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("Event publisher is unavailable: {0}")]
    Unavailable(String),
}

impl std::fmt::Debug for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

///
/// Topic based publishing of live events.
///
/// Publishing only hands the event over for delivery and must not block.
/// Delivery is best effort, subscribers are not tracked by the publisher.
///
pub trait EventPublisher: Send + Sync {
    fn publish(&self, channel: &str, data: &[u8]) -> Result<(), PublishError>;
}
