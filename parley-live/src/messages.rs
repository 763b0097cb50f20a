use actix::Recipient;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

///
/// These messages are sent and received via the live websocket.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum LiveMessage {
    /// Sent periodically from the client, the server has to respond with a [`LiveMessage::Pong`].
    Ping,
    /// Sent as a response to a [`LiveMessage::Ping`] message.
    Pong,
    /// Sent from the client to start receiving the events of a channel.
    Subscribe { channel: String },
    /// Sent from the client to stop receiving the events of a channel.
    Unsubscribe { channel: String },
    /// Sent to the client once it is subscribed to a channel.
    Subscribed { channel: String },
    /// Sent to the client once it is unsubscribed from a channel.
    Unsubscribed { channel: String },
    /// Sent to the client for every event published on a subscribed channel.
    Event {
        channel: String,
        data: serde_json::Value,
    },
    /// Sent to the client if one of its requests was rejected.
    Error { message: String },
}

///
/// Event delivered from the [`crate::LiveServer`] to a subscribed session.
///
#[derive(Debug, Clone, actix::prelude::Message)]
#[rtype(result = "()")]
pub struct LiveEvent {
    pub channel: String,
    pub data: serde_json::Value,
}

///
/// Message to register a session with the live server.
///
#[derive(Debug, actix::prelude::Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub session_id: Uuid,
    pub addr: Recipient<LiveEvent>,
}

///
/// Message to notify the live server about a closed session.
///
#[derive(Debug, actix::prelude::Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub session_id: Uuid,
}

impl Disconnect {
    pub fn new(session_id: Uuid) -> Self {
        Self { session_id }
    }
}

///
/// Message to add a session to the subscribers of a channel.
///
#[derive(Debug, actix::prelude::Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub session_id: Uuid,
    pub channel: String,
}

///
/// Message to remove a session from the subscribers of a channel.
///
#[derive(Debug, actix::prelude::Message)]
#[rtype(result = "()")]
pub struct Unsubscribe {
    pub session_id: Uuid,
    pub channel: String,
}

///
/// Message to deliver data to every subscriber of a channel.
///
/// Responds with the number of sessions the event was handed to.
///
#[derive(Debug, Clone, actix::prelude::Message)]
#[rtype(result = "usize")]
pub struct Publish {
    pub channel: String,
    pub data: serde_json::Value,
}

impl Publish {
    pub fn new(channel: String, data: serde_json::Value) -> Self {
        Self { channel, data }
    }
}
