use serde::{Deserialize, Serialize};

///
/// Events exchanged between application instances through the message broker.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrokerEvent {
    /// Deliver `data` to the live subscribers of `channel`.
    Broadcast {
        channel: String,
        data: serde_json::Value,
    },
}
