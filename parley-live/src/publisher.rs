use actix::Addr;
use parley_shared::live::{EventPublisher, PublishError};

use crate::{messages::Publish, LiveServer};

///
/// [`EventPublisher`] handing events to the [`LiveServer`] of this process.
///
#[derive(Clone)]
pub struct LivePublisher {
    server: Addr<LiveServer>,
}

impl LivePublisher {
    pub fn new(server: Addr<LiveServer>) -> Self {
        Self { server }
    }
}

impl EventPublisher for LivePublisher {
    fn publish(&self, channel: &str, data: &[u8]) -> Result<(), PublishError> {
        let data: serde_json::Value = serde_json::from_slice(data)?;

        if self.server.connected() == false {
            return Err(PublishError::Unavailable(
                "live server is not running".to_string(),
            ));
        }

        self.server.do_send(Publish::new(channel.to_string(), data));

        Ok(())
    }
}
