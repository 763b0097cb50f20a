use std::collections::{HashMap, HashSet};

use actix::{Actor, Context, Handler, Recipient};
use uuid::Uuid;

use super::messages::{Connect, Disconnect, LiveEvent, Publish, Subscribe, Unsubscribe};

///
/// Manages all [`crate::LiveSession`]s and fans published events out to the subscribers of a channel.
///
/// Delivery is fire and forget: events are put into the mailbox of every subscribed session and
/// dropped for sessions that are gone.
///
#[derive(Default)]
pub struct LiveServer {
    sessions: HashMap<Uuid, Recipient<LiveEvent>>,
    channels: HashMap<String, HashSet<Uuid>>,
}

impl LiveServer {
    fn subscribe(&mut self, session_id: Uuid, channel: String) {
        if self.sessions.contains_key(&session_id) == false {
            return;
        }

        self.channels.entry(channel).or_default().insert(session_id);
    }

    fn unsubscribe(&mut self, session_id: Uuid, channel: &str) {
        if let Some(subscribers) = self.channels.get_mut(channel) {
            subscribers.remove(&session_id);

            if subscribers.is_empty() {
                self.channels.remove(channel);
            }
        }
    }

    fn disconnect(&mut self, session_id: Uuid) {
        self.sessions.remove(&session_id);

        // Forget the session in every channel and drop channels nobody listens to anymore
        self.channels.retain(|_, subscribers| {
            subscribers.remove(&session_id);

            subscribers.is_empty() == false
        });
    }

    fn publish(&self, channel: String, data: serde_json::Value) -> usize {
        let subscribers = match self.channels.get(&channel) {
            Some(subscribers) => subscribers,
            None => return 0,
        };

        let recipients: Vec<&Recipient<LiveEvent>> = subscribers
            .iter()
            .filter_map(|session_id| self.sessions.get(session_id))
            .collect();

        for recipient in &recipients {
            recipient.do_send(LiveEvent {
                channel: channel.clone(),
                data: data.clone(),
            });
        }

        tracing::debug!(channel = %channel, subscribers = recipients.len(), "Published live event");

        recipients.len()
    }
}

impl Actor for LiveServer {
    type Context = Context<Self>;
}

impl Handler<Connect> for LiveServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        self.sessions.insert(msg.session_id, msg.addr);
    }
}

impl Handler<Disconnect> for LiveServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        self.disconnect(msg.session_id);
    }
}

impl Handler<Subscribe> for LiveServer {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Self::Context) -> Self::Result {
        self.subscribe(msg.session_id, msg.channel);
    }
}

impl Handler<Unsubscribe> for LiveServer {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _ctx: &mut Self::Context) -> Self::Result {
        self.unsubscribe(msg.session_id, &msg.channel);
    }
}

impl Handler<Publish> for LiveServer {
    type Result = usize;

    fn handle(&mut self, msg: Publish, _ctx: &mut Self::Context) -> Self::Result {
        self.publish(msg.channel, msg.data)
    }
}
