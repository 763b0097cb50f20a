#![allow(clippy::bool_comparison)]

pub mod messages;
mod publisher;
mod server;

use std::collections::HashSet;

use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, StreamHandler};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use messages::{Connect, Disconnect, LiveEvent, LiveMessage, Subscribe, Unsubscribe};
use parley_shared::{jwt::AuthorizationService, live::org_channel_prefix};
use uuid::Uuid;

pub use publisher::LivePublisher;
pub use server::LiveServer;

///
/// Check if a member of an organization may listen to a channel.
///
pub fn can_subscribe(org_id: i64, channel: &str) -> bool {
    channel.starts_with(&org_channel_prefix(org_id))
}

///
/// A single websocket connection listening to live channels.
///
pub struct LiveSession {
    pub id: Uuid,
    pub org_id: i64,
    pub server: Addr<LiveServer>,
    pub channels: HashSet<String>,
}

impl LiveSession {
    pub fn new(org_id: i64, server: Addr<LiveServer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            server,
            channels: HashSet::new(),
        }
    }

    fn send(&self, ctx: &mut ws::WebsocketContext<Self>, message: &LiveMessage) {
        match serde_json::to_string(message) {
            Ok(text) => ctx.text(text),
            Err(error) => tracing::error!(error = %error, "Failed to serialize live message"),
        }
    }

    fn handle_message(&mut self, message: LiveMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match message {
            LiveMessage::Ping => self.send(ctx, &LiveMessage::Pong),
            LiveMessage::Subscribe { channel } => {
                if can_subscribe(self.org_id, &channel) == false {
                    self.send(
                        ctx,
                        &LiveMessage::Error {
                            message: format!("Access to {} is denied", channel),
                        },
                    );
                    return;
                }

                self.server.do_send(Subscribe {
                    session_id: self.id,
                    channel: channel.clone(),
                });
                self.channels.insert(channel.clone());

                self.send(ctx, &LiveMessage::Subscribed { channel });
            }
            LiveMessage::Unsubscribe { channel } => {
                self.server.do_send(Unsubscribe {
                    session_id: self.id,
                    channel: channel.clone(),
                });
                self.channels.remove(&channel);

                self.send(ctx, &LiveMessage::Unsubscribed { channel });
            }
            // Everything else is only ever sent by the server
            _ => (),
        }
    }
}

impl Actor for LiveSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.server.do_send(Connect {
            session_id: self.id,
            addr: ctx.address().recipient(),
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.server.do_send(Disconnect::new(self.id));
    }
}

impl Handler<LiveEvent> for LiveSession {
    type Result = ();

    fn handle(&mut self, msg: LiveEvent, ctx: &mut Self::Context) -> Self::Result {
        if self.channels.contains(&msg.channel) == false {
            return;
        }

        self.send(
            ctx,
            &LiveMessage::Event {
                channel: msg.channel,
                data: msg.data,
            },
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for LiveSession {
    fn handle(&mut self, item: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match item {
            Ok(ws::Message::Text(text)) => {
                // Malformed messages are ignored, the connection stays open
                if let Ok(message) = serde_json::from_str::<LiveMessage>(&text) {
                    self.handle_message(message, ctx);
                }
            }
            Ok(ws::Message::Ping(bytes)) => ctx.pong(&bytes),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(error) => {
                tracing::warn!(error = %error, "Live websocket protocol error");
                ctx.stop();
            }
            _ => (),
        }
    }
}

#[tracing::instrument(
    name = "Open live websocket",
    skip(request, stream, server, auth),
    fields(user_id = %auth.claims.user_id, org_id = %auth.claims.org_id)
)]
pub async fn websocket(
    request: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<LiveServer>>,
    auth: AuthorizationService,
) -> Result<HttpResponse, actix_web::Error> {
    ws::start(
        LiveSession::new(auth.claims.org_id, server.get_ref().clone()),
        &request,
        stream,
    )
}
