use actix::{Actor, Addr, Context, ContextFutureSpawner, Handler, WrapFuture};
use anyhow::Context as _;
use futures::StreamExt;
use lapin::{
    options::{
        BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind,
};
use parley_live::{messages::Publish, LiveServer};
use parley_shared::{
    broker::BrokerEvent,
    live::{EventPublisher, PublishError},
    settings::BrokerSettings,
};
use tokio_amqp::LapinTokioExt;

///
/// Publishes [`BrokerEvent`]s to the fanout exchange shared by all application instances.
///
/// Events are published one after another, in the order they were received.
///
pub struct Broker {
    pub exchange: String,
    pub channel: Channel,
    // Keeps the connection of `channel` open
    _connection: Connection,
}

impl Actor for Broker {
    type Context = Context<Self>;
}

#[derive(Debug, Clone, actix::prelude::Message)]
#[rtype(result = "()")]
pub struct PublishBrokerEvent {
    pub broker_event: BrokerEvent,
}

impl Handler<PublishBrokerEvent> for Broker {
    type Result = ();

    fn handle(&mut self, msg: PublishBrokerEvent, ctx: &mut Self::Context) -> Self::Result {
        let serialized_message = match serde_json::to_vec(&msg.broker_event) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to serialize broker event");
                return;
            }
        };

        let channel = self.channel.clone();
        let exchange = self.exchange.clone();

        async move {
            let confirmation = channel
                .basic_publish(
                    &exchange,
                    "",
                    BasicPublishOptions::default(),
                    &serialized_message,
                    BasicProperties::default(),
                )
                .await;

            let result = match confirmation {
                Ok(confirmation) => confirmation.await.map(|_| ()),
                Err(error) => Err(error),
            };

            if let Err(error) = result {
                tracing::warn!(error = %error, exchange = %exchange, "Failed to publish broker event");
            }
        }
        .into_actor(self)
        .wait(ctx)
    }
}

///
/// [`EventPublisher`] relaying events through the [`Broker`].
///
#[derive(Clone)]
pub struct BrokerPublisher {
    broker: Addr<Broker>,
}

impl BrokerPublisher {
    pub fn new(broker: Addr<Broker>) -> Self {
        Self { broker }
    }
}

impl EventPublisher for BrokerPublisher {
    fn publish(&self, channel: &str, data: &[u8]) -> Result<(), PublishError> {
        let broker_event = broadcast_event(channel, data)?;

        self.broker
            .try_send(PublishBrokerEvent { broker_event })
            .map_err(|error| PublishError::Unavailable(error.to_string()))
    }
}

pub fn broadcast_event(channel: &str, data: &[u8]) -> Result<BrokerEvent, PublishError> {
    Ok(BrokerEvent::Broadcast {
        channel: channel.to_string(),
        data: serde_json::from_slice(data)?,
    })
}

///
/// Translate a delivery from the broker into a publication on the local live server.
///
pub fn to_publish(delivery: &[u8]) -> Result<Publish, serde_json::Error> {
    match serde_json::from_slice::<BrokerEvent>(delivery)? {
        BrokerEvent::Broadcast { channel, data } => Ok(Publish::new(channel, data)),
    }
}

///
/// Connect to the broker.
///
/// Declares the fanout exchange, binds an exclusive queue of this instance to it and relays
/// every received event to `live_server`.
///
#[tracing::instrument(name = "Connect to the message broker", skip(settings, live_server), fields(host = %settings.host, exchange = %settings.exchange))]
pub async fn connect(
    settings: &BrokerSettings,
    live_server: Addr<LiveServer>,
) -> Result<BrokerPublisher, anyhow::Error> {
    let connection = Connection::connect(
        &settings.get_connection_string(),
        ConnectionProperties::default().with_tokio(),
    )
    .await
    .context("Could not connect to broker.")?;

    let publish_channel = connection
        .create_channel()
        .await
        .context("Failed to open a broker channel for publishing.")?;

    publish_channel
        .exchange_declare(
            &settings.exchange,
            ExchangeKind::Fanout,
            ExchangeDeclareOptions::default(),
            FieldTable::default(),
        )
        .await
        .context("Failed to declare the broker exchange.")?;

    let consume_channel = connection
        .create_channel()
        .await
        .context("Failed to open a broker channel for consuming.")?;

    let queue = consume_channel
        .queue_declare(
            "",
            QueueDeclareOptions {
                exclusive: true,
                auto_delete: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .context("Failed to declare the broker queue.")?;

    consume_channel
        .queue_bind(
            queue.name().as_str(),
            &settings.exchange,
            "",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .context("Failed to bind the broker queue.")?;

    let consumer = consume_channel
        .basic_consume(
            queue.name().as_str(),
            "parley",
            BasicConsumeOptions {
                no_ack: true,
                ..BasicConsumeOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .context("Failed to consume the broker queue.")?;

    actix::spawn(relay(consumer, live_server));

    let broker = Broker {
        exchange: settings.exchange.clone(),
        channel: publish_channel,
        _connection: connection,
    }
    .start();

    Ok(BrokerPublisher::new(broker))
}

async fn relay(mut consumer: Consumer, live_server: Addr<LiveServer>) {
    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(error = %error, "Broker consumer failed, live relay stopped");
                return;
            }
        };

        match to_publish(&delivery.data) {
            Ok(publish) => live_server.do_send(publish),
            Err(error) => tracing::warn!(error = %error, "Dropping malformed broker event"),
        }
    }
}
