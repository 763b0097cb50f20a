use std::{net::TcpListener, sync::Arc};

use actix::{Actor, Addr};
use actix_cors::Cors;
use actix_web::{dev::Server, web, web::Data, App, HttpServer};
use anyhow::Context;
use parley_db::{messages::PgMessageStore, users::PgUserDirectory};
use parley_live::{LivePublisher, LiveServer};
use parley_shared::{
    directory::UserDirectory,
    jwt::Jwt,
    live::EventPublisher,
    settings::{get_db_pool, Settings},
    store::MessageStore,
};
use tracing_actix_web::TracingLogger;

use crate::{
    broker,
    chats::ChatService,
    routes::{chats, health_check},
};

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    ///
    /// Build the application backed by postgres, applying pending migrations first.
    ///
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        let db_pool = get_db_pool(&settings.database)
            .await
            .context("Could not connect to database.")?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to migrate the database.")?;

        let store = Arc::new(PgMessageStore::new(db_pool.clone()));
        let directory = Arc::new(PgUserDirectory::new(db_pool));

        Self::build_with_backends(settings, store, directory).await
    }

    ///
    /// Build the application with the given message store and user directory.
    ///
    pub async fn build_with_backends(
        settings: Settings,
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );

        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}.", address))?;
        let port = listener.local_addr()?.port();

        let live_server = LiveServer::default().start();

        let publisher: Arc<dyn EventPublisher> = match &settings.broker {
            Some(broker_settings) => {
                Arc::new(broker::connect(broker_settings, live_server.clone()).await?)
            }
            None => Arc::new(LivePublisher::new(live_server.clone())),
        };

        let chat_service = ChatService::new(store, directory, publisher);

        let server = run(
            listener,
            settings.application.jwt_secret,
            chat_service,
            live_server,
        )?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn run(
    listener: TcpListener,
    jwt_secret: String,
    chat_service: ChatService,
    live_server: Addr<LiveServer>,
) -> Result<Server, std::io::Error> {
    let chat_service = Data::new(chat_service);
    let jwt = Data::new(Jwt::new(jwt_secret));
    let live_server = Data::new(live_server);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(
                Cors::default()
                    .allow_any_header()
                    .allow_any_method()
                    .allow_any_origin(),
            )
            .app_data(chat_service.clone())
            .app_data(jwt.clone())
            .app_data(live_server.clone())
            .route("/health_check", web::get().to(health_check))
            .route("/api/chats/send-message", web::post().to(chats::send_message))
            .route("/api/chats/get-messages", web::post().to(chats::get_messages))
            .route("/api/live/ws", web::get().to(parley_live::websocket))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
