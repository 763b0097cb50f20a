use std::{sync::Arc, time::Duration};

use actix_codec::Framed;
use actix_http::ws;
use async_trait::async_trait;
use awc::{error::WsClientError, BoxedSocket, ClientResponse};
use fake::Fake;
use futures::{SinkExt, StreamExt};
use once_cell::sync::Lazy;
use parley::application::Application;
use parley_db::memory::{InMemoryMessageStore, InMemoryUserDirectory};
use parley_live::messages::LiveMessage;
use parley_shared::{
    jwt::Jwt,
    messages::Message,
    settings::{get_db_pool, get_settings, DatabaseSettings, Settings},
    store::{GetMessagesFilter, MessageStore, StoreError},
    telemetry::{get_subscriber, init_subscriber},
    users::UserSearchHit,
};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

pub const TEST_ORG_ID: i64 = 1;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber)
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber)
    };
});

pub enum BootstrapType {
    Default,
    User,
    UserWithBrokenStore,
    PostgresUser,
}

pub type LiveConnection = Framed<BoxedSocket, ws::Codec>;

pub struct TestApplication {
    pub address: String,
    pub port: u16,
    pub jwt: Jwt,
    pub store: Arc<InMemoryMessageStore>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub settings: Settings,
    db_pool: Option<PgPool>,
    test_user: Option<TestUser>,
    test_user_token: Option<String>,
}

impl TestApplication {
    pub fn test_user(&self) -> TestUser {
        self.test_user.as_ref().unwrap().clone()
    }

    pub fn test_user_token(&self) -> String {
        self.test_user_token.as_ref().unwrap().clone()
    }

    pub fn db_pool(&self) -> &PgPool {
        self.db_pool
            .as_ref()
            .expect("Test application is not backed by postgres.")
    }

    fn sign_in(&mut self, test_user: TestUser) {
        self.test_user_token = Some(
            self.jwt
                .encode(test_user.id, TEST_ORG_ID, test_user.login.clone())
                .unwrap(),
        );
        self.test_user = Some(test_user);
    }

    ///
    /// Create a token for a user that is not part of the directory.
    ///
    pub fn token_for(&self, user_id: i64, org_id: i64) -> String {
        self.jwt
            .encode(user_id, org_id, format!("user-{}", user_id))
            .unwrap()
    }

    pub async fn post_send_message(
        &self,
        body: serde_json::Value,
        bearer: Option<String>,
    ) -> reqwest::Response {
        let mut client = reqwest::Client::new()
            .post(&format!("{}/api/chats/send-message", &self.address))
            .json(&body);

        if let Some(bearer) = bearer {
            client = client.bearer_auth(bearer);
        }

        client.send().await.expect("Failed to execute request.")
    }

    pub async fn post_get_messages(
        &self,
        body: serde_json::Value,
        bearer: Option<String>,
    ) -> reqwest::Response {
        let mut client = reqwest::Client::new()
            .post(&format!("{}/api/chats/get-messages", &self.address))
            .json(&body);

        if let Some(bearer) = bearer {
            client = client.bearer_auth(bearer);
        }

        client.send().await.expect("Failed to execute request.")
    }

    pub async fn live(
        &self,
        bearer: Option<String>,
    ) -> Result<(ClientResponse, LiveConnection), WsClientError> {
        let mut request =
            awc::Client::new().ws(format!("ws://localhost:{}/api/live/ws", self.port));

        if let Some(bearer) = bearer {
            request = request.bearer_auth(bearer);
        }

        request.connect().await
    }

    ///
    /// Open a live connection as the test user and subscribe to `channel`.
    ///
    pub async fn subscribed_live(&self, channel: &str) -> LiveConnection {
        let (_response, mut connection) = self
            .live(Some(self.test_user_token()))
            .await
            .expect("Failed to open live connection.");

        send_live_message(
            &mut connection,
            LiveMessage::Subscribe {
                channel: channel.to_string(),
            },
        )
        .await;

        match get_next_live_message(&mut connection).await {
            Some(LiveMessage::Subscribed { .. }) => (),
            other => panic!("Expected a subscription confirmation, got {:#?}", other),
        }

        connection
    }
}

pub async fn spawn_app(bootstrap_type: BootstrapType) -> TestApplication {
    Lazy::force(&TRACING);

    let settings = {
        let mut settings = get_settings().expect("Failed to read settings");

        settings.database.database_name = Uuid::new_v4().to_string();
        settings.application.port = 0;
        settings.broker = None;

        settings
    };

    let store = Arc::new(InMemoryMessageStore::new());
    let directory = Arc::new(InMemoryUserDirectory::new());

    let (application, db_pool) = match bootstrap_type {
        BootstrapType::PostgresUser => {
            configure_database(&settings.database).await;

            let application = Application::build(settings.clone())
                .await
                .expect("Failed to build application");
            let db_pool = get_db_pool(&settings.database)
                .await
                .expect("Failed to connect to database");

            (application, Some(db_pool))
        }
        _ => {
            let application_store: Arc<dyn MessageStore> = match bootstrap_type {
                BootstrapType::UserWithBrokenStore => Arc::new(BrokenMessageStore),
                _ => store.clone() as Arc<dyn MessageStore>,
            };

            let application = Application::build_with_backends(
                settings.clone(),
                application_store,
                directory.clone(),
            )
            .await
            .expect("Failed to build application");

            (application, None)
        }
    };

    let application_port = application.port();

    let _ = tokio::spawn(application.run_until_stopped());

    let mut test_application = TestApplication {
        address: format!("http://localhost:{}", application_port),
        port: application_port,
        jwt: Jwt::new(settings.application.jwt_secret.clone()),
        store,
        directory,
        db_pool,
        settings,
        test_user: None,
        test_user_token: None,
    };

    match bootstrap_type {
        BootstrapType::Default => (),
        BootstrapType::User | BootstrapType::UserWithBrokenStore => {
            let test_user = TestUser::generate(1);
            test_user.store(&test_application.directory).await;

            test_application.sign_in(test_user);
        }
        BootstrapType::PostgresUser => {
            let test_user = TestUser::generate(1);
            test_user.insert(test_application.db_pool()).await;

            test_application.sign_in(test_user);
        }
    }

    test_application
}

async fn configure_database(settings: &DatabaseSettings) {
    let mut connection = PgConnection::connect_with(&settings.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(
            r#"CREATE DATABASE "{}";"#,
            settings.database_name
        ))
        .await
        .expect("Failed to create database.");
}

///
/// Drop the database of a postgres backed test application.
///
pub async fn teardown(app: TestApplication) {
    let db_pool = match app.db_pool {
        Some(db_pool) => db_pool,
        None => return,
    };

    db_pool.close().await;

    let mut connection = PgConnection::connect_with(&app.settings.database.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(
            r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE);"#,
            app.settings.database.database_name
        ))
        .await
        .expect("Failed to drop database.");
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub email: String,
}

impl TestUser {
    pub fn generate(id: i64) -> Self {
        Self {
            id,
            name: fake::faker::name::en::Name().fake(),
            login: format!(
                "{}-{}",
                fake::faker::internet::en::Username().fake::<String>(),
                id
            ),
            email: fake::faker::internet::en::SafeEmail().fake(),
        }
    }

    pub async fn insert(&self, pool: &PgPool) {
        sqlx::query("INSERT INTO users (id, name, login, email) VALUES ($1, $2, $3, $4)")
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.login)
            .bind(&self.email)
            .execute(pool)
            .await
            .expect("Failed to store test user.");
    }

    pub async fn store(&self, directory: &InMemoryUserDirectory) {
        directory
            .insert_user(UserSearchHit {
                id: self.id,
                name: self.name.clone(),
                login: self.login.clone(),
                email: self.email.clone(),
            })
            .await;
    }
}

///
/// A message store that fails every operation.
///
pub struct BrokenMessageStore;

#[async_trait]
impl MessageStore for BrokenMessageStore {
    async fn create_message(
        &self,
        _org_id: i64,
        _content_type_id: i32,
        _object_id: &str,
        _user_id: i64,
        _content: &str,
    ) -> Result<Message, StoreError> {
        Err(StoreError::Unavailable("broken on purpose".to_string()))
    }

    async fn get_messages(
        &self,
        _org_id: i64,
        _content_type_id: i32,
        _object_id: &str,
        _filter: &GetMessagesFilter,
    ) -> Result<Vec<Message>, StoreError> {
        Err(StoreError::Unavailable("broken on purpose".to_string()))
    }
}

pub async fn send_live_message(connection: &mut LiveConnection, message: LiveMessage) {
    send_live_text(connection, serde_json::to_string(&message).unwrap()).await;
}

pub async fn send_live_text(connection: &mut LiveConnection, text: String) {
    connection
        .send(ws::Message::Text(text.into()))
        .await
        .expect("Failed to send live message.");
}

///
/// Wait for the next text frame of the connection.
///
/// Returns `None` if nothing arrives within a second.
///
pub async fn get_next_live_message(connection: &mut LiveConnection) -> Option<LiveMessage> {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(1), connection.next())
            .await
            .ok()??;

        match frame {
            Ok(ws::Frame::Text(bytes)) => return serde_json::from_slice(&bytes).ok(),
            Ok(ws::Frame::Ping(_)) | Ok(ws::Frame::Pong(_)) => continue,
            _ => return None,
        }
    }
}
