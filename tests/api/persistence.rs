use parley_db::{messages::PgMessageStore, users::PgUserDirectory};
use parley_shared::{
    directory::UserDirectory,
    messages::MessageDto,
    store::{GetMessagesFilter, MessageStore},
};

use crate::helpers::{TestApplication, TestUser, TEST_ORG_ID};

fn message_body(object_id: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "contentTypeId": 3,
        "objectId": object_id,
        "content": content
    })
}

fn thread_body(object_id: &str) -> serde_json::Value {
    serde_json::json!({
        "contentTypeId": 3,
        "objectId": object_id
    })
}

async fn stored_message_count(app: &TestApplication) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_messages")
        .fetch_one(app.db_pool())
        .await
        .expect("Failed to count stored messages.");

    count
}

async fn fetch_thread(app: &TestApplication, object_id: &str, token: String) -> Vec<MessageDto> {
    let response = app
        .post_get_messages(thread_body(object_id), Some(token))
        .await;

    assert_eq!(200, response.status().as_u16());

    response
        .json::<Vec<MessageDto>>()
        .await
        .expect("Failed to parse messages.")
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn send_message_persists_the_new_message_in_postgres() {
    // Act
    let response = app
        .post_send_message(message_body("task-42", "foobar"), Some(app.test_user_token()))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());

    let (content, user_id, org_id): (String, i64, i64) =
        sqlx::query_as("SELECT content, user_id, org_id FROM chat_messages")
            .fetch_one(app.db_pool())
            .await
            .expect("Failed to fetch saved chat message");

    assert_eq!("foobar", content);
    assert_eq!(app.test_user().id, user_id);
    assert_eq!(TEST_ORG_ID, org_id);
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn get_messages_returns_postgres_messages_in_sending_order() {
    // Arrange
    for content in ["first", "second", "third"] {
        let response = app
            .post_send_message(message_body("task-42", content), Some(app.test_user_token()))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    // Act
    let messages = fetch_thread(&app, "task-42", app.test_user_token()).await;

    // Assert
    let contents = messages
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();

    assert_eq!(vec!["first", "second", "third"], contents);
    assert!(messages.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(messages
        .iter()
        .all(|message| message.user.as_ref().map(|user| user.login.as_str())
            == Some(app.test_user().login.as_str())));
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn get_messages_returns_an_empty_list_for_a_new_postgres_thread() {
    // Act
    let messages = fetch_thread(&app, "task-42", app.test_user_token()).await;

    // Assert
    assert!(messages.is_empty());
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn get_messages_is_scoped_to_org_and_thread_in_postgres() {
    // Arrange
    let other_org_token = app.token_for(app.test_user().id, TEST_ORG_ID + 1);

    for (object_id, content, token) in [
        ("task-42", "ours", app.test_user_token()),
        ("task-43", "other thread", app.test_user_token()),
        ("task-42", "other org", other_org_token),
    ] {
        let response = app
            .post_send_message(message_body(object_id, content), Some(token))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    // Act
    let messages = fetch_thread(&app, "task-42", app.test_user_token()).await;

    // Assert
    assert_eq!(1, messages.len());
    assert_eq!("ours", messages[0].content);
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn send_message_does_not_store_messages_of_unknown_authors_in_postgres() {
    // Arrange
    let token = app.token_for(app.test_user().id + 1, TEST_ORG_ID);

    // Act
    let response = app
        .post_send_message(message_body("task-42", "foobar"), Some(token))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    assert_eq!(0, stored_message_count(&app).await);
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn get_messages_fails_if_an_author_was_deleted_from_postgres() {
    // Arrange
    let response = app
        .post_send_message(message_body("task-42", "foobar"), Some(app.test_user_token()))
        .await;
    assert_eq!(200, response.status().as_u16());

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(app.test_user().id)
        .execute(app.db_pool())
        .await
        .unwrap();

    // Act
    let response = app
        .post_get_messages(thread_body("task-42"), Some(app.test_user_token()))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn get_messages_fails_if_there_is_a_database_error() {
    // Arrange
    sqlx::query("ALTER TABLE chat_messages DROP COLUMN content;")
        .execute(app.db_pool())
        .await
        .unwrap();

    // Act
    let response = app
        .post_get_messages(thread_body("task-42"), Some(app.test_user_token()))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn postgres_store_assigns_strictly_increasing_ids() {
    // Arrange
    let store = PgMessageStore::new(app.db_pool().clone());

    // Act
    let first = store
        .create_message(TEST_ORG_ID, 3, "task-42", 1, "first")
        .await
        .unwrap();
    let second = store
        .create_message(TEST_ORG_ID, 3, "task-42", 0, "second")
        .await
        .unwrap();

    // Assert
    assert!(first.id < second.id);
    assert!(first.created_at <= second.created_at);

    let messages = store
        .get_messages(TEST_ORG_ID, 3, "task-42", &GetMessagesFilter::default())
        .await
        .unwrap();

    assert_eq!(2, messages.len());
    assert!(messages.iter().any(|message| message.user_id == 0));
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn postgres_directory_resolves_nothing_without_ids() {
    // Arrange
    let directory = PgUserDirectory::new(app.db_pool().clone());

    // Act
    let users = directory.resolve_users(&[], 0).await.unwrap();

    // Assert
    assert!(users.is_empty());
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn postgres_directory_resolves_exactly_the_requested_ids() {
    // Arrange
    for id in [2, 3] {
        TestUser::generate(id).insert(app.db_pool()).await;
    }

    let directory = PgUserDirectory::new(app.db_pool().clone());

    // Act
    let users = directory.resolve_users(&[1, 3], 2).await.unwrap();

    // Assert
    assert_eq!(2, users.len());
    assert_eq!(app.test_user().login, users[&1].login);
    assert!(users.contains_key(&3));
    assert!(users.contains_key(&2) == false);
}

#[parley_macros::test(strategy = "PostgresUser")]
async fn postgres_directory_honors_the_limit() {
    // Arrange
    for id in [2, 3] {
        TestUser::generate(id).insert(app.db_pool()).await;
    }

    let directory = PgUserDirectory::new(app.db_pool().clone());

    // Act
    let users = directory.resolve_users(&[1, 2, 3], 1).await.unwrap();

    // Assert
    assert_eq!(1, users.len());
}
