//! In-memory implementations of the storage traits.
//!
//! Nothing is persisted beyond the lifetime of the value. Used for tests and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parley_shared::{
    directory::{DirectoryError, SearchUsersQuery, UserDirectory},
    messages::Message,
    store::{GetMessagesFilter, MessageStore, StoreError},
    users::UserSearchHit,
};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
struct MessageLog {
    last_id: i64,
    messages: Vec<Message>,
}

///
/// [`MessageStore`] keeping all messages in memory.
///
/// Ids are assigned under the same lock that appends the message, so concurrent writers never
/// observe the same id.
///
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    log: Mutex<MessageLog>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Number of messages in all threads.
    ///
    pub async fn len(&self) -> usize {
        self.log.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create_message(
        &self,
        org_id: i64,
        content_type_id: i32,
        object_id: &str,
        user_id: i64,
        content: &str,
    ) -> Result<Message, StoreError> {
        let mut log = self.log.lock().await;
        log.last_id += 1;

        let message = Message {
            id: log.last_id,
            org_id,
            content_type_id,
            object_id: object_id.to_owned(),
            user_id,
            content: content.to_owned(),
            created_at: Utc::now(),
        };
        log.messages.push(message.clone());

        Ok(message)
    }

    async fn get_messages(
        &self,
        org_id: i64,
        content_type_id: i32,
        object_id: &str,
        _filter: &GetMessagesFilter,
    ) -> Result<Vec<Message>, StoreError> {
        let log = self.log.lock().await;

        Ok(log
            .messages
            .iter()
            .filter(|message| {
                message.org_id == org_id
                    && message.content_type_id == content_type_id
                    && message.object_id == object_id
            })
            .cloned()
            .collect())
    }
}

///
/// [`UserDirectory`] keeping all users in memory.
///
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<BTreeMap<i64, UserSearchHit>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Add a user, replacing any existing user with the same id.
    ///
    pub async fn insert_user(&self, user: UserSearchHit) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn remove_user(&self, user_id: i64) -> Option<UserSearchHit> {
        self.users.write().await.remove(&user_id)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn search_users(
        &self,
        query: &SearchUsersQuery,
    ) -> Result<Vec<UserSearchHit>, DirectoryError> {
        let users = self.users.read().await;

        let mut matches: Vec<UserSearchHit> = users
            .values()
            .filter(|user| query.matches(user))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.login.cmp(&b.login));

        Ok(matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }
}
