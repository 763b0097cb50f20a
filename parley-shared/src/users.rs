use serde::{Deserialize, Serialize};

use crate::messages::MessageUser;

///
/// Model for users returned by a [`crate::directory::UserDirectory`].
///
/// It does not contain sensitive information and can be used for responses.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearchHit {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub email: String,
}

impl From<&UserSearchHit> for MessageUser {
    fn from(val: &UserSearchHit) -> Self {
        Self {
            id: val.id,
            name: val.name.to_owned(),
            login: val.login.to_owned(),
            email: val.email.to_owned(),
            avatar_url: gravatar_url(&val.email),
        }
    }
}

///
/// Get the avatar url for an email address.
///
/// The url points to the avatar proxy and is keyed by the md5 hash of the lowercased email.
/// An empty email has no avatar.
///
pub fn gravatar_url(email: &str) -> String {
    if email.is_empty() {
        return String::new();
    }

    format!("/avatar/{:x}", md5::compute(email.to_lowercase().as_bytes()))
}
