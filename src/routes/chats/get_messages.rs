use std::convert::{TryFrom, TryInto};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use parley_db::messages::models::{ContentTypeId, ObjectId};
use parley_shared::{error_chain_fmt, jwt::AuthorizationService};

use crate::chats::{ChatService, GetMessagesCmd};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyData {
    content_type_id: i32,
    object_id: String,
}

impl TryFrom<BodyData> for GetMessagesCmd {
    type Error = String;

    fn try_from(value: BodyData) -> Result<Self, Self::Error> {
        let content_type_id = ContentTypeId::parse(value.content_type_id)?;
        let object_id = ObjectId::parse(value.object_id)?;

        Ok(Self {
            content_type_id: content_type_id.get(),
            object_id: object_id.into_inner(),
        })
    }
}

#[derive(thiserror::Error)]
pub enum GetMessagesError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for GetMessagesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GetMessagesError {
    fn status_code(&self) -> StatusCode {
        match *self {
            GetMessagesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GetMessagesError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[tracing::instrument(
    name = "Get chat messages",
    skip(body, chats, auth),
    fields(user_id = %auth.claims.user_id, org_id = %auth.claims.org_id)
)]
pub async fn get_messages(
    body: web::Json<BodyData>,
    chats: web::Data<ChatService>,
    auth: AuthorizationService,
) -> Result<HttpResponse, GetMessagesError> {
    let cmd: GetMessagesCmd = body
        .0
        .try_into()
        .map_err(GetMessagesError::ValidationError)?;

    let messages = chats
        .get_messages(auth.claims.org_id, auth.claims.user_id, cmd)
        .await
        .context("Failed to retrieve chat messages.")?;

    Ok(HttpResponse::Ok().json(messages))
}
