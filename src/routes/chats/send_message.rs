use std::convert::{TryFrom, TryInto};

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use parley_db::messages::models::{ContentTypeId, MessageContent, ObjectId};
use parley_shared::{error_chain_fmt, jwt::AuthorizationService};

use crate::chats::{ChatService, SendMessageCmd};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyData {
    content_type_id: i32,
    object_id: String,
    content: String,
}

impl TryFrom<BodyData> for SendMessageCmd {
    type Error = String;

    fn try_from(value: BodyData) -> Result<Self, Self::Error> {
        let content_type_id = ContentTypeId::parse(value.content_type_id)?;
        let object_id = ObjectId::parse(value.object_id)?;
        let content = MessageContent::parse(value.content)?;

        Ok(Self {
            content_type_id: content_type_id.get(),
            object_id: object_id.into_inner(),
            content: content.into_inner(),
        })
    }
}

#[derive(thiserror::Error)]
pub enum SendMessageError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SendMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SendMessageError {
    fn status_code(&self) -> StatusCode {
        match *self {
            SendMessageError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SendMessageError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[tracing::instrument(
    name = "Send a chat message",
    skip(body, chats, auth),
    fields(user_id = %auth.claims.user_id, org_id = %auth.claims.org_id)
)]
pub async fn send_message(
    body: web::Json<BodyData>,
    chats: web::Data<ChatService>,
    auth: AuthorizationService,
) -> Result<HttpResponse, SendMessageError> {
    let cmd: SendMessageCmd = body
        .0
        .try_into()
        .map_err(SendMessageError::ValidationError)?;

    let message = chats
        .send_message(auth.claims.org_id, auth.claims.user_id, cmd)
        .await
        .context("Failed to send a chat message.")?;

    Ok(HttpResponse::Ok().json(message))
}
