use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{web::Data, FromRequest, HttpResponse, ResponseError};
use futures::future::{err, ok, Ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error_chain_fmt;

///
/// Contains information about the user, decoded from the JWT.
///
/// The organization is the tenant every chat operation of this user is scoped to.
///
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub org_id: i64,
    pub login: String,
    iat: usize,
}

///
/// Helper to encode and decode JWTs.
///
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Jwt {
    secret: String,
}

impl Jwt {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    ///
    /// Create a JWT for a user acting in an organization.
    ///
    pub fn encode(
        &self,
        user_id: i64,
        org_id: i64,
        login: String,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since_epoch| since_epoch.as_millis() as usize)
            .unwrap_or_default();

        jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                user_id,
                org_id,
                login,
                iat,
            },
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    ///
    /// Get the claims for a JWT.
    ///
    /// Note: Currently tokens are not checked for expiration.
    ///
    pub fn get_claims(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()
        .map(|value| value.claims)
    }
}

///
/// This can be used to restrict a route to authenticated users
/// by having it as a parameter in the request handler.
///
/// The token is read from the `Authorization` header, or from the `bearer` query parameter
/// for clients that cannot set headers (e.g. browser websockets).
///
/// If the user is unauthenticated, the request will result in a 401 Unauthorized.
///
pub struct AuthorizationService {
    pub claims: Claims,
}

///
/// Possible errors that can occur in the [`AuthorizationService`].
///
#[derive(thiserror::Error)]
pub enum AuthorizationError {
    /// User could not be authenticated.
    #[error("Unauthorized")]
    Unauthorized,
}

impl std::fmt::Debug for AuthorizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AuthorizationError {
    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            AuthorizationError::Unauthorized => HttpResponse::Unauthorized().finish(),
        }
    }
}

impl FromRequest for AuthorizationService {
    type Error = AuthorizationError;
    type Future = Ready<Result<AuthorizationService, Self::Error>>;

    fn from_request(
        request: &actix_web::HttpRequest,
        _payload: &mut actix_http::Payload,
    ) -> Self::Future {
        let jwt = match request.app_data::<Data<Jwt>>() {
            Some(jwt) => jwt,
            None => return err(AuthorizationError::Unauthorized),
        };

        let header_token = request
            .headers()
            .get("Authorization")
            .and_then(|x| x.to_str().ok())
            .map(|x| x.replace("Bearer ", ""));

        let query_token = request
            .query_string()
            .split('&')
            .filter_map(|parameter| parameter.split_once('='))
            .find(|&(key, _)| key == "bearer")
            .map(|(_, value)| value.to_string());

        match header_token
            .or(query_token)
            .and_then(|token| jwt.get_claims(&token))
        {
            Some(claims) => ok(AuthorizationService { claims }),
            None => err(AuthorizationError::Unauthorized),
        }
    }
}
