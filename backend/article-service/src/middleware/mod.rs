/// Request authentication
///
/// `AuthenticatedUser` is an extractor: handlers that take it reject requests
/// without a valid `Authorization: Bearer <token>` header.
use crate::error::AppError;
use crate::security::TokenIssuer;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: i32,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let issuer = req
        .app_data::<web::Data<Arc<TokenIssuer>>>()
        .ok_or_else(|| AppError::Internal("token issuer not configured".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = issuer.validate(token.trim())?;
    let account_id = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Malformed token subject".to_string()))?;

    Ok(AuthenticatedUser {
        account_id,
        username: claims.username,
    })
}
