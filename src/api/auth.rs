use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use super::SharedState;
use crate::access::{ensure_staff, Principal};
use crate::error::AppError;

/// A staff principal authenticated from the request's Basic credentials.
///
/// Missing or wrong credentials reject with 401, an authenticated user who is
/// neither a superuser nor a property owner with 403.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

/// Extract `(username, password)` from an `Authorization: Basic ...` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl FromRequestParts<SharedState> for AdminPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) =
            basic_credentials(&parts.headers).ok_or(AppError::Unauthorized)?;

        let principal = match state.db.authenticate(&username, &password).await? {
            Some(principal) => principal,
            None => {
                warn!("Rejected admin credentials for '{}'", username);
                return Err(AppError::Unauthorized);
            }
        };

        ensure_staff(&principal)?;
        Ok(AdminPrincipal(principal))
    }
}
