//! JWT principal extraction for protected endpoints.
//!
//! Resolves the authenticated principal from the Authorization header.
//! Session issuance itself belongs to the identity service; this layer
//! only verifies the bearer token and extracts the claims the step-up
//! gate needs.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mc_core::domain::value_objects::{Principal, RequestContext};
use mc_core::errors::StepUpError;
use mc_shared::config::JwtConfig;

use crate::handlers::ApiError;

/// JWT claims carried by MediCase access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Registered email address
    pub email: String,
    /// Issuer
    pub iss: String,
    /// Expiry (seconds since epoch)
    pub exp: usize,
}

/// Extractor resolving the authenticated principal from a Bearer token.
///
/// Fails with 401 when the header is missing, the token does not verify,
/// or the claims are malformed.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve_principal(req).map(CurrentUser))
    }
}

fn resolve_principal(req: &HttpRequest) -> Result<Principal, ApiError> {
    let token = extract_bearer_token(req).ok_or(StepUpError::Unauthenticated)?;

    let jwt_config = req
        .app_data::<web::Data<JwtConfig>>()
        .ok_or(StepUpError::Unauthenticated)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&jwt_config.issuer]);

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        StepUpError::Unauthenticated
    })?;

    let user_id =
        Uuid::parse_str(&token_data.claims.sub).map_err(|_| StepUpError::Unauthenticated)?;

    Ok(Principal::new(user_id, token_data.claims.email))
}

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Build the audit/block context from request headers.
///
/// The client IP honours reverse-proxy headers before falling back to the
/// peer address; the session id comes from the X-Session-Id header when
/// the transport layer supplies one.
pub fn request_context(req: &HttpRequest) -> RequestContext {
    let session_id = req
        .headers()
        .get("X-Session-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());

    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string());

    RequestContext::new(session_id, extract_client_ip(req), user_agent)
}

/// Extract the client IP address from the request
fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    // X-Forwarded-For holds a comma-separated chain; the first entry is
    // the original client
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    req.connection_info().peer_addr().map(|s| s.to_string())
}
