//! User authentication using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{Caller, User};

/// Extractor that requires a valid JWT token
///
/// Extracts the JWT token from:
/// - Authorization header: `Bearer <jwt_token>`
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?.ok_or_else(|| {
            ApiError::unauthorized(
                "Authentication required. Provide JWT token via 'Authorization: Bearer <token>' header",
            )
        })?;

        resolve_user(&token, state).await.map(RequireUser)
    }
}

/// Resolves the request's caller for policy checks.
///
/// A request without an Authorization header is `Anonymous`; a header that is
/// present but invalid is rejected rather than downgraded.
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match extract_jwt_token(&parts.headers)? {
            Some(token) => resolve_user(&token, state).await.map(Caller::Authenticated),
            None => Ok(Caller::Anonymous),
        }
    }
}

async fn resolve_user(token: &str, state: &AppState) -> Result<User, ApiError> {
    debug!("Validating JWT token");

    let claims = state.jwt_service.validate(token)?;
    let user_id = claims.user_id()?;

    let user = state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !user.is_active() {
        return Err(ApiError::unauthorized("User account is inactive"));
    }

    Ok(user)
}

/// Extract the bearer token from the Authorization header, if any
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(ApiError::unauthorized(
            "Unsupported Authorization scheme, expected 'Bearer <token>'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        let token = extract_jwt_token(&headers).unwrap();
        assert_eq!(token.as_deref(), Some("eyJhbGciOiJIUzI1NiJ9.test"));
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let headers = HeaderMap::new();
        assert!(extract_jwt_token(&headers).unwrap().is_none());
    }

    #[test]
    fn test_invalid_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let err = extract_jwt_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_empty_bearer_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer   ".parse().unwrap());

        assert!(extract_jwt_token(&headers).is_err());
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        let token = extract_jwt_token(&headers).unwrap();
        assert_eq!(token.as_deref(), Some("token-with-spaces"));
    }
}
