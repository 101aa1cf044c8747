use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use super::error::ApiError;
use super::server::AppState;
use crate::platform::base::Principal;

/// Extractor for any authenticated caller. Pulls the bearer token from the
/// `Authorization` header and verifies it with the identity provider.
pub struct AuthUser(pub Principal);

/// Extractor for administrators (authenticated + `admin` custom claim).
pub struct AdminUser(pub Principal);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        let principal = state.identity.verify_token(token).await.map_err(|e| {
            debug!("Token verification failed: {}", e);
            ApiError::Unauthenticated
        })?;
        Ok(AuthUser(principal))
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        if !principal.is_admin {
            debug!("Non-admin {} hit an admin route", principal.uid);
            return Err(ApiError::PermissionDenied);
        }
        Ok(AdminUser(principal))
    }
}
