//! Request extractors: bearer identity and validated JSON bodies.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use dungeons_domain::{PlayerId, Role};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::app::App;

use super::error::ApiError;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// token. Token claims are trusted as-is; no account lookup per request.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub player_id: PlayerId,
    pub role: Role,
}

impl FromRequestParts<Arc<App>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<App>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

        let claims = state.auth.verify(token)?;
        let player_id = Uuid::parse_str(&claims.sub)
            .map(PlayerId::from)
            .map_err(|_| ApiError::unauthorized("invalid token subject"))?;

        Ok(Identity {
            player_id,
            role: claims.role,
        })
    }
}

/// An [`Identity`] that must carry the mj role; everyone else gets 403.
#[derive(Debug, Clone, Copy)]
pub struct MjIdentity(pub Identity);

impl FromRequestParts<Arc<App>> for MjIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<App>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if identity.role != Role::Mj {
            return Err(ApiError::forbidden("mj role required"));
        }
        Ok(MjIdentity(identity))
    }
}

/// JSON body that has passed field validation. Malformed bodies and policy
/// violations both map to the 400 envelope.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        value
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}
