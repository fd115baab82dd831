//! HTTP error envelope and the use-case error mappings.
//!
//! Every failure leaves the API as `{"error": {"code", "message"}}` with a
//! stable machine-readable code. Progression rejections carry their own
//! codes (`WRONG_STEP_ORDER`, `NOT_IN_RANGE`, `ATTEMPT_ALREADY_HANDLED`) so
//! clients can branch without parsing prose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::infrastructure::auth::AuthError;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::dungeon::DungeonError;
use crate::use_cases::market::MarketError;
use crate::use_cases::player::PlayerError;
use crate::use_cases::run::RunError;

#[derive(Debug, Serialize)]
struct ErrorPayload {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal error",
        )
    }

    fn from_repo(e: RepoError) -> Self {
        if e.is_not_found() {
            Self::not_found(e.to_string())
        } else if e.is_duplicate() || e.is_conflict() {
            Self::conflict(e.to_string())
        } else {
            tracing::error!(error = %e, "Repository failure");
            Self::internal()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorPayload {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RunError> for ApiError {
    fn from(e: RunError) -> Self {
        let message = e.to_string();
        match e {
            RunError::DungeonNotFound
            | RunError::PlayerNotFound
            | RunError::RunNotFound
            | RunError::StepNotFound => Self::not_found(message),
            RunError::DungeonNotPublished => Self::bad_request(message),
            RunError::ActiveRunExists | RunError::RunNotActive => Self::conflict(message),
            RunError::NotRunOwner => Self::forbidden(message),
            RunError::WrongStepOrder { .. } => {
                Self::new(StatusCode::CONFLICT, "WRONG_STEP_ORDER", message)
            }
            RunError::NotInRange { .. } => Self::new(StatusCode::CONFLICT, "NOT_IN_RANGE", message),
            RunError::AlreadyHandled => {
                Self::new(StatusCode::CONFLICT, "ATTEMPT_ALREADY_HANDLED", message)
            }
            RunError::Repo(repo) => Self::from_repo(repo),
        }
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        let message = e.to_string();
        match e {
            MarketError::ListingNotFound | MarketError::ItemNotFound => Self::not_found(message),
            MarketError::NotListingOwner => Self::forbidden(message),
            MarketError::InsufficientFunds => {
                Self::new(StatusCode::CONFLICT, "insufficient_funds", message)
            }
            MarketError::NotTradable
            | MarketError::ListingNotActive
            | MarketError::OwnListing
            | MarketError::NotEnoughQuantity
            | MarketError::ListingExpired
            | MarketError::NotEnoughItems => Self::conflict(message),
            MarketError::Repo(repo) => Self::from_repo(repo),
        }
    }
}

impl From<PlayerError> for ApiError {
    fn from(e: PlayerError) -> Self {
        let message = e.to_string();
        match e {
            PlayerError::EmailTaken => Self::conflict(message),
            PlayerError::InvalidCredentials => Self::unauthorized(message),
            PlayerError::PlayerNotFound => Self::not_found(message),
            PlayerError::NotAllowed => Self::forbidden(message),
            PlayerError::Token(auth) => auth.into(),
            PlayerError::Repo(repo) => Self::from_repo(repo),
        }
    }
}

impl From<DungeonError> for ApiError {
    fn from(e: DungeonError) -> Self {
        let message = e.to_string();
        match e {
            DungeonError::DungeonNotFound | DungeonError::StepNotFound => Self::not_found(message),
            DungeonError::NotDungeonOwner => Self::forbidden(message),
            DungeonError::NoSteps | DungeonError::InvalidRadius | DungeonError::InvalidReorder => {
                Self::bad_request(message)
            }
            DungeonError::OrderTaken(_) => Self::conflict(message),
            DungeonError::Repo(repo) => Self::from_repo(repo),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Expired | AuthError::InvalidToken => Self::unauthorized(e.to_string()),
            AuthError::Encoding(_) => {
                tracing::error!(error = %e, "Token signing failure");
                Self::internal()
            }
        }
    }
}
