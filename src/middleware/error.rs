use std::fmt;

use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::ctx::Ctx;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
    pub req_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    Forbidden,
    EntityFailIdNotFound { ident: String },
    AuthFailNoJwtCookie,
    AuthFailJwtInvalid { source: String },
    ContestNotReady { status: String },
    ContestAlreadySettled,
    WinnersNotFinalized,
    Serde { source: String },
    Stripe { source: String },
    SurrealDb { source: String },
}

/// CtxError carries the req_id reported back to the client and implements IntoResponse.
pub type CtxResult<T> = core::result::Result<T, CtxError>;
/// Any error raised before a request id is attached.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

// for slightly less verbose error mappings
impl CtxError {
    pub fn from<T: Into<AppError>>(ctx: &Ctx) -> impl FnOnce(T) -> CtxError + '_ {
        |err| CtxError {
            req_id: ctx.req_id(),
            error: err.into(),
        }
    }
}

impl From<AppError> for CtxError {
    fn from(value: AppError) -> Self {
        CtxError {
            req_id: Uuid::new_v4(),
            error: value,
        }
    }
}

impl From<surrealdb::Error> for CtxError {
    fn from(value: surrealdb::Error) -> Self {
        CtxError {
            req_id: Uuid::new_v4(),
            error: value.into(),
        }
    }
}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::EntityFailIdNotFound { ident } => write!(f, "Record id= {ident} not found"),
            Self::AuthFailNoJwtCookie => write!(f, "You are not logged in"),
            Self::AuthFailJwtInvalid { .. } => {
                write!(f, "The provided JWT token is not valid")
            }
            Self::ContestNotReady { status } => {
                write!(f, "Contest is not ready for payout, status={status}")
            }
            Self::ContestAlreadySettled => write!(f, "Contest payout already processed"),
            Self::WinnersNotFinalized => write!(f, "Contest winners are not finalized"),
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::Stripe { .. } => write!(f, "Payment provider error"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    error: String,
    req_id: String,
}

impl ErrorResponseBody {
    pub fn new(error: String, req_id: Option<String>) -> Self {
        ErrorResponseBody {
            error,
            req_id: req_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

impl From<ErrorResponseBody> for String {
    fn from(value: ErrorResponseBody) -> Self {
        serde_json::to_string(&value).unwrap()
    }
}

// REST error response
impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!("->> {:<12} - into_response - {self:?}", "ERROR");
        let status_code = match self.error {
            AppError::EntityFailIdNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::ContestNotReady { .. }
            | AppError::ContestAlreadySettled
            | AppError::WinnersNotFinalized => StatusCode::CONFLICT,
            AppError::Serde { .. }
            | AppError::Generic { .. }
            | AppError::Stripe { .. }
            | AppError::SurrealDb { .. } => StatusCode::BAD_REQUEST,
            AppError::Forbidden
            | AppError::AuthFailNoJwtCookie
            | AppError::AuthFailJwtInvalid { .. } => StatusCode::FORBIDDEN,
        };
        let err = self.error.clone();
        let body: String =
            ErrorResponseBody::new(self.error.to_string(), Some(self.req_id.to_string())).into();
        let mut response = (status_code, body).into_response();
        // keep the real error reachable for the trace layer
        response.extensions_mut().insert(err);
        response
    }
}

// External Errors
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<stripe::StripeError> for AppError {
    fn from(value: stripe::StripeError) -> Self {
        Self::Stripe {
            source: value.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::AuthFailJwtInvalid {
            source: value.to_string(),
        }
    }
}

impl From<CtxError> for AppError {
    fn from(value: CtxError) -> Self {
        value.error
    }
}
