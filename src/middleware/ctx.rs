use std::sync::Arc;

use super::error::{AppError, AppResult, CtxError, CtxResult};
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use crate::middleware::utils::string_utils::get_string_thing;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use reqwest::StatusCode;
use surrealdb::sql::Thing;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Ctx {
    result_user_id: AppResult<String>,
    req_id: Uuid,
}

impl Ctx {
    pub fn new(result_user_id: AppResult<String>, req_id: Uuid) -> Self {
        Self {
            result_user_id,
            req_id,
        }
    }

    pub fn user_id(&self) -> CtxResult<String> {
        self.result_user_id.clone().map_err(|error| CtxError {
            error,
            req_id: self.req_id,
        })
    }

    pub fn user_thing(&self) -> CtxResult<Thing> {
        let id = self.user_id()?;
        get_string_thing(id).map_err(|e| self.to_ctx_error(e))
    }

    pub fn req_id(&self) -> Uuid {
        self.req_id
    }

    pub fn to_ctx_error(&self, error: AppError) -> CtxError {
        CtxError {
            req_id: self.req_id,
            error,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<CtxState>> for Ctx {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state): State<Arc<CtxState>> = State::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let cookies = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let jwt_user_id: AppResult<String> = match cookies.get(JWT_KEY) {
            Some(cookie) => app_state
                .jwt
                .decode_by_type(cookie.value(), crate::utils::jwt::TokenType::Login)
                .map(|claims| claims.auth),
            None => Err(AppError::AuthFailNoJwtCookie),
        };

        Ok(Ctx::new(jwt_user_id, Uuid::new_v4()))
    }
}
