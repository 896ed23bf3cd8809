use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::generate_jwt;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::validation::require;

#[derive(Debug, Deserialize)]
pub struct LoginModel {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// POST /api/authentication/login - exchange credentials for a bearer token
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginModel>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(login) = payload?;
    require("username", &login.username)?;
    require("password", &login.password)?;

    let user = state
        .users
        .authenticate(&login.username, &login.password)
        .await?
        .ok_or_else(|| {
            warn!("Failed login attempt for '{}'", login.username);
            ApiError::unauthorized("Invalid username or password")
        })?;

    let issued = generate_jwt(user.id, &state.config.security)?;
    info!("User '{}' logged in", user.user_name);

    Ok(ApiResponse::success(LoginResponse {
        token: issued.token,
        expiration: issued.expiration,
    }))
}
