use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Registration;

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

/// POST /api/authentication/register - create an account
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<StatusMessage> {
    let Json(registration) = payload?;
    state.users.add_user(registration).await?;

    Ok(ApiResponse::success(StatusMessage {
        status: "Success",
        message: "User created successfully".to_string(),
    }))
}
