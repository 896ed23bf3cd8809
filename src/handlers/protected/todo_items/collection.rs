use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::LOCATION,
    response::IntoResponse,
    Extension, Json,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TodoItem;

/// GET /api/todoitems - the caller's items, ordered by id
pub async fn get(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<TodoItem>> {
    let items = state.todo_items.get_todo_items(auth.user_id).await?;
    Ok(ApiResponse::success(items))
}

/// POST /api/todoitems - create an item owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<TodoItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(item) = payload?;
    let created = state.todo_items.add_todo_item(auth.user_id, item).await?;

    let location = format!("/api/todoitems/{}", created.id);
    Ok(([(LOCATION, location)], ApiResponse::created(created)))
}
