use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TodoItem;

/// GET /api/todoitems/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<TodoItem> {
    let Path(id) = id?;
    state
        .todo_items
        .get_todo_item(auth.user_id, id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("To-do item {} not found", id)))
}

/// PUT /api/todoitems/:id - replace description and completion state
///
/// The body's `id` must match the path. Sending the `version` last read makes
/// the write fail with 409 if the item changed in the meantime.
pub async fn put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TodoItem>, JsonRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let Json(item) = payload?;
    if item.id != id {
        return Err(ApiError::bad_request(format!(
            "Item id {} does not match route id {}",
            item.id, id
        )));
    }

    state.todo_items.update_todo_item(auth.user_id, item).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /api/todoitems/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.todo_items.remove_todo_item(auth.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
