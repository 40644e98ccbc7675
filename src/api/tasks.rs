//! Task endpoints and request payload validation.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::server::ApiServer;
use crate::error::{ApiError, ApiResult};
use crate::types::{NewTask, Task};

/// Response body for a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Create-task request body.
///
/// Mirrors the Task shape. `id`, `completed` and `created_at` are accepted
/// with any value and discarded, since the store assigns them.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "id")]
    _id: Option<IgnoredAny>,
    #[serde(default, rename = "completed")]
    _completed: Option<IgnoredAny>,
    #[serde(default, rename = "created_at")]
    _created_at: Option<IgnoredAny>,
}

impl TaskPayload {
    /// Check the title is not blank and build the store input.
    pub fn into_new_task(self) -> ApiResult<NewTask> {
        if self.title.trim().is_empty() {
            return Err(ApiError::invalid_value("title", "title must not be empty"));
        }

        Ok(NewTask {
            title: self.title,
            description: self.description,
        })
    }
}

fn task_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::invalid_path(rejection.body_text()))
}

/// POST /tasks/
pub async fn create_task(
    State(state): State<ApiServer>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(payload) =
        payload.map_err(|rejection| ApiError::invalid_body(rejection.body_text()))?;
    let new_task = payload.into_new_task()?;

    let task = state.run(move |db| db.create_task(&new_task)).await?;
    info!(task_id = task.id, "Task created");
    Ok(Json(task))
}

/// GET /tasks/
pub async fn list_tasks(State(state): State<ApiServer>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.run(|db| db.list_tasks()).await?;
    debug!(count = tasks.len(), "Listed tasks");
    Ok(Json(tasks))
}

/// GET /tasks/{task_id}
pub async fn get_task(
    State(state): State<ApiServer>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = task_id(path)?;

    state
        .run(move |db| db.get_task(task_id))
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}

/// PUT /tasks/{task_id}/complete
pub async fn complete_task(
    State(state): State<ApiServer>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = task_id(path)?;

    let task = state
        .run(move |db| db.mark_task_completed(task_id))
        .await?
        .ok_or_else(ApiError::task_not_found)?;
    info!(task_id, "Task completed");
    Ok(Json(task))
}

/// DELETE /tasks/{task_id}
pub async fn delete_task(
    State(state): State<ApiServer>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let task_id = task_id(path)?;

    if !state.run(move |db| db.delete_task(task_id)).await? {
        return Err(ApiError::task_not_found());
    }

    info!(task_id, "Task deleted");
    Ok(Json(DeleteResponse {
        message: format!("Task {} deleted successfully", task_id),
    }))
}
