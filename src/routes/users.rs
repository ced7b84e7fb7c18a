use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{User, UserDocument},
    queries::user_queries,
    utils::extractors::parse_record_id,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = user_queries::find_all(&state.db).await?;

    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(payload) = payload?;
    let document = UserDocument::try_from(payload)?;

    let user = user_queries::create(&state.db, document).await?;
    tracing::info!(id = %user.id, "User created");

    Ok(Json(user))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id = parse_record_id(&id)?;

    let user = user_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>> {
    let id = parse_record_id(&id)?;
    let Json(payload) = payload?;
    let patch = UserDocument::try_from(payload)?;

    let user = user_queries::update(&state.db, id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_record_id(&id)?;

    let deleted = user_queries::delete_by_id(&state.db, id).await?;
    tracing::info!(%id, deleted, "User delete requested");

    Ok(Json(json!({ "message": "User deleted" })))
}
