// src/handlers/shelf.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{AtLeastGeneral, RequireRole},
        tenancy::TenantScope,
    },
};

// ---
// Handler: get_my_shelf
// ---
pub async fn get_my_shelf(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let contents = app_state.shelf_service.list(&scope).await?;
    Ok((StatusCode::OK, Json(contents)))
}

// ---
// Handler: add_to_shelf (Guest não edita prateleira)
// ---
pub async fn add_to_shelf(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _guard: RequireRole<AtLeastGeneral>,
    Path(ingredient_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state.shelf_service.add(&scope, ingredient_id).await?;
    Ok((StatusCode::OK, Json(entry)))
}

// ---
// Handler: remove_from_shelf
// ---
pub async fn remove_from_shelf(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _guard: RequireRole<AtLeastGeneral>,
    Path(ingredient_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.shelf_service.remove(&scope, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
