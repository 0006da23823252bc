// src/handlers/cocktails.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::tenancy::TenantScope};

pub async fn list_cocktails(
    State(app_state): State<AppState>,
    scope: TenantScope,
    WithRejection(Query(params), _): WithRejection<Query<Vec<(String, String)>>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.cocktail_service.list(&scope, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// "Consigo fazer este coquetel com a minha prateleira?", linha a linha.
pub async fn get_cocktail_availability(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(cocktail_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.cocktail_service.availability(&scope, cocktail_id).await?;
    Ok((StatusCode::OK, Json(report)))
}
