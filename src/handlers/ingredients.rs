// src/handlers/ingredients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::tenancy::TenantScope};

// ---
// Handler: list_ingredients
// ---
// Os parâmetros chegam crus, em pares, para que nomes repetidos ou
// desconhecidos sejam rejeitados pelo motor de filtros.
pub async fn list_ingredients(
    State(app_state): State<AppState>,
    scope: TenantScope,
    WithRejection(Query(params), _): WithRejection<Query<Vec<(String, String)>>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.ingredient_service.list(&scope, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// ---
// Handler: get_ingredient
// ---
pub async fn get_ingredient(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(ingredient_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ingredient = app_state.ingredient_service.get(&scope, ingredient_id).await?;
    Ok((StatusCode::OK, Json(ingredient)))
}
