// src/handlers/bars.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

// ---
// Handler: list_my_bars
// ---
// Só exige autenticação: é daqui que o cliente tira o X-Bar-ID.
pub async fn list_my_bars(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let bars = app_state
        .tenancy_service
        .list_memberships(user.user_id)
        .await?;

    Ok((StatusCode::OK, Json(bars)))
}
