// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::bar::UserRole,
};

// O nome do nosso cabeçalho HTTP customizado
const BAR_ID_HEADER: &str = "x-bar-id";

// O contexto resolvido de uma requisição: qual bar, qual vínculo e com qual papel.
// Tudo que é filtrado ou calculado fica implicitamente preso a este bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub bar_id: Uuid,
    pub membership_id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Lê e valida o X-Bar-ID.
pub fn bar_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers.get(BAR_ID_HEADER).ok_or(AppError::MissingBarHeader)?;
    let value_str = value.to_str().map_err(|_| AppError::InvalidBarHeader)?;
    Uuid::parse_str(value_str.trim()).map_err(|_| AppError::InvalidBarHeader)
}

// O guardião das rotas de bar. Roda depois do `auth_guard`.
pub async fn bar_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    let bar_id = bar_id_from_headers(request.headers())?;

    let scope = app_state
        .tenancy_service
        .resolve_scope(user.user_id, bar_id)
        .await?;

    request.extensions_mut().insert(scope);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantScope>()
            .copied()
            .ok_or(AppError::MissingBarHeader)
    }
}
