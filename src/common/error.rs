use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::bar::UserRole;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Erros do motor de filtros (sempre 400, nunca ignorados) ---
    #[error("Filtro desconhecido: {0}")]
    UnknownFilter(String),

    #[error("Ordenação não permitida: {0}")]
    UnknownSort(String),

    #[error("Valor inválido para '{name}': '{value}' (esperado {expected})")]
    InvalidFilterValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Parâmetro repetido: {0}")]
    DuplicateParameter(String),

    #[error("Query string inválida")]
    InvalidQueryString(#[from] QueryRejection),

    // --- Autenticação e tenancy ---
    #[error("Token inválido")]
    InvalidToken,

    #[error("Cabeçalho X-Bar-ID ausente")]
    MissingBarHeader,

    #[error("Cabeçalho X-Bar-ID inválido")]
    InvalidBarHeader,

    #[error("Bar não encontrado")]
    BarNotFound,

    #[error("Papel insuficiente (necessário: {required:?})")]
    InsufficientRole { required: UserRole },

    #[error("Papel de usuário desconhecido: {0}")]
    UnknownRole(i32),

    // --- Recursos ---
    #[error("Ingrediente não encontrado")]
    IngredientNotFound,

    #[error("Coquetel não encontrado")]
    CocktailNotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::UnknownFilter(_)
            | AppError::UnknownSort(_)
            | AppError::InvalidFilterValue { .. }
            | AppError::DuplicateParameter(_)
            | AppError::InvalidQueryString(_)
            | AppError::MissingBarHeader
            | AppError::InvalidBarHeader => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
            // Recurso de outro bar responde igual a recurso inexistente.
            AppError::BarNotFound | AppError::IngredientNotFound | AppError::CocktailNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::UnknownRole(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais parâmetros são inválidos.",
                    "details": details,
                })
            }
            AppError::InvalidFilterValue { name, value, expected } => json!({
                "error": self.to_string(),
                "details": { "parameter": name, "value": value, "expected": expected },
            }),
            AppError::InvalidQueryString(rejection) => json!({
                "error": self.to_string(),
                "details": rejection.body_text(),
            }),
            // Erros internos: o detalhe vai para o log, o cliente recebe uma mensagem opaca.
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_errors_are_client_errors() {
        assert_eq!(AppError::UnknownFilter("foo".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UnknownSort("price".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidFilterValue {
                name: "strength_min".into(),
                value: "abc".into(),
                expected: "número decimal",
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn cross_tenant_lookups_look_like_missing_rows() {
        assert_eq!(AppError::BarNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::IngredientNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::CocktailNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = AppError::UnknownRole(9).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn malformed_query_string_gets_the_json_error_body() {
        use std::collections::HashMap;

        use axum::{extract::Query, http::Uri};

        let uri: Uri = "/api/ingredients?page=abc".parse().unwrap();
        let rejection = Query::<HashMap<String, u32>>::try_from_uri(&uri).unwrap_err();

        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Query string inválida");
        assert!(body["details"].is_string());
    }

    #[test]
    fn insufficient_role_is_forbidden() {
        let err = AppError::InsufficientRole { required: UserRole::General };
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
