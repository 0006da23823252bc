// src/common/db_utils.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::common::error::AppError;
use crate::middleware::tenancy::TenantScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Leituras: um único snapshot consistente para todas as consultas.
    ReadOnly,
    ReadWrite,
}

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define as variáveis RLS (`app.bar_id`, `app.user_id`).
/// `set_config(..., true)` só vale dentro da transação, por isso ela é aberta aqui.
pub(crate) async fn begin_scoped(
    pool: &PgPool,
    scope: &TenantScope,
    access: Access,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // 1. Abre a transação
    let mut tx = pool.begin().await?;

    // 2. Isolamento (tem que ser o primeiro comando da transação)
    if access == Access::ReadOnly {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
    }

    // 3. Define Bar ID
    sqlx::query("SELECT set_config('app.bar_id', $1, true)")
        .bind(scope.bar_id.to_string())
        .execute(&mut *tx)
        .await?;

    // 4. Define User ID
    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(scope.user_id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
