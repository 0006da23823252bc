// src/db/tenancy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::bar::{BarMembershipRow, MembershipRow};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca o vínculo ATIVO do usuário com o bar.
    /// Esta é a verificação de isolamento mais importante: sem vínculo, o bar
    /// simplesmente "não existe" para quem chama.
    pub async fn find_active_membership(
        &self,
        user_id: Uuid,
        bar_id: Uuid,
    ) -> Result<Option<MembershipRow>, AppError> {
        let membership = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT m.id, m.bar_id, m.user_id, m.user_role_id, m.active
            FROM bar_memberships m
            JOIN bars b ON b.id = m.bar_id
            WHERE m.user_id = $1
              AND m.bar_id = $2
              AND m.active = true
            "#,
        )
        .bind(user_id)
        .bind(bar_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Todos os bares em que o usuário tem vínculo ativo.
    pub async fn list_memberships_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BarMembershipRow>, AppError> {
        let rows = sqlx::query_as::<_, BarMembershipRow>(
            r#"
            SELECT
                m.id AS membership_id,
                b.id AS bar_id,
                b.name AS bar_name,
                b.subtitle AS bar_subtitle,
                m.user_role_id
            FROM bar_memberships m
            JOIN bars b ON b.id = m.bar_id
            WHERE m.user_id = $1 AND m.active = true
            ORDER BY b.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
