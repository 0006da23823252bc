// src/db/shelf_repo.rs

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::shelf::ShelfEntry,
    services::collaborators::{Shelf, ShoppingList},
};

#[derive(Clone)]
pub struct ShelfRepository {
    pool: PgPool,
}

impl ShelfRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotente: adicionar de novo devolve a mesma linha.
    pub async fn add_entry<'e, E>(
        &self,
        executor: E,
        membership_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<ShelfEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, ShelfEntry>(
            r#"
            INSERT INTO user_ingredients (bar_membership_id, ingredient_id)
            VALUES ($1, $2)
            ON CONFLICT (bar_membership_id, ingredient_id)
            DO UPDATE SET ingredient_id = EXCLUDED.ingredient_id
            RETURNING id, bar_membership_id, ingredient_id, created_at
            "#,
        )
        .bind(membership_id)
        .bind(ingredient_id)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    /// `true` se havia algo para remover.
    pub async fn remove_entry<'e, E>(
        &self,
        executor: E,
        membership_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM user_ingredients WHERE bar_membership_id = $1 AND ingredient_id = $2",
        )
        .bind(membership_id)
        .bind(ingredient_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Shelf for ShelfRepository {
    async fn ids_for(&self, membership_id: Uuid, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
        // O JOIN com ingredients garante que nada de outro bar entra no snapshot.
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT ui.ingredient_id
            FROM user_ingredients ui
            JOIN bar_memberships m ON m.id = ui.bar_membership_id
            JOIN ingredients i ON i.id = ui.ingredient_id
            WHERE ui.bar_membership_id = $1
              AND m.bar_id = $2
              AND i.bar_id = $2
            "#,
        )
        .bind(membership_id)
        .bind(bar_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl ShoppingList for ShelfRepository {
    async fn ids_for(&self, user_id: Uuid, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT sl.ingredient_id
            FROM user_shopping_lists sl
            JOIN bar_memberships m ON m.id = sl.bar_membership_id
            JOIN ingredients i ON i.id = sl.ingredient_id
            WHERE m.user_id = $1
              AND m.bar_id = $2
              AND m.active = true
              AND i.bar_id = $2
            "#,
        )
        .bind(user_id)
        .bind(bar_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
