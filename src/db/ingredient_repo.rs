// src/db/ingredient_repo.rs

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::filter_sql::{self, INGREDIENTS},
    models::ingredient::{
        Image, Ingredient, IngredientCategory, IngredientPart, ParentIngredientRef, UsageCount,
    },
    services::{
        collaborators::MainIngredientClassifier,
        filter::{IdSets, QueryPlan},
    },
};

#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Listagem filtrada
    // ---

    pub async fn list<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        plan: &QueryPlan,
        ids: &IdSets,
    ) -> Result<Vec<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut query = filter_sql::select_page(INGREDIENTS, bar_id, plan, ids, true);
        let rows = query.build_query_as::<Ingredient>().fetch_all(executor).await?;
        Ok(rows)
    }

    pub async fn count<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        plan: &QueryPlan,
        ids: &IdSets,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut query = filter_sql::count(INGREDIENTS, bar_id, plan, ids);
        let total = query.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(total)
    }

    /// Ingrediente de outro bar = `None`, igual a um id inexistente.
    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT * FROM ingredients WHERE bar_id = $1 AND id = $2",
        )
        .bind(bar_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(ingredient)
    }

    pub async fn exists_in_bar<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ingredients WHERE bar_id = $1 AND id = $2)",
        )
        .bind(bar_id)
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    // ---
    // Carregamento em lote (uma consulta por tipo, nunca por item)
    // ---

    pub async fn categories_by_ids<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<IngredientCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, IngredientCategory>(
            r#"
            SELECT id, bar_id, name, description
            FROM ingredient_categories
            WHERE bar_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(bar_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(categories)
    }

    pub async fn images_for<'e, E>(
        &self,
        executor: E,
        ingredient_ids: &[Uuid],
    ) -> Result<Vec<Image>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, imageable_id, file_path, file_extension, copyright, sort, placeholder_hash
            FROM images
            WHERE imageable_type = 'ingredient' AND imageable_id = ANY($1)
            ORDER BY imageable_id, sort ASC
            "#,
        )
        .bind(ingredient_ids)
        .fetch_all(executor)
        .await?;
        Ok(images)
    }

    pub async fn parents_by_ids<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<ParentIngredientRef>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parents = sqlx::query_as::<_, ParentIngredientRef>(
            "SELECT id, slug, name FROM ingredients WHERE bar_id = $1 AND id = ANY($2)",
        )
        .bind(bar_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(parents)
    }

    /// Quantas linhas de receita usam cada ingrediente.
    pub async fn usage_counts<'e, E>(
        &self,
        executor: E,
        ingredient_ids: &[Uuid],
    ) -> Result<Vec<UsageCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, UsageCount>(
            r#"
            SELECT ingredient_id, COUNT(*) AS cocktails_count
            FROM cocktail_ingredients
            WHERE ingredient_id = ANY($1)
            GROUP BY ingredient_id
            "#,
        )
        .bind(ingredient_ids)
        .fetch_all(executor)
        .await?;
        Ok(counts)
    }

    /// Partes diretas (um nível) dos ingredientes compostos informados.
    pub async fn parts_for<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        ingredient_ids: &[Uuid],
    ) -> Result<Vec<IngredientPart>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parts = sqlx::query_as::<_, IngredientPart>(
            r#"
            SELECT p.ingredient_id, p.part_ingredient_id
            FROM ingredient_parts p
            JOIN ingredients i ON i.id = p.ingredient_id
            WHERE i.bar_id = $1 AND p.ingredient_id = ANY($2)
            "#,
        )
        .bind(bar_id)
        .bind(ingredient_ids)
        .fetch_all(executor)
        .await?;
        Ok(parts)
    }
}

// O ingrediente principal de um coquetel é a linha com o menor `sort`.
#[async_trait]
impl MainIngredientClassifier for IngredientRepository {
    async fn ids_for(&self, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT ON (ci.cocktail_id) ci.ingredient_id
            FROM cocktail_ingredients ci
            JOIN cocktails c ON c.id = ci.cocktail_id
            WHERE c.bar_id = $1
            ORDER BY ci.cocktail_id, ci.sort ASC, ci.id ASC
            "#,
        )
        .bind(bar_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
