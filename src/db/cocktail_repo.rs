// src/db/cocktail_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::filter_sql::{self, COCKTAILS},
    models::cocktail::{Cocktail, CocktailIngredientLine, Substitute},
    services::filter::{IdSets, QueryPlan},
};

#[derive(Clone, Default)]
pub struct CocktailRepository;

impl CocktailRepository {
    pub fn new() -> Self {
        Self
    }

    /// `paginate = false` quando o filtro `on_shelf` ainda vai cortar linhas em memória.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        plan: &QueryPlan,
        ids: &IdSets,
        paginate: bool,
    ) -> Result<Vec<Cocktail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut query = filter_sql::select_page(COCKTAILS, bar_id, plan, ids, paginate);
        let rows = query.build_query_as::<Cocktail>().fetch_all(executor).await?;
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
        let mut query = filter_sql::count(COCKTAILS, bar_id, plan, ids);
        let total = query.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(total)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        bar_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Cocktail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cocktail = sqlx::query_as::<_, Cocktail>(
            "SELECT * FROM cocktails WHERE bar_id = $1 AND id = $2",
        )
        .bind(bar_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(cocktail)
    }

    /// Linhas de receita de vários coquetéis de uma vez, na ordem da receita.
    pub async fn lines_for_cocktails<'e, E>(
        &self,
        executor: E,
        cocktail_ids: &[Uuid],
    ) -> Result<Vec<CocktailIngredientLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, CocktailIngredientLine>(
            r#"
            SELECT
                ci.id,
                ci.cocktail_id,
                ci.ingredient_id,
                i.name AS ingredient_name,
                ci.amount,
                ci.amount_max,
                ci.units,
                ci.sort,
                ci.optional
            FROM cocktail_ingredients ci
            JOIN ingredients i ON i.id = ci.ingredient_id
            WHERE ci.cocktail_id = ANY($1)
            ORDER BY ci.cocktail_id, ci.sort ASC, ci.id ASC
            "#,
        )
        .bind(cocktail_ids)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    pub async fn substitutes_for_lines<'e, E>(
        &self,
        executor: E,
        line_ids: &[Uuid],
    ) -> Result<Vec<Substitute>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let substitutes = sqlx::query_as::<_, Substitute>(
            r#"
            SELECT id, cocktail_ingredient_id, ingredient_id
            FROM cocktail_ingredient_substitutes
            WHERE cocktail_ingredient_id = ANY($1)
            "#,
        )
        .bind(line_ids)
        .fetch_all(executor)
        .await?;
        Ok(substitutes)
    }
}
