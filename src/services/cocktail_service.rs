// src/services/cocktail_service.rs

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{begin_scoped, Access},
        error::AppError,
    },
    db::{CocktailRepository, IngredientRepository},
    middleware::tenancy::TenantScope,
    models::{
        cocktail::{Cocktail, CocktailIngredientLine, CocktailLineView, CocktailListItem},
        pagination::{PageMeta, Paginated},
    },
    services::{
        availability::{
            availability_report, is_makeable, AvailabilityReport, CompoundIngredientIndex,
            LineDescriptor, ShelfSnapshot, SubstitutionGraph,
        },
        collaborators::{load_id_sets, load_snapshot, Collaborators},
        filter::{Page, PostFilter, COCKTAIL_QUERY},
    },
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailAvailability {
    pub cocktail_id: Uuid,
    #[serde(flatten)]
    pub report: AvailabilityReport,
}

// Tudo que foi carregado sobre as receitas de um conjunto de coquetéis.
struct Recipes {
    lines: Vec<CocktailIngredientLine>,
    substitutes: SubstitutionGraph,
    compounds: CompoundIngredientIndex,
}

#[derive(Clone)]
pub struct CocktailService {
    pool: PgPool,
    cocktail_repo: CocktailRepository,
    ingredient_repo: IngredientRepository,
    collaborators: Collaborators,
}

impl CocktailService {
    pub fn new(
        pool: PgPool,
        cocktail_repo: CocktailRepository,
        ingredient_repo: IngredientRepository,
        collaborators: Collaborators,
    ) -> Self {
        Self { pool, cocktail_repo, ingredient_repo, collaborators }
    }

    // --- LIST ---
    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &[(String, String)],
    ) -> Result<Paginated<CocktailListItem>, AppError> {
        let plan = COCKTAIL_QUERY.plan(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let ids = load_id_sets(&plan, scope, &self.collaborators).await?;

        // A prateleira usa a própria conexão do pool: tem que ser lida antes de
        // a transação segurar outra.
        let shelf = if plan.needs_post_filter(PostFilter::Makeable) {
            Some(load_snapshot(self.collaborators.shelf.as_ref(), scope).await)
        } else {
            None
        };

        let mut tx = begin_scoped(&self.pool, scope, Access::ReadOnly).await?;

        let (page_rows, recipes, total) = if let Some(shelf) = shelf {
            // Disponibilidade não vira SQL: busca tudo que passou nos predicados,
            // corta pela prateleira e só então pagina.
            let rows = self
                .cocktail_repo
                .list(&mut *tx, scope.bar_id, &plan, &ids, false)
                .await?;
            let recipes = self.load_recipes(&mut tx, scope.bar_id, &rows).await?;

            let makeable = keep_makeable(rows, &recipes, &shelf);
            let total = i64::try_from(makeable.len()).unwrap_or(i64::MAX);
            (page_slice(makeable, &plan.page), recipes, total)
        } else {
            let total = self.cocktail_repo.count(&mut *tx, scope.bar_id, &plan, &ids).await?;
            let rows = self.cocktail_repo.list(&mut *tx, scope.bar_id, &plan, &ids, true).await?;
            let recipes = self.load_recipes(&mut tx, scope.bar_id, &rows).await?;
            (rows, recipes, total)
        };

        tx.commit().await?;

        Ok(Paginated {
            data: assemble_items(page_rows, recipes),
            meta: PageMeta::new(plan.page.number, plan.page.per_page, total),
        })
    }

    // --- AVAILABILITY ---
    /// Relatório linha a linha para a prateleira de quem chama.
    pub async fn availability(
        &self,
        scope: &TenantScope,
        cocktail_id: Uuid,
    ) -> Result<CocktailAvailability, AppError> {
        let mut tx = begin_scoped(&self.pool, scope, Access::ReadOnly).await?;

        let cocktail = self
            .cocktail_repo
            .find_by_id(&mut *tx, scope.bar_id, cocktail_id)
            .await?
            .ok_or(AppError::CocktailNotFound)?;

        let recipes = self
            .load_recipes(&mut tx, scope.bar_id, std::slice::from_ref(&cocktail))
            .await?;
        tx.commit().await?;

        // Carregada uma vez e usada em todas as linhas.
        let shelf = load_snapshot(self.collaborators.shelf.as_ref(), scope).await;
        let descriptors = descriptors_by_cocktail(&recipes)
            .remove(&cocktail.id)
            .unwrap_or_default();

        let report = availability_report(&shelf, &descriptors);
        tracing::debug!(
            %cocktail_id,
            makeable = report.makeable,
            missing = report.missing_count,
            "Disponibilidade calculada"
        );

        Ok(CocktailAvailability { cocktail_id: cocktail.id, report })
    }

    async fn load_recipes(
        &self,
        conn: &mut PgConnection,
        bar_id: Uuid,
        cocktails: &[Cocktail],
    ) -> Result<Recipes, AppError> {
        if cocktails.is_empty() {
            return Ok(Recipes {
                lines: Vec::new(),
                substitutes: SubstitutionGraph::default(),
                compounds: CompoundIngredientIndex::default(),
            });
        }

        let cocktail_ids: Vec<Uuid> = cocktails.iter().map(|c| c.id).collect();
        let lines = self.cocktail_repo.lines_for_cocktails(&mut *conn, &cocktail_ids).await?;

        let line_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
        let ingredient_ids: Vec<Uuid> = lines.iter().map(|l| l.ingredient_id).collect();

        let substitutes = self.cocktail_repo.substitutes_for_lines(&mut *conn, &line_ids).await?;
        let parts = self.ingredient_repo.parts_for(&mut *conn, bar_id, &ingredient_ids).await?;

        Ok(Recipes {
            lines,
            substitutes: SubstitutionGraph::from_substitutes(&substitutes),
            compounds: CompoundIngredientIndex::from_parts(&parts),
        })
    }
}

fn descriptors_by_cocktail(recipes: &Recipes) -> HashMap<Uuid, Vec<LineDescriptor>> {
    let mut by_cocktail: HashMap<Uuid, Vec<LineDescriptor>> = HashMap::new();
    for line in &recipes.lines {
        by_cocktail
            .entry(line.cocktail_id)
            .or_default()
            .push(LineDescriptor::assemble(line, &recipes.substitutes, &recipes.compounds));
    }
    by_cocktail
}

/// Mantém a ordem recebida (a ordenação já veio do SQL).
fn keep_makeable(
    cocktails: Vec<Cocktail>,
    recipes: &Recipes,
    shelf: &ShelfSnapshot,
) -> Vec<Cocktail> {
    if !shelf.is_loaded() {
        return Vec::new();
    }

    let descriptors = descriptors_by_cocktail(recipes);
    cocktails
        .into_iter()
        .filter(|c| {
            let lines = descriptors.get(&c.id).map(Vec::as_slice).unwrap_or(&[]);
            is_makeable(shelf, lines)
        })
        .collect()
}

fn page_slice<T>(items: Vec<T>, page: &Page) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn assemble_items(cocktails: Vec<Cocktail>, recipes: Recipes) -> Vec<CocktailListItem> {
    let mut lines_by_cocktail: HashMap<Uuid, Vec<CocktailLineView>> = HashMap::new();
    for line in recipes.lines {
        let substitutes = recipes.substitutes.substitutes_for(&line.id).to_vec();
        lines_by_cocktail
            .entry(line.cocktail_id)
            .or_default()
            .push(CocktailLineView { line, substitutes });
    }

    cocktails
        .into_iter()
        .map(|cocktail| CocktailListItem {
            ingredients: lines_by_cocktail.remove(&cocktail.id).unwrap_or_default(),
            cocktail,
        })
        .collect()
}
