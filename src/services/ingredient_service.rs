// src/services/ingredient_service.rs

use std::collections::{HashMap, HashSet};

use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{begin_scoped, Access},
        error::AppError,
    },
    db::IngredientRepository,
    middleware::tenancy::TenantScope,
    models::{
        ingredient::{
            Image, Ingredient, IngredientCategory, IngredientListItem, ParentIngredientRef,
            UsageCount,
        },
        pagination::{PageMeta, Paginated},
    },
    services::{
        collaborators::{load_id_sets, Collaborators},
        filter::INGREDIENT_QUERY,
    },
};

#[derive(Clone)]
pub struct IngredientService {
    pool: PgPool,
    ingredient_repo: IngredientRepository,
    collaborators: Collaborators,
}

impl IngredientService {
    pub fn new(
        pool: PgPool,
        ingredient_repo: IngredientRepository,
        collaborators: Collaborators,
    ) -> Self {
        Self { pool, ingredient_repo, collaborators }
    }

    // --- LIST ---
    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &[(String, String)],
    ) -> Result<Paginated<IngredientListItem>, AppError> {
        // 1. Valida os parâmetros (qualquer erro derruba a requisição)
        let plan = INGREDIENT_QUERY.plan(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        // 2. Conjuntos de ids por requisição (prateleira, lista de compras...)
        let ids = load_id_sets(&plan, scope, &self.collaborators).await?;

        // 3. Página + total no mesmo snapshot
        let mut tx = begin_scoped(&self.pool, scope, Access::ReadOnly).await?;
        let total = self.ingredient_repo.count(&mut *tx, scope.bar_id, &plan, &ids).await?;
        let rows = self.ingredient_repo.list(&mut *tx, scope.bar_id, &plan, &ids).await?;

        // 4. Metadados em lote
        let data = self.enrich(&mut tx, scope.bar_id, rows).await?;
        tx.commit().await?;

        Ok(Paginated {
            data,
            meta: PageMeta::new(plan.page.number, plan.page.per_page, total),
        })
    }

    // --- GET ---
    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<IngredientListItem, AppError> {
        let mut tx = begin_scoped(&self.pool, scope, Access::ReadOnly).await?;

        let ingredient = self
            .ingredient_repo
            .find_by_id(&mut *tx, scope.bar_id, id)
            .await?
            .ok_or(AppError::IngredientNotFound)?;

        let mut items = self.enrich(&mut tx, scope.bar_id, vec![ingredient]).await?;
        tx.commit().await?;

        items.pop().ok_or(AppError::IngredientNotFound)
    }

    async fn enrich(
        &self,
        conn: &mut PgConnection,
        bar_id: Uuid,
        rows: Vec<Ingredient>,
    ) -> Result<Vec<IngredientListItem>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|i| i.id).collect();
        let category_ids = distinct(rows.iter().filter_map(|i| i.ingredient_category_id));
        let parent_ids = distinct(rows.iter().filter_map(|i| i.parent_ingredient_id));

        let categories = self
            .ingredient_repo
            .categories_by_ids(&mut *conn, bar_id, &category_ids)
            .await?;
        let images = self.ingredient_repo.images_for(&mut *conn, &ids).await?;
        let parents = self.ingredient_repo.parents_by_ids(&mut *conn, bar_id, &parent_ids).await?;
        let counts = self.ingredient_repo.usage_counts(&mut *conn, &ids).await?;

        Ok(assemble_items(rows, categories, images, parents, counts))
    }
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    ids.collect::<HashSet<_>>().into_iter().collect()
}

/// Junta cada ingrediente com seus metadados, preservando a ordem da página.
fn assemble_items(
    rows: Vec<Ingredient>,
    categories: Vec<IngredientCategory>,
    images: Vec<Image>,
    parents: Vec<ParentIngredientRef>,
    counts: Vec<UsageCount>,
) -> Vec<IngredientListItem> {
    let categories: HashMap<Uuid, IngredientCategory> =
        categories.into_iter().map(|c| (c.id, c)).collect();
    let parents: HashMap<Uuid, ParentIngredientRef> =
        parents.into_iter().map(|p| (p.id, p)).collect();
    let counts: HashMap<Uuid, i64> =
        counts.into_iter().map(|c| (c.ingredient_id, c.cocktails_count)).collect();

    let mut images_by_owner: HashMap<Uuid, Vec<Image>> = HashMap::new();
    for image in images {
        images_by_owner.entry(image.imageable_id).or_default().push(image);
    }

    rows.into_iter()
        .map(|ingredient| {
            let mut images = images_by_owner.remove(&ingredient.id).unwrap_or_default();
            images.sort_by_key(|img| img.sort);

            IngredientListItem {
                category: ingredient
                    .ingredient_category_id
                    .and_then(|id| categories.get(&id).cloned()),
                parent_ingredient: ingredient
                    .parent_ingredient_id
                    .and_then(|id| parents.get(&id).cloned()),
                cocktails_count: counts.get(&ingredient.id).copied().unwrap_or(0),
                images,
                ingredient,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn ingredient(name: &str) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            bar_id: Uuid::nil(),
            slug: name.to_lowercase(),
            name: name.to_string(),
            strength: Decimal::ZERO,
            description: None,
            origin: None,
            color: None,
            ingredient_category_id: None,
            parent_ingredient_id: None,
            user_id: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn image(owner: Uuid, sort: i32) -> Image {
        Image {
            id: Uuid::new_v4(),
            imageable_id: owner,
            file_path: format!("ingredients/{owner}-{sort}"),
            file_extension: "png".to_string(),
            copyright: None,
            sort,
            placeholder_hash: None,
        }
    }

    #[test]
    fn metadata_is_attached_to_the_right_ingredient() {
        let mut bourbon = ingredient("Bourbon");
        let whiskey = ingredient("Whiskey");
        let category = IngredientCategory {
            id: Uuid::new_v4(),
            bar_id: Uuid::nil(),
            name: "Destilados".to_string(),
            description: None,
        };
        bourbon.ingredient_category_id = Some(category.id);
        bourbon.parent_ingredient_id = Some(whiskey.id);

        let parent = ParentIngredientRef {
            id: whiskey.id,
            slug: whiskey.slug.clone(),
            name: whiskey.name.clone(),
        };
        let counts = vec![UsageCount { ingredient_id: bourbon.id, cocktails_count: 4 }];
        let images = vec![image(bourbon.id, 2), image(bourbon.id, 1)];
        let bourbon_id = bourbon.id;

        let items =
            assemble_items(vec![bourbon, whiskey], vec![category], images, vec![parent], counts);

        assert_eq!(items.len(), 2);
        let first = &items[0];
        assert_eq!(first.ingredient.id, bourbon_id);
        assert_eq!(first.category.as_ref().map(|c| c.name.as_str()), Some("Destilados"));
        assert_eq!(first.parent_ingredient.as_ref().map(|p| p.name.as_str()), Some("Whiskey"));
        assert_eq!(first.cocktails_count, 4);
        assert_eq!(first.images.iter().map(|i| i.sort).collect::<Vec<_>>(), vec![1, 2]);

        let second = &items[1];
        assert!(second.category.is_none());
        assert!(second.images.is_empty());
        assert_eq!(second.cocktails_count, 0);
    }

    #[test]
    fn page_order_is_preserved() {
        let rows = vec![ingredient("Gin"), ingredient("Vodka"), ingredient("Amaro")];
        let names: Vec<String> = assemble_items(rows, vec![], vec![], vec![], vec![])
            .into_iter()
            .map(|i| i.ingredient.name)
            .collect();
        assert_eq!(names, vec!["Gin", "Vodka", "Amaro"]);
    }

    #[test]
    fn distinct_drops_repeats() {
        let id = Uuid::new_v4();
        assert_eq!(distinct([id, id, id].into_iter()), vec![id]);
    }
}
