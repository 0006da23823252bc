// src/services/shelf_service.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{begin_scoped, Access},
        error::AppError,
    },
    db::{IngredientRepository, ShelfRepository},
    middleware::tenancy::TenantScope,
    models::shelf::{ShelfContents, ShelfEntry},
    services::collaborators::Shelf,
};

#[derive(Clone)]
pub struct ShelfService {
    pool: PgPool,
    shelf: Arc<dyn Shelf>,
    shelf_repo: ShelfRepository,
    ingredient_repo: IngredientRepository,
}

impl ShelfService {
    pub fn new(
        pool: PgPool,
        shelf: Arc<dyn Shelf>,
        shelf_repo: ShelfRepository,
        ingredient_repo: IngredientRepository,
    ) -> Self {
        Self { pool, shelf, shelf_repo, ingredient_repo }
    }

    /// Aqui a falha vira erro: quem pede a lista precisa saber que ela não veio.
    pub async fn list(&self, scope: &TenantScope) -> Result<ShelfContents, AppError> {
        let ids = self.shelf.ids_for(scope.membership_id, scope.bar_id).await?;
        Ok(sorted_contents(scope.bar_id, ids))
    }

    pub async fn add(
        &self,
        scope: &TenantScope,
        ingredient_id: Uuid,
    ) -> Result<ShelfEntry, AppError> {
        let mut tx = begin_scoped(&self.pool, scope, Access::ReadWrite).await?;

        // Ingrediente de outro bar responde igual a um inexistente.
        if !self.ingredient_repo.exists_in_bar(&mut *tx, scope.bar_id, ingredient_id).await? {
            return Err(AppError::IngredientNotFound);
        }

        let entry = self
            .shelf_repo
            .add_entry(&mut *tx, scope.membership_id, ingredient_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            membership_id = %scope.membership_id,
            %ingredient_id,
            "Ingrediente adicionado à prateleira"
        );
        Ok(entry)
    }

    /// Remover algo que já não está na prateleira não é erro.
    pub async fn remove(&self, scope: &TenantScope, ingredient_id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, scope, Access::ReadWrite).await?;

        if !self.ingredient_repo.exists_in_bar(&mut *tx, scope.bar_id, ingredient_id).await? {
            return Err(AppError::IngredientNotFound);
        }

        let removed = self
            .shelf_repo
            .remove_entry(&mut *tx, scope.membership_id, ingredient_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            membership_id = %scope.membership_id,
            %ingredient_id,
            removed,
            "Ingrediente removido da prateleira"
        );
        Ok(())
    }
}

fn sorted_contents(bar_id: Uuid, ids: impl IntoIterator<Item = Uuid>) -> ShelfContents {
    let mut ingredient_ids: Vec<Uuid> = ids.into_iter().collect();
    ingredient_ids.sort();
    ShelfContents { bar_id, ingredient_ids }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_are_listed_in_a_stable_order() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let mut reversed = ids.clone();
        reversed.reverse();

        let bar_id = Uuid::new_v4();
        let a = sorted_contents(bar_id, ids);
        let b = sorted_contents(bar_id, reversed);
        assert_eq!(a.ingredient_ids, b.ingredient_ids);
        assert_eq!(a.bar_id, bar_id);
    }
}
