// src/services/collaborators.rs
//
// Interfaces que o núcleo consome. As implementações Postgres ficam nos
// repositórios; os testes usam versões em memória.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    services::{
        availability::ShelfSnapshot,
        filter::{IdSets, IdSource, QueryPlan},
    },
};

#[async_trait]
pub trait Shelf: Send + Sync {
    /// Ingredientes que o membro possui neste bar.
    async fn ids_for(&self, membership_id: Uuid, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError>;
}

#[async_trait]
pub trait ShoppingList: Send + Sync {
    async fn ids_for(&self, user_id: Uuid, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError>;
}

#[async_trait]
pub trait MainIngredientClassifier: Send + Sync {
    async fn ids_for(&self, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError>;
}

// Os três colaboradores juntos, compartilhados pelos serviços.
#[derive(Clone)]
pub struct Collaborators {
    pub shelf: Arc<dyn Shelf>,
    pub shopping_list: Arc<dyn ShoppingList>,
    pub classifier: Arc<dyn MainIngredientClassifier>,
}

/// Carrega a prateleira de quem chama. Se a carga falhar, o snapshot fica
/// "não carregado" e nada conta como disponível.
pub async fn load_snapshot(shelf: &dyn Shelf, scope: &TenantScope) -> ShelfSnapshot {
    match shelf.ids_for(scope.membership_id, scope.bar_id).await {
        Ok(ids) => ShelfSnapshot::new(ids),
        Err(e) => {
            tracing::warn!(
                membership_id = %scope.membership_id,
                bar_id = %scope.bar_id,
                "Falha ao carregar a prateleira: {}",
                e
            );
            ShelfSnapshot::unavailable()
        }
    }
}

/// Carrega só os conjuntos de ids que o plano usa.
pub async fn load_id_sets(
    plan: &QueryPlan,
    scope: &TenantScope,
    collaborators: &Collaborators,
) -> Result<IdSets, AppError> {
    let mut sets = IdSets::default();

    for source in plan.id_sources() {
        let ids = match source {
            IdSource::Shelf => load_snapshot(collaborators.shelf.as_ref(), scope).await.ids(),
            IdSource::ShoppingList => {
                collaborators.shopping_list.ids_for(scope.user_id, scope.bar_id).await?
            }
            IdSource::MainIngredients => collaborators.classifier.ids_for(scope.bar_id).await?,
        };
        sets.insert(source, ids);
    }

    Ok(sets)
}

#[cfg(test)]
pub mod fakes {
    use std::collections::HashMap;

    use super::*;

    // Prateleiras em memória, por (membro, bar).
    #[derive(Default)]
    pub struct InMemoryShelf {
        pub shelves: HashMap<(Uuid, Uuid), HashSet<Uuid>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Shelf for InMemoryShelf {
        async fn ids_for(
            &self,
            membership_id: Uuid,
            bar_id: Uuid,
        ) -> Result<HashSet<Uuid>, AppError> {
            if self.fail {
                let cause = anyhow::anyhow!("prateleira indisponível");
                return Err(AppError::InternalServerError(cause));
            }
            Ok(self.shelves.get(&(membership_id, bar_id)).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    pub struct InMemoryShoppingList {
        pub lists: HashMap<(Uuid, Uuid), HashSet<Uuid>>,
    }

    #[async_trait]
    impl ShoppingList for InMemoryShoppingList {
        async fn ids_for(&self, user_id: Uuid, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
            Ok(self.lists.get(&(user_id, bar_id)).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    pub struct FixedClassifier {
        pub by_bar: HashMap<Uuid, HashSet<Uuid>>,
    }

    #[async_trait]
    impl MainIngredientClassifier for FixedClassifier {
        async fn ids_for(&self, bar_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
            Ok(self.by_bar.get(&bar_id).cloned().unwrap_or_default())
        }
    }
}
