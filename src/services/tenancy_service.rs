// src/services/tenancy_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenantRepository,
    middleware::tenancy::TenantScope,
    models::bar::{BarMembershipView, Membership, MembershipRow},
};

#[derive(Clone)]
pub struct TenancyService {
    tenant_repo: TenantRepository,
}

impl TenancyService {
    pub fn new(tenant_repo: TenantRepository) -> Self {
        Self { tenant_repo }
    }

    /// Resolve (bar, vínculo, papel) para o usuário. Sem vínculo ativo o bar
    /// "não existe" para quem chama, qualquer que seja o motivo.
    pub async fn resolve_scope(
        &self,
        user_id: Uuid,
        bar_id: Uuid,
    ) -> Result<TenantScope, AppError> {
        let row = self.tenant_repo.find_active_membership(user_id, bar_id).await?;
        scope_from_membership(row, user_id, bar_id)
    }

    pub async fn list_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BarMembershipView>, AppError> {
        self.tenant_repo
            .list_memberships_for_user(user_id)
            .await?
            .into_iter()
            .map(BarMembershipView::try_from)
            .collect()
    }
}

fn scope_from_membership(
    row: Option<MembershipRow>,
    user_id: Uuid,
    bar_id: Uuid,
) -> Result<TenantScope, AppError> {
    let Some(row) = row else {
        tracing::info!(%user_id, %bar_id, "Acesso a bar sem vínculo ativo");
        return Err(AppError::BarNotFound);
    };

    let membership = Membership::try_from(row)?;

    // A consulta já filtra por usuário, bar e ativo; isto só impede que um
    // vínculo errado vire escopo.
    if membership.bar_id != bar_id || membership.user_id != user_id || !membership.active {
        return Err(AppError::BarNotFound);
    }

    Ok(TenantScope {
        bar_id: membership.bar_id,
        membership_id: membership.id,
        user_id: membership.user_id,
        role: membership.role,
    })
}
