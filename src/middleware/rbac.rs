// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::bar::UserRole,
};

/// 1. O Trait que define o papel mínimo exigido
pub trait RoleRequirement: Send + Sync + 'static {
    fn minimum() -> UserRole;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

pub fn check_role<T: RoleRequirement>(scope: &TenantScope) -> Result<(), AppError> {
    let required = T::minimum();
    if scope.role.satisfies(required) {
        Ok(())
    } else {
        tracing::info!(
            user_id = %scope.user_id,
            bar_id = %scope.bar_id,
            role = ?scope.role,
            required = ?required,
            "Acesso negado por papel insuficiente"
        );
        Err(AppError::InsufficientRole { required })
    }
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O escopo já foi resolvido pelo `bar_guard`
        let scope = parts
            .extensions
            .get::<TenantScope>()
            .ok_or(AppError::MissingBarHeader)?;

        check_role::<T>(scope)?;

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS MÍNIMOS (TIPOS)
// ---

pub struct AtLeastGeneral;
impl RoleRequirement for AtLeastGeneral {
    fn minimum() -> UserRole { UserRole::General }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scope(role: UserRole) -> TenantScope {
        TenantScope {
            bar_id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn guests_cannot_edit_shelves() {
        assert!(matches!(
            check_role::<AtLeastGeneral>(&scope(UserRole::Guest)),
            Err(AppError::InsufficientRole { required: UserRole::General })
        ));
    }

    #[test]
    fn general_and_above_pass() {
        for role in [UserRole::General, UserRole::Moderator, UserRole::Admin] {
            assert!(check_role::<AtLeastGeneral>(&scope(role)).is_ok());
        }
    }
}
