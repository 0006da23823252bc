// src/models/bar.rs

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// 1. UserRole (Papel do membro dentro do bar)
// ---
// No banco é um id (1 = Admin ... 4 = Guest). Ids menores significam MAIS
// privilégio, por isso nunca comparamos o id diretamente: a ordem vem de
// `privilege()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Moderator,
    General,
    Guest,
}

impl UserRole {
    pub const ALL: [UserRole; 4] =
        [UserRole::Admin, UserRole::Moderator, UserRole::General, UserRole::Guest];

    /// Tabela explícita de privilégios: quanto maior, mais permissões.
    pub fn privilege(self) -> u8 {
        match self {
            UserRole::Admin => 3,
            UserRole::Moderator => 2,
            UserRole::General => 1,
            UserRole::Guest => 0,
        }
    }

    /// `true` se este papel tem pelo menos os privilégios de `required`.
    pub fn satisfies(self, required: UserRole) -> bool {
        self.privilege() >= required.privilege()
    }

    /// Id persistido em `user_roles`. Única fonte da conversão nos dois sentidos.
    pub fn role_id(self) -> i32 {
        match self {
            UserRole::Admin => 1,
            UserRole::Moderator => 2,
            UserRole::General => 3,
            UserRole::Guest => 4,
        }
    }
}

impl TryFrom<i32> for UserRole {
    type Error = AppError;

    fn try_from(role_id: i32) -> Result<Self, Self::Error> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.role_id() == role_id)
            .ok_or(AppError::UnknownRole(role_id))
    }
}

impl PartialOrd for UserRole {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UserRole {
    fn cmp(&self, other: &Self) -> Ordering {
        self.privilege().cmp(&other.privilege())
    }
}

// ---
// 2. Membership (A "Ponte" Usuário-Bar)
// ---
// Como vem do banco: o papel ainda é o id cru.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub id: Uuid,
    pub bar_id: Uuid,
    pub user_id: Uuid,
    pub user_role_id: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub bar_id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub active: bool,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            bar_id: row.bar_id,
            user_id: row.user_id,
            role: UserRole::try_from(row.user_role_id)?,
            active: row.active,
        })
    }
}

// Listagem "meus bares"
#[derive(Debug, Clone, FromRow)]
pub struct BarMembershipRow {
    pub membership_id: Uuid,
    pub bar_id: Uuid,
    pub bar_name: String,
    pub bar_subtitle: Option<String>,
    pub user_role_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarMembershipView {
    pub membership_id: Uuid,
    pub bar_id: Uuid,
    pub bar_name: String,
    pub bar_subtitle: Option<String>,
    pub role: UserRole,
}

impl TryFrom<BarMembershipRow> for BarMembershipView {
    type Error = AppError;

    fn try_from(row: BarMembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            membership_id: row.membership_id,
            bar_id: row.bar_id,
            bar_name: row.bar_name,
            bar_subtitle: row.bar_subtitle,
            role: UserRole::try_from(row.user_role_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_the_most_privileged_role() {
        assert!(UserRole::Admin > UserRole::Moderator);
        assert!(UserRole::Moderator > UserRole::General);
        assert!(UserRole::General > UserRole::Guest);
    }

    #[test]
    fn ordering_does_not_follow_the_persisted_id() {
        // Admin tem o menor id e o maior privilégio.
        assert!(UserRole::Admin.role_id() < UserRole::Guest.role_id());
        assert!(UserRole::Admin.satisfies(UserRole::Guest));
        assert!(!UserRole::Guest.satisfies(UserRole::Admin));
    }

    #[test]
    fn role_ids_round_trip_through_the_table() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::try_from(role.role_id()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_id_is_rejected() {
        assert!(matches!(UserRole::try_from(0), Err(AppError::UnknownRole(0))));
        assert!(matches!(UserRole::try_from(5), Err(AppError::UnknownRole(5))));
    }

    #[test]
    fn membership_row_converts_role() {
        let row = MembershipRow {
            id: Uuid::new_v4(),
            bar_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_role_id: 3,
            active: true,
        };
        let membership = Membership::try_from(row).unwrap();
        assert_eq!(membership.role, UserRole::General);
    }
}
