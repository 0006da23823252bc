// src/models/shelf.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Uma linha da prateleira: o membro X possui o ingrediente Y.
// Única por (bar_membership_id, ingredient_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShelfEntry {
    pub id: Uuid,
    pub bar_membership_id: Uuid,
    pub ingredient_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfContents {
    pub bar_id: Uuid,
    pub ingredient_ids: Vec<Uuid>,
}
