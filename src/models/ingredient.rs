// src/models/ingredient.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IngredientCategory {
    pub id: Uuid,
    pub bar_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

// --- 2. Ingredientes ---
// `parent_ingredient_id` aponta para outro ingrediente do MESMO bar
// (ex: "Bourbon" -> "Whiskey").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub bar_id: Uuid,
    pub slug: String,
    pub name: String,
    pub strength: Decimal,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub color: Option<String>,
    pub ingredient_category_id: Option<Uuid>,
    pub parent_ingredient_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 3. Partes (ingrediente composto) ---
// "Sour Mix" -> { "Lime", "Sugar" }. Uma linha por parte.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPart {
    pub ingredient_id: Uuid,
    pub part_ingredient_id: Uuid,
}

// --- 4. Metadados carregados em lote para a listagem ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub imageable_id: Uuid,
    pub file_path: String,
    pub file_extension: String,
    pub copyright: Option<String>,
    pub sort: i32,
    pub placeholder_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParentIngredientRef {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UsageCount {
    pub ingredient_id: Uuid,
    pub cocktails_count: i64,
}

// O que a API devolve: o ingrediente + tudo que o frontend precisa para
// desenhar o card, sem uma consulta extra por item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientListItem {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub category: Option<IngredientCategory>,
    pub images: Vec<Image>,
    pub parent_ingredient: Option<ParentIngredientRef>,
    pub cocktails_count: i64,
}
