// src/models/cocktail.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- 1. Coquetel ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cocktail {
    pub id: Uuid,
    pub bar_id: Uuid,
    pub slug: String,
    pub name: String,
    pub instructions: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub garnish: Option<String>,
    pub abv: Option<Decimal>,
    pub glass_id: Option<Uuid>,
    pub cocktail_method_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Linha da receita (cocktail_ingredients) ---
// Pertence ao coquetel; apagada junto com ele.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CocktailIngredientLine {
    pub id: Uuid,
    pub cocktail_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub amount: Decimal,
    pub amount_max: Option<Decimal>,
    pub units: String,
    pub sort: i32,
    pub optional: bool,
}

// --- 3. Substituto ---
// Vale só para a linha dona, não para o ingrediente em geral.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Substitute {
    pub id: Uuid,
    pub cocktail_ingredient_id: Uuid,
    pub ingredient_id: Uuid,
}

// --- 4. Respostas ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailLineView {
    #[serde(flatten)]
    pub line: CocktailIngredientLine,
    pub substitutes: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailListItem {
    #[serde(flatten)]
    pub cocktail: Cocktail,
    pub ingredients: Vec<CocktailLineView>,
}
