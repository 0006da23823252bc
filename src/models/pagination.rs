// src/models/pagination.rs

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

impl PageMeta {
    pub fn new(current_page: u32, per_page: u32, total: i64) -> Self {
        let per_page_i64 = i64::from(per_page.max(1));
        let last_page = ((total + per_page_i64 - 1) / per_page_i64).max(1);
        Self {
            current_page,
            per_page,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }
}

// Resposta paginada padrão das coleções filtráveis
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
