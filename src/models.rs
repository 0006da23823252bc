pub mod auth;
pub mod bar;
pub mod cocktail;
pub mod ingredient;
pub mod pagination;
pub mod shelf;
