pub mod availability;
pub mod cocktail_service;
pub mod collaborators;
pub mod filter;
pub mod ingredient_service;
pub mod shelf_service;
pub mod tenancy_service;
