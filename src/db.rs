pub mod cocktail_repo;
pub use cocktail_repo::CocktailRepository;
pub mod filter_sql;
pub mod ingredient_repo;
pub use ingredient_repo::IngredientRepository;
pub mod shelf_repo;
pub use shelf_repo::ShelfRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
