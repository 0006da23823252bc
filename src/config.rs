// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CocktailRepository, IngredientRepository, ShelfRepository, TenantRepository},
    services::{
        cocktail_service::CocktailService, collaborators::Collaborators,
        ingredient_service::IngredientService, shelf_service::ShelfService,
        tenancy_service::TenancyService,
    },
};

// ---
// 1. Config (lida do ambiente / .env)
// ---
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado de `from_env` para ser testável sem mexer no ambiente do processo.
    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR inválido")?;

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().context("DATABASE_MAX_CONNECTIONS inválido")?,
            None => 5,
        };

        let acquire_timeout_secs = match lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().context("DATABASE_ACQUIRE_TIMEOUT_SECS inválido")?,
            None => 3,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            database_max_connections,
            database_acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

// ---
// 2. AppState (compartilhado por todos os handlers)
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub tenancy_service: TenancyService,
    pub ingredient_service: IngredientService,
    pub cocktail_service: CocktailService,
    pub shelf_service: ShelfService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let ingredient_repo = IngredientRepository::new(db_pool.clone());
        let shelf_repo = ShelfRepository::new(db_pool.clone());
        let cocktail_repo = CocktailRepository::new();

        let collaborators = Collaborators {
            shelf: Arc::new(shelf_repo.clone()),
            shopping_list: Arc::new(shelf_repo.clone()),
            classifier: Arc::new(ingredient_repo.clone()),
        };

        let tenancy_service = TenancyService::new(tenant_repo);
        let ingredient_service =
            IngredientService::new(db_pool.clone(), ingredient_repo.clone(), collaborators.clone());
        let cocktail_service = CocktailService::new(
            db_pool.clone(),
            cocktail_repo,
            ingredient_repo.clone(),
            collaborators.clone(),
        );
        let shelf_service = ShelfService::new(
            db_pool.clone(),
            collaborators.shelf.clone(),
            shelf_repo,
            ingredient_repo,
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            tenancy_service,
            ingredient_service,
            cocktail_service,
            shelf_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/barkeep"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn required_vars_must_be_present() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "segredo")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn malformed_values_fail_start_up() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/barkeep"),
            ("JWT_SECRET", "segredo"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/barkeep"),
            ("JWT_SECRET", "segredo"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(10));
    }
}
