//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use barkeep::{
    config::{AppState, Config},
    handlers,
    middleware::{auth::auth_guard, tenancy::bar_guard},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG manda, `info` se não houver nada.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let public_routes = Router::new().route("/health", get(|| async { "OK" }));

    // Rotas que só precisam de usuário autenticado
    let user_routes = Router::new()
        .route("/bars", get(handlers::bars::list_my_bars))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas de bar: auth_guard (externo) roda antes do bar_guard (interno)
    let bar_routes = Router::new()
        .route("/ingredients", get(handlers::ingredients::list_ingredients))
        .route("/ingredients/{id}", get(handlers::ingredients::get_ingredient))
        .route("/cocktails", get(handlers::cocktails::list_cocktails))
        .route(
            "/cocktails/{id}/availability",
            get(handlers::cocktails::get_cocktail_availability),
        )
        .route("/shelf", get(handlers::shelf::get_my_shelf))
        .route(
            "/shelf/ingredients/{id}",
            put(handlers::shelf::add_to_shelf).delete(handlers::shelf::remove_from_shelf),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            bar_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .nest("/api", public_routes.merge(user_routes).merge(bar_routes))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
