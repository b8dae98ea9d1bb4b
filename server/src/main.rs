use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use partners_server::config::Config;
use partners_server::engine::PartnershipEngine;
use partners_server::gateways::{JsonSnapshotRenderer, LocalObjectStore, LogNotificationGateway};
use partners_server::routes::create_routes;
use partners_server::state::AppState;
use partners_server::store::PgPartnershipStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("partners_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    let store = PgPartnershipStore::new(pool);
    store.migrate().await.expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let engine = PartnershipEngine::new(
        Arc::new(store),
        Arc::new(JsonSnapshotRenderer),
        Arc::new(LocalObjectStore::new(
            config.storage_dir.clone(),
            config.public_base_url.clone(),
        )),
        Arc::new(LogNotificationGateway),
    );
    let app: Router = create_routes(AppState::new(engine), &config);

    tracing::info!("Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
