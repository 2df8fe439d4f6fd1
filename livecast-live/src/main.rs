use axum::routing::{get, post};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;
mod store;

use config::AppConfig;
use services::{LiveSessionService, StreamEndpoints};
use store::PgSessionStore;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub service: LiveSessionService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    livecast_shared::middleware::init_tracing("livecast-live");

    let config = AppConfig::load()?;
    let port = config.port;

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let service = LiveSessionService::new(
        Arc::new(PgSessionStore::new(db)),
        StreamEndpoints {
            rtmp_host: config.rtmp_host.clone(),
            http_host: config.http_host.clone(),
        },
    );

    let state = Arc::new(AppState { service });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/live", get(routes::live::list_sessions).post(routes::live::create_session))
        .route(
            "/live/:id",
            get(routes::live::get_session)
                .put(routes::live::update_session)
                .delete(routes::live::destroy_session),
        )
        .route("/live/:id/status", post(routes::live::force_session_status))
        .route("/live/:id/start", post(routes::live::start_session))
        .route("/live/:id/end", post(routes::live::end_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "livecast-live starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
