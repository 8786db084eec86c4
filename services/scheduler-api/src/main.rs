mod engine;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use scheduler_store::{DocumentStoreClient, VehicleStore};
use shared::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    shared::logging::init_logging(settings.debug);

    tracing::info!(
        num_vehicles = settings.num_vehicles,
        tick_rate_seconds = settings.tick_rate_seconds,
        api_port = settings.api_port,
        "starting paint shop scheduler"
    );

    let document_store_url = format!(
        "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
        settings.firebase_project_id
    );
    let store: Arc<dyn VehicleStore> = Arc::new(DocumentStoreClient::new(document_store_url));

    let engine_handle = engine::spawn(
        store.clone(),
        settings.tick_rate_seconds,
        settings.oven_production_rate,
        settings.max_conveyor_pick,
    );

    let allowed_origins: Vec<axum::http::HeaderValue> =
        settings.allowed_origins.iter().filter_map(|origin| origin.parse().ok()).collect();
    let cors = CorsLayer::new().allow_origin(AllowOrigin::list(allowed_origins)).allow_methods(tower_http::cors::Any);

    let app_state = state::AppState { engine: engine_handle, store };
    let app = routes::create_router().with_state(app_state).layer(TraceLayer::new_for_http()).layer(cors);

    let addr = format!("{}:{}", settings.api_host, settings.api_port);
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
