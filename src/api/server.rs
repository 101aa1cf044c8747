use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::{self, unix::SignalKind};
use tower_http::cors::CorsLayer;
use tracing::info;

use super::handlers;
use crate::core::config::SportsfestConfig;
use crate::core::services::deletion::DeletionOrchestrator;
use crate::core::services::registration::RegistrationService;
use crate::platform::base::{DocumentStore, IdentityProvider, ObjectStore};
use crate::toolkit::analytics::AnalyticsManager;

/// Everything the handlers need, wired once at startup.
pub struct AppState {
    pub config: SportsfestConfig,
    pub registrations: RegistrationService,
    pub deletion: DeletionOrchestrator,
    pub analytics: AnalyticsManager,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        config: SportsfestConfig,
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Arc<Self> {
        let registrations =
            RegistrationService::new(documents.clone(), &config.registrations_collection);
        let deletion =
            DeletionOrchestrator::new(documents.clone(), objects, identity.clone(), &config);
        let analytics = AnalyticsManager::new(
            documents,
            &config.registrations_collection,
            config.stats_cache_size,
            config.stats_cache_ttl,
        );

        Arc::new(Self {
            config,
            registrations,
            deletion,
            analytics,
            identity,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/registrants", get(handlers::list_registrants))
        .route("/registrants/{id}", patch(handlers::update_registrant))
        .route("/stats/houses", get(handlers::house_stats))
        .route("/stats/overview", get(handlers::overview_stats))
        .route("/account/delete", post(handlers::delete_account))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> crate::Result<()> {
    let address = state.config.bind_addr();
    let app = build_router(state);

    info!("Binding to {}", address);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
