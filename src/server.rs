use crate::config::Config;
use crate::config_validator::ConfigValidator;
use crate::error::ApiError;
use crate::handlers::{
    create_todo, create_user, delete_todo, delete_user, get_todo, get_user, health_check,
    list_todos, list_users, not_found, stats, update_todo, update_user, AppState,
};
use crate::middleware::{logging_middleware, record_metrics, require_api_key};
use axum::handler::HandlerWithoutStateExt;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router around an existing context.
///
/// Layer order, outermost first: tracing, request logging, metrics, API-key
/// check, handler. Metrics therefore cover rejected requests too.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let static_files = ServeDir::new(&config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/_stats", get(stats))
        // Users
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        // Todos
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/:id",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(middleware::from_fn_with_state(state.clone(), record_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(logging_middleware)),
        )
        .with_state(state);

    if config.enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

pub struct Server {
    app: Router,
    bind_addr: SocketAddr,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        ConfigValidator::validate_config(&config)?;

        let state = AppState::new(&config)?;
        let app = create_app(state, &config);

        Ok(Self {
            app,
            bind_addr: config.bind_addr,
        })
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!("Todo API listening on {}", self.bind_addr);
        tracing::info!("Health check available at /api/health");
        tracing::info!("Request metrics available at /api/_stats");

        // Run server with graceful shutdown
        axum::serve(
            listener,
            self.app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
