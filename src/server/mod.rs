//! Static site host and contact relay.

pub mod contact;
pub mod health;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderName, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tokio::signal;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

pub use contact::{LogMailer, Mailer, OutboundEmail};
pub use state::AppState;

use crate::config::ServerConfig;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
font-src 'self' https://fonts.gstatic.com; \
script-src 'self' 'unsafe-inline' 'wasm-unsafe-eval' https://cdn.jsdelivr.net; \
img-src 'self' data: https:; \
connect-src 'self'";

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

/// API routes plus the static site. Unknown paths get `index.html` with a 404.
///
/// Requests are rate limited per peer IP, so the router has to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let config = state.config();
    let site = ServeDir::new(&config.static_dir)
        .not_found_service(ServeFile::new(config.static_dir.join("index.html")));
    let cors = config.cors_layer();

    let site_limit = GovernorConfigBuilder::default()
        .period(config.site_limit.replenish_period())
        .burst_size(config.site_limit.burst())
        .finish()
        .context("invalid site rate limit")?;
    let contact_limit = GovernorConfigBuilder::default()
        .period(config.contact_limit.replenish_period())
        .burst_size(config.contact_limit.burst())
        .finish()
        .context("invalid contact rate limit")?;

    let router = Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/contact",
            post(contact::submit).layer(GovernorLayer::new(contact_limit)),
        )
        .fallback_service(site)
        .layer(GovernorLayer::new(site_limit))
        .layer(cors)
        .layer(security_header(header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY))
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .layer(security_header(header::REFERRER_POLICY, "no-referrer"))
        .layer(security_header(
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=15552000; includeSubDomains",
        ))
        .with_state(state);
    Ok(router)
}

/// Binds and serves until Ctrl-C or SIGTERM.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.log();
    let addr = config.bind_addr();
    let state = AppState::new(config, Arc::new(LogMailer));
    let app = build_router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
