/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (CORS / request-id / trace / limit / timeout)
 * - axum::serve() で起動 (graceful shutdown 付き)
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_token_verifier;
use crate::services::proxy::{Forwarder, Upstreams};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,api_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panic via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "configuration loaded");

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        "API gateway listening on port {} ({:?} mode)",
        config.addr.port(),
        config.app_env
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API gateway stopped");
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    // Everything here is built once and read-only afterwards.
    let verifier = build_token_verifier(config);
    let forwarder = Forwarder::new(config.upstream_timeout)?;
    let upstreams = Arc::new(Upstreams::from_config(config));

    Ok(AppState::new(
        verifier,
        forwarder,
        upstreams,
        config.body_limit_bytes,
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::routes(state.clone()))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
