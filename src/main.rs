use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use media_intake::config::settings::AppConfig;
use media_intake::state::AppState;
use media_intake::workers::transcoder::WorkerPool;
use media_intake::{app, modules};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting media intake...");

    let config = AppConfig::new().context("invalid configuration")?;
    let grace = config.shutdown_grace();
    let state = AppState::new(config.clone());
    state
        .storage
        .ensure_dirs()
        .await
        .context("failed to prepare storage directories")?;

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });
    }

    let pool = WorkerPool::start(&state, config.worker_count);

    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.grpc_port));
    let grpc = tonic::transport::Server::builder()
        .add_service(modules::upload::grpc_service(state.clone()))
        .serve_with_shutdown(grpc_addr, shutdown.clone().cancelled_owned());
    info!("gRPC server listening on {}", grpc_addr);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {http_addr}"))?;
    let http = axum::serve(listener, app::create_app(state.clone()))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned());
    info!("HTTP server listening on http://{}", http_addr);

    let servers = async {
        tokio::try_join!(
            async { grpc.await.context("gRPC server failed") },
            async { http.await.context("HTTP server failed") },
        )
        .map(|_| ())
    };
    tokio::pin!(servers);

    // One grace period covers both the servers and the worker pool.
    let (result, deadline) = tokio::select! {
        res = &mut servers => (res, Instant::now() + grace),
        _ = shutdown.cancelled() => {
            info!("Shutdown signal received, stopping servers...");
            let deadline = Instant::now() + grace;
            let res = match tokio::time::timeout_at(deadline, &mut servers).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(grace_secs = grace.as_secs(), "Servers did not drain in time");
                    Ok(())
                }
            };
            (res, deadline)
        }
    };

    shutdown.cancel();
    pool.shutdown(deadline.saturating_duration_since(Instant::now())).await;

    if let Err(e) = &result {
        error!(error = %e, "Exiting after server failure");
    }
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
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
}
