use std::sync::Arc;

use chat_server::auth::PlaintextVerifier;
use chat_server::config::Config;
use chat_server::state::AppState;
use chat_server::{db, repo, session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .init();

    let config = Arc::new(Config::from_env());

    info!("connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await;
    db::run_migrations(&pool).await;
    info!("migrations applied");

    let world_conversation_id = repo::conversations::world_conversation_id(&pool)
        .await
        .expect("world conversation must exist after migration");

    let state = AppState::new(pool, config.clone(), Arc::new(PlaintextVerifier), world_conversation_id);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    info!(addr = %config.bind_addr, "server listening");

    accept_loop(listener, state).await;
    info!("server shut down gracefully");
}

async fn accept_loop(listener: tokio::net::TcpListener, state: AppState) {
    let mut shutdown = std::pin::pin!(shutdown_signal());
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            session::run(stream, state).await;
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                }
            }
            _ = &mut shutdown => break,
        }
    }
}

/// Waits for SIGTERM or Ctrl-C (SIGINT) and returns to trigger graceful shutdown.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("received Ctrl+C, shutting down"); },
        _ = terminate => { info!("received SIGTERM, shutting down"); },
    }
}
