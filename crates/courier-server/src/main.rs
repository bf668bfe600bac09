mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use courier_api::{AppState, AppStateInner};
use courier_db::Database;
use courier_mail::{MailService, UuidIds};
use courier_storage::{FsObjectStore, MemoryObjectStore, ObjectStore};

use crate::config::{Config, ObjectBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "courier=debug,courier_api=debug,courier_mail=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::open(&config.db_path)?;
    info!("Record store at {}", config.db_path.display());

    let objects: Arc<dyn ObjectStore> = match &config.objects {
        ObjectBackend::Fs(root) => {
            info!("Object store at {}", root.display());
            Arc::new(FsObjectStore::new(root.clone()).await?)
        }
        ObjectBackend::Memory => {
            info!("Object store in memory; payloads are lost on exit");
            Arc::new(MemoryObjectStore::new())
        }
    };

    let mail = MailService::new(Arc::new(db), objects, Arc::new(UuidIds));
    let state: AppState = Arc::new(AppStateInner { mail });

    let app = courier_api::router(state, config.max_body_bytes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Courier listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Could not install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
