use crate::cli::Args;
use crate::sources::SourceRegistry;
use crate::store::OutputStore;
use crate::video::FfmpegTrimmer;
use crate::web::api::{get_sources, trim_handler};
use crate::web::error::ApiError;
use crate::web::trimmed::{count_handler, delete_all_handler, serve_video_handler};
use crate::web::{AppState, PublicUrl};
use anyhow::Result;
use axum::{
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use std::any::Any;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/trim", post(trim_handler))
        .route("/video/:filename", get(serve_video_handler))
        .route("/trimmed/count", get(count_handler))
        .route("/trimmed/delete-all", delete(delete_all_handler))
        .route("/sources", get(get_sources))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);
    ApiError::internal(format!("Server error: {}", detail)).into_response()
}

pub fn build_state(args: &Args) -> Result<AppState> {
    let sources = match &args.sources {
        Some(path) => SourceRegistry::load(path, &args.video_root)?,
        None => SourceRegistry::builtin(&args.video_root),
    };
    sources.report();

    let store = OutputStore::open(&args.output_root)?;
    info!("Writing trimmed videos to {:?}", store.dir());

    Ok(AppState {
        sources,
        store,
        executor: Arc::new(FfmpegTrimmer::new(args.trimmer_config())),
        public_url: PublicUrl {
            https: args.public_https,
            base_url: args.public_base_url.clone(),
        },
    })
}

pub async fn run_server(args: Args) -> Result<()> {
    let state = Arc::new(build_state(&args)?);

    let mut current_port = args.port;
    let listener = loop {
        let addr = SocketAddr::new(args.host, current_port);
        match TcpListener::bind(addr) {
            Ok(listener) => {
                listener.set_nonblocking(true)?;
                info!("Successfully bound to {}", addr);
                break listener;
            }
            Err(e) => {
                warn!("Failed to bind to {}: {}. Trying next port...", addr, e);
                current_port = current_port
                    .checked_add(1)
                    .ok_or_else(|| anyhow::anyhow!("No available ports found"))?;
            }
        }
    };

    let app = build_router(state);

    let tokio_listener = tokio::net::TcpListener::from_std(listener)?;
    info!(
        "Fast Trimmer server started on http://{}",
        tokio_listener.local_addr()?
    );

    axum::serve(tokio_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
