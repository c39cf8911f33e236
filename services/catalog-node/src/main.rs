use axum::{
    routing::{delete, get},
    Router,
};
use orbital_core::{logging, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::info;

mod handlers;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(&args)?;
    logging::init_from_config(&config.logging);

    let state = Arc::new(AppState::open(config.clone())?);
    state.bootstrap().await?;

    let app = router(state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Catalog node listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/v1/planets", get(handlers::get_all_planets))
        .route(
            "/v1/launches",
            get(handlers::get_all_launches).post(handlers::add_new_launch),
        )
        .route("/v1/launches/:id", delete(handlers::abort_launch))
        .with_state(state)
        .layer(ServiceBuilder::new().into_inner())
}

/// Read `--config <path>` if given, otherwise start from defaults; the
/// environment overrides either.
fn load_config(args: &[String]) -> anyhow::Result<Config> {
    let config = match parse_config_path(args)? {
        Some(path) => Config::from_file(&path)?,
        None => Config::default_config(),
    };
    Ok(config.apply_env()?)
}

fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            anyhow::bail!("--config was provided without a path");
        }
    }

    Ok(None)
}
