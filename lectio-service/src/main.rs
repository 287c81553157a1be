mod error;
mod routes;
mod state;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use lectio_core::{Config, ReadingPlan, ScriptureStore};
use state::{AppState, SharedState};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectio-service")]
#[command(about = "HTTP service for scripture lookup, search and daily readings")]
#[command(version)]
struct Args {
    /// Path to a lectio.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verse corpus CSV (overrides config)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Reading plan TOML (overrides config)
    #[arg(long)]
    readings: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

fn app(state: SharedState) -> Router {
    Router::new()
        .route("/scripture", get(routes::scripture))
        .route("/readings/today", get(routes::todays_reading))
        .route("/readings/random", get(routes::random_reading))
        .route("/readings/search", get(routes::search_readings))
        .route("/status", get(routes::status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run(args: Args) -> lectio_core::Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(corpus) = args.corpus {
        config.corpus.path = corpus;
    }
    if let Some(readings) = args.readings {
        config.readings.path = Some(readings);
    }
    if let Some(bind) = args.bind {
        config.service.bind = bind;
    }
    if let Some(port) = args.port {
        config.service.port = port;
    }

    let readings = match &config.readings.path {
        Some(path) => {
            let plan = ReadingPlan::load(path)?;
            tracing::info!(path = %path.display(), readings = plan.readings().len(), "reading plan loaded");
            Some(plan)
        }
        None => None,
    };

    let store = ScriptureStore::from_config(&config);
    let addr = format!("{}:{}", config.service.bind, config.service.port);
    let state: SharedState = Arc::new(AppState::new(config, store, readings));
    state.warm();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "lectio-service listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}
