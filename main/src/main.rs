use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::utils::config::get_config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let api_state = ApiState::new(&config);

    info!(
        embedding_backend = ?config.embedding_backend,
        data_dir = %config.data_dir,
        "Initialized ingestion and retrieval state"
    );

    let app: Router = api_routes(&api_state).with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
