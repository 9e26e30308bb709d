use std::net::SocketAddr;

use anyhow::Context;
use lodge_api::{app, AppState, AuthConfig};
use lodge_store::{Config, Repositories};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodge_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Lodge API on port {}", config.server.port);

    let repos = Repositories::connect(&config)
        .await
        .context("Failed to initialise storage")?;

    let app_state = AppState::new(
        repos,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
