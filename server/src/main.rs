//! Person API server.
//!
//! Run from repo root: `cargo run -p server`
//! Settings come from the environment or a `.env` file: `DATABASE_URL`, `BIND_ADDR`,
//! `DATABASE_MAX_CONNECTIONS`, `RUST_LOG`.

use person_api::{app, connect, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("person_api=info,server=info,tower_http=debug")
            }),
        )
        .init();

    let settings = Settings::from_env()?;
    let store = connect(&settings).await?;
    let state = AppState::new(store);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
