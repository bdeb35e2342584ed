//! # Universe Ingest Example
//!
//! Drives `UniverseStore` through the same lifecycle an ingestion host uses:
//! ask for credentials, init, push a few files, delete one, finalize.
//!
//! Environment:
//! - `UNIVERSE_SERVER_URL` – e.g. `http://localhost:8080`
//! - `UNIVERSE_NAME` – e.g. `demo_docs`
//! - `UNIVERSE_TOKEN` – bearer token for that server
//!
//! Run: `RUST_LOG=adk_universe=debug cargo run -p adk-universe --example universe_ingest`

use std::collections::HashMap;

use adk_universe::{RagPlugin, UniverseConfig, UniverseStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // -- 1. Configure and collect credentials ------------------------------
    let mut store = UniverseStore::new(UniverseConfig::from_env()?)?;

    let token = std::env::var("UNIVERSE_TOKEN")?;
    let mut credentials = HashMap::new();
    for (name, description) in store.required_credentials(None)? {
        println!("credential {name}: {description}");
        credentials.insert(name, token.clone());
    }
    store.init(&credentials, None).await?;

    // -- 2. Push, update and delete ----------------------------------------
    store.add_file("intro", "The universe server embeds every item it stores.").await?;
    store.add_file("usage", "Items are addressed by id within a universe.").await?;
    store.update_file("usage", "Items are addressed by id; emitting again overwrites.").await?;
    store.delete_file("intro").await?;

    // -- 3. Done ------------------------------------------------------------
    store.finalize().await?;
    println!("ingest complete");
    Ok(())
}
