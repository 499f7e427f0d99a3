// Seraph — Les 3 Anges
// Binary entry point: logging, config from env, state wiring, serve.

use anyhow::Result;
use log::info;

use seraph::config::ServerConfig;
use seraph::server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    info!("[main] Seraph - Les 3 Anges v{}", env!("CARGO_PKG_VERSION"));
    info!("[main] Store: {:?}", config.db_path);
    info!("[main] Completion API: {}", config.completion_url);

    let state = AppState::new(config)?;
    for persona in state.registry.personas() {
        info!("[main] Persona: {} ({})", persona.name, persona.role);
    }

    serve(state).await?;
    Ok(())
}
