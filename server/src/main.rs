use farmgate_server::{setup_environment, Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    setup_environment();

    tracing::info!("Farmgate server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State (database, atomicity probe, services)
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server
    let server = Server::with_state(config, state);
    server.run().await?;

    Ok(())
}
