use ticket_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, log directory, logger)
    setup_environment()?;

    print_banner();

    tracing::info!("Ticket server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. Store, printer core, startup auto-connect
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server; releases the printer on ctrl-c
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
