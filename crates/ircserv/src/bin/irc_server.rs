use clap::Parser;
use flexi_logger::Logger;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use ircserv::config::{Cli, ServerConfig};
use ircserv::errors::ServerError;
use ircserv::handlers::client::accept_loop;
use ircserv::server_state::ServerState;

const CONFIG_PATH: &str = "ircserv.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.log_to_stderr().start())
        .ok();

    if let Err(err) = run().await {
        error!("{err}");
        eprintln!("irc-server: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    // clap exits 2 on usage errors; a fatal init error here is exit 1
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    cli.validate()?;
    let config = ServerConfig::load(CONFIG_PATH)?;

    let listener = TcpListener::bind(("0.0.0.0", cli.port))
        .await
        .map_err(ServerError::Bind)?;
    info!("listening on port {}", cli.port);

    let state = Arc::new(ServerState::new(cli.password, config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = tokio::spawn(accept_loop(listener, state, shutdown_rx));

    tokio::signal::ctrl_c().await.map_err(ServerError::Signal)?;
    info!("SIGINT received, shutting down");
    let _ = shutdown_tx.send(true);

    // connection tasks flush their shutdown notices before the process ends
    let _ = server.await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    info!("server successfully shut down");
    Ok(())
}
