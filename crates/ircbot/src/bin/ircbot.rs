use flexi_logger::Logger;
use log::{error, info, warn};

use ircbot::config::{BotEnv, ENV_PATH, QUOTES_PATH, load_quotes};
use ircbot::errors::BotError;
use ircbot::session::BotSession;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.log_to_stderr().start())
        .ok();

    if let Err(err) = run().await {
        error!("{err}");
        eprintln!("ircbot: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BotError> {
    let env = BotEnv::load(ENV_PATH)?;
    let quotes = load_quotes(QUOTES_PATH);
    if quotes.is_empty() {
        warn!("no quotes at {QUOTES_PATH}; !funfact will use the fallback");
    } else {
        info!("loaded {} quotes", quotes.len());
    }

    let mut session = BotSession::connect(&env, quotes).await?;
    session.run().await
}
