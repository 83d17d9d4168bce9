use thiserror::Error;

/// Bot-fatal failures; the process exits non-zero on any of them.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("failed to open environment file: {0}")]
    Env(String),

    #[error("failed to get environment value: {0}")]
    MissingKey(&'static str),

    #[error("invalid SERVER_PORT value")]
    BadPort,

    #[error("connection failed: {0}")]
    Connect(std::io::Error),

    #[error("failed to send message: {0}")]
    Write(std::io::Error),

    #[error("bot authentication failed")]
    AuthFailed,

    #[error("server closed the connection")]
    Disconnected,
}
