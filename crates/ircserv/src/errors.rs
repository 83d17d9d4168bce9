use thiserror::Error;

/// Fatal startup failures. Reported to stderr; the process exits 1.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid port number. Port must be between 1 and 65535")]
    InvalidPort,

    #[error("incorrect password format")]
    InvalidPassword,

    #[error("failed to read configuration file: {0}")]
    Config(String),

    #[error("failed to bind server socket. {0}")]
    Bind(std::io::Error),

    #[error("failed to configure SIGINT signal: {0}")]
    Signal(std::io::Error),
}

/// Why a connection was torn down. Drives the final QUIT broadcast.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// Peer closed the socket (recv returned 0).
    Eof,
    /// Transport error other than would-block.
    Transport(String),
    /// Explicit QUIT with an optional reason.
    Quit(Option<String>),
    /// PASS mismatch or NICK/USER before PASS.
    AuthFailure,
    /// No PONG within the timeout window.
    Timeout,
    /// Outbound queue overflowed.
    SlowConsumer,
    /// Global shutdown broadcast.
    Shutdown,
}

impl SessionEnd {
    /// Reason text carried in the QUIT broadcast to channel peers.
    pub fn reason(&self) -> &str {
        match self {
            SessionEnd::Eof | SessionEnd::Transport(_) | SessionEnd::AuthFailure => {
                crate::constants::DEFAULT_QUIT_REASON
            }
            SessionEnd::Quit(Some(reason)) => reason,
            SessionEnd::Quit(None) => crate::constants::DEFAULT_QUIT_REASON,
            SessionEnd::Timeout => crate::constants::TIMEOUT_REASON,
            SessionEnd::SlowConsumer => crate::constants::SLOW_CONSUMER_REASON,
            SessionEnd::Shutdown => crate::constants::SHUTDOWN_REASON,
        }
    }
}
