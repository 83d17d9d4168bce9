use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::errors::ServerError;

/// `irc-server <port> <password>`
#[derive(Debug, Parser)]
#[command(name = "irc-server", about = "RFC 1459/2812 subset IRC server")]
pub struct Cli {
    /// TCP port to listen on, 1-65535
    pub port: u16,
    /// Connection password shared by every client
    pub password: String,
}

impl Cli {
    /// Ports and passwords come straight from argv; clap only guarantees the
    /// port parses as u16, the rest is checked here.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.port == 0 {
            return Err(ServerError::InvalidPort);
        }
        if self.password.is_empty()
            || !self
                .password
                .bytes()
                .all(|b| b.is_ascii_graphic())
        {
            return Err(ServerError::InvalidPassword);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub motd: Vec<String>,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    /// Outbound queue depth per client; overflow drops the client.
    pub outbound_queue: usize,
    pub ping_interval: u64,
    pub pong_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            motd: vec!["Gimme dat smile =)".to_string()],
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            outbound_queue: 512,
            ping_interval: crate::constants::PING_INTERVAL_SECS,
            pong_timeout: crate::constants::PONG_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Loads and parses the TOML configuration file. A missing file is not an
    /// error; every field has a default.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ServerError> {
        if !path.as_ref().exists() {
            return Ok(ServerConfig::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| ServerError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ServerError::Config(e.to_string()))
    }
}
