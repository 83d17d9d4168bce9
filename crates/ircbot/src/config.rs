use std::fs;
use std::path::Path;

use crate::errors::BotError;

// === BOT IDENTITY ===
pub const BOT_NICK: &str = "BOTTY";
pub const BOT_USER: &str = "bot";
pub const BOT_REAL: &str = "bot";

// === AUTHENTICATION ===

/// Server lines consumed while waiting for the welcome numeric before the
/// bot gives up.
pub const REQUIRED_AUTH_SERVER_REPLY_COUNT: usize = 25;

// === RESOURCES ===
pub const ENV_PATH: &str = ".env";
pub const QUOTES_PATH: &str = "assets/quotes.txt";

// === CANNED MESSAGES ===
pub const WELCOME_PROMPT: &str = "Hello there! Type !funfact for a fun fact, !time to get the current time, or !age <YYYY-MM-DD> to know your precise age, including months and days.";
pub const INVALID_DATE_FORMAT: &str = "Please enter a valid date/format: !age <YYYY-MM-DD>";
pub const FALLBACK_FUNFACT: &str =
    "Honey never spoils: edible honey was found in 3000-year-old Egyptian tombs.";

/// Connection settings read from the `.env` file: `KEY=VALUE` lines, `#`
/// comments and blank lines ignored. `SERVER_IP`, `SERVER_PORT` and
/// `PASSWORD` are required; `CHANNEL` optionally names a channel to join
/// after registration.
#[derive(Debug, Clone)]
pub struct BotEnv {
    pub server_ip: String,
    pub server_port: u16,
    pub password: String,
    pub channel: Option<String>,
}

impl BotEnv {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BotError> {
        let content = fs::read_to_string(&path)
            .map_err(|err| BotError::Env(format!("{}: {err}", path.as_ref().display())))?;
        Self::from_str(&content)
    }

    fn from_str(content: &str) -> Result<Self, BotError> {
        let mut server_ip = None;
        let mut server_port = None;
        let mut password = None;
        let mut channel = None;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "SERVER_IP" => server_ip = Some(value.trim().to_string()),
                "SERVER_PORT" => server_port = Some(value.trim().to_string()),
                "PASSWORD" => password = Some(value.trim().to_string()),
                "CHANNEL" => channel = Some(value.trim().to_string()),
                _ => {}
            }
        }
        let server_port = server_port
            .ok_or(BotError::MissingKey("SERVER_PORT"))?
            .parse::<u16>()
            .map_err(|_| BotError::BadPort)?;
        if server_port == 0 {
            return Err(BotError::BadPort);
        }
        Ok(BotEnv {
            server_ip: server_ip.ok_or(BotError::MissingKey("SERVER_IP"))?,
            server_port,
            password: password.ok_or(BotError::MissingKey("PASSWORD"))?,
            channel: channel.filter(|c| !c.is_empty()),
        })
    }
}

/// One quote per line, blanks skipped. A missing file is not fatal; the
/// `!funfact` handler falls back to a canned line.
pub fn load_quotes<P: AsRef<Path>>(path: P) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}
