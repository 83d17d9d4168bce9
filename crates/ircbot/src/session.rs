use log::{info, warn};
use rand::seq::SliceRandom;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::age::age_reply;
use crate::config::{
    BOT_NICK, BOT_REAL, BOT_USER, BotEnv, FALLBACK_FUNFACT, REQUIRED_AUTH_SERVER_REPLY_COUNT,
    WELCOME_PROMPT,
};
use crate::errors::BotError;
use crate::parsers::{ServerEvent, Trigger, parse_server_line, parse_trigger};

/// One bot connection. The bot is an ordinary client on the wire: it
/// registers with PASS/NICK/USER, then answers trigger PRIVMSGs with
/// NOTICEs until the server goes away.
pub struct BotSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    has_sent_auth: bool,
    is_authenticated: bool,
    quotes: Vec<String>,
    channel: Option<String>,
    password: String,
}

impl BotSession {
    pub async fn connect(env: &BotEnv, quotes: Vec<String>) -> Result<Self, BotError> {
        let socket = TcpStream::connect((env.server_ip.as_str(), env.server_port))
            .await
            .map_err(BotError::Connect)?;
        info!("Bot connected to {}:{}", env.server_ip, env.server_port);
        let (read_half, writer) = socket.into_split();
        Ok(BotSession {
            reader: BufReader::new(read_half),
            writer,
            has_sent_auth: false,
            is_authenticated: false,
            quotes,
            channel: env.channel.clone(),
            password: env.password.clone(),
        })
    }

    pub async fn run(&mut self) -> Result<(), BotError> {
        if !self.is_authenticated {
            self.authenticate().await?;
        }
        loop {
            let line = self.read_line().await?;
            match parse_server_line(&line) {
                ServerEvent::Ping(token) => self.send_line(&format!("PONG :{token}")).await?,
                ServerEvent::Privmsg { from, target, text } => {
                    self.handle_privmsg(&from, &target, &text).await?;
                }
                ServerEvent::Welcome | ServerEvent::Other => {}
            }
        }
    }

    /// Sends the PASS/NICK/USER burst, then consumes server lines until the
    /// welcome numeric. A server that never welcomes us within the reply
    /// window is treated as an authentication failure.
    async fn authenticate(&mut self) -> Result<(), BotError> {
        if !self.has_sent_auth {
            info!("Sending password, nickname and username");
            self.send_line(&format!("PASS {}", self.password.clone())).await?;
            self.send_line(&format!("NICK {BOT_NICK}")).await?;
            self.send_line(&format!("USER {BOT_USER} 0 * :{BOT_REAL}")).await?;
            self.has_sent_auth = true;
        }

        for _ in 0..REQUIRED_AUTH_SERVER_REPLY_COUNT {
            let line = self.read_line().await?;
            match parse_server_line(&line) {
                ServerEvent::Welcome => {
                    self.is_authenticated = true;
                    info!("Bot successfully authenticated");
                    if let Some(channel) = self.channel.clone() {
                        self.send_line(&format!("JOIN {channel}")).await?;
                        self.send_line(&format!("NOTICE {channel} :{WELCOME_PROMPT}")).await?;
                    }
                    return Ok(());
                }
                ServerEvent::Ping(token) => {
                    self.send_line(&format!("PONG :{token}")).await?;
                }
                _ => {}
            }
        }
        warn!("no welcome within {REQUIRED_AUTH_SERVER_REPLY_COUNT} replies");
        Err(BotError::AuthFailed)
    }

    async fn handle_privmsg(
        &mut self,
        from: &str,
        target: &str,
        text: &str,
    ) -> Result<(), BotError> {
        let Some(trigger) = parse_trigger(text) else {
            return Ok(());
        };
        let reply = match trigger {
            Trigger::FunFact => self.random_quote(),
            Trigger::Time => chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            Trigger::Age(arg) => age_reply(arg.as_deref()),
        };
        let to = reply_target(from, target).to_string();
        info!("answering {} in {}", from, to);
        self.send_line(&format!("NOTICE {to} :{reply}")).await
    }

    fn random_quote(&self) -> String {
        self.quotes
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_FUNFACT.to_string())
    }

    async fn read_line(&mut self) -> Result<String, BotError> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(|_| BotError::Disconnected)?;
        if n == 0 {
            return Err(BotError::Disconnected);
        }
        Ok(line)
    }

    async fn send_line(&mut self, line: &str) -> Result<(), BotError> {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .map_err(BotError::Write)
    }
}

/// A private PRIVMSG (addressed to the bot's nick) is answered to the
/// sender; a channel PRIVMSG is answered into the channel.
pub fn reply_target<'a>(from: &'a str, target: &'a str) -> &'a str {
    if target.eq_ignore_ascii_case(BOT_NICK) {
        from
    } else {
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_messages_answer_the_sender() {
        assert_eq!(reply_target("alice", "BOTTY"), "alice");
        assert_eq!(reply_target("alice", "botty"), "alice");
        assert_eq!(reply_target("alice", "#general"), "#general");
    }
}
