use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;

use crate::replies::IrcReply;

pub type ClientId = usize;

/// Per-connection session state. Mutated only from the event loop; the
/// connection task and command handlers share it through [`ClientHandle`].
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub ip: String,
    /// PASS matched the server password.
    pub password_ok: bool,
    pub nick: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
    /// Starts as the remote IP, becomes the nickname once USER completes.
    pub hostname: String,
    /// Welcome burst already sent; guards against a second USER.
    pub welcomed: bool,
    pub away: Option<String>,
    /// Lower-cased names of joined channels. Mirrors channel membership.
    pub joined: HashSet<String>,
    /// Lower-cased names of channels this client holds an invite for.
    pub invited: HashSet<String>,
    pub signon: i64,
    pub last_activity: Instant,
    /// Set when a liveness PING is outstanding.
    pub last_ping: Option<Instant>,
}

impl Client {
    pub fn new(id: ClientId, ip: String) -> Self {
        Client {
            id,
            hostname: ip.clone(),
            ip,
            password_ok: false,
            nick: None,
            username: None,
            realname: None,
            welcomed: false,
            away: None,
            joined: HashSet::new(),
            invited: HashSet::new(),
            signon: chrono::Utc::now().timestamp(),
            last_activity: Instant::now(),
            last_ping: None,
        }
    }

    /// PASS + NICK + USER all done.
    pub fn is_registered(&self) -> bool {
        self.password_ok && self.nick.is_some() && self.username.is_some()
    }

    /// `nick!~user@host`, the prefix of user-sourced lines.
    pub fn mask(&self) -> String {
        format!(
            "{}!~{}@{}",
            self.nick.as_deref().unwrap_or("*"),
            self.username.as_deref().unwrap_or("unknown"),
            self.hostname
        )
    }

    pub fn display_nick(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }
}

/// Read-only copy of the fields handlers need, taken under one short lock so
/// no lock is held across awaits.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: ClientId,
    pub registered: bool,
    pub password_ok: bool,
    pub nick: Option<String>,
    pub display: String,
    pub username: Option<String>,
    pub realname: Option<String>,
    pub hostname: String,
    pub mask: String,
    pub away: Option<String>,
    pub joined: Vec<String>,
    pub signon: i64,
    pub last_activity: Instant,
}

/// Cloneable handle pairing the shared session state with the outbound queue.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub client: Arc<RwLock<Client>>,
    tx: mpsc::Sender<String>,
    overflowed: Arc<AtomicBool>,
}

impl ClientHandle {
    pub fn new(id: ClientId, ip: String, tx: mpsc::Sender<String>) -> Self {
        ClientHandle {
            client: Arc::new(RwLock::new(Client::new(id, ip))),
            tx,
            overflowed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn snapshot(&self) -> ClientInfo {
        let client = self.client.read().await;
        ClientInfo {
            id: client.id,
            registered: client.is_registered(),
            password_ok: client.password_ok,
            nick: client.nick.clone(),
            display: client.display_nick().to_string(),
            username: client.username.clone(),
            realname: client.realname.clone(),
            hostname: client.hostname.clone(),
            mask: client.mask(),
            away: client.away.clone(),
            joined: client.joined.iter().cloned().collect(),
            signon: client.signon,
            last_activity: client.last_activity,
        }
    }

    pub async fn id(&self) -> ClientId {
        self.client.read().await.id
    }

    /// Queues one line, appending CRLF. A full queue marks the client as a
    /// slow consumer; its connection task drops it at the next loop turn.
    pub fn send_line(&self, line: &str) {
        let mut framed = String::with_capacity(line.len() + 2);
        framed.push_str(line);
        framed.push_str("\r\n");
        match self.tx.try_send(framed) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.overflowed.store(true, Ordering::Release);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    pub fn send(&self, reply: &IrcReply<'_>) {
        self.send_line(&reply.format());
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_needs_all_three() {
        let mut client = Client::new(1, "127.0.0.1".to_string());
        assert!(!client.is_registered());
        client.password_ok = true;
        client.nick = Some("alice".to_string());
        assert!(!client.is_registered());
        client.username = Some("alice".to_string());
        assert!(client.is_registered());
    }

    #[test]
    fn mask_shape() {
        let mut client = Client::new(1, "10.0.0.7".to_string());
        assert_eq!(client.mask(), "*!~unknown@10.0.0.7");
        client.nick = Some("alice".to_string());
        client.username = Some("al".to_string());
        client.hostname = "alice".to_string();
        assert_eq!(client.mask(), "alice!~al@alice");
    }

    #[tokio::test]
    async fn overflow_marks_slow_consumer() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ClientHandle::new(1, "127.0.0.1".to_string(), tx);
        handle.send_line("first");
        assert!(!handle.is_overflowed());
        handle.send_line("second");
        assert!(handle.is_overflowed());
    }
}
