//! The bot driven against the real server, end to end: register, trigger,
//! NOTICE back.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use ircbot::config::BotEnv;
use ircbot::session::BotSession;
use ircserv::config::ServerConfig;
use ircserv::handlers::client::accept_loop;
use ircserv::server_state::ServerState;

const PASSWORD: &str = "pw";
const READ_TIMEOUT: Duration = Duration::from_secs(3);

async fn start_server() -> (SocketAddr, Arc<ServerState>, watch::Sender<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(ServerState::new(
        PASSWORD.to_string(),
        ServerConfig::default(),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(accept_loop(listener, state.clone(), shutdown_rx));
    (addr, state, shutdown_tx)
}

struct TestUser {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestUser {
    async fn connect_and_register(addr: SocketAddr, nick: &str) -> Self {
        let socket = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = socket.into_split();
        let mut user = TestUser { reader: BufReader::new(read_half), writer };
        user.send(&format!("PASS {PASSWORD}")).await;
        user.send(&format!("NICK {nick}")).await;
        user.send(&format!("USER {nick} 0 * :{nick}")).await;
        for _ in 0..11 {
            user.read_line().await;
        }
        user
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("read timed out")
            .expect("read failed");
        line.trim_end_matches(['\r', '\n']).to_string()
    }
}

async fn spawn_bot(addr: SocketAddr, state: &ServerState) {
    let env = BotEnv {
        server_ip: "127.0.0.1".to_string(),
        server_port: addr.port(),
        password: PASSWORD.to_string(),
        channel: None,
    };
    tokio::spawn(async move {
        let mut session = BotSession::connect(&env, vec!["The fun fact.".to_string()])
            .await
            .expect("bot connects");
        let _ = session.run().await;
    });
    // wait for the bot to finish its handshake
    for _ in 0..40 {
        if state.find_by_nick("BOTTY").is_some() {
            return;
        }
        sleep(Duration::from_millis(25)).await;
    }
    panic!("bot never registered");
}

#[tokio::test]
async fn age_trigger_is_answered_privately() {
    let (addr, state, _shutdown) = start_server().await;
    spawn_bot(addr, &state).await;
    let mut alice = TestUser::connect_and_register(addr, "alice").await;

    alice.send("PRIVMSG BOTTY :!age 2000-02-29").await;
    let reply = alice.read_line().await;
    assert!(reply.contains("NOTICE alice :You are:"), "{reply}");
    let numbers: Vec<i64> = reply
        .split(|c: char| !c.is_ascii_digit() && c != '-')
        .filter_map(|tok| tok.parse().ok())
        .collect();
    assert!(
        numbers.iter().rev().take(3).all(|n| *n >= 0),
        "years/months/days are non-negative: {reply}"
    );
}

#[tokio::test]
async fn invalid_age_gets_the_usage_message() {
    let (addr, state, _shutdown) = start_server().await;
    spawn_bot(addr, &state).await;
    let mut alice = TestUser::connect_and_register(addr, "alice").await;

    alice.send("PRIVMSG BOTTY :!age 2001-02-29").await;
    let reply = alice.read_line().await;
    assert!(
        reply.contains("Please enter a valid date/format: !age <YYYY-MM-DD>"),
        "{reply}"
    );
}

#[tokio::test]
async fn funfact_and_time_triggers() {
    let (addr, state, _shutdown) = start_server().await;
    spawn_bot(addr, &state).await;
    let mut alice = TestUser::connect_and_register(addr, "alice").await;

    alice.send("PRIVMSG BOTTY :!funfact").await;
    let reply = alice.read_line().await;
    assert!(reply.contains("NOTICE alice :The fun fact."), "{reply}");

    alice.send("PRIVMSG BOTTY :!time").await;
    let reply = alice.read_line().await;
    // YYYY-MM-DD HH:MM:SS
    let trailing = reply.rsplit(':').count();
    assert!(reply.contains("NOTICE alice :"), "{reply}");
    assert!(trailing >= 3, "time has HH:MM:SS fields: {reply}");
}
