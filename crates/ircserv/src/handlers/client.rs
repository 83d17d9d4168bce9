use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::ClientHandle;
use crate::constants::{MAX_LINE_CONTENT, SERVER_NAME, SHUTDOWN_REASON};
use crate::errors::SessionEnd;
use crate::handlers::request::handle_request;
use crate::replies::IrcReply;
use crate::server_state::ServerState;

/// Accepts connections until the shutdown flag flips. Each connection gets
/// its own task; they all share the runtime's single thread.
pub async fn accept_loop(
    listener: TcpListener,
    state: Arc<ServerState>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, addr)) => {
                        let state = state.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(handle_client(socket, addr, state, shutdown));
                    }
                    Err(err) => error!("failed to accept client: {err}"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

/// Entry point for one accepted connection. A writer task drains the
/// outbound queue; the session driver below owns the read half. Teardown
/// runs the removal cascade, then lets the writer flush what is queued.
pub async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Client connected: {:?}", addr);
    let (tx, mut rx) = mpsc::channel::<String>(state.config.limits.outbound_queue);
    let id = state.next_client_id();
    let handle = ClientHandle::new(id, addr.ip().to_string(), tx);
    state.add_client(id, handle.clone());

    let (mut read_half, mut write_half) = socket.into_split();

    let writer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    let end = drive_session(&mut read_half, &state, &handle, &mut shutdown).await;

    state.remove_client(id, end.reason()).await;
    // dropping the last queue sender ends the writer once it has drained
    drop(handle);
    let _ = writer.await;
    info!("Client {} disconnected: {:?}", id, end);
}

async fn drive_session(
    read_half: &mut OwnedReadHalf,
    state: &ServerState,
    handle: &ClientHandle,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let mut scratch = [0u8; 512];
    let mut inbuf: Vec<u8> = Vec::new();
    let mut truncated = false;
    let mut tick = time::interval(Duration::from_secs(15));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if handle.is_overflowed() {
            return SessionEnd::SlowConsumer;
        }
        tokio::select! {
            read = read_half.read(&mut scratch) => {
                match read {
                    Ok(0) => return SessionEnd::Eof,
                    Ok(n) => {
                        handle.client.write().await.last_activity = Instant::now();
                        inbuf.extend_from_slice(&scratch[..n]);
                        if let Err(end) =
                            process_buffer(&mut inbuf, &mut truncated, state, handle).await
                        {
                            return end;
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(err) => return SessionEnd::Transport(err.to_string()),
                }
            }
            _ = tick.tick() => {
                if let Some(end) = run_liveness(state, handle).await {
                    return end;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let info = handle.snapshot().await;
                    handle.send(&IrcReply::ServerNotice {
                        nick: &info.display,
                        text: SHUTDOWN_REASON,
                    });
                    return SessionEnd::Shutdown;
                }
            }
        }
    }
}

/// Extracts complete lines (CRLF, tolerating bare LF) and dispatches them.
/// A line exceeding 510 bytes of content is truncated, answered with 417,
/// and the tail up to the next terminator is discarded.
async fn process_buffer(
    inbuf: &mut Vec<u8>,
    truncated: &mut bool,
    state: &ServerState,
    handle: &ClientHandle,
) -> Result<(), SessionEnd> {
    loop {
        if let Some(pos) = inbuf.iter().position(|&b| b == b'\n') {
            let mut line_bytes: Vec<u8> = inbuf.drain(..=pos).collect();
            while matches!(line_bytes.last(), Some(b'\n') | Some(b'\r')) {
                line_bytes.pop();
            }
            if *truncated {
                // tail of an over-long line already processed
                *truncated = false;
                continue;
            }
            if line_bytes.len() > MAX_LINE_CONTENT {
                line_bytes.truncate(MAX_LINE_CONTENT);
                send_input_too_long(handle).await;
            }
            let line = String::from_utf8_lossy(&line_bytes).into_owned();
            handle_request(&line, state, handle).await?;
        } else {
            // no terminator yet; force the frame limit anyway
            if !*truncated && inbuf.len() > MAX_LINE_CONTENT {
                let head: Vec<u8> = inbuf.drain(..MAX_LINE_CONTENT).collect();
                inbuf.clear();
                *truncated = true;
                send_input_too_long(handle).await;
                let line = String::from_utf8_lossy(&head).into_owned();
                handle_request(&line, state, handle).await?;
            }
            return Ok(());
        }
    }
}

async fn send_input_too_long(handle: &ClientHandle) {
    let info = handle.snapshot().await;
    handle.send(&IrcReply::ErrInputTooLong { nick: &info.display });
}

/// Liveness: after `ping_interval` idle seconds a PING goes out; a challenge
/// unanswered for `pong_timeout` seconds drops the client.
async fn run_liveness(state: &ServerState, handle: &ClientHandle) -> Option<SessionEnd> {
    let now = Instant::now();
    let (last_activity, last_ping) = {
        let client = handle.client.read().await;
        (client.last_activity, client.last_ping)
    };
    let ping_after = Duration::from_secs(state.config.limits.ping_interval);
    let drop_after = Duration::from_secs(state.config.limits.pong_timeout);

    match last_ping {
        Some(sent) if now.saturating_duration_since(sent) > drop_after => {
            return Some(SessionEnd::Timeout);
        }
        None if now.saturating_duration_since(last_activity) > ping_after => {
            handle.send(&IrcReply::Ping { token: SERVER_NAME });
            handle.client.write().await.last_ping = Some(now);
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::test_support::{attach_client, new_state};
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn lines_split_on_crlf_and_bare_lf() {
        let state = new_state();
        let (me, mut rx) = attach_client(&state, "a").await;
        let mut inbuf = b"PING :one\r\nPING :two\nPING :thr".to_vec();
        let mut truncated = false;
        process_buffer(&mut inbuf, &mut truncated, &state, &me).await.unwrap();

        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 2, "third line incomplete: {lines:?}");
        assert!(lines[0].contains("PONG :one"));
        assert!(lines[1].contains("PONG :two"));
        assert_eq!(inbuf, b"PING :thr".to_vec());
    }

    #[tokio::test]
    async fn overlong_line_is_truncated_with_417() {
        let state = new_state();
        let (me, mut rx) = attach_client(&state, "a").await;
        let mut inbuf = format!("PING :{}\r\nPING :ok\r\n", "x".repeat(600)).into_bytes();
        let mut truncated = false;
        process_buffer(&mut inbuf, &mut truncated, &state, &me).await.unwrap();

        let lines = drain(&mut rx);
        assert!(lines[0].contains(" 417 "), "{lines:?}");
        assert!(lines[1].contains("PONG"), "truncated line still dispatched");
        assert!(lines[2].contains("PONG :ok"), "next line unaffected");
    }

    #[tokio::test]
    async fn unterminated_flood_is_cut_at_frame_limit() {
        let state = new_state();
        let (me, mut rx) = attach_client(&state, "a").await;
        let mut inbuf = format!("PING :{}", "y".repeat(700)).into_bytes();
        let mut truncated = false;
        process_buffer(&mut inbuf, &mut truncated, &state, &me).await.unwrap();
        assert!(truncated);
        assert!(inbuf.is_empty());

        let lines = drain(&mut rx);
        assert!(lines[0].contains(" 417 "));
        assert!(lines[1].contains("PONG"));

        // the late terminator only closes the discarded tail
        let mut rest = b"yyyy\r\nPING :after\r\n".to_vec();
        process_buffer(&mut rest, &mut truncated, &state, &me).await.unwrap();
        assert!(!truncated);
        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].contains("PONG :after"));
    }
}
