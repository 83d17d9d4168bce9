use tokio::time::Instant;

use crate::client::{ClientHandle, ClientInfo};
use crate::constants::SERVER_NAME;
use crate::replies::IrcReply;
use crate::server_state::ServerState;

// PING :<token> — answered immediately with a server-prefixed PONG carrying
// the same token.
pub async fn handle_ping(me: &ClientHandle, token: String) {
    me.send(&IrcReply::Pong { token: &token });
}

/// PONG settles the outstanding liveness challenge, but only when it echoes
/// the token the server pings with; any other PONG is not a liveness reply.
pub async fn handle_pong(me: &ClientHandle, token: String) {
    if token == SERVER_NAME {
        me.client.write().await.last_ping = None;
    }
}

// AWAY [ :<text> ] — with text marks away (306), without clears it (305).
pub async fn handle_away(me: &ClientHandle, message: Option<String>) {
    let nick = {
        let mut client = me.client.write().await;
        client.away = message.clone();
        client.display_nick().to_string()
    };
    match message {
        Some(_) => me.send(&IrcReply::NowAway { nick: &nick }),
        None => me.send(&IrcReply::Unaway { nick: &nick }),
    }
}

fn who_flags(info: &ClientInfo, is_op: bool) -> String {
    let mut flags = String::from(if info.away.is_some() { "G" } else { "H" });
    if is_op {
        flags.push('@');
    }
    flags
}

// WHO [ <mask> ] — a channel mask lists its members, a nickname lists that
// user, no mask lists everyone. Always terminated by 315.
pub async fn handle_who(state: &ServerState, me: &ClientHandle, mask: Option<String>) {
    let info = me.snapshot().await;
    let mask_text = mask.as_deref().unwrap_or("*");

    if let Some(channel) = mask.as_deref().and_then(|m| state.get_channel(m)) {
        for id in channel.member_ids() {
            if let Some(member) = state.get_client(id) {
                let member_info = member.snapshot().await;
                send_who_reply(me, &info, &channel.name, &member_info, channel.is_operator(id));
            }
        }
    } else if let Some(peer) = mask.as_deref().and_then(|m| state.find_by_nick(m)) {
        let peer_info = peer.snapshot().await;
        send_who_reply(me, &info, "*", &peer_info, false);
    } else if mask.is_none() {
        let ids: Vec<_> = state.users.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some(peer) = state.get_client(id) {
                let peer_info = peer.snapshot().await;
                if peer_info.registered {
                    send_who_reply(me, &info, "*", &peer_info, false);
                }
            }
        }
    }
    me.send(&IrcReply::EndOfWho { nick: &info.display, mask: mask_text });
}

fn send_who_reply(
    me: &ClientHandle,
    info: &ClientInfo,
    channel: &str,
    member: &ClientInfo,
    is_op: bool,
) {
    let flags = who_flags(member, is_op);
    me.send(&IrcReply::WhoReply {
        nick: &info.display,
        channel,
        user: member.username.as_deref().unwrap_or("unknown"),
        host: &member.hostname,
        target: &member.display,
        flags: &flags,
        realname: member.realname.as_deref().unwrap_or(""),
    });
}

// WHOIS <nick> — 311, 312, 317 and the 318 terminator.
pub async fn handle_whois(state: &ServerState, me: &ClientHandle, target: String) {
    let info = me.snapshot().await;
    let Some(peer) = state.find_by_nick(&target) else {
        me.send(&IrcReply::ErrNoSuchNick { nick: &info.display, target: &target });
        return;
    };
    let peer_info = peer.snapshot().await;
    me.send(&IrcReply::WhoisUser {
        nick: &info.display,
        target: &peer_info.display,
        user: peer_info.username.as_deref().unwrap_or("unknown"),
        host: &peer_info.hostname,
        realname: peer_info.realname.as_deref().unwrap_or(""),
    });
    me.send(&IrcReply::WhoisServer { nick: &info.display, target: &peer_info.display });
    me.send(&IrcReply::WhoisIdle {
        nick: &info.display,
        target: &peer_info.display,
        idle: Instant::now()
            .saturating_duration_since(peer_info.last_activity)
            .as_secs(),
        signon: peer_info.signon,
    });
    me.send(&IrcReply::EndOfWhois { nick: &info.display, target: &peer_info.display });
}

// WHOWAS <nick> — no history is kept, so only the terminator.
pub async fn handle_whowas(me: &ClientHandle, target: String) {
    let info = me.snapshot().await;
    me.send(&IrcReply::EndOfWhowas { nick: &info.display, target: &target });
}

/// 421 once registered; before registration the gate numeric is the more
/// helpful answer.
pub async fn handle_unknown(me: &ClientHandle, command: String) {
    let info = me.snapshot().await;
    if info.registered {
        me.send(&IrcReply::ErrUnknownCommand { nick: &info.display, command: &command });
    } else {
        me.send(&IrcReply::ErrNotRegistered { nick: &info.display });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::channels::handle_join;
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
    async fn ping_is_answered_with_pong() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        handle_ping(&a, "tok123".to_string()).await;
        assert_eq!(drain(&mut arx)[0], ":ircserv PONG :tok123\r\n");
    }

    #[tokio::test]
    async fn pong_clears_challenge_only_on_matching_token() {
        let state = new_state();
        let (a, _arx) = attach_client(&state, "a").await;

        a.client.write().await.last_ping = Some(Instant::now());
        handle_pong(&a, "something-else".to_string()).await;
        assert!(
            a.client.read().await.last_ping.is_some(),
            "stray PONG must not settle the challenge"
        );

        handle_pong(&a, SERVER_NAME.to_string()).await;
        assert!(a.client.read().await.last_ping.is_none());
    }

    #[tokio::test]
    async fn away_toggles() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        handle_away(&a, Some("afk".to_string())).await;
        assert!(drain(&mut arx)[0].contains(" 306 "));
        handle_away(&a, None).await;
        assert!(drain(&mut arx)[0].contains(" 305 "));
        assert!(a.client.read().await.away.is_none());
    }

    #[tokio::test]
    async fn who_lists_channel_members() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        let (b, mut brx) = attach_client(&state, "b").await;
        handle_join(&state, &a, vec!["#t".to_string()], vec![]).await;
        handle_join(&state, &b, vec!["#t".to_string()], vec![]).await;
        drain(&mut arx);
        drain(&mut brx);

        handle_who(&state, &a, Some("#t".to_string())).await;
        let lines = drain(&mut arx);
        assert_eq!(lines.len(), 3, "{lines:?}");
        assert!(lines.iter().any(|l| l.contains(" 352 ") && l.contains("@")));
        assert!(lines.last().unwrap().contains(" 315 "));
    }

    #[tokio::test]
    async fn whois_sequence() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        let (_b, _brx) = attach_client(&state, "b").await;

        handle_whois(&state, &a, "b".to_string()).await;
        let lines = drain(&mut arx);
        assert!(lines[0].contains(" 311 "));
        assert!(lines[1].contains(" 312 "));
        assert!(lines[2].contains(" 317 "));
        assert!(lines[3].contains(" 318 "));

        handle_whois(&state, &a, "ghost".to_string()).await;
        assert!(drain(&mut arx)[0].contains(" 401 "));
    }

    #[tokio::test]
    async fn whowas_terminates_immediately() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        handle_whowas(&a, "oldnick".to_string()).await;
        assert!(drain(&mut arx)[0].contains(" 369 "));
    }
}
