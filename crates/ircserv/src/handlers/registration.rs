use log::info;

use crate::client::ClientHandle;
use crate::errors::SessionEnd;
use crate::parsers::is_valid_nickname;
use crate::replies::IrcReply;
use crate::server_state::ServerState;

// Handshake state machine:
//
//   INIT --PASS(good)--> HAS_PASS --NICK--> HAS_NICK --USER--> REGISTERED
//
// USER before NICK is accepted (NICK still required); NICK or USER before a
// good PASS ends the connection with 464.

/// Wrong password, or NICK/USER attempted before PASS. Writes the 464 and
/// the closing ERROR, then ends the session.
fn reject_auth(me: &ClientHandle, display: &str) -> SessionEnd {
    me.send(&IrcReply::ErrPasswdMismatch { nick: display });
    me.send(&IrcReply::ErrorClosing {
        reason: crate::constants::ERR_PASSWDMISMATCH_STR,
    });
    SessionEnd::AuthFailure
}

pub async fn handle_pass(
    state: &ServerState,
    me: &ClientHandle,
    password: String,
) -> Result<(), SessionEnd> {
    let info = me.snapshot().await;
    if info.registered {
        me.send(&IrcReply::ErrAlreadyRegistered { nick: &info.display });
        return Ok(());
    }
    if password != state.password {
        return Err(reject_auth(me, &info.display));
    }
    me.client.write().await.password_ok = true;
    Ok(())
}

pub async fn handle_nick(
    state: &ServerState,
    me: &ClientHandle,
    nick: String,
) -> Result<(), SessionEnd> {
    let info = me.snapshot().await;
    if !info.password_ok {
        return Err(reject_auth(me, &info.display));
    }
    if !is_valid_nickname(&nick) {
        me.send(&IrcReply::ErrErroneusNickname { nick: &info.display, bad: &nick });
        return Ok(());
    }
    if !state.claim_nick(&nick, info.id) {
        me.send(&IrcReply::ErrNicknameInUse { nick: &info.display, bad: &nick });
        return Ok(());
    }

    match &info.nick {
        // nick change after registration: tell self and every channel peer
        Some(old) if info.registered => {
            if old.to_ascii_lowercase() != nick.to_ascii_lowercase() {
                state.release_nick(old);
            }
            me.client.write().await.nick = Some(nick.clone());
            let echo = IrcReply::NickChange { mask: &info.mask, new_nick: &nick }.format();
            me.send_line(&echo);
            for peer in state.channel_peers(info.id) {
                if let Some(peer_handle) = state.get_client(peer) {
                    peer_handle.send_line(&echo);
                }
            }
            info!("client {} is now known as {}", info.id, nick);
        }
        Some(old) => {
            if old.to_ascii_lowercase() != nick.to_ascii_lowercase() {
                state.release_nick(old);
            }
            me.client.write().await.nick = Some(nick);
        }
        None => {
            me.client.write().await.nick = Some(nick);
        }
    }
    complete_registration(state, me).await;
    Ok(())
}

pub async fn handle_user(
    state: &ServerState,
    me: &ClientHandle,
    username: String,
    realname: String,
) -> Result<(), SessionEnd> {
    let info = me.snapshot().await;
    if !info.password_ok {
        return Err(reject_auth(me, &info.display));
    }
    if info.registered {
        me.send(&IrcReply::ErrAlreadyRegistered { nick: &info.display });
        return Ok(());
    }
    {
        let mut client = me.client.write().await;
        client.username = Some(username);
        client.realname = Some(realname);
    }
    complete_registration(state, me).await;
    Ok(())
}

/// CAP is acknowledged with an empty capability list; END and everything
/// else pass silently.
pub async fn handle_cap(me: &ClientHandle, subcommand: String) {
    if subcommand == "LS" {
        let info = me.snapshot().await;
        me.send(&IrcReply::CapLs { nick: &info.display });
    }
}

/// Fires the welcome burst exactly once, when PASS, NICK and USER are all in.
/// The advertised hostname switches from the IP to the nickname here.
async fn complete_registration(state: &ServerState, me: &ClientHandle) {
    let (nick, user) = {
        let mut client = me.client.write().await;
        if !client.is_registered() || client.welcomed {
            return;
        }
        client.welcomed = true;
        let nick = client.nick.clone().unwrap_or_default();
        client.hostname = nick.clone();
        (nick, client.username.clone().unwrap_or_default())
    };

    me.send(&IrcReply::Welcome { nick: &nick, user: &user, host: &nick });
    me.send(&IrcReply::YourHost { nick: &nick });
    me.send(&IrcReply::Created { nick: &nick, date: &state.created_at });
    me.send(&IrcReply::MyInfo { nick: &nick });
    me.send(&IrcReply::LuserOp { nick: &nick, ops: 0 });
    me.send(&IrcReply::LuserUnknown { nick: &nick, unknown: state.unknown_count() });
    me.send(&IrcReply::LuserChannels { nick: &nick, channels: state.channel_count() });
    me.send(&IrcReply::LuserMe { nick: &nick, clients: state.client_count() });
    me.send(&IrcReply::MotdStart { nick: &nick });
    for line in &state.config.motd {
        me.send(&IrcReply::Motd { nick: &nick, line });
    }
    me.send(&IrcReply::EndOfMotd { nick: &nick });
    info!("client {} registered as {}", me.client.read().await.id, nick);
}
