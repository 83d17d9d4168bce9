use log::info;

use crate::client::ClientHandle;
use crate::commands::{Command, CommandError};
use crate::errors::SessionEnd;
use crate::handlers::channels::{
    handle_invite, handle_join, handle_kick, handle_mode, handle_part, handle_part_all,
    handle_topic,
};
use crate::handlers::messages::{handle_notice, handle_privmsg};
use crate::handlers::miscellanneous::{
    handle_away, handle_ping, handle_pong, handle_unknown, handle_who, handle_whois,
    handle_whowas,
};
use crate::handlers::registration::{handle_cap, handle_nick, handle_pass, handle_user};
use crate::message::IrcMessage;
use crate::replies::IrcReply;
use crate::server_state::ServerState;

/// Dispatches one raw line. `Err` ends the session (QUIT, failed
/// authentication); protocol and semantic errors are answered with their
/// numeric and the session continues.
pub async fn handle_request(
    line: &str,
    state: &ServerState,
    me: &ClientHandle,
) -> Result<(), SessionEnd> {
    let Some(msg) = IrcMessage::parse(line) else {
        return Ok(());
    };
    info!(">> incoming {:?}", line);

    let command = match Command::parse(&msg) {
        Ok(command) => command,
        Err(err) => {
            // NOTICE must stay silent whatever went wrong
            if msg.command == "NOTICE" {
                return Ok(());
            }
            let info = me.snapshot().await;
            let nick = info.display.as_str();
            match err {
                CommandError::NeedMoreParams(command) => {
                    me.send(&IrcReply::ErrNeedMoreParams { nick, command: &command });
                }
                CommandError::NoNicknameGiven => {
                    me.send(&IrcReply::ErrNoNicknameGiven { nick });
                }
                CommandError::NoRecipient(command) => {
                    me.send(&IrcReply::ErrNoRecipient { nick, command: &command });
                }
                CommandError::NoTextToSend => {
                    me.send(&IrcReply::ErrNoTextToSend { nick });
                }
                CommandError::Unknown(command) => {
                    handle_unknown(me, command).await;
                }
            }
            return Ok(());
        }
    };

    // registration gate: everything outside the handshake set requires a
    // completed PASS/NICK/USER exchange
    if !command.is_pre_auth() {
        let info = me.snapshot().await;
        if !info.registered {
            me.send(&IrcReply::ErrNotRegistered { nick: &info.display });
            return Ok(());
        }
    }

    match command {
        Command::Pass(password) => handle_pass(state, me, password).await,
        Command::Nick(nick) => handle_nick(state, me, nick).await,
        Command::User { username, realname } => handle_user(state, me, username, realname).await,
        Command::Cap { subcommand } => {
            handle_cap(me, subcommand).await;
            Ok(())
        }
        Command::Quit(reason) => Err(SessionEnd::Quit(reason)),
        Command::Ping(token) => {
            handle_ping(me, token).await;
            Ok(())
        }
        Command::Pong(token) => {
            handle_pong(me, token).await;
            Ok(())
        }
        Command::Join { channels, keys } => {
            handle_join(state, me, channels, keys).await;
            Ok(())
        }
        Command::PartAll => {
            handle_part_all(state, me).await;
            Ok(())
        }
        Command::Part { channels, reason } => {
            handle_part(state, me, channels, reason).await;
            Ok(())
        }
        Command::Kick { channel, user, reason } => {
            handle_kick(state, me, channel, user, reason).await;
            Ok(())
        }
        Command::Invite { nick, channel } => {
            handle_invite(state, me, nick, channel).await;
            Ok(())
        }
        Command::Topic { channel, text } => {
            handle_topic(state, me, channel, text).await;
            Ok(())
        }
        Command::Mode { target, modestring, args } => {
            handle_mode(state, me, target, modestring, args).await;
            Ok(())
        }
        Command::Privmsg { targets, text } => {
            handle_privmsg(state, me, targets, text).await;
            Ok(())
        }
        Command::Notice { targets, text } => {
            handle_notice(state, me, targets, text).await;
            Ok(())
        }
        Command::Who { mask } => {
            handle_who(state, me, mask).await;
            Ok(())
        }
        Command::Whois { target } => {
            handle_whois(state, me, target).await;
            Ok(())
        }
        Command::Whowas { target } => {
            handle_whowas(me, target).await;
            Ok(())
        }
        Command::Away { message } => {
            handle_away(me, message).await;
            Ok(())
        }
    }
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
    async fn post_auth_commands_are_gated() {
        let state = new_state();
        let (tx, mut rx) = mpsc::channel(64);
        let id = state.next_client_id();
        let me = crate::client::ClientHandle::new(id, "127.0.0.1".to_string(), tx);
        state.add_client(id, me.clone());

        handle_request("JOIN #t", &state, &me).await.unwrap();
        assert!(drain(&mut rx)[0].contains(" 451 "));
    }

    #[tokio::test]
    async fn quit_ends_the_session() {
        let state = new_state();
        let (me, _rx) = attach_client(&state, "a").await;
        let end = handle_request("QUIT :gone fishing", &state, &me).await;
        assert_eq!(end, Err(SessionEnd::Quit(Some("gone fishing".to_string()))));
    }

    #[tokio::test]
    async fn unknown_command_answers_421() {
        let state = new_state();
        let (me, mut rx) = attach_client(&state, "a").await;
        handle_request("DANCE", &state, &me).await.unwrap();
        assert!(drain(&mut rx)[0].contains(" 421 a DANCE "));
    }

    #[tokio::test]
    async fn empty_lines_are_ignored() {
        let state = new_state();
        let (me, mut rx) = attach_client(&state, "a").await;
        handle_request("", &state, &me).await.unwrap();
        handle_request("   ", &state, &me).await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn cap_ls_is_acknowledged_empty() {
        let state = new_state();
        let (me, mut rx) = attach_client(&state, "a").await;
        handle_request("CAP LS 302", &state, &me).await.unwrap();
        assert_eq!(drain(&mut rx)[0], ":ircserv CAP a LS :\r\n");
        handle_request("CAP END", &state, &me).await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }
}
