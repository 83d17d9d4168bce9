use log::{debug, info};

use crate::client::ClientHandle;
use crate::parsers::dcc_request_parser;
use crate::replies::IrcReply;
use crate::server_state::{FileData, ServerState};

// PRIVMSG/NOTICE <msgtarget> :<text>. Targets are comma-separated; each is
// a channel (membership required, fan-out excludes the sender) or a
// nickname. NOTICE follows the same routing but never generates an error
// reply.
pub async fn handle_privmsg(
    state: &ServerState,
    me: &ClientHandle,
    targets: Vec<String>,
    text: String,
) {
    deliver(state, me, targets, text, false).await;
}

pub async fn handle_notice(
    state: &ServerState,
    me: &ClientHandle,
    targets: Vec<String>,
    text: String,
) {
    deliver(state, me, targets, text, true).await;
}

async fn deliver(
    state: &ServerState,
    me: &ClientHandle,
    targets: Vec<String>,
    text: String,
    notice: bool,
) {
    let info = me.snapshot().await;
    for target in &targets {
        if target.starts_with('#') || target.starts_with('&') {
            let Some(channel) = state.get_channel(target) else {
                if !notice {
                    me.send(&IrcReply::ErrNoSuchChannel { nick: &info.display, channel: target });
                }
                continue;
            };
            if !channel.is_member(info.id) {
                if !notice {
                    me.send(&IrcReply::ErrCannotSendToChan {
                        nick: &info.display,
                        channel: &channel.name,
                    });
                }
                continue;
            }
            let line = if notice {
                IrcReply::Notice { mask: &info.mask, target: &channel.name, text: &text }.format()
            } else {
                IrcReply::Privmsg { mask: &info.mask, target: &channel.name, text: &text }.format()
            };
            state.broadcast_to_channel(&channel, &line, Some(info.id));
        } else {
            let Some(peer) = state.find_by_nick(target) else {
                if !notice {
                    me.send(&IrcReply::ErrNoSuchNick { nick: &info.display, target });
                }
                continue;
            };
            let peer_info = peer.snapshot().await;

            // A CTCP DCC offer is recorded for the receiver, then relayed
            // untouched; the transfer itself is peer-to-peer.
            if !notice {
                if let Ok((_, (verb, path))) = dcc_request_parser(&text) {
                    info!(
                        "DCC {:?} {} from {} to {}",
                        verb, path, info.display, peer_info.display
                    );
                    state.pending_files.insert(
                        peer_info.display.to_ascii_lowercase(),
                        FileData {
                            path,
                            sender: info.display.clone(),
                            receiver: peer_info.display.clone(),
                        },
                    );
                }
            }

            let line = if notice {
                IrcReply::Notice { mask: &info.mask, target: &peer_info.display, text: &text }
                    .format()
            } else {
                IrcReply::Privmsg { mask: &info.mask, target: &peer_info.display, text: &text }
                    .format()
            };
            peer.send_line(&line);

            if !notice {
                if let Some(away) = &peer_info.away {
                    me.send(&IrcReply::Away {
                        nick: &info.display,
                        target: &peer_info.display,
                        message: away,
                    });
                }
            }
            debug!("{} -> {}: {} bytes", info.display, peer_info.display, text.len());
        }
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
    async fn channel_message_excludes_sender() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        let (b, mut brx) = attach_client(&state, "b").await;
        handle_join(&state, &a, vec!["#t".to_string()], vec![]).await;
        handle_join(&state, &b, vec!["#t".to_string()], vec![]).await;
        drain(&mut arx);
        drain(&mut brx);

        handle_privmsg(&state, &a, vec!["#t".to_string()], "hello".to_string()).await;
        assert!(drain(&mut brx)[0].contains(":a!~a@a PRIVMSG #t :hello"));
        assert!(drain(&mut arx).is_empty(), "sender sees no echo");
    }

    #[tokio::test]
    async fn channel_message_requires_membership() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        let (b, mut brx) = attach_client(&state, "b").await;
        handle_join(&state, &b, vec!["#t".to_string()], vec![]).await;
        drain(&mut brx);

        handle_privmsg(&state, &a, vec!["#t".to_string()], "hi".to_string()).await;
        assert!(drain(&mut arx)[0].contains(" 404 "));
        assert!(drain(&mut brx).is_empty());

        handle_notice(&state, &a, vec!["#t".to_string()], "hi".to_string()).await;
        assert!(drain(&mut arx).is_empty(), "NOTICE never errors");
    }

    #[tokio::test]
    async fn direct_message_and_missing_nick() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        let (_b, mut brx) = attach_client(&state, "b").await;

        handle_privmsg(&state, &a, vec!["b".to_string()], "psst".to_string()).await;
        assert!(drain(&mut brx)[0].contains(":a!~a@a PRIVMSG b :psst"));

        handle_privmsg(&state, &a, vec!["ghost".to_string()], "psst".to_string()).await;
        assert!(drain(&mut arx)[0].contains(" 401 "));
    }

    #[tokio::test]
    async fn away_peer_answers_301() {
        let state = new_state();
        let (a, mut arx) = attach_client(&state, "a").await;
        let (b, mut brx) = attach_client(&state, "b").await;
        b.client.write().await.away = Some("gone fishing".to_string());

        handle_privmsg(&state, &a, vec!["b".to_string()], "there?".to_string()).await;
        assert!(drain(&mut brx)[0].contains("PRIVMSG"));
        let lines = drain(&mut arx);
        assert!(lines[0].contains(" 301 a b :gone fishing"), "{lines:?}");
    }

    #[tokio::test]
    async fn dcc_offer_is_recorded_and_relayed() {
        let state = new_state();
        let (a, _arx) = attach_client(&state, "a").await;
        let (_b, mut brx) = attach_client(&state, "b").await;

        let ctcp = "\u{1}DCC SEND notes.txt 2130706433 5000\u{1}";
        handle_privmsg(&state, &a, vec!["b".to_string()], ctcp.to_string()).await;

        let relayed = drain(&mut brx);
        assert!(relayed[0].contains("DCC SEND notes.txt"), "frame passes through");
        let pending = state.pending_files.get("b").expect("offer recorded");
        assert_eq!(pending.path, "notes.txt");
        assert_eq!(pending.sender, "a");
        assert_eq!(pending.receiver, "b");
    }
}
