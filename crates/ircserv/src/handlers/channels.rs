use log::debug;

use crate::channel::{Channel, TopicInfo};
use crate::client::{ClientHandle, ClientId, ClientInfo};
use crate::parsers::{is_valid_channel_name, is_valid_key, modestring_parser};
use crate::replies::IrcReply;
use crate::server_state::ServerState;

async fn nick_of(state: &ServerState, id: ClientId) -> Option<String> {
    let handle = state.get_client(id)?;
    let client = handle.client.read().await;
    client.nick.clone()
}

/// NAMES payload: operators first with their `@` prefix, plain members
/// after, both alphabetical.
async fn names_reply(state: &ServerState, channel: &Channel) -> String {
    let mut ops = Vec::new();
    let mut plain = Vec::new();
    for id in channel.member_ids() {
        if let Some(nick) = nick_of(state, id).await {
            if channel.is_operator(id) {
                ops.push(format!("@{nick}"));
            } else {
                plain.push(nick);
            }
        }
    }
    ops.sort();
    plain.sort();
    ops.extend(plain);
    ops.join(" ")
}

// JOIN ( <channel> *( "," <channel> ) [ <key> *( "," <key> ) ] )
// Keys pair with channels positionally. A channel is created on first JOIN
// and its creator becomes operator.
pub async fn handle_join(
    state: &ServerState,
    me: &ClientHandle,
    channels: Vec<String>,
    keys: Vec<String>,
) {
    let info = me.snapshot().await;
    for (idx, name) in channels.iter().enumerate() {
        join_one(state, me, &info, name, keys.get(idx).map(String::as_str)).await;
    }
}

async fn join_one(
    state: &ServerState,
    me: &ClientHandle,
    info: &ClientInfo,
    name: &str,
    key: Option<&str>,
) {
    if !is_valid_channel_name(name) {
        me.send(&IrcReply::ErrBadChanMask { nick: &info.display, channel: name });
        return;
    }
    let (channel, created) = state.get_or_create_channel(name);
    if channel.is_member(info.id) {
        return;
    }
    if !created {
        let modes = channel.modes.read().await.clone();
        if modes.invite_only && !channel.invited.contains(&info.id) {
            me.send(&IrcReply::ErrInviteOnlyChan { nick: &info.display, channel: &channel.name });
            return;
        }
        if let Some(chan_key) = &modes.key {
            if key != Some(chan_key.as_str()) {
                me.send(&IrcReply::ErrBadChannelKey { nick: &info.display, channel: &channel.name });
                return;
            }
        }
        if let Some(limit) = modes.user_limit {
            if channel.member_count() >= limit as usize {
                me.send(&IrcReply::ErrChannelIsFull { nick: &info.display, channel: &channel.name });
                return;
            }
        }
    }

    channel.add_member(info.id);
    if created {
        channel.promote(info.id);
    }
    // an invite is good for one JOIN
    channel.invited.remove(&info.id);
    {
        let mut client = me.client.write().await;
        client.joined.insert(name.to_ascii_lowercase());
        client.invited.remove(&name.to_ascii_lowercase());
    }

    let join_line = IrcReply::Join { mask: &info.mask, channel: &channel.name }.format();
    state.broadcast_to_channel(&channel, &join_line, None);

    if let Some(topic) = channel.topic.read().await.clone() {
        me.send(&IrcReply::Topic {
            nick: &info.display,
            channel: &channel.name,
            topic: &topic.text,
        });
        me.send(&IrcReply::TopicWhoTime {
            nick: &info.display,
            channel: &channel.name,
            set_by: &topic.set_by,
            set_at: topic.set_at,
        });
    }
    let names = names_reply(state, &channel).await;
    me.send(&IrcReply::NamReply { nick: &info.display, channel: &channel.name, names: &names });
    me.send(&IrcReply::EndOfNames { nick: &info.display, channel: &channel.name });
}

pub async fn handle_part(
    state: &ServerState,
    me: &ClientHandle,
    channels: Vec<String>,
    reason: Option<String>,
) {
    let info = me.snapshot().await;
    for name in &channels {
        part_one(state, me, &info, name, reason.as_deref()).await;
    }
}

/// `JOIN 0`: leave every channel, oldest state first.
pub async fn handle_part_all(state: &ServerState, me: &ClientHandle) {
    let info = me.snapshot().await;
    for name in &info.joined {
        part_one(state, me, &info, name, None).await;
    }
}

async fn part_one(
    state: &ServerState,
    me: &ClientHandle,
    info: &ClientInfo,
    name: &str,
    reason: Option<&str>,
) {
    let Some(channel) = state.get_channel(name) else {
        me.send(&IrcReply::ErrNoSuchChannel { nick: &info.display, channel: name });
        return;
    };
    if !channel.is_member(info.id) {
        me.send(&IrcReply::ErrNotOnChannel { nick: &info.display, channel: &channel.name });
        return;
    }
    let line = IrcReply::Part { mask: &info.mask, channel: &channel.name, reason }.format();
    state.broadcast_to_channel(&channel, &line, None);
    channel.remove_member(info.id);
    me.client
        .write()
        .await
        .joined
        .remove(&name.to_ascii_lowercase());
    state.drop_channel_if_empty(&channel.name);
}

// KICK <channel> <user> [ :<comment> ]  — the default comment is the
// kicker's nickname.
pub async fn handle_kick(
    state: &ServerState,
    me: &ClientHandle,
    channel_name: String,
    user: String,
    reason: Option<String>,
) {
    let info = me.snapshot().await;
    let Some(channel) = state.get_channel(&channel_name) else {
        me.send(&IrcReply::ErrNoSuchChannel { nick: &info.display, channel: &channel_name });
        return;
    };
    if !channel.is_member(info.id) {
        me.send(&IrcReply::ErrNotOnChannel { nick: &info.display, channel: &channel.name });
        return;
    }
    if !channel.is_operator(info.id) {
        me.send(&IrcReply::ErrChanOpPrivsNeeded { nick: &info.display, channel: &channel.name });
        return;
    }
    let target = state.find_by_nick(&user);
    let target_id = match &target {
        Some(handle) => handle.id().await,
        None => {
            me.send(&IrcReply::ErrUserNotInChannel {
                nick: &info.display,
                target: &user,
                channel: &channel.name,
            });
            return;
        }
    };
    if !channel.is_member(target_id) {
        me.send(&IrcReply::ErrUserNotInChannel {
            nick: &info.display,
            target: &user,
            channel: &channel.name,
        });
        return;
    }

    let reason = reason.unwrap_or_else(|| info.display.clone());
    let line = IrcReply::Kick {
        mask: &info.mask,
        channel: &channel.name,
        target: &user,
        reason: &reason,
    }
    .format();
    state.broadcast_to_channel(&channel, &line, None);
    channel.remove_member(target_id);
    if let Some(target) = target {
        target
            .client
            .write()
            .await
            .joined
            .remove(&channel_name.to_ascii_lowercase());
    }
    debug!("{} kicked {} from {}", info.display, user, channel.name);
}

// INVITE <nickname> <channel>. On +i channels only operators may invite.
pub async fn handle_invite(
    state: &ServerState,
    me: &ClientHandle,
    nick: String,
    channel_name: String,
) {
    let info = me.snapshot().await;
    let Some(target) = state.find_by_nick(&nick) else {
        me.send(&IrcReply::ErrNoSuchNick { nick: &info.display, target: &nick });
        return;
    };
    let target_id = target.id().await;
    let Some(channel) = state.get_channel(&channel_name) else {
        me.send(&IrcReply::ErrNoSuchChannel { nick: &info.display, channel: &channel_name });
        return;
    };
    if !channel.is_member(info.id) {
        me.send(&IrcReply::ErrNotOnChannel { nick: &info.display, channel: &channel.name });
        return;
    }
    if channel.is_member(target_id) {
        me.send(&IrcReply::ErrUserOnChannel {
            nick: &info.display,
            target: &nick,
            channel: &channel.name,
        });
        return;
    }
    if channel.modes.read().await.invite_only && !channel.is_operator(info.id) {
        me.send(&IrcReply::ErrChanOpPrivsNeeded { nick: &info.display, channel: &channel.name });
        return;
    }

    channel.invited.insert(target_id);
    target
        .client
        .write()
        .await
        .invited
        .insert(channel.name.to_ascii_lowercase());
    me.send(&IrcReply::Inviting { nick: &info.display, target: &nick, channel: &channel.name });
    target.send(&IrcReply::Invite { mask: &info.mask, target: &nick, channel: &channel.name });
}

// TOPIC <channel> [ :<topic> ]. Without a topic argument this is a query;
// an empty argument clears the topic. Setting is op-gated under +t.
pub async fn handle_topic(
    state: &ServerState,
    me: &ClientHandle,
    channel_name: String,
    text: Option<String>,
) {
    let info = me.snapshot().await;
    let Some(channel) = state.get_channel(&channel_name) else {
        me.send(&IrcReply::ErrNoSuchChannel { nick: &info.display, channel: &channel_name });
        return;
    };
    let Some(text) = text else {
        match channel.topic.read().await.clone() {
            Some(topic) => {
                me.send(&IrcReply::Topic {
                    nick: &info.display,
                    channel: &channel.name,
                    topic: &topic.text,
                });
                me.send(&IrcReply::TopicWhoTime {
                    nick: &info.display,
                    channel: &channel.name,
                    set_by: &topic.set_by,
                    set_at: topic.set_at,
                });
            }
            None => me.send(&IrcReply::NoTopic { nick: &info.display, channel: &channel.name }),
        }
        return;
    };

    if !channel.is_member(info.id) {
        me.send(&IrcReply::ErrNotOnChannel { nick: &info.display, channel: &channel.name });
        return;
    }
    if channel.modes.read().await.topic_lock && !channel.is_operator(info.id) {
        me.send(&IrcReply::ErrChanOpPrivsNeeded { nick: &info.display, channel: &channel.name });
        return;
    }
    {
        let mut topic = channel.topic.write().await;
        *topic = if text.is_empty() {
            None
        } else {
            Some(TopicInfo {
                text: text.clone(),
                set_by: info.display.clone(),
                set_at: chrono::Utc::now().timestamp(),
            })
        };
    }
    let line = IrcReply::TopicSet { mask: &info.mask, channel: &channel.name, topic: &text }.format();
    state.broadcast_to_channel(&channel, &line, None);
}

// MODE <target> [ <modestring> [ <args>... ] ]
pub async fn handle_mode(
    state: &ServerState,
    me: &ClientHandle,
    target: String,
    modestring: Option<String>,
    args: Vec<String>,
) {
    let info = me.snapshot().await;
    if target.starts_with('#') || target.starts_with('&') {
        channel_mode(state, me, &info, &target, modestring, args).await;
    } else {
        user_mode(state, &info, me, &target, modestring).await;
    }
}

/// Only `MODE <self>` with no arguments is supported for user targets: it
/// echoes the (empty) user mode set. Anything else is ignored.
async fn user_mode(
    state: &ServerState,
    info: &ClientInfo,
    me: &ClientHandle,
    target: &str,
    modestring: Option<String>,
) {
    if state.find_by_nick(target).is_none() {
        me.send(&IrcReply::ErrNoSuchNick { nick: &info.display, target });
        return;
    }
    let is_self = info
        .nick
        .as_deref()
        .map(|nick| nick.eq_ignore_ascii_case(target))
        .unwrap_or(false);
    if is_self && modestring.is_none() {
        me.send(&IrcReply::ModeEcho { mask: &info.mask, target: &info.display, modes: "+" });
    }
}

async fn channel_mode(
    state: &ServerState,
    me: &ClientHandle,
    info: &ClientInfo,
    target: &str,
    modestring: Option<String>,
    args: Vec<String>,
) {
    let Some(channel) = state.get_channel(target) else {
        me.send(&IrcReply::ErrNoSuchChannel { nick: &info.display, channel: target });
        return;
    };

    // query: current modes plus creation time
    let Some(modestring) = modestring else {
        let modes = channel.modes.read().await.to_modestring();
        me.send(&IrcReply::ChannelModeIs {
            nick: &info.display,
            channel: &channel.name,
            modes: &modes,
        });
        me.send(&IrcReply::CreationTime {
            nick: &info.display,
            channel: &channel.name,
            created_at: channel.created_at,
        });
        return;
    };

    // ban-list query; the list is always empty but clients expect the
    // terminator
    if args.is_empty() && matches!(modestring.as_str(), "b" | "+b") {
        me.send(&IrcReply::EndOfBanList { nick: &info.display, channel: &channel.name });
        return;
    }

    let Ok(("", changes)) = modestring_parser(&modestring) else {
        me.send(&IrcReply::ErrUnknownMode {
            nick: &info.display,
            mode: modestring.chars().next().unwrap_or('?'),
            channel: &channel.name,
        });
        return;
    };

    if !channel.is_member(info.id) {
        me.send(&IrcReply::ErrNotOnChannel { nick: &info.display, channel: &channel.name });
        return;
    }
    if !channel.is_operator(info.id) {
        me.send(&IrcReply::ErrChanOpPrivsNeeded { nick: &info.display, channel: &channel.name });
        return;
    }

    let mut arg_iter = args.into_iter();
    let mut applied: Vec<(bool, char, Option<String>)> = Vec::new();
    for (adding, letter) in changes {
        match letter {
            'i' => {
                channel.modes.write().await.invite_only = adding;
                applied.push((adding, letter, None));
            }
            't' => {
                channel.modes.write().await.topic_lock = adding;
                applied.push((adding, letter, None));
            }
            'k' => {
                if adding {
                    match arg_iter.next() {
                        None => me.send(&IrcReply::ErrNeedMoreParams {
                            nick: &info.display,
                            command: "MODE",
                        }),
                        Some(key) if !is_valid_key(&key) => {
                            me.send(&IrcReply::ErrInvalidKey {
                                nick: &info.display,
                                channel: &channel.name,
                            });
                        }
                        Some(key) => {
                            channel.modes.write().await.key = Some(key.clone());
                            applied.push((true, 'k', Some(key)));
                        }
                    }
                } else {
                    // -k conventionally carries the key; consume it if given
                    let _ = arg_iter.next();
                    channel.modes.write().await.key = None;
                    applied.push((false, 'k', None));
                }
            }
            'l' => {
                if adding {
                    match arg_iter.next() {
                        None => me.send(&IrcReply::ErrNeedMoreParams {
                            nick: &info.display,
                            command: "MODE",
                        }),
                        Some(arg) => match arg.parse::<u32>() {
                            Ok(limit) if limit > 0 => {
                                channel.modes.write().await.user_limit = Some(limit);
                                applied.push((true, 'l', Some(arg)));
                            }
                            _ => me.send(&IrcReply::ErrInvalidModeParam {
                                nick: &info.display,
                                channel: &channel.name,
                                mode: 'l',
                                param: &arg,
                            }),
                        },
                    }
                } else {
                    channel.modes.write().await.user_limit = None;
                    applied.push((false, 'l', None));
                }
            }
            'o' => match arg_iter.next() {
                None => me.send(&IrcReply::ErrNeedMoreParams {
                    nick: &info.display,
                    command: "MODE",
                }),
                Some(nick_arg) => {
                    let target_id = match state.find_by_nick(&nick_arg) {
                        Some(handle) => Some(handle.id().await),
                        None => None,
                    };
                    match target_id {
                        Some(id) if channel.is_member(id) => {
                            if adding {
                                channel.promote(id);
                            } else {
                                channel.demote(id);
                            }
                            applied.push((adding, 'o', Some(nick_arg)));
                        }
                        _ => me.send(&IrcReply::ErrUserNotInChannel {
                            nick: &info.display,
                            target: &nick_arg,
                            channel: &channel.name,
                        }),
                    }
                }
            },
            other => me.send(&IrcReply::ErrUnknownMode {
                nick: &info.display,
                mode: other,
                channel: &channel.name,
            }),
        }
    }

    if !applied.is_empty() {
        let modes = format_mode_changes(&applied);
        let line =
            IrcReply::ModeEcho { mask: &info.mask, target: &channel.name, modes: &modes }.format();
        state.broadcast_to_channel(&channel, &line, None);
    }
}

/// Canonical echo for applied changes: sign runs collapsed, parameters
/// appended in consumption order. `[(true,'i'),(true,'k',"x"),(false,'t')]`
/// becomes `+ik-t x`.
fn format_mode_changes(applied: &[(bool, char, Option<String>)]) -> String {
    let mut letters = String::new();
    let mut params = Vec::new();
    let mut last_sign = None;
    for (adding, letter, param) in applied {
        if last_sign != Some(*adding) {
            letters.push(if *adding { '+' } else { '-' });
            last_sign = Some(*adding);
        }
        letters.push(*letter);
        if let Some(param) = param {
            params.push(param.clone());
        }
    }
    for param in params {
        letters.push(' ');
        letters.push_str(&param);
    }
    letters
}
