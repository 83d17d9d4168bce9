use crate::message::IrcMessage;

/// A semantically extracted command, ready for its handler. Arity problems
/// surface here as [`CommandError`] so every handler starts from validated
/// shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pass(String),
    Nick(String),
    User { username: String, realname: String },
    Cap { subcommand: String },
    Quit(Option<String>),
    Ping(String),
    Pong(String),
    /// `JOIN 0`: leave every joined channel.
    PartAll,
    Join { channels: Vec<String>, keys: Vec<String> },
    Part { channels: Vec<String>, reason: Option<String> },
    Kick { channel: String, user: String, reason: Option<String> },
    Invite { nick: String, channel: String },
    Topic { channel: String, text: Option<String> },
    Mode { target: String, modestring: Option<String>, args: Vec<String> },
    Privmsg { targets: Vec<String>, text: String },
    Notice { targets: Vec<String>, text: String },
    Who { mask: Option<String> },
    Whois { target: String },
    Whowas { target: String },
    Away { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    NeedMoreParams(String),
    NoNicknameGiven,
    NoRecipient(String),
    NoTextToSend,
    Unknown(String),
}

fn split_list(param: &str) -> Vec<String> {
    param
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Command {
    /// Commands a connection may issue before completing registration.
    pub fn is_pre_auth(&self) -> bool {
        matches!(
            self,
            Command::Pass(_)
                | Command::Nick(_)
                | Command::User { .. }
                | Command::Cap { .. }
                | Command::Quit(_)
                | Command::Ping(_)
                | Command::Pong(_)
        )
    }

    pub fn parse(msg: &IrcMessage) -> Result<Command, CommandError> {
        let need = |cmd: &str| CommandError::NeedMoreParams(cmd.to_string());
        match msg.command.as_str() {
            "PASS" => {
                let password = msg
                    .trailing_or_param(0)
                    .ok_or_else(|| need("PASS"))?;
                if password.is_empty() {
                    return Err(need("PASS"));
                }
                Ok(Command::Pass(password.to_string()))
            }
            "NICK" => {
                let nick = msg
                    .trailing_or_param(0)
                    .filter(|n| !n.is_empty())
                    .ok_or(CommandError::NoNicknameGiven)?;
                Ok(Command::Nick(nick.to_string()))
            }
            // USER <user> <mode> <unused> :<realname>
            "USER" => {
                if msg.params.len() < 3 {
                    return Err(need("USER"));
                }
                let realname = msg
                    .trailing_or_param(3)
                    .ok_or_else(|| need("USER"))?;
                Ok(Command::User {
                    username: msg.params[0].clone(),
                    realname: realname.to_string(),
                })
            }
            "CAP" => {
                let subcommand = msg.params.first().ok_or_else(|| need("CAP"))?;
                Ok(Command::Cap {
                    subcommand: subcommand.to_ascii_uppercase(),
                })
            }
            "QUIT" => Ok(Command::Quit(
                msg.trailing_or_param(0).map(str::to_owned),
            )),
            "PING" => {
                let token = msg.trailing_or_param(0).ok_or_else(|| need("PING"))?;
                Ok(Command::Ping(token.to_string()))
            }
            "PONG" => Ok(Command::Pong(
                msg.trailing_or_param(0).unwrap_or("").to_string(),
            )),
            // JOIN ( <channel> *( "," <channel> ) [ <key> *( "," <key> ) ] ) / "0"
            "JOIN" => {
                let first = msg.params.first().ok_or_else(|| need("JOIN"))?;
                if first == "0" {
                    return Ok(Command::PartAll);
                }
                let keys = msg
                    .params
                    .get(1)
                    .map(|list| split_list(list))
                    .unwrap_or_default();
                Ok(Command::Join {
                    channels: split_list(first),
                    keys,
                })
            }
            "PART" => {
                let channels = msg.params.first().ok_or_else(|| need("PART"))?;
                Ok(Command::Part {
                    channels: split_list(channels),
                    reason: msg.trailing_or_param(1).map(str::to_owned),
                })
            }
            // KICK <channel> <user> [ :<comment> ]
            "KICK" => {
                if msg.params.len() < 2 {
                    return Err(need("KICK"));
                }
                Ok(Command::Kick {
                    channel: msg.params[0].clone(),
                    user: msg.params[1].clone(),
                    reason: msg.trailing_or_param(2).map(str::to_owned),
                })
            }
            // INVITE <nickname> <channel>
            "INVITE" => {
                if msg.params.len() < 2 {
                    return Err(need("INVITE"));
                }
                Ok(Command::Invite {
                    nick: msg.params[0].clone(),
                    channel: msg.params[1].clone(),
                })
            }
            // TOPIC <channel> [ :<topic> ]  — an empty topic clears it
            "TOPIC" => {
                let channel = msg.params.first().ok_or_else(|| need("TOPIC"))?;
                let text = msg
                    .trailing
                    .clone()
                    .or_else(|| msg.params.get(1).cloned());
                Ok(Command::Topic {
                    channel: channel.clone(),
                    text,
                })
            }
            "MODE" => {
                let target = msg.params.first().ok_or_else(|| need("MODE"))?;
                Ok(Command::Mode {
                    target: target.clone(),
                    modestring: msg.params.get(1).cloned(),
                    args: msg.params.iter().skip(2).cloned().collect(),
                })
            }
            "PRIVMSG" | "NOTICE" => {
                let command = msg.command.clone();
                let targets = msg
                    .params
                    .first()
                    .ok_or(CommandError::NoRecipient(command.clone()))?;
                let text = msg
                    .trailing
                    .as_deref()
                    .or_else(|| msg.params.get(1).map(String::as_str))
                    .filter(|t| !t.is_empty())
                    .ok_or(CommandError::NoTextToSend)?;
                let targets = split_list(targets);
                if targets.is_empty() {
                    return Err(CommandError::NoRecipient(command));
                }
                if msg.command == "PRIVMSG" {
                    Ok(Command::Privmsg { targets, text: text.to_string() })
                } else {
                    Ok(Command::Notice { targets, text: text.to_string() })
                }
            }
            "WHO" => Ok(Command::Who {
                mask: msg.params.first().cloned(),
            }),
            "WHOIS" => {
                let target = msg.params.first().ok_or_else(|| need("WHOIS"))?;
                Ok(Command::Whois { target: target.clone() })
            }
            "WHOWAS" => {
                let target = msg.params.first().ok_or_else(|| need("WHOWAS"))?;
                Ok(Command::Whowas { target: target.clone() })
            }
            "AWAY" => Ok(Command::Away {
                message: msg
                    .trailing_or_param(0)
                    .filter(|m| !m.is_empty())
                    .map(str::to_owned),
            }),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
