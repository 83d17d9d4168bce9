use crate::constants::*;

/// One outbound line, ready to format. Three shapes:
///
/// - server numeric:  `:<server> <NNN> <nick> <params> :<trailing>`
/// - user source:     `:<nick>!~<user>@<host> <CMD> <params> [:<trailing>]`
/// - server command:  `:<server> <CMD> <params> [:<trailing>]`
///
/// `format()` returns the line without its CRLF terminator; the outbound
/// queue appends it. Nothing here touches a socket.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum IrcReply<'a> {
    // Connection registration
    Welcome { nick: &'a str, user: &'a str, host: &'a str },
    YourHost { nick: &'a str },
    Created { nick: &'a str, date: &'a str },
    MyInfo { nick: &'a str },
    LuserOp { nick: &'a str, ops: usize },
    LuserUnknown { nick: &'a str, unknown: usize },
    LuserChannels { nick: &'a str, channels: usize },
    LuserMe { nick: &'a str, clients: usize },
    MotdStart { nick: &'a str },
    Motd { nick: &'a str, line: &'a str },
    EndOfMotd { nick: &'a str },

    // Channel state
    ChannelModeIs { nick: &'a str, channel: &'a str, modes: &'a str },
    CreationTime { nick: &'a str, channel: &'a str, created_at: i64 },
    NoTopic { nick: &'a str, channel: &'a str },
    Topic { nick: &'a str, channel: &'a str, topic: &'a str },
    TopicWhoTime { nick: &'a str, channel: &'a str, set_by: &'a str, set_at: i64 },
    Inviting { nick: &'a str, target: &'a str, channel: &'a str },
    NamReply { nick: &'a str, channel: &'a str, names: &'a str },
    EndOfNames { nick: &'a str, channel: &'a str },
    EndOfBanList { nick: &'a str, channel: &'a str },

    // Client queries
    Away { nick: &'a str, target: &'a str, message: &'a str },
    Unaway { nick: &'a str },
    NowAway { nick: &'a str },
    WhoisUser { nick: &'a str, target: &'a str, user: &'a str, host: &'a str, realname: &'a str },
    WhoisServer { nick: &'a str, target: &'a str },
    WhoisIdle { nick: &'a str, target: &'a str, idle: u64, signon: i64 },
    EndOfWhois { nick: &'a str, target: &'a str },
    WhoReply { nick: &'a str, channel: &'a str, user: &'a str, host: &'a str, target: &'a str, flags: &'a str, realname: &'a str },
    EndOfWho { nick: &'a str, mask: &'a str },
    EndOfWhowas { nick: &'a str, target: &'a str },

    // Errors
    ErrNoSuchNick { nick: &'a str, target: &'a str },
    ErrNoSuchChannel { nick: &'a str, channel: &'a str },
    ErrCannotSendToChan { nick: &'a str, channel: &'a str },
    ErrNoRecipient { nick: &'a str, command: &'a str },
    ErrNoTextToSend { nick: &'a str },
    ErrInputTooLong { nick: &'a str },
    ErrUnknownCommand { nick: &'a str, command: &'a str },
    ErrNoNicknameGiven { nick: &'a str },
    ErrErroneusNickname { nick: &'a str, bad: &'a str },
    ErrNicknameInUse { nick: &'a str, bad: &'a str },
    ErrUserNotInChannel { nick: &'a str, target: &'a str, channel: &'a str },
    ErrNotOnChannel { nick: &'a str, channel: &'a str },
    ErrUserOnChannel { nick: &'a str, target: &'a str, channel: &'a str },
    ErrNotRegistered { nick: &'a str },
    ErrNeedMoreParams { nick: &'a str, command: &'a str },
    ErrAlreadyRegistered { nick: &'a str },
    ErrPasswdMismatch { nick: &'a str },
    ErrChannelIsFull { nick: &'a str, channel: &'a str },
    ErrUnknownMode { nick: &'a str, mode: char, channel: &'a str },
    ErrInviteOnlyChan { nick: &'a str, channel: &'a str },
    ErrBadChannelKey { nick: &'a str, channel: &'a str },
    ErrBadChanMask { nick: &'a str, channel: &'a str },
    ErrChanOpPrivsNeeded { nick: &'a str, channel: &'a str },
    ErrInvalidKey { nick: &'a str, channel: &'a str },
    ErrInvalidModeParam { nick: &'a str, channel: &'a str, mode: char, param: &'a str },

    // Command echoes with the acting user as source
    Join { mask: &'a str, channel: &'a str },
    Part { mask: &'a str, channel: &'a str, reason: Option<&'a str> },
    Kick { mask: &'a str, channel: &'a str, target: &'a str, reason: &'a str },
    Invite { mask: &'a str, target: &'a str, channel: &'a str },
    NickChange { mask: &'a str, new_nick: &'a str },
    Quit { mask: &'a str, reason: &'a str },
    TopicSet { mask: &'a str, channel: &'a str, topic: &'a str },
    ModeEcho { mask: &'a str, target: &'a str, modes: &'a str },
    Privmsg { mask: &'a str, target: &'a str, text: &'a str },
    Notice { mask: &'a str, target: &'a str, text: &'a str },

    // Server-sourced commands
    CapLs { nick: &'a str },
    Ping { token: &'a str },
    Pong { token: &'a str },
    ServerNotice { nick: &'a str, text: &'a str },
    ErrorClosing { reason: &'a str },
}

impl<'a> IrcReply<'a> {
    pub fn format(&self) -> String {
        match self {
            // registration burst
            IrcReply::Welcome { nick, user, host } => format!(
                ":{SERVER_NAME} {RPL_WELCOME_NB:03} {nick} :{RPL_WELCOME_STR} {nick}!~{user}@{host}"
            ),
            IrcReply::YourHost { nick } => format!(
                ":{SERVER_NAME} {RPL_YOURHOST_NB:03} {nick} :Your host is {SERVER_NAME}, running version {SERVER_VERSION}"
            ),
            IrcReply::Created { nick, date } => {
                format!(":{SERVER_NAME} {RPL_CREATED_NB:03} {nick} :{RPL_CREATED_STR} {date}")
            }
            IrcReply::MyInfo { nick } => format!(
                ":{SERVER_NAME} {RPL_MYINFO_NB:03} {nick} {SERVER_NAME} {SERVER_VERSION} :Available channel modes: {CHANNEL_MODES}"
            ),
            IrcReply::LuserOp { nick, ops } => {
                format!(":{SERVER_NAME} {RPL_LUSEROP_NB:03} {nick} {ops} :{RPL_LUSEROP_STR}")
            }
            IrcReply::LuserUnknown { nick, unknown } => format!(
                ":{SERVER_NAME} {RPL_LUSERUNKNOWN_NB:03} {nick} {unknown} :{RPL_LUSERUNKNOWN_STR}"
            ),
            IrcReply::LuserChannels { nick, channels } => format!(
                ":{SERVER_NAME} {RPL_LUSERCHANNELS_NB:03} {nick} {channels} :{RPL_LUSERCHANNELS_STR}"
            ),
            IrcReply::LuserMe { nick, clients } => format!(
                ":{SERVER_NAME} {RPL_LUSERME_NB:03} {nick} :I have {clients} clients and 1 servers"
            ),
            IrcReply::MotdStart { nick } => format!(
                ":{SERVER_NAME} {RPL_MOTDSTART_NB:03} {nick} :- {SERVER_NAME} {RPL_MOTDSTART_STR} -"
            ),
            IrcReply::Motd { nick, line } => {
                format!(":{SERVER_NAME} {RPL_MOTD_NB:03} {nick} :- {line}")
            }
            IrcReply::EndOfMotd { nick } => {
                format!(":{SERVER_NAME} {RPL_ENDOFMOTD_NB:03} {nick} :{RPL_ENDOFMOTD_STR}")
            }

            // channel state
            IrcReply::ChannelModeIs { nick, channel, modes } => {
                format!(":{SERVER_NAME} {RPL_CHANNELMODEIS_NB:03} {nick} {channel} {modes}")
            }
            IrcReply::CreationTime { nick, channel, created_at } => {
                format!(":{SERVER_NAME} {RPL_CREATIONTIME_NB:03} {nick} {channel} {created_at}")
            }
            IrcReply::NoTopic { nick, channel } => {
                format!(":{SERVER_NAME} {RPL_NOTOPIC_NB:03} {nick} {channel} :{RPL_NOTOPIC_STR}")
            }
            IrcReply::Topic { nick, channel, topic } => {
                format!(":{SERVER_NAME} {RPL_TOPIC_NB:03} {nick} {channel} :{topic}")
            }
            IrcReply::TopicWhoTime { nick, channel, set_by, set_at } => {
                format!(":{SERVER_NAME} {RPL_TOPICWHOTIME_NB:03} {nick} {channel} {set_by} {set_at}")
            }
            IrcReply::Inviting { nick, target, channel } => {
                format!(":{SERVER_NAME} {RPL_INVITING_NB:03} {nick} {target} {channel}")
            }
            IrcReply::NamReply { nick, channel, names } => {
                format!(":{SERVER_NAME} {RPL_NAMREPLY_NB:03} {nick} = {channel} :{names}")
            }
            IrcReply::EndOfNames { nick, channel } => format!(
                ":{SERVER_NAME} {RPL_ENDOFNAMES_NB:03} {nick} {channel} :{RPL_ENDOFNAMES_STR}"
            ),
            IrcReply::EndOfBanList { nick, channel } => format!(
                ":{SERVER_NAME} {RPL_ENDOFBANLIST_NB:03} {nick} {channel} :{RPL_ENDOFBANLIST_STR}"
            ),

            // client queries
            IrcReply::Away { nick, target, message } => {
                format!(":{SERVER_NAME} {RPL_AWAY_NB:03} {nick} {target} :{message}")
            }
            IrcReply::Unaway { nick } => {
                format!(":{SERVER_NAME} {RPL_UNAWAY_NB:03} {nick} :{RPL_UNAWAY_STR}")
            }
            IrcReply::NowAway { nick } => {
                format!(":{SERVER_NAME} {RPL_NOWAWAY_NB:03} {nick} :{RPL_NOWAWAY_STR}")
            }
            IrcReply::WhoisUser { nick, target, user, host, realname } => format!(
                ":{SERVER_NAME} {RPL_WHOISUSER_NB:03} {nick} {target} ~{user} {host} * :{realname}"
            ),
            IrcReply::WhoisServer { nick, target } => format!(
                ":{SERVER_NAME} {RPL_WHOISSERVER_NB:03} {nick} {target} {SERVER_NAME} :{RPL_WHOISSERVER_STR}"
            ),
            IrcReply::WhoisIdle { nick, target, idle, signon } => format!(
                ":{SERVER_NAME} {RPL_WHOISIDLE_NB:03} {nick} {target} {idle} {signon} :{RPL_WHOISIDLE_STR}"
            ),
            IrcReply::EndOfWhois { nick, target } => format!(
                ":{SERVER_NAME} {RPL_ENDOFWHOIS_NB:03} {nick} {target} :{RPL_ENDOFWHOIS_STR}"
            ),
            IrcReply::WhoReply { nick, channel, user, host, target, flags, realname } => format!(
                ":{SERVER_NAME} {RPL_WHOREPLY_NB:03} {nick} {channel} ~{user} {host} {SERVER_NAME} {target} {flags} :0 {realname}"
            ),
            IrcReply::EndOfWho { nick, mask } => {
                format!(":{SERVER_NAME} {RPL_ENDOFWHO_NB:03} {nick} {mask} :{RPL_ENDOFWHO_STR}")
            }
            IrcReply::EndOfWhowas { nick, target } => format!(
                ":{SERVER_NAME} {RPL_ENDOFWHOWAS_NB:03} {nick} {target} :{RPL_ENDOFWHOWAS_STR}"
            ),

            // errors
            IrcReply::ErrNoSuchNick { nick, target } => {
                format!(":{SERVER_NAME} {ERR_NOSUCHNICK_NB:03} {nick} {target} :{ERR_NOSUCHNICK_STR}")
            }
            IrcReply::ErrNoSuchChannel { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_NOSUCHCHANNEL_NB:03} {nick} {channel} :{ERR_NOSUCHCHANNEL_STR}"
            ),
            IrcReply::ErrCannotSendToChan { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_CANNOTSENDTOCHAN_NB:03} {nick} {channel} :{ERR_CANNOTSENDTOCHAN_STR}"
            ),
            IrcReply::ErrNoRecipient { nick, command } => format!(
                ":{SERVER_NAME} {ERR_NORECIPIENT_NB:03} {nick} :{ERR_NORECIPIENT_STR} ({command})"
            ),
            IrcReply::ErrNoTextToSend { nick } => {
                format!(":{SERVER_NAME} {ERR_NOTEXTTOSEND_NB:03} {nick} :{ERR_NOTEXTTOSEND_STR}")
            }
            IrcReply::ErrInputTooLong { nick } => {
                format!(":{SERVER_NAME} {ERR_INPUTTOOLONG_NB:03} {nick} :{ERR_INPUTTOOLONG_STR}")
            }
            IrcReply::ErrUnknownCommand { nick, command } => format!(
                ":{SERVER_NAME} {ERR_UNKNOWNCOMMAND_NB:03} {nick} {command} :{ERR_UNKNOWNCOMMAND_STR}"
            ),
            IrcReply::ErrNoNicknameGiven { nick } => format!(
                ":{SERVER_NAME} {ERR_NONICKNAMEGIVEN_NB:03} {nick} :{ERR_NONICKNAMEGIVEN_STR}"
            ),
            IrcReply::ErrErroneusNickname { nick, bad } => format!(
                ":{SERVER_NAME} {ERR_ERRONEUSNICKNAME_NB:03} {nick} {bad} :{ERR_ERRONEUSNICKNAME_STR}"
            ),
            IrcReply::ErrNicknameInUse { nick, bad } => format!(
                ":{SERVER_NAME} {ERR_NICKNAMEINUSE_NB:03} {nick} {bad} :{ERR_NICKNAMEINUSE_STR}"
            ),
            IrcReply::ErrUserNotInChannel { nick, target, channel } => format!(
                ":{SERVER_NAME} {ERR_USERNOTINCHANNEL_NB:03} {nick} {target} {channel} :{ERR_USERNOTINCHANNEL_STR}"
            ),
            IrcReply::ErrNotOnChannel { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_NOTONCHANNEL_NB:03} {nick} {channel} :{ERR_NOTONCHANNEL_STR}"
            ),
            IrcReply::ErrUserOnChannel { nick, target, channel } => format!(
                ":{SERVER_NAME} {ERR_USERONCHANNEL_NB:03} {nick} {target} {channel} :{ERR_USERONCHANNEL_STR}"
            ),
            IrcReply::ErrNotRegistered { nick } => format!(
                ":{SERVER_NAME} {ERR_NOTREGISTERED_NB:03} {nick} :{ERR_NOTREGISTERED_STR}"
            ),
            IrcReply::ErrNeedMoreParams { nick, command } => format!(
                ":{SERVER_NAME} {ERR_NEEDMOREPARAMS_NB:03} {nick} {command} :{ERR_NEEDMOREPARAMS_STR}"
            ),
            IrcReply::ErrAlreadyRegistered { nick } => format!(
                ":{SERVER_NAME} {ERR_ALREADYREGISTERED_NB:03} {nick} :{ERR_ALREADYREGISTERED_STR}"
            ),
            IrcReply::ErrPasswdMismatch { nick } => format!(
                ":{SERVER_NAME} {ERR_PASSWDMISMATCH_NB:03} {nick} :{ERR_PASSWDMISMATCH_STR}"
            ),
            IrcReply::ErrChannelIsFull { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_CHANNELISFULL_NB:03} {nick} {channel} :{ERR_CHANNELISFULL_STR}"
            ),
            IrcReply::ErrUnknownMode { nick, mode, channel } => format!(
                ":{SERVER_NAME} {ERR_UNKNOWNMODE_NB:03} {nick} {mode} :{ERR_UNKNOWNMODE_STR} for {channel}"
            ),
            IrcReply::ErrInviteOnlyChan { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_INVITEONLYCHAN_NB:03} {nick} {channel} :{ERR_INVITEONLYCHAN_STR}"
            ),
            IrcReply::ErrBadChannelKey { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_BADCHANNELKEY_NB:03} {nick} {channel} :{ERR_BADCHANNELKEY_STR}"
            ),
            IrcReply::ErrBadChanMask { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_BADCHANMASK_NB:03} {nick} {channel} :{ERR_BADCHANMASK_STR}"
            ),
            IrcReply::ErrChanOpPrivsNeeded { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_CHANOPRIVSNEEDED_NB:03} {nick} {channel} :{ERR_CHANOPRIVSNEEDED_STR}"
            ),
            IrcReply::ErrInvalidKey { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_INVALIDKEY_NB:03} {nick} {channel} :{ERR_INVALIDKEY_STR}"
            ),
            IrcReply::ErrInvalidModeParam { nick, channel, mode, param } => format!(
                ":{SERVER_NAME} {ERR_INVALIDMODEPARAM_NB:03} {nick} {channel} {mode} {param} :{ERR_INVALIDMODEPARAM_STR}"
            ),

            // user-sourced echoes
            IrcReply::Join { mask, channel } => format!(":{mask} JOIN {channel}"),
            IrcReply::Part { mask, channel, reason } => match reason {
                Some(reason) => format!(":{mask} PART {channel} :{reason}"),
                None => format!(":{mask} PART {channel}"),
            },
            IrcReply::Kick { mask, channel, target, reason } => {
                format!(":{mask} KICK {channel} {target} :{reason}")
            }
            IrcReply::Invite { mask, target, channel } => {
                format!(":{mask} INVITE {target} {channel}")
            }
            IrcReply::NickChange { mask, new_nick } => format!(":{mask} NICK :{new_nick}"),
            IrcReply::Quit { mask, reason } => format!(":{mask} QUIT :{reason}"),
            IrcReply::TopicSet { mask, channel, topic } => {
                format!(":{mask} TOPIC {channel} :{topic}")
            }
            IrcReply::ModeEcho { mask, target, modes } => format!(":{mask} MODE {target} {modes}"),
            IrcReply::Privmsg { mask, target, text } => {
                format!(":{mask} PRIVMSG {target} :{text}")
            }
            IrcReply::Notice { mask, target, text } => format!(":{mask} NOTICE {target} :{text}"),

            // server-sourced commands
            IrcReply::CapLs { nick } => format!(":{SERVER_NAME} CAP {nick} LS :"),
            IrcReply::Ping { token } => format!(":{SERVER_NAME} PING :{token}"),
            IrcReply::Pong { token } => format!(":{SERVER_NAME} PONG :{token}"),
            IrcReply::ServerNotice { nick, text } => {
                format!(":{SERVER_NAME} NOTICE {nick} :{text}")
            }
            IrcReply::ErrorClosing { reason } => format!("ERROR :Closing Link: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_replies_carry_server_prefix_and_code() {
        let line = IrcReply::Welcome { nick: "alice", user: "alice", host: "alice" }.format();
        assert!(line.starts_with(":ircserv 001 alice :"));
        assert!(line.ends_with("alice!~alice@alice"));

        let line = IrcReply::ErrNicknameInUse { nick: "*", bad: "alice" }.format();
        assert_eq!(line, ":ircserv 433 * alice :This nickname is already taken");

        let line = IrcReply::ErrNeedMoreParams { nick: "a", command: "JOIN" }.format();
        assert_eq!(line, ":ircserv 461 a JOIN :Not enough parameters");
    }

    #[test]
    fn user_sourced_echoes() {
        let mask = "alice!~alice@alice";
        assert_eq!(
            IrcReply::Join { mask, channel: "#t" }.format(),
            ":alice!~alice@alice JOIN #t"
        );
        assert_eq!(
            IrcReply::Part { mask, channel: "#t", reason: None }.format(),
            ":alice!~alice@alice PART #t"
        );
        assert_eq!(
            IrcReply::Kick { mask, channel: "#t", target: "bob", reason: "bye" }.format(),
            ":alice!~alice@alice KICK #t bob :bye"
        );
        assert_eq!(
            IrcReply::NickChange { mask, new_nick: "al" }.format(),
            ":alice!~alice@alice NICK :al"
        );
    }

    #[test]
    fn ping_pong_use_server_prefix() {
        assert_eq!(IrcReply::Ping { token: "ircserv" }.format(), ":ircserv PING :ircserv");
        assert_eq!(
            IrcReply::Pong { token: "abc" }.format(),
            ":ircserv PONG :abc"
        );
    }

    #[test]
    fn names_reply_shape() {
        let line = IrcReply::NamReply { nick: "a", channel: "#t", names: "@a b" }.format();
        assert_eq!(line, ":ircserv 353 a = #t :@a b");
    }
}
