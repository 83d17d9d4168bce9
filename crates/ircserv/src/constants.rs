//! Server identity, protocol limits and the numeric reply table.

// === SERVER IDENTITY ===
pub const SERVER_NAME: &str = "ircserv";
pub const SERVER_VERSION: &str = "1.1";
pub const CHANNEL_MODES: &str = "itkol";

// === PROTOCOL LIMITS ===

/// Maximum line content before the CRLF terminator (512-byte frame).
pub const MAX_LINE_CONTENT: usize = 510;
pub const MAX_NICKNAME_LEN: usize = 10;
pub const MIN_CHANNEL_NAME_LEN: usize = 2;
pub const MAX_CHANNEL_NAME_LEN: usize = 50;
pub const MAX_KEY_LEN: usize = 23;

// === LIVENESS ===

/// Idle seconds before the server challenges the client with a PING.
pub const PING_INTERVAL_SECS: u64 = 240;
/// Seconds after an unanswered PING before the client is dropped.
pub const PONG_TIMEOUT_SECS: u64 = 300;

// === QUIT REASONS ===
pub const DEFAULT_QUIT_REASON: &str = "Client left server";
pub const SHUTDOWN_REASON: &str = "Server shutting down";
pub const TIMEOUT_REASON: &str = "Connection timeout";
pub const SLOW_CONSUMER_REASON: &str = "Slow consumer";

// === CONNECTION REGISTRATION ===

//    001    RPL_WELCOME
//           "Welcome to the Internet Relay Network <nick>!<user>@<host>"
pub const RPL_WELCOME_NB: u16 = 1;
pub const RPL_WELCOME_STR: &str = "Welcome to the Internet Relay Network";

//    002    RPL_YOURHOST
//           "Your host is <servername>, running version <ver>"
pub const RPL_YOURHOST_NB: u16 = 2;

//    003    RPL_CREATED
//           "This server was created <date>"
pub const RPL_CREATED_NB: u16 = 3;
pub const RPL_CREATED_STR: &str = "Server created on";

//    004    RPL_MYINFO
//           "<servername> <version> <available user modes> <available channel modes>"
pub const RPL_MYINFO_NB: u16 = 4;

// === LUSERS ===
pub const RPL_LUSEROP_NB: u16 = 252;
pub const RPL_LUSEROP_STR: &str = "operator(s) online";
pub const RPL_LUSERUNKNOWN_NB: u16 = 253;
pub const RPL_LUSERUNKNOWN_STR: &str = "unknown connection(s)";
pub const RPL_LUSERCHANNELS_NB: u16 = 254;
pub const RPL_LUSERCHANNELS_STR: &str = "channels formed";
pub const RPL_LUSERME_NB: u16 = 255;

// === MOTD ===
pub const RPL_MOTDSTART_NB: u16 = 375;
pub const RPL_MOTDSTART_STR: &str = "Message of the day";
pub const RPL_MOTD_NB: u16 = 372;
pub const RPL_ENDOFMOTD_NB: u16 = 376;
pub const RPL_ENDOFMOTD_STR: &str = "End of MOTD";

// === AWAY ===
pub const RPL_AWAY_NB: u16 = 301;
pub const RPL_UNAWAY_NB: u16 = 305;
pub const RPL_UNAWAY_STR: &str = "You are no longer marked as being away";
pub const RPL_NOWAWAY_NB: u16 = 306;
pub const RPL_NOWAWAY_STR: &str = "You have been marked as being away";

// === WHOIS / WHO / WHOWAS ===
pub const RPL_WHOISUSER_NB: u16 = 311;
pub const RPL_WHOISSERVER_NB: u16 = 312;
pub const RPL_WHOISSERVER_STR: &str = "server info";
pub const RPL_ENDOFWHO_NB: u16 = 315;
pub const RPL_ENDOFWHO_STR: &str = "End of /WHO list";
pub const RPL_WHOISIDLE_NB: u16 = 317;
pub const RPL_WHOISIDLE_STR: &str = "seconds idle, signon time";
pub const RPL_ENDOFWHOIS_NB: u16 = 318;
pub const RPL_ENDOFWHOIS_STR: &str = "End of /WHOIS list";
pub const RPL_ENDOFWHOWAS_NB: u16 = 369;
pub const RPL_ENDOFWHOWAS_STR: &str = "End of /WHOWAS list";

// === CHANNEL STATE ===
pub const RPL_CHANNELMODEIS_NB: u16 = 324;
pub const RPL_CREATIONTIME_NB: u16 = 329;
pub const RPL_NOTOPIC_NB: u16 = 331;
pub const RPL_NOTOPIC_STR: &str = "No topic is set";
pub const RPL_TOPIC_NB: u16 = 332;
pub const RPL_TOPICWHOTIME_NB: u16 = 333;
pub const RPL_INVITING_NB: u16 = 341;
pub const RPL_WHOREPLY_NB: u16 = 352;
pub const RPL_NAMREPLY_NB: u16 = 353;
pub const RPL_ENDOFNAMES_NB: u16 = 366;
pub const RPL_ENDOFNAMES_STR: &str = "End of /NAMES list";
pub const RPL_BANLIST_NB: u16 = 367;
pub const RPL_ENDOFBANLIST_NB: u16 = 368;
pub const RPL_ENDOFBANLIST_STR: &str = "End of channel ban list";

// === ERRORS ===

//    401    ERR_NOSUCHNICK
//           "<nickname> :No such nick/channel"
pub const ERR_NOSUCHNICK_NB: u16 = 401;
pub const ERR_NOSUCHNICK_STR: &str = "Nickname not found";

pub const ERR_NOSUCHCHANNEL_NB: u16 = 403;
pub const ERR_NOSUCHCHANNEL_STR: &str = "No such channel";

pub const ERR_CANNOTSENDTOCHAN_NB: u16 = 404;
pub const ERR_CANNOTSENDTOCHAN_STR: &str = "Cannot send to channel";

pub const ERR_NORECIPIENT_NB: u16 = 411;
pub const ERR_NORECIPIENT_STR: &str = "No recipient given";

pub const ERR_NOTEXTTOSEND_NB: u16 = 412;
pub const ERR_NOTEXTTOSEND_STR: &str = "No text to send";

pub const ERR_INPUTTOOLONG_NB: u16 = 417;
pub const ERR_INPUTTOOLONG_STR: &str = "Input line too long, message truncated";

//    421    ERR_UNKNOWNCOMMAND
//           "<command> :Unknown command"
pub const ERR_UNKNOWNCOMMAND_NB: u16 = 421;
pub const ERR_UNKNOWNCOMMAND_STR: &str = "Unknown command";

pub const ERR_NONICKNAMEGIVEN_NB: u16 = 431;
pub const ERR_NONICKNAMEGIVEN_STR: &str = "No nickname given";

pub const ERR_ERRONEUSNICKNAME_NB: u16 = 432;
pub const ERR_ERRONEUSNICKNAME_STR: &str = "Erroneus nickname";

pub const ERR_NICKNAMEINUSE_NB: u16 = 433;
pub const ERR_NICKNAMEINUSE_STR: &str = "This nickname is already taken";

pub const ERR_USERNOTINCHANNEL_NB: u16 = 441;
pub const ERR_USERNOTINCHANNEL_STR: &str = "User not in channel";

pub const ERR_NOTONCHANNEL_NB: u16 = 442;
pub const ERR_NOTONCHANNEL_STR: &str = "You're not on this channel";

pub const ERR_USERONCHANNEL_NB: u16 = 443;
pub const ERR_USERONCHANNEL_STR: &str = "is already on channel";

pub const ERR_NOTREGISTERED_NB: u16 = 451;
pub const ERR_NOTREGISTERED_STR: &str = "Please register first";

// 461    ERR_NEEDMOREPARAMS
//               "<command> :Not enough parameters"

//          - Returned by the server by numerous commands to
//            indicate to the client that it didn't supply enough
//            parameters.
pub const ERR_NEEDMOREPARAMS_NB: u16 = 461;
pub const ERR_NEEDMOREPARAMS_STR: &str = "Not enough parameters";

pub const ERR_ALREADYREGISTERED_NB: u16 = 462;
pub const ERR_ALREADYREGISTERED_STR: &str = "You are already registered";

pub const ERR_PASSWDMISMATCH_NB: u16 = 464;
pub const ERR_PASSWDMISMATCH_STR: &str = "Incorrect password";

pub const ERR_YOUREBANNEDCREEP_NB: u16 = 465;
pub const ERR_YOUREBANNEDCREEP_STR: &str = "You're banned from this server";

pub const ERR_CHANNELISFULL_NB: u16 = 471;
pub const ERR_CHANNELISFULL_STR: &str = "Channel is full";

pub const ERR_UNKNOWNMODE_NB: u16 = 472;
pub const ERR_UNKNOWNMODE_STR: &str = "is unknown mode char to me";

pub const ERR_INVITEONLYCHAN_NB: u16 = 473;
pub const ERR_INVITEONLYCHAN_STR: &str = "Invite only channel";

pub const ERR_BANNEDFROMCHAN_NB: u16 = 474;
pub const ERR_BANNEDFROMCHAN_STR: &str = "You're banned from this channel";

pub const ERR_BADCHANNELKEY_NB: u16 = 475;
pub const ERR_BADCHANNELKEY_STR: &str = "Incorrect channel key";

pub const ERR_BADCHANMASK_NB: u16 = 476;
pub const ERR_BADCHANMASK_STR: &str = "Bad channel mask";

pub const ERR_NEEDREGGEDNICK_NB: u16 = 477;
pub const ERR_NEEDREGGEDNICK_STR: &str = "You must be registered to join this channel";

pub const ERR_CHANOPRIVSNEEDED_NB: u16 = 482;
pub const ERR_CHANOPRIVSNEEDED_STR: &str = "You're not channel operator";

//    525    ERR_INVALIDKEY
//           Rejected value of a key channel mode change (+k).
pub const ERR_INVALIDKEY_NB: u16 = 525;
pub const ERR_INVALIDKEY_STR: &str = "Key is not well-formed";

pub const ERR_INVALIDMODEPARAM_NB: u16 = 696;
pub const ERR_INVALIDMODEPARAM_STR: &str = "Invalid mode parameter";
