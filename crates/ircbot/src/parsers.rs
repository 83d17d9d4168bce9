use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{opt, rest, value},
    sequence::preceded,
};

/// The subset of server traffic the bot reacts to. Everything else is
/// counted during authentication and otherwise dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Liveness challenge; must be echoed back.
    Ping(String),
    /// 001, registration done.
    Welcome,
    Privmsg { from: String, target: String, text: String },
    Other,
}

//   :<nick>!<user>@<host> PRIVMSG <target> :<text>
fn prefix_nick_parser(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c: char| c != '!' && c != ' ')).parse(input)
}

fn privmsg_parser(input: &str) -> IResult<&str, ServerEvent> {
    let (rem, (from, _prefix_rest, target, text)) = (
        prefix_nick_parser,
        take_while1(|c: char| c != ' '),
        preceded(tag(" PRIVMSG "), take_while1(|c: char| c != ' ')),
        preceded(tag(" :"), rest),
    )
        .parse(input)?;
    Ok((
        rem,
        ServerEvent::Privmsg {
            from: from.to_string(),
            target: target.to_string(),
            text: text.to_string(),
        },
    ))
}

//   :<server> 001 <nick> :Welcome ...
fn welcome_parser(input: &str) -> IResult<&str, ServerEvent> {
    let (rem, _) = (
        preceded(char(':'), take_while1(|c: char| c != ' ')),
        tag(" 001 "),
    )
        .parse(input)?;
    Ok((rem, ServerEvent::Welcome))
}

//   PING :<token>   (a server-prefixed PING also matches)
fn ping_parser(input: &str) -> IResult<&str, ServerEvent> {
    let (rem, token) = preceded(
        (
            opt((preceded(char(':'), take_while1(|c: char| c != ' ')), char(' '))),
            tag("PING "),
            opt(char(':')),
        ),
        rest,
    )
        .parse(input)?;
    Ok((rem, ServerEvent::Ping(token.trim().to_string())))
}

pub fn parse_server_line(line: &str) -> ServerEvent {
    let line = line.trim_end_matches(['\r', '\n']);
    alt((ping_parser, privmsg_parser, welcome_parser))
        .parse(line)
        .map(|(_rem, event)| event)
        .unwrap_or(ServerEvent::Other)
}

/// A trigger at the start of a PRIVMSG body. `!age` keeps its raw argument;
/// validation happens in the age module.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    FunFact,
    Time,
    Age(Option<String>),
}

fn age_trigger_parser(input: &str) -> IResult<&str, Trigger> {
    let (rem, arg) = preceded(
        tag("!age"),
        opt(preceded(
            take_while1(|c: char| c == ' '),
            take_while1(|c: char| c != ' '),
        )),
    )
    .parse(input)?;
    Ok((rem, Trigger::Age(arg.map(str::to_string))))
}

pub fn parse_trigger(text: &str) -> Option<Trigger> {
    let text = text.trim();
    let (rem, trigger) = alt((
        value(Trigger::FunFact, tag("!funfact")),
        value(Trigger::Time, tag("!time")),
        age_trigger_parser,
    ))
    .parse(text)
    .ok()?;
    // "!funfactory" is not a trigger
    if rem.is_empty() || rem.starts_with(' ') {
        Some(trigger)
    } else {
        None
    }
}
