use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{opt, verify},
    multi::many0,
    sequence::preceded,
};

// 2.3.1 Message format in Augmented BNF

//     message    =  [ ":" prefix SPACE ] command [ params ] crlf
//     prefix     =  servername / ( nickname [ [ "!" user ] "@" host ] )
//     command    =  1*letter / 3digit
//     params     =  *14( SPACE middle ) [ SPACE ":" trailing ]
//                =/ 14( SPACE middle ) [ SPACE [ ":" ] trailing ]

//     nospcrlfcl =  %x01-09 / %x0B-0C / %x0E-1F / %x21-39 / %x3B-FF
//                     ; any octet except NUL, CR, LF, " " and ":"
//     middle     =  nospcrlfcl *( ":" / nospcrlfcl )
//     trailing   =  *( ":" / " " / nospcrlfcl )

/// One parsed protocol line. `command` is uppercased on parse; the trailing
/// parameter is kept apart from the middles so formatting can restore it.
#[derive(Debug, Clone, PartialEq)]
pub struct IrcMessage {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

fn prefix_parser(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c: char| c != ' ')).parse(input)
}

fn command_parser(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ' ').parse(input)
}

//     middle     =  nospcrlfcl *( ":" / nospcrlfcl )
fn middle_parser(input: &str) -> IResult<&str, &str> {
    verify(take_while1(|c: char| c != ' '), |s: &str| !s.starts_with(':')).parse(input)
}

//     trailing   =  *( ":" / " " / nospcrlfcl )
fn trailing_parser(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while(|c: char| c != '\r' && c != '\n')).parse(input)
}

fn message_parser(input: &str) -> IResult<&str, IrcMessage> {
    let (rem, (prefix, command, params, trailing)) = (
        opt(prefix_parser),
        preceded(take_while(|c: char| c == ' '), command_parser),
        many0(preceded(take_while1(|c: char| c == ' '), middle_parser)),
        opt(preceded(take_while1(|c: char| c == ' '), trailing_parser)),
    )
        .parse(input)?;
    Ok((
        rem,
        IrcMessage {
            prefix: prefix.map(str::to_owned),
            command: command.to_ascii_uppercase(),
            params: params.into_iter().map(str::to_owned).collect(),
            trailing: trailing.map(str::to_owned),
        },
    ))
}

impl IrcMessage {
    /// Parses one line with its terminator already stripped. Empty lines are
    /// silently ignored per the RFC and yield `None`.
    pub fn parse(line: &str) -> Option<IrcMessage> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        message_parser(line).ok().map(|(_rem, msg)| msg)
    }

    /// Formats the message back into wire shape, without terminator.
    pub fn to_line(&self) -> String {
        let mut line = String::new();
        if let Some(prefix) = &self.prefix {
            line.push(':');
            line.push_str(prefix);
            line.push(' ');
        }
        line.push_str(&self.command);
        for param in &self.params {
            line.push(' ');
            line.push_str(param);
        }
        if let Some(trailing) = &self.trailing {
            line.push_str(" :");
            line.push_str(trailing);
        }
        line
    }

    /// The trailing parameter when present, otherwise the param at `idx`.
    /// PART/TOPIC/KICK reasons arrive both ways in the wild.
    pub fn trailing_or_param(&self, idx: usize) -> Option<&str> {
        self.trailing
            .as_deref()
            .or_else(|| self.params.get(idx).map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_command() {
        let msg = IrcMessage::parse("QUIT").unwrap();
        assert_eq!(msg.command, "QUIT");
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
        assert!(msg.trailing.is_none());
    }

    #[test]
    fn parses_params_and_trailing() {
        let msg = IrcMessage::parse("PRIVMSG #t,alice :hello :world").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#t,alice"]);
        assert_eq!(msg.trailing.as_deref(), Some("hello :world"));
    }

    #[test]
    fn parses_prefix() {
        let msg = IrcMessage::parse(":alice!~a@localhost PART #t :bye").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("alice!~a@localhost"));
        assert_eq!(msg.command, "PART");
        assert_eq!(msg.params, vec!["#t"]);
        assert_eq!(msg.trailing.as_deref(), Some("bye"));
    }

    #[test]
    fn command_is_uppercased() {
        let msg = IrcMessage::parse("join #t").unwrap();
        assert_eq!(msg.command, "JOIN");
    }

    #[test]
    fn empty_lines_are_ignored() {
        assert!(IrcMessage::parse("").is_none());
        assert!(IrcMessage::parse("   ").is_none());
        assert!(IrcMessage::parse("\r\n").is_none());
    }

    #[test]
    fn empty_trailing_is_kept() {
        let msg = IrcMessage::parse("TOPIC #t :").unwrap();
        assert_eq!(msg.trailing.as_deref(), Some(""));
    }

    #[test]
    fn round_trip() {
        // format(parse(L)) = L modulo whitespace normalization
        let cases = [
            "PASS secret",
            "NICK alice",
            "USER alice 0 * :Alice Liddell",
            "JOIN #t,#u key1,key2",
            "MODE #t +kl key 10",
            "PRIVMSG #t :hello there",
            ":alice!~a@host KICK #t bob :bye",
            "PING :ircserv",
        ];
        for &case in &cases {
            let msg = IrcMessage::parse(case).unwrap();
            assert_eq!(msg.to_line(), case);
        }
    }
}
