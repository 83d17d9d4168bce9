use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::{recognize, verify},
    sequence::{delimited, pair, preceded},
};

use crate::constants::{
    MAX_CHANNEL_NAME_LEN, MAX_KEY_LEN, MAX_NICKNAME_LEN, MIN_CHANNEL_NAME_LEN,
};

// Validators for the parameter syntaxes the dispatcher cares about. The
// line-level grammar (prefix / command / params / trailing) lives in
// message.rs; these handle individual fields.

//   nickname   =  letter *9( letter / digit / special / "-" )
//   special    =  "-", "_", "[", "]", "\", "^", "{", "}", "|"
fn is_nickname_first_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_nickname_tail_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_[]\\^{}|".contains(c)
}

pub fn nickname_parser(input: &str) -> IResult<&str, &str> {
    let parser = recognize(pair(
        satisfy(is_nickname_first_char),
        take_while(is_nickname_tail_char),
    ));
    verify(parser, |s: &str| s.len() <= MAX_NICKNAME_LEN).parse(input)
}

pub fn is_valid_nickname(name: &str) -> bool {
    matches!(nickname_parser(name), Ok(("", _)))
}

//   channel    =  ( "#" / "&" ) chanstring
//   chanstring =  any octet except NUL, BELL, CR, LF, " ", "," and ":"
fn is_chan_char(c: char) -> bool {
    !c.is_control() && c != ' ' && c != ',' && c != ':'
}

pub fn channel_parser(input: &str) -> IResult<&str, &str> {
    let parser = recognize(pair(
        satisfy(|c| c == '#' || c == '&'),
        take_while1(is_chan_char),
    ));
    verify(parser, |s: &str| {
        s.len() >= MIN_CHANNEL_NAME_LEN && s.len() <= MAX_CHANNEL_NAME_LEN
    })
    .parse(input)
}

pub fn is_valid_channel_name(name: &str) -> bool {
    matches!(channel_parser(name), Ok(("", _)))
}

//   key        =  1*23( %x01-05 / %x07-08 / %x0C / %x0E-1F / %x21-7F )
//                   ; any 7-bit US_ASCII character,
//                   ; except NUL, CR, LF, FF, h/v TABs, and " "
fn is_key_char(c: char) -> bool {
    if !c.is_ascii() {
        return false;
    }
    matches!(c as u8,
        0x01..=0x05 |
        0x07..=0x08 |
        0x0C |
        0x0E..=0x1F |
        0x21..=0x7F
    )
}

pub fn key_parser(input: &str) -> IResult<&str, &str> {
    verify(take_while1(is_key_char), |s: &str| s.len() <= MAX_KEY_LEN).parse(input)
}

pub fn is_valid_key(key: &str) -> bool {
    matches!(key_parser(key), Ok(("", _)))
}

//   modestring =  *( "+" / "-" ) *( letter )
// Signs are sticky: "+ik-t" toggles i and k on, t off. A string with no
// leading sign adds.
pub fn modestring_parser(input: &str) -> IResult<&str, Vec<(bool, char)>> {
    let mut raw = verify(
        take_while1(|c: char| c == '+' || c == '-' || c.is_ascii_alphabetic()),
        |s: &str| s.chars().any(|c| c.is_ascii_alphabetic()),
    );
    let (rem, raw) = raw.parse(input)?;
    let mut adding = true;
    let mut changes = Vec::new();
    for c in raw.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            letter => changes.push((adding, letter)),
        }
    }
    Ok((rem, changes))
}

// CTCP DCC frames travel inside a PRIVMSG trailing parameter:
//   \x01DCC SEND <filename> <ip> <port> [<size>]\x01
//   \x01DCC GET <filename>\x01
// The frame is relayed to the peer untouched; only the verb and filename are
// recorded in the pending-transfer table.
#[derive(Debug, Clone, PartialEq)]
pub enum DccVerb {
    Send,
    Get,
}

pub fn dcc_request_parser(input: &str) -> IResult<&str, (DccVerb, String)> {
    let verb = alt((
        nom::combinator::value(DccVerb::Send, tag("SEND")),
        nom::combinator::value(DccVerb::Get, tag("GET")),
    ));
    let body = preceded(
        tag("DCC "),
        pair(verb, preceded(char(' '), take_while1(|c: char| c != ' ' && c != '\u{1}'))),
    );
    let (rem, (verb, filename)) = delimited(
        char('\u{1}'),
        pair(body, take_while(|c: char| c != '\u{1}')),
        char('\u{1}'),
    )
    .map(|((verb, filename), _rest)| (verb, filename))
    .parse(input)?;
    Ok((rem, (verb, filename.to_owned())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_nicknames() {
        let cases = ["a", "alice", "Z9", "x-y", "t[est]", "g{o}", "h|i", "a_b", "Qwertyuiop"];
        for &case in &cases {
            let (rest, out) = nickname_parser(case).unwrap_or_else(|_| panic!("should parse: {case}"));
            assert_eq!(rest, "");
            assert_eq!(out, case);
        }
    }

    #[test]
    fn invalid_nicknames() {
        assert!(nickname_parser("1abc").is_err(), "cannot start with digit");
        assert!(nickname_parser("_abc").is_err(), "cannot start with underscore");
        assert!(nickname_parser("").is_err(), "empty");
        assert!(!is_valid_nickname("toolongnick1"), "11 chars");
        assert!(!is_valid_nickname("ab cd"), "stops at space");
    }

    #[test]
    fn valid_channel_names() {
        for &case in &["#t", "#general", "&local", "#chan-42", "#a.b"] {
            assert!(is_valid_channel_name(case), "should accept: {case}");
        }
    }

    #[test]
    fn invalid_channel_names() {
        assert!(!is_valid_channel_name("#"), "too short");
        assert!(!is_valid_channel_name("general"), "missing prefix");
        assert!(!is_valid_channel_name("#a b"), "space");
        assert!(!is_valid_channel_name("#a,b"), "comma");
        assert!(!is_valid_channel_name("#a:b"), "colon");
        assert!(!is_valid_channel_name(&format!("#{}", "x".repeat(50))), "51 chars");
    }

    #[test]
    fn key_rules() {
        assert!(is_valid_key("hunter2"));
        assert!(is_valid_key(&"k".repeat(23)));
        assert!(!is_valid_key(&"k".repeat(24)));
        assert!(!is_valid_key("with space"));
        assert!(!is_valid_key(""));
    }

    #[test]
    fn modestring_sticky_signs() {
        let (rem, changes) = modestring_parser("+ik-t").unwrap();
        assert_eq!(rem, "");
        assert_eq!(changes, vec![(true, 'i'), (true, 'k'), (false, 't')]);

        let (_, changes) = modestring_parser("it").unwrap();
        assert_eq!(changes, vec![(true, 'i'), (true, 't')]);

        let (_, changes) = modestring_parser("-o").unwrap();
        assert_eq!(changes, vec![(false, 'o')]);

        assert!(modestring_parser("+-").is_err(), "signs only");
    }

    #[test]
    fn dcc_frames() {
        let (rem, (verb, file)) = dcc_request_parser("\u{1}DCC SEND notes.txt 2130706433 5000 1024\u{1}").unwrap();
        assert_eq!(rem, "");
        assert_eq!(verb, DccVerb::Send);
        assert_eq!(file, "notes.txt");

        let (_, (verb, file)) = dcc_request_parser("\u{1}DCC GET notes.txt\u{1}").unwrap();
        assert_eq!(verb, DccVerb::Get);
        assert_eq!(file, "notes.txt");

        assert!(dcc_request_parser("\u{1}VERSION\u{1}").is_err());
        assert!(dcc_request_parser("DCC SEND x").is_err(), "missing CTCP markers");
    }
}
