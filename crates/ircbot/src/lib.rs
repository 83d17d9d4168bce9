//! ircbot: a trigger-answering IRC client.
//!
//! Connects to the server like any other client, registers as `BOTTY`, and
//! answers `!funfact`, `!time` and `!age <YYYY-MM-DD>` PRIVMSGs with
//! NOTICEs. No memory is shared with the server; only the wire protocol.

pub mod age;
pub mod config;
pub mod errors;
pub mod parsers;
pub mod session;
