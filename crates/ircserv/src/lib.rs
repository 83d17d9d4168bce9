//! ircserv: an RFC 1459/2812-subset IRC server.
//!
//! Single-threaded cooperative design: every connection runs as a task on a
//! current-thread tokio runtime, multiplexed over non-blocking sockets.
//! Command handlers mutate the shared [`server_state::ServerState`] and queue
//! outbound lines; nothing in a handler blocks.

pub mod channel;
pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod message;
pub mod parsers;
pub mod replies;
pub mod server_state;
