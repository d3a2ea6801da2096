//! Example runner for the chat-ox client.
//!
//! One blocking completion, one streamed completion, then a greeting. Each
//! step writes to any [`std::io::Write`] sink so the binary can hand it
//! stdout and tests can hand it a buffer.

pub mod config;
pub mod error;
pub mod runner;

pub use config::Cli;
pub use error::RunError;
pub use runner::{greeting, print_completion, print_greeting, print_stream, run};
