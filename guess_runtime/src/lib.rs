//! Command surface for the anime guessing games.
//!
//! Front ends parse player input with [`parse_command_line`] and hand the
//! resulting [`GameCommand`] to a [`SessionRunner`], which drives the game
//! controllers from `guess_core` and returns a serializable
//! [`CommandOutcome`].

pub mod command_text;
pub mod commands;
pub mod runner;

pub use command_text::{parse_command_line, CommandParseError};
pub use commands::{CommandOutcome, GameCommand, SessionStatus};
pub use runner::{RunnerError, SessionRunner};
