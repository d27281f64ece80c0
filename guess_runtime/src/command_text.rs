use guess_schema::GameMode;
use thiserror::Error;

use crate::GameCommand;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid game mode '{0}'")]
    InvalidMode(String),
    #[error("unexpected argument '{argument}' for {command}")]
    UnexpectedArgument {
        command: &'static str,
        argument: String,
    },
}

/// Parses one line of player input. Titles keep their inner spacing and
/// case; verbs and modes are case-insensitive.
pub fn parse_command_line(input: &str) -> Result<GameCommand, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "start" | "new" => {
            let mode_str = rest
                .split_whitespace()
                .next()
                .ok_or(CommandParseError::MissingArgument("mode"))?;
            let mode = parse_mode(mode_str)?;
            Ok(GameCommand::Start { mode })
        }
        "guess" | "g" => {
            if rest.is_empty() {
                return Err(CommandParseError::MissingArgument("title"));
            }
            Ok(GameCommand::Guess {
                title: collapse_spaces(rest),
            })
        }
        "skip" | "hint" => no_arguments("skip", rest, GameCommand::Skip),
        "draw" | "reroll" => no_arguments("draw", rest, GameCommand::Draw),
        "resume" | "continue" => no_arguments("resume", rest, GameCommand::Resume),
        "status" | "show" => no_arguments("status", rest, GameCommand::Status),
        "quit" | "exit" | "q" => no_arguments("quit", rest, GameCommand::Quit),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_mode(token: &str) -> Result<GameMode, CommandParseError> {
    match token.to_ascii_lowercase().as_str() {
        "chain" | "challenge" => Ok(GameMode::Chain),
        "comparison" | "compare" | "wordle" => Ok(GameMode::Comparison),
        other => Err(CommandParseError::InvalidMode(other.to_string())),
    }
}

fn no_arguments(
    command: &'static str,
    rest: &str,
    parsed: GameCommand,
) -> Result<GameCommand, CommandParseError> {
    match rest.split_whitespace().next() {
        None => Ok(parsed),
        Some(argument) => Err(CommandParseError::UnexpectedArgument {
            command,
            argument: argument.to_string(),
        }),
    }
}

fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
