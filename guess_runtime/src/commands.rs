use guess_core::{
    ChainState, ComparisonState, ComparisonTurn, GuessOutcome, HintSet, HintTier, RevealedClues,
    RoundOutcome, SkipOutcome,
};
use guess_schema::GameMode;
use serde::{Deserialize, Serialize};

/// Player commands accepted by [`SessionRunner`](crate::SessionRunner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GameCommand {
    Start { mode: GameMode },
    Guess { title: String },
    Skip,
    Draw,
    Resume,
    Status,
    Quit,
}

impl GameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GameCommand::Start { .. } => "start",
            GameCommand::Guess { .. } => "guess",
            GameCommand::Skip => "skip",
            GameCommand::Draw => "draw",
            GameCommand::Resume => "resume",
            GameCommand::Status => "status",
            GameCommand::Quit => "quit",
        }
    }
}

/// Result of one command, ready to render or serialize.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Started { status: SessionStatus },
    Resumed { status: SessionStatus },
    ChainGuess { result: GuessOutcome },
    ComparisonGuess { turn: ComparisonTurn },
    Skipped { skip: SkipOutcome },
    Drawn { round: RoundOutcome },
    Status { status: SessionStatus },
    Quit,
}

/// Player-visible view of the active session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionStatus {
    Chain {
        state: ChainState,
        reference: String,
        challenge: String,
        rounds_completed: u32,
        score: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        failure_reason: Option<String>,
    },
    Comparison {
        state: ComparisonState,
        attempts_used: u32,
        attempts_remaining: u32,
        tier: HintTier,
        #[serde(skip_serializing_if = "Option::is_none")]
        skip_cost: Option<u32>,
        hints: HintSet,
        clues: RevealedClues,
        score: u32,
        /// Only disclosed once the session is over.
        #[serde(skip_serializing_if = "Option::is_none")]
        answer: Option<String>,
    },
}

impl SessionStatus {
    pub fn mode(&self) -> GameMode {
        match self {
            SessionStatus::Chain { .. } => GameMode::Chain,
            SessionStatus::Comparison { .. } => GameMode::Comparison,
        }
    }
}
