use serde::{Deserialize, Serialize};

/// Which game a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Chain,
    Comparison,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Chain => "chain",
            GameMode::Comparison => "comparison",
        }
    }
}

/// Payload for the score submission endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub game_id: String,
    pub board_id: String,
    pub username: String,
    pub score: u32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Payload for the achievement unlock endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub game_id: String,
    pub username: String,
    pub achievement_id: String,
}
