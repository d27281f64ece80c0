use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use guess_schema::{ChallengeKind, GameMode};
use serde::Deserialize;
use thiserror::Error;

use crate::achievements::{default_achievements, AchievementRule};

pub const BUILTIN_GAME_CONFIG: &str = include_str!("data/game_config.json");
pub const GAME_CONFIG_ENV: &str = "GUESS_CONFIG_PATH";

/// Tunables for both game modes. Every section falls back to its defaults
/// when absent, so partial override files are valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub chain: ChainConfig,
    pub comparison: ComparisonConfig,
    pub scoring: ScoringConfig,
    pub persistence: PersistenceConfig,
    pub reporting: ReportingConfig,
    pub achievements: Vec<AchievementRule>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            comparison: ComparisonConfig::default(),
            scoring: ScoringConfig::default(),
            persistence: PersistenceConfig::default(),
            reporting: ReportingConfig::default(),
            achievements: default_achievements(),
        }
    }
}

impl GameConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            read_game_config_from_str(BUILTIN_GAME_CONFIG)
                .expect("builtin game config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameConfigError> {
        read_game_config_from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, GameConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| GameConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        read_game_config_from_str(&contents)
    }

    fn validate(&self) -> Result<(), GameConfigError> {
        if self.comparison.attempt_budget == 0 {
            return Err(GameConfigError::Invalid(
                "comparison.attempt_budget must be positive".to_string(),
            ));
        }
        let thresholds = &self.comparison.hint_thresholds;
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(GameConfigError::Invalid(
                "comparison.hint_thresholds must be strictly increasing".to_string(),
            ));
        }
        if thresholds
            .last()
            .is_some_and(|last| *last > self.comparison.attempt_budget)
        {
            return Err(GameConfigError::Invalid(
                "comparison.hint_thresholds must not exceed the attempt budget".to_string(),
            ));
        }
        if self.chain.rejection_sample_cap == 0 {
            return Err(GameConfigError::Invalid(
                "chain.rejection_sample_cap must be positive".to_string(),
            ));
        }
        if self.scoring.time_bucket_secs == 0 {
            return Err(GameConfigError::Invalid(
                "scoring.time_bucket_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum GameConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid game config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rejection_sample_cap: u32,
    pub challenge_kinds: Vec<ChallengeKind>,
    pub require_solvable: bool,
    pub score_window: f32,
    pub year_window: i32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rejection_sample_cap: 100,
            challenge_kinds: ChallengeKind::ALL
                .into_iter()
                .filter(|kind| *kind != ChallengeKind::Anything)
                .collect(),
            require_solvable: true,
            score_window: 0.5,
            year_window: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub attempt_budget: u32,
    pub score_tolerance: f32,
    pub hint_thresholds: Vec<u32>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            attempt_budget: 21,
            score_tolerance: 0.1,
            hint_thresholds: vec![10, 15, 20],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base: u32,
    pub attempt_penalty: u32,
    pub time_bucket_secs: u64,
    pub time_penalty: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 10_000,
            attempt_penalty: 500,
            time_bucket_secs: 30,
            time_penalty: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub slot_key: String,
    pub ttl_secs: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            slot_key: "chain_session".to_string(),
            ttl_secs: 2 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    pub chain_game_id: String,
    pub chain_board_id: String,
    pub comparison_game_id: String,
    pub comparison_board_id: String,
}

impl ReportingConfig {
    /// `(game_id, board_id)` for a mode.
    pub fn ids_for(&self, mode: GameMode) -> (&str, &str) {
        match mode {
            GameMode::Chain => (&self.chain_game_id, &self.chain_board_id),
            GameMode::Comparison => (&self.comparison_game_id, &self.comparison_board_id),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            chain_game_id: "anime-chain".to_string(),
            chain_board_id: "rounds".to_string(),
            comparison_game_id: "anime-wordle".to_string(),
            comparison_board_id: "score".to_string(),
        }
    }
}

/// Loads the config named by `GUESS_CONFIG_PATH`, falling back to the
/// builtin config when the variable is unset or the file is unusable.
pub fn load_game_config_from_env() -> Arc<GameConfig> {
    if let Some(path) = env::var(GAME_CONFIG_ENV).ok().map(PathBuf::from) {
        match GameConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "anime_guess::config",
                    path = %path.display(),
                    "config.loaded"
                );
                return Arc::new(config);
            }
            Err(err) => {
                tracing::warn!(
                    target: "anime_guess::config",
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
            }
        }
    }
    GameConfig::builtin()
}

fn read_game_config_from_str(data: &str) -> Result<GameConfig, GameConfigError> {
    let config: GameConfig = serde_json::from_str(data)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementTrigger;

    #[test]
    fn builtin_matches_defaults() {
        let builtin = GameConfig::builtin();
        let defaults = GameConfig::default();
        assert_eq!(builtin.chain.rejection_sample_cap, 100);
        assert_eq!(builtin.chain.challenge_kinds, defaults.chain.challenge_kinds);
        assert_eq!(builtin.comparison.attempt_budget, 21);
        assert_eq!(builtin.comparison.hint_thresholds, vec![10, 15, 20]);
        assert_eq!(builtin.scoring.base, defaults.scoring.base);
        assert_eq!(builtin.persistence.ttl_secs, 7_200);
        assert_eq!(builtin.achievements, defaults.achievements);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GameConfig::from_json_str(r#"{"comparison": {"attempt_budget": 30}}"#)
            .expect("partial config parses");
        assert_eq!(config.comparison.attempt_budget, 30);
        assert_eq!(config.comparison.hint_thresholds, vec![10, 15, 20]);
        assert_eq!(config.scoring.attempt_penalty, 500);
        assert!(config
            .achievements
            .iter()
            .any(|rule| rule.trigger == AchievementTrigger::Won));
    }

    #[test]
    fn rejects_unsorted_hint_thresholds() {
        let err = GameConfig::from_json_str(r#"{"comparison": {"hint_thresholds": [15, 10]}}"#)
            .expect_err("thresholds must increase");
        assert!(matches!(err, GameConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_thresholds_beyond_budget() {
        let err = GameConfig::from_json_str(
            r#"{"comparison": {"attempt_budget": 12, "hint_thresholds": [10, 15]}}"#,
        )
        .expect_err("thresholds must fit the budget");
        assert!(matches!(err, GameConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::from_file(Path::new("/nonexistent/game_config.json"))
            .expect_err("missing file");
        assert!(err.to_string().contains("game_config.json"));
    }
}
