use std::cell::RefCell;
use std::rc::Rc;

use guess_schema::{AchievementUnlock, GameMode, ScoreSubmission};
use thiserror::Error;

use crate::achievements::{AchievementProgress, AchievementRule, AchievementTracker};
use crate::config::GameConfig;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("report rejected with status {status}")]
    Rejected { status: u16 },
}

/// Score and achievement collaborator. Calls are fire-and-forget from the
/// engine's point of view; errors are logged and never change an outcome.
pub trait GameReporter {
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ReportError>;
    fn unlock_achievement(&self, unlock: &AchievementUnlock) -> Result<(), ReportError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl GameReporter for NullReporter {
    fn submit_score(&self, _submission: &ScoreSubmission) -> Result<(), ReportError> {
        Ok(())
    }

    fn unlock_achievement(&self, _unlock: &AchievementUnlock) -> Result<(), ReportError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ReporterLog {
    scores: Vec<ScoreSubmission>,
    unlocks: Vec<AchievementUnlock>,
    failing: bool,
}

/// Records every call. Clones share the same log. A failing recorder still
/// records the attempt before returning an error.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    log: Rc<RefCell<ReporterLog>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let reporter = Self::default();
        reporter.log.borrow_mut().failing = true;
        reporter
    }

    pub fn scores(&self) -> Vec<ScoreSubmission> {
        self.log.borrow().scores.clone()
    }

    pub fn unlocks(&self) -> Vec<AchievementUnlock> {
        self.log.borrow().unlocks.clone()
    }
}

impl GameReporter for MemoryReporter {
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ReportError> {
        let mut log = self.log.borrow_mut();
        log.scores.push(submission.clone());
        if log.failing {
            return Err(ReportError::Unavailable("recorder set to fail".to_string()));
        }
        Ok(())
    }

    fn unlock_achievement(&self, unlock: &AchievementUnlock) -> Result<(), ReportError> {
        let mut log = self.log.borrow_mut();
        log.unlocks.push(unlock.clone());
        if log.failing {
            return Err(ReportError::Unavailable("recorder set to fail".to_string()));
        }
        Ok(())
    }
}

/// Per-session bridge between a controller and the reporter: knows the
/// player, the board ids for the mode and which achievements were already
/// unlocked this session.
pub struct SessionReporter {
    reporter: Box<dyn GameReporter>,
    username: Option<String>,
    mode: GameMode,
    game_id: String,
    board_id: String,
    rules: Vec<AchievementRule>,
    tracker: AchievementTracker,
}

impl SessionReporter {
    pub fn new(
        reporter: Box<dyn GameReporter>,
        username: Option<String>,
        mode: GameMode,
        config: &GameConfig,
    ) -> Self {
        let (game_id, board_id) = config.reporting.ids_for(mode);
        Self {
            reporter,
            username: username.filter(|name| !name.trim().is_empty()),
            mode,
            game_id: game_id.to_string(),
            board_id: board_id.to_string(),
            rules: config
                .achievements
                .iter()
                .filter(|rule| rule.mode == mode)
                .cloned()
                .collect(),
            tracker: AchievementTracker::new(),
        }
    }

    /// Forgets unlocks from the previous session.
    pub fn reset(&mut self) {
        self.tracker = AchievementTracker::new();
    }

    /// Unlocks every newly met achievement and returns their ids.
    pub fn check_achievements(&mut self, progress: &AchievementProgress) -> Vec<String> {
        let met: Vec<String> = self
            .tracker
            .newly_met(&self.rules, progress)
            .into_iter()
            .map(|rule| rule.id.clone())
            .collect();
        let Some(username) = self.username.as_deref() else {
            return met;
        };
        for achievement_id in &met {
            let unlock = AchievementUnlock {
                game_id: self.game_id.clone(),
                username: username.to_string(),
                achievement_id: achievement_id.clone(),
            };
            match self.reporter.unlock_achievement(&unlock) {
                Ok(()) => tracing::info!(
                    target: "anime_guess::reporting",
                    mode = self.mode.as_str(),
                    achievement = %achievement_id,
                    "achievement.unlocked"
                ),
                Err(err) => tracing::warn!(
                    target: "anime_guess::reporting",
                    mode = self.mode.as_str(),
                    achievement = %achievement_id,
                    error = %err,
                    "achievement.unlock_failed"
                ),
            }
        }
        met
    }

    pub fn submit_score(&self, score: u32, metadata: serde_json::Map<String, serde_json::Value>) {
        let Some(username) = self.username.as_deref() else {
            tracing::debug!(
                target: "anime_guess::reporting",
                mode = self.mode.as_str(),
                score,
                "score.skipped_guest"
            );
            return;
        };
        let submission = ScoreSubmission {
            game_id: self.game_id.clone(),
            board_id: self.board_id.clone(),
            username: username.to_string(),
            score,
            metadata,
        };
        match self.reporter.submit_score(&submission) {
            Ok(()) => tracing::info!(
                target: "anime_guess::reporting",
                mode = self.mode.as_str(),
                score,
                "score.submitted"
            ),
            Err(err) => tracing::warn!(
                target: "anime_guess::reporting",
                mode = self.mode.as_str(),
                score,
                error = %err,
                "score.submit_failed"
            ),
        }
    }
}

impl std::fmt::Debug for SessionReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReporter")
            .field("username", &self.username)
            .field("mode", &self.mode)
            .field("game_id", &self.game_id)
            .field("board_id", &self.board_id)
            .finish_non_exhaustive()
    }
}
