use std::collections::BTreeSet;

use guess_schema::GameMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRule {
    pub id: String,
    pub mode: GameMode,
    pub trigger: AchievementTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementTrigger {
    RoundsAtLeast { rounds: u32 },
    Won,
    WonWithin { attempts: u32 },
    ScoreAtLeast { score: u32 },
}

/// Session facts an achievement trigger is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementProgress {
    pub mode: GameMode,
    pub rounds_completed: u32,
    pub won: bool,
    pub attempts_used: u32,
    pub score: u32,
}

impl AchievementTrigger {
    pub fn is_met(&self, progress: &AchievementProgress) -> bool {
        match *self {
            AchievementTrigger::RoundsAtLeast { rounds } => progress.rounds_completed >= rounds,
            AchievementTrigger::Won => progress.won,
            AchievementTrigger::WonWithin { attempts } => {
                progress.won && progress.attempts_used <= attempts
            }
            AchievementTrigger::ScoreAtLeast { score } => progress.score >= score,
        }
    }
}

/// Remembers which achievements a session already reported so each one is
/// unlocked at most once per session.
#[derive(Debug, Clone, Default)]
pub struct AchievementTracker {
    unlocked: BTreeSet<String>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rules for `progress.mode` that are met now and were not
    /// met before, recording them as unlocked.
    pub fn newly_met<'a>(
        &mut self,
        rules: &'a [AchievementRule],
        progress: &AchievementProgress,
    ) -> Vec<&'a AchievementRule> {
        let mut met = Vec::new();
        for rule in rules {
            if rule.mode != progress.mode || self.unlocked.contains(&rule.id) {
                continue;
            }
            if rule.trigger.is_met(progress) {
                self.unlocked.insert(rule.id.clone());
                met.push(rule);
            }
        }
        met
    }
}

pub fn default_achievements() -> Vec<AchievementRule> {
    let rule = |id: &str, mode, trigger| AchievementRule {
        id: id.to_string(),
        mode,
        trigger,
    };
    vec![
        rule(
            "chain_5",
            GameMode::Chain,
            AchievementTrigger::RoundsAtLeast { rounds: 5 },
        ),
        rule(
            "chain_10",
            GameMode::Chain,
            AchievementTrigger::RoundsAtLeast { rounds: 10 },
        ),
        rule(
            "chain_25",
            GameMode::Chain,
            AchievementTrigger::RoundsAtLeast { rounds: 25 },
        ),
        rule("first_win", GameMode::Comparison, AchievementTrigger::Won),
        rule(
            "sharp_eye",
            GameMode::Comparison,
            AchievementTrigger::WonWithin { attempts: 5 },
        ),
        rule(
            "high_score",
            GameMode::Comparison,
            AchievementTrigger::ScoreAtLeast { score: 8000 },
        ),
    ]
}
