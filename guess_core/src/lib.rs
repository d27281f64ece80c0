//! Core engine for the anime guessing games.
//!
//! Two controllers own one session each: [`ChainGameController`] for the
//! chain-challenge mode and [`ComparisonGameController`] for the comparison
//! mode. Everything they delegate to (challenge generation, attribute diffing,
//! hint scheduling, scoring) is pure. Catalog access, score reporting and
//! session storage sit behind the [`CatalogProvider`], [`GameReporter`] and
//! [`SessionStore`] traits.

pub mod achievements;
pub mod catalog;
pub mod chain;
pub mod challenge;
mod clock;
pub mod comparison;
pub mod comparison_game;
pub mod config;
pub mod hints;
pub mod persistence;
pub mod reporting;
mod scoring;

use rand::{rngs::SmallRng, SeedableRng};

pub use achievements::{AchievementProgress, AchievementRule, AchievementTrigger};
pub use catalog::{resolve_guess, search_cached, CatalogError, CatalogProvider, StaticCatalog};
pub use chain::{
    ChainError, ChainGameController, ChainSession, ChainState, GuessOutcome, GuessRecord,
    GuessVerdict, RoundOutcome, StartError,
};
pub use challenge::{evaluate, failure_reason, ActiveChallenge, ChallengeGenerator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use comparison::{ClueFlags, ComparisonEngine, RevealedClues};
pub use comparison_game::{
    select_target, ComparisonError, ComparisonGameController, ComparisonGuess, ComparisonSession,
    ComparisonState, ComparisonTurn, SkipOutcome,
};
pub use config::{load_game_config_from_env, GameConfig, GameConfigError};
pub use hints::{hints_for, HintScheduler, HintSet, HintTier, SkipError};
pub use persistence::{FileStore, MemoryStore, SessionPersistence, SessionStore, StoreError};
pub use reporting::{GameReporter, MemoryReporter, NullReporter, ReportError, SessionReporter};
pub use scoring::ScoreCalculator;

/// Session RNG: reproducible when seeded, entropy-backed otherwise.
pub fn session_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}
