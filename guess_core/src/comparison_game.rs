//! Comparison ("wordle") mode: a fixed hidden target, a bounded attempt
//! budget and clues that accumulate with every guess.

use std::collections::HashSet;
use std::rc::Rc;

use guess_schema::{ComparisonResult, Entity, EntityId, GameMode};
use rand::{rngs::SmallRng, seq::SliceRandom};
use serde::Serialize;
use thiserror::Error;

use crate::achievements::AchievementProgress;
use crate::catalog::{resolve_guess, CatalogProvider};
use crate::chain::StartError;
use crate::clock::{Clock, SystemClock};
use crate::comparison::{ComparisonEngine, RevealedClues};
use crate::config::GameConfig;
use crate::hints::{hints_for, HintScheduler, HintSet, HintTier, SkipError};
use crate::reporting::{GameReporter, NullReporter, SessionReporter};
use crate::scoring::ScoreCalculator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonState {
    Active,
    Won,
    Lost,
}

impl ComparisonState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ComparisonState::Active)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("no comparison session has been started")]
    NoSession,
    #[error("session is over")]
    SessionOver,
    #[error("no anime matches \"{0}\"")]
    UnknownTitle(String),
    #[error("\"{0}\" was already guessed")]
    AlreadyGuessed(String),
}

/// One guess and its diff against the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonGuess {
    pub entity: Entity,
    pub result: ComparisonResult,
    /// Attempts used once this guess was counted.
    pub attempt: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTurn {
    pub guess: String,
    pub result: ComparisonResult,
    pub state: ComparisonState,
    pub attempts_remaining: u32,
    pub tier: HintTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkipOutcome {
    pub cost: u32,
    pub attempts_remaining: u32,
    pub tier: HintTier,
    pub state: ComparisonState,
}

#[derive(Debug, Clone)]
pub struct ComparisonSession {
    state: ComparisonState,
    target: Entity,
    attempt_budget: u32,
    attempts_remaining: u32,
    history: Vec<ComparisonGuess>,
    guessed: HashSet<EntityId>,
    clues: RevealedClues,
    created_at_ms: u64,
    finished_at_ms: Option<u64>,
}

impl ComparisonSession {
    fn new(target: Entity, attempt_budget: u32, created_at_ms: u64) -> Self {
        Self {
            state: ComparisonState::Active,
            target,
            attempt_budget,
            attempts_remaining: attempt_budget,
            history: Vec::new(),
            guessed: HashSet::new(),
            clues: RevealedClues::new(),
            created_at_ms,
            finished_at_ms: None,
        }
    }

    pub fn state(&self) -> ComparisonState {
        self.state
    }

    /// The hidden answer. Front ends should only show it once the session
    /// is terminal.
    pub fn target(&self) -> &Entity {
        &self.target
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempt_budget - self.attempts_remaining
    }

    pub fn history(&self) -> &[ComparisonGuess] {
        &self.history
    }

    pub fn clues(&self) -> &RevealedClues {
        &self.clues
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Whole seconds from creation to the terminal transition, or to `now_ms`
    /// while still active.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        self.finished_at_ms
            .unwrap_or(now_ms)
            .saturating_sub(self.created_at_ms)
            / 1_000
    }
}

pub struct ComparisonGameController {
    engine: ComparisonEngine,
    scheduler: HintScheduler,
    scores: ScoreCalculator,
    attempt_budget: u32,
    provider: Rc<dyn CatalogProvider>,
    catalog: Vec<Entity>,
    rng: SmallRng,
    clock: Box<dyn Clock>,
    reporter: SessionReporter,
    session: Option<ComparisonSession>,
}

/// Uniform choice of a target from the catalog.
pub fn select_target(catalog: &[Entity], rng: &mut SmallRng) -> Option<Entity> {
    catalog.choose(rng).cloned()
}

impl ComparisonGameController {
    pub fn new(config: &GameConfig, provider: Rc<dyn CatalogProvider>, rng: SmallRng) -> Self {
        Self {
            engine: ComparisonEngine::new(config.comparison.score_tolerance),
            scheduler: HintScheduler::new(&config.comparison.hint_thresholds),
            scores: ScoreCalculator::new(config.scoring.clone()),
            attempt_budget: config.comparison.attempt_budget,
            provider,
            catalog: Vec::new(),
            rng,
            clock: Box::new(SystemClock),
            reporter: SessionReporter::new(
                Box::new(NullReporter),
                None,
                GameMode::Comparison,
                config,
            ),
            session: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reporter(
        mut self,
        config: &GameConfig,
        reporter: Box<dyn GameReporter>,
        username: Option<String>,
    ) -> Self {
        self.reporter = SessionReporter::new(reporter, username, GameMode::Comparison, config);
        self
    }

    pub fn session(&self) -> Option<&ComparisonSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<ComparisonState> {
        self.session.as_ref().map(ComparisonSession::state)
    }

    /// Starts a session with a target drawn uniformly from `catalog`.
    pub fn start_session(
        &mut self,
        catalog: Vec<Entity>,
    ) -> Result<&ComparisonSession, StartError> {
        let target = select_target(&catalog, &mut self.rng).ok_or(StartError::EmptyCatalog)?;
        self.start_with_target(catalog, target)
    }

    pub fn start_with_target(
        &mut self,
        catalog: Vec<Entity>,
        target: Entity,
    ) -> Result<&ComparisonSession, StartError> {
        if catalog.is_empty() {
            return Err(StartError::EmptyCatalog);
        }
        self.catalog = catalog;
        self.reporter.reset();
        tracing::info!(
            target: "anime_guess::comparison",
            catalog = self.catalog.len(),
            budget = self.attempt_budget,
            "comparison.session_started"
        );
        let session: &ComparisonSession = self.session.insert(ComparisonSession::new(
            target,
            self.attempt_budget,
            self.clock.now_ms(),
        ));
        Ok(session)
    }

    pub fn attempts_used(&self) -> u32 {
        self.session
            .as_ref()
            .map(ComparisonSession::attempts_used)
            .unwrap_or(0)
    }

    pub fn tier(&self) -> HintTier {
        self.scheduler.tier_for(self.attempts_used())
    }

    /// Hints unlocked so far for the current target.
    pub fn hints(&self) -> HintSet {
        match &self.session {
            Some(session) => hints_for(&session.target, self.tier()),
            None => HintSet::default(),
        }
    }

    /// Attempts a skip would cost right now, if one is available.
    pub fn skip_cost(&self) -> Option<u32> {
        self.scheduler.skip_cost(self.attempts_used())
    }

    /// Final score: non-zero only for a won session.
    pub fn score(&self) -> u32 {
        let Some(session) = &self.session else {
            return 0;
        };
        let elapsed = session.elapsed_secs(self.clock.now_ms());
        self.scores.comparison(
            session.state == ComparisonState::Won,
            session.attempts_used(),
            elapsed,
        )
    }

    /// Resolves a typed title and submits it.
    pub fn submit_title(&mut self, query: &str) -> Result<ComparisonTurn, ComparisonError> {
        match &self.session {
            None => return Err(ComparisonError::NoSession),
            Some(session) if session.state.is_terminal() => {
                return Err(ComparisonError::SessionOver)
            }
            Some(_) => {}
        }
        let entity = resolve_guess(self.provider.as_ref(), &self.catalog, query)
            .ok_or_else(|| ComparisonError::UnknownTitle(query.trim().to_string()))?;
        self.submit_guess(&entity)
    }

    pub fn submit_guess(&mut self, guess: &Entity) -> Result<ComparisonTurn, ComparisonError> {
        let session = self.session.as_mut().ok_or(ComparisonError::NoSession)?;
        if session.state.is_terminal() {
            return Err(ComparisonError::SessionOver);
        }
        if session.guessed.contains(&guess.id) {
            return Err(ComparisonError::AlreadyGuessed(guess.title.clone()));
        }

        let result = self.engine.compare(&session.target, guess);
        session.attempts_remaining = session.attempts_remaining.saturating_sub(1);
        session.guessed.insert(guess.id);
        session.clues.merge(&session.target, guess, &result);
        let attempt = session.attempt_budget - session.attempts_remaining;
        session.history.push(ComparisonGuess {
            entity: guess.clone(),
            result: result.clone(),
            attempt,
        });
        tracing::debug!(
            target: "anime_guess::comparison",
            guess = %guess.id,
            attempt,
            remaining = session.attempts_remaining,
            "comparison.guess_scored"
        );

        if result.is_target {
            self.finish(ComparisonState::Won);
        } else if session.attempts_remaining == 0 {
            self.finish(ComparisonState::Lost);
        }

        let state = self.state().unwrap_or(ComparisonState::Active);
        Ok(ComparisonTurn {
            guess: guess.title.clone(),
            result,
            state,
            attempts_remaining: self
                .session
                .as_ref()
                .map(ComparisonSession::attempts_remaining)
                .unwrap_or(0),
            tier: self.tier(),
        })
    }

    /// Spends attempts to reach the next hint tier. A rejected skip leaves
    /// the session untouched.
    pub fn request_skip(&mut self) -> Result<SkipOutcome, SkipError> {
        let session = self.session.as_mut().ok_or(SkipError::SessionOver)?;
        if session.state.is_terminal() {
            return Err(SkipError::SessionOver);
        }
        let cost = self
            .scheduler
            .plan_skip(session.attempts_used(), session.attempts_remaining)?;
        session.attempts_remaining -= cost;
        let attempts_remaining = session.attempts_remaining;
        let tier = self.scheduler.tier_for(session.attempts_used());
        tracing::debug!(
            target: "anime_guess::comparison",
            cost,
            remaining = attempts_remaining,
            tier = ?tier,
            "comparison.skipped"
        );
        if attempts_remaining == 0 {
            self.finish(ComparisonState::Lost);
        }
        Ok(SkipOutcome {
            cost,
            attempts_remaining,
            tier,
            state: self.state().unwrap_or(ComparisonState::Active),
        })
    }

    fn finish(&mut self, state: ComparisonState) {
        let now_ms = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state = state;
        session.finished_at_ms = Some(now_ms);
        session.clues.reveal_all(&session.target);

        let attempts_used = session.attempts_used();
        let elapsed_secs = session.elapsed_secs(now_ms);
        let won = state == ComparisonState::Won;
        let score = self.scores.comparison(won, attempts_used, elapsed_secs);
        let tier = self.scheduler.tier_for(attempts_used);

        let mut metadata = serde_json::Map::new();
        metadata.insert("attempts_used".to_string(), attempts_used.into());
        metadata.insert("elapsed_seconds".to_string(), elapsed_secs.into());
        metadata.insert("target_id".to_string(), session.target.id.0.into());
        metadata.insert(
            "hints_used_tier".to_string(),
            serde_json::to_value(tier).unwrap_or(serde_json::Value::Null),
        );

        tracing::info!(
            target: "anime_guess::comparison",
            state = ?state,
            attempts_used,
            elapsed_secs,
            score,
            "comparison.session_finished"
        );

        self.reporter.check_achievements(&AchievementProgress {
            mode: GameMode::Comparison,
            rounds_completed: 0,
            won,
            attempts_used,
            score,
        });
        self.reporter.submit_score(score, metadata);
    }
}

impl std::fmt::Debug for ComparisonGameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonGameController")
            .field("attempt_budget", &self.attempt_budget)
            .field("catalog", &self.catalog.len())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
