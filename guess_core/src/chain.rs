//! Chain-challenge mode.
//!
//! Each round the player names an anime satisfying a challenge derived from
//! the current reference. An accepted guess becomes the next reference; the
//! first rejection ends the session.

use std::collections::HashSet;
use std::rc::Rc;

use guess_schema::{ChainSessionSnapshot, Entity, EntityId, GameMode};
use rand::{rngs::SmallRng, seq::SliceRandom};
use serde::Serialize;
use thiserror::Error;

use crate::achievements::AchievementProgress;
use crate::catalog::{resolve_guess, CatalogError, CatalogProvider};
use crate::challenge::{failure_reason, ActiveChallenge, ChallengeGenerator};
use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::persistence::SessionPersistence;
use crate::reporting::{GameReporter, NullReporter, SessionReporter};
use crate::scoring::ScoreCalculator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    Active,
    Exhausted,
    Failed,
}

impl ChainState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ChainState::Active)
    }
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
    #[error("catalog has no playable entries")]
    EmptyCatalog,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("no chain session has been started")]
    NoSession,
    #[error("session is over")]
    SessionOver,
    #[error("no anime matches \"{0}\"")]
    UnknownTitle(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GuessVerdict {
    Accepted,
    Rejected { reason: String },
}

/// One submitted guess, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessRecord {
    pub entity: Entity,
    /// Round index the guess answered, starting at zero.
    pub round: u32,
    pub verdict: GuessVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuessOutcome {
    Accepted {
        rounds_completed: u32,
        challenge: String,
    },
    /// The guess was used earlier in the session; nothing changed.
    AlreadyUsed,
    Rejected {
        reason: String,
    },
    /// Accepted, and no unused entity remains.
    Exhausted {
        rounds_completed: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoundOutcome {
    Drawn { reference: String, challenge: String },
    Exhausted { rounds_completed: u32 },
}

/// State of one chain session, owned by its controller.
#[derive(Debug, Clone)]
pub struct ChainSession {
    state: ChainState,
    reference: Entity,
    challenge: ActiveChallenge,
    used: HashSet<EntityId>,
    used_order: Vec<EntityId>,
    rounds_completed: u32,
    accumulated_score: u32,
    history: Vec<GuessRecord>,
    failure_reason: Option<String>,
    created_at_ms: u64,
}

impl ChainSession {
    fn new(reference: Entity, challenge: ActiveChallenge, created_at_ms: u64) -> Self {
        let mut session = Self {
            state: ChainState::Active,
            reference: reference.clone(),
            challenge,
            used: HashSet::new(),
            used_order: Vec::new(),
            rounds_completed: 0,
            accumulated_score: 0,
            history: Vec::new(),
            failure_reason: None,
            created_at_ms,
        };
        session.mark_used(reference.id);
        session
    }

    fn mark_used(&mut self, id: EntityId) {
        if self.used.insert(id) {
            self.used_order.push(id);
        }
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn reference(&self) -> &Entity {
        &self.reference
    }

    pub fn challenge(&self) -> &ActiveChallenge {
        &self.challenge
    }

    pub fn is_used(&self, id: EntityId) -> bool {
        self.used.contains(&id)
    }

    /// Used identifiers in the order they were consumed.
    pub fn used_ids(&self) -> &[EntityId] {
        &self.used_order
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn accumulated_score(&self) -> u32 {
        self.accumulated_score
    }

    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}

pub struct ChainGameController {
    generator: ChallengeGenerator,
    scores: ScoreCalculator,
    rejection_sample_cap: u32,
    provider: Rc<dyn CatalogProvider>,
    catalog: Vec<Entity>,
    rng: SmallRng,
    clock: Box<dyn Clock>,
    persistence: Option<SessionPersistence>,
    reporter: SessionReporter,
    session: Option<ChainSession>,
}

impl ChainGameController {
    pub fn new(config: &GameConfig, provider: Rc<dyn CatalogProvider>, rng: SmallRng) -> Self {
        Self {
            generator: ChallengeGenerator::new(&config.chain),
            scores: ScoreCalculator::new(config.scoring.clone()),
            rejection_sample_cap: config.chain.rejection_sample_cap,
            provider,
            catalog: Vec::new(),
            rng,
            clock: Box::new(SystemClock),
            persistence: None,
            reporter: SessionReporter::new(Box::new(NullReporter), None, GameMode::Chain, config),
            session: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_persistence(mut self, persistence: SessionPersistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_reporter(
        mut self,
        config: &GameConfig,
        reporter: Box<dyn GameReporter>,
        username: Option<String>,
    ) -> Self {
        self.reporter = SessionReporter::new(reporter, username, GameMode::Chain, config);
        self
    }

    pub fn session(&self) -> Option<&ChainSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<ChainState> {
        self.session.as_ref().map(ChainSession::state)
    }

    pub fn score(&self) -> u32 {
        self.session
            .as_ref()
            .map(|session| self.scores.chain(session.rounds_completed))
            .unwrap_or(0)
    }

    /// Starts a fresh session over an already fetched catalog and draws the
    /// first round.
    pub fn start_session(&mut self, catalog: Vec<Entity>) -> Result<&ChainSession, StartError> {
        if catalog.is_empty() {
            return Err(StartError::EmptyCatalog);
        }
        self.catalog = catalog;
        self.reporter.reset();

        let reference = draw_unused(
            &self.catalog,
            &HashSet::new(),
            self.rejection_sample_cap,
            &mut self.rng,
        )
        .ok_or(StartError::EmptyCatalog)?;
        let mut used = HashSet::new();
        used.insert(reference.id);
        let challenge =
            self.generator
                .generate_for_pool(&reference, &self.catalog, &used, &mut self.rng);

        tracing::info!(
            target: "anime_guess::chain",
            catalog = self.catalog.len(),
            reference = %reference.id,
            challenge = challenge.kind().as_str(),
            "chain.session_started"
        );
        let session = ChainSession::new(reference, challenge, self.clock.now_ms());
        let snapshot = self.snapshot_of(&session);
        self.save(&snapshot);
        let session: &ChainSession = self.session.insert(session);
        Ok(session)
    }

    /// Reads the persisted slot, if a resumable session is there.
    pub fn load_resumable(&mut self) -> Option<ChainSessionSnapshot> {
        let now_ms = self.clock.now_ms();
        self.persistence.as_mut()?.load(now_ms)
    }

    /// Rebuilds an active session from a snapshot.
    pub fn resume(
        &mut self,
        catalog: Vec<Entity>,
        snapshot: ChainSessionSnapshot,
    ) -> Result<&ChainSession, StartError> {
        if catalog.is_empty() {
            return Err(StartError::EmptyCatalog);
        }
        self.catalog = catalog;
        self.reporter.reset();

        let mut session = ChainSession::new(
            snapshot.reference,
            ActiveChallenge::new(snapshot.challenge),
            snapshot.created_at_ms,
        );
        session.used.clear();
        session.used_order.clear();
        for id in snapshot.used_ids {
            session.mark_used(id);
        }
        session.rounds_completed = snapshot.rounds_completed;
        session.accumulated_score = snapshot.accumulated_score;

        tracing::info!(
            target: "anime_guess::chain",
            rounds = session.rounds_completed,
            used = session.used_order.len(),
            "chain.session_resumed"
        );
        let session: &ChainSession = self.session.insert(session);
        Ok(session)
    }

    /// Replaces the reference with a random unused entity. Exhausts the
    /// session when rejection sampling finds none within the cap.
    pub fn draw_round(&mut self) -> Result<RoundOutcome, ChainError> {
        let session = self.session.as_mut().ok_or(ChainError::NoSession)?;
        if session.state.is_terminal() {
            return Err(ChainError::SessionOver);
        }

        let Some(reference) = draw_unused(
            &self.catalog,
            &session.used,
            self.rejection_sample_cap,
            &mut self.rng,
        ) else {
            let rounds_completed = session.rounds_completed;
            self.finish(ChainState::Exhausted);
            return Ok(RoundOutcome::Exhausted { rounds_completed });
        };

        session.mark_used(reference.id);
        session.challenge =
            self.generator
                .generate_for_pool(&reference, &self.catalog, &session.used, &mut self.rng);
        session.reference = reference;
        let outcome = RoundOutcome::Drawn {
            reference: session.reference.title.clone(),
            challenge: session.challenge.display_text().to_string(),
        };
        tracing::debug!(
            target: "anime_guess::chain",
            reference = %session.reference.id,
            challenge = session.challenge.kind().as_str(),
            "chain.round_drawn"
        );
        self.checkpoint();
        Ok(outcome)
    }

    /// Resolves a typed title and submits it.
    pub fn submit_title(&mut self, query: &str) -> Result<GuessOutcome, ChainError> {
        self.ensure_active()?;
        let entity = resolve_guess(self.provider.as_ref(), &self.catalog, query)
            .ok_or_else(|| ChainError::UnknownTitle(query.trim().to_string()))?;
        self.submit_guess(&entity)
    }

    pub fn submit_guess(&mut self, guess: &Entity) -> Result<GuessOutcome, ChainError> {
        let session = self.session.as_mut().ok_or(ChainError::NoSession)?;
        if session.state.is_terminal() {
            return Err(ChainError::SessionOver);
        }
        if session.is_used(guess.id) {
            tracing::debug!(
                target: "anime_guess::chain",
                guess = %guess.id,
                "chain.guess_already_used"
            );
            return Ok(GuessOutcome::AlreadyUsed);
        }

        let round = session.rounds_completed;
        if !session.challenge.is_satisfied_by(guess) {
            let reason = failure_reason(session.challenge.rule(), guess);
            session.history.push(GuessRecord {
                entity: guess.clone(),
                round,
                verdict: GuessVerdict::Rejected {
                    reason: reason.clone(),
                },
            });
            session.failure_reason = Some(reason.clone());
            tracing::info!(
                target: "anime_guess::chain",
                guess = %guess.id,
                challenge = session.challenge.kind().as_str(),
                rounds = round,
                "chain.guess_rejected"
            );
            self.finish(ChainState::Failed);
            return Ok(GuessOutcome::Rejected { reason });
        }

        session.history.push(GuessRecord {
            entity: guess.clone(),
            round,
            verdict: GuessVerdict::Accepted,
        });
        session.rounds_completed += 1;
        session.accumulated_score = self.scores.chain(session.rounds_completed);
        session.reference = guess.clone();
        session.mark_used(guess.id);
        let rounds_completed = session.rounds_completed;
        tracing::debug!(
            target: "anime_guess::chain",
            guess = %guess.id,
            rounds = rounds_completed,
            "chain.guess_accepted"
        );

        self.reporter.check_achievements(&AchievementProgress {
            mode: GameMode::Chain,
            rounds_completed,
            won: false,
            attempts_used: 0,
            score: session.accumulated_score,
        });

        if self
            .catalog
            .iter()
            .all(|entity| session.used.contains(&entity.id))
        {
            self.finish(ChainState::Exhausted);
            return Ok(GuessOutcome::Exhausted { rounds_completed });
        }

        session.challenge = self.generator.generate_for_pool(
            &session.reference,
            &self.catalog,
            &session.used,
            &mut self.rng,
        );
        let challenge = session.challenge.display_text().to_string();
        self.checkpoint();
        Ok(GuessOutcome::Accepted {
            rounds_completed,
            challenge,
        })
    }

    /// The resumable view of the current session, stamped with the clock.
    pub fn snapshot(&self) -> Option<ChainSessionSnapshot> {
        self.session
            .as_ref()
            .map(|session| self.snapshot_of(session))
    }

    fn snapshot_of(&self, session: &ChainSession) -> ChainSessionSnapshot {
        ChainSessionSnapshot {
            reference: session.reference.clone(),
            challenge: session.challenge.rule().clone(),
            used_ids: session.used_order.clone(),
            rounds_completed: session.rounds_completed,
            accumulated_score: session.accumulated_score,
            terminal: session.state.is_terminal(),
            created_at_ms: session.created_at_ms,
            saved_at_ms: self.clock.now_ms(),
        }
    }

    fn ensure_active(&self) -> Result<(), ChainError> {
        match &self.session {
            None => Err(ChainError::NoSession),
            Some(session) if session.state.is_terminal() => Err(ChainError::SessionOver),
            Some(_) => Ok(()),
        }
    }

    fn checkpoint(&mut self) {
        if let Some(snapshot) = self.snapshot() {
            self.save(&snapshot);
        }
    }

    fn save(&mut self, snapshot: &ChainSessionSnapshot) {
        if let Some(persistence) = self.persistence.as_mut() {
            persistence.save(snapshot);
        }
    }

    fn finish(&mut self, state: ChainState) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state = state;
        let rounds_completed = session.rounds_completed;
        let score = self.scores.chain(rounds_completed);
        let mut metadata = serde_json::Map::new();
        metadata.insert("rounds_completed".to_string(), rounds_completed.into());
        metadata.insert(
            "last_reference".to_string(),
            session.reference.title.clone().into(),
        );

        tracing::info!(
            target: "anime_guess::chain",
            state = ?state,
            rounds = rounds_completed,
            "chain.session_finished"
        );

        if let Some(persistence) = self.persistence.as_mut() {
            persistence.clear();
        }
        self.reporter.check_achievements(&AchievementProgress {
            mode: GameMode::Chain,
            rounds_completed,
            won: state == ChainState::Exhausted,
            attempts_used: 0,
            score,
        });
        self.reporter.submit_score(score, metadata);
    }
}

impl std::fmt::Debug for ChainGameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainGameController")
            .field("catalog", &self.catalog.len())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Bounded rejection sampling for an entity not yet used.
fn draw_unused(
    catalog: &[Entity],
    used: &HashSet<EntityId>,
    cap: u32,
    rng: &mut SmallRng,
) -> Option<Entity> {
    for _ in 0..cap.max(1) {
        let candidate = catalog.choose(rng)?;
        if !used.contains(&candidate.id) {
            return Some(candidate.clone());
        }
    }
    None
}
