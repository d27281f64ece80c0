use std::rc::Rc;

use guess_core::{
    session_rng, CatalogProvider, ChainError, ChainGameController, ComparisonError,
    ComparisonGameController, GameConfig, SkipError, StartError,
};
use guess_schema::{Entity, GameMode};
use thiserror::Error;

use crate::{CommandOutcome, GameCommand, SessionStatus};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Start(#[from] StartError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error(transparent)]
    Skip(#[from] SkipError),
    #[error("no game is running; use `start chain` or `start comparison`")]
    NoActiveGame,
    #[error("no resumable chain session")]
    NothingToResume,
    #[error("`{command}` is not available in {mode} mode")]
    Unsupported {
        command: &'static str,
        mode: &'static str,
    },
}

impl RunnerError {
    /// Recoverable errors leave the session untouched and simply re-prompt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RunnerError::Start(_))
    }
}

/// Explicit command API over both game controllers. At most one mode is
/// active at a time; the fetched catalog is cached for later sessions.
pub struct SessionRunner {
    provider: Rc<dyn CatalogProvider>,
    catalog: Option<Vec<Entity>>,
    chain: ChainGameController,
    comparison: ComparisonGameController,
    active: Option<GameMode>,
}

impl SessionRunner {
    pub fn new(
        provider: Rc<dyn CatalogProvider>,
        chain: ChainGameController,
        comparison: ComparisonGameController,
    ) -> Self {
        Self {
            provider,
            catalog: None,
            chain,
            comparison,
            active: None,
        }
    }

    /// Controllers with no persistence, no reporting and the system clock.
    pub fn with_defaults(
        config: &GameConfig,
        provider: Rc<dyn CatalogProvider>,
        seed: Option<u64>,
    ) -> Self {
        let chain = ChainGameController::new(config, Rc::clone(&provider), session_rng(seed));
        let comparison = ComparisonGameController::new(
            config,
            Rc::clone(&provider),
            session_rng(seed.map(|seed| seed.wrapping_add(1))),
        );
        Self::new(provider, chain, comparison)
    }

    pub fn active_mode(&self) -> Option<GameMode> {
        self.active
    }

    pub fn chain(&self) -> &ChainGameController {
        &self.chain
    }

    pub fn comparison(&self) -> &ComparisonGameController {
        &self.comparison
    }

    pub fn execute(&mut self, command: GameCommand) -> Result<CommandOutcome, RunnerError> {
        tracing::debug!(
            target: "anime_guess::runtime",
            command = command.name(),
            "runtime.command"
        );
        match command {
            GameCommand::Start { mode } => {
                let catalog = self.catalog()?;
                match mode {
                    GameMode::Chain => {
                        self.chain.start_session(catalog)?;
                    }
                    GameMode::Comparison => {
                        self.comparison.start_session(catalog)?;
                    }
                }
                self.active = Some(mode);
                Ok(CommandOutcome::Started {
                    status: self.status_of(mode)?,
                })
            }
            GameCommand::Resume => {
                let snapshot = self
                    .chain
                    .load_resumable()
                    .ok_or(RunnerError::NothingToResume)?;
                let catalog = self.catalog()?;
                self.chain.resume(catalog, snapshot)?;
                self.active = Some(GameMode::Chain);
                Ok(CommandOutcome::Resumed {
                    status: self.status_of(GameMode::Chain)?,
                })
            }
            GameCommand::Guess { title } => match self.active_or_err()? {
                GameMode::Chain => Ok(CommandOutcome::ChainGuess {
                    result: self.chain.submit_title(&title)?,
                }),
                GameMode::Comparison => Ok(CommandOutcome::ComparisonGuess {
                    turn: self.comparison.submit_title(&title)?,
                }),
            },
            GameCommand::Skip => match self.active_or_err()? {
                GameMode::Comparison => Ok(CommandOutcome::Skipped {
                    skip: self.comparison.request_skip()?,
                }),
                GameMode::Chain => Err(RunnerError::Unsupported {
                    command: "skip",
                    mode: GameMode::Chain.as_str(),
                }),
            },
            GameCommand::Draw => match self.active_or_err()? {
                GameMode::Chain => Ok(CommandOutcome::Drawn {
                    round: self.chain.draw_round()?,
                }),
                GameMode::Comparison => Err(RunnerError::Unsupported {
                    command: "draw",
                    mode: GameMode::Comparison.as_str(),
                }),
            },
            GameCommand::Status => {
                let mode = self.active_or_err()?;
                Ok(CommandOutcome::Status {
                    status: self.status_of(mode)?,
                })
            }
            GameCommand::Quit => Ok(CommandOutcome::Quit),
        }
    }

    fn active_or_err(&self) -> Result<GameMode, RunnerError> {
        self.active.ok_or(RunnerError::NoActiveGame)
    }

    /// Fetches the catalog on first use. Failure is fatal to starting a game
    /// but leaves the runner ready to try again.
    fn catalog(&mut self) -> Result<Vec<Entity>, RunnerError> {
        if let Some(catalog) = &self.catalog {
            return Ok(catalog.clone());
        }
        let catalog = self.provider.fetch_catalog().map_err(|err| {
            tracing::error!(
                target: "anime_guess::runtime",
                error = %err,
                "runtime.catalog_fetch_failed"
            );
            RunnerError::Start(StartError::Catalog(err))
        })?;
        if catalog.is_empty() {
            return Err(StartError::EmptyCatalog.into());
        }
        tracing::info!(
            target: "anime_guess::runtime",
            entries = catalog.len(),
            "runtime.catalog_loaded"
        );
        self.catalog = Some(catalog.clone());
        Ok(catalog)
    }

    pub fn status(&self) -> Result<SessionStatus, RunnerError> {
        self.status_of(self.active_or_err()?)
    }

    fn status_of(&self, mode: GameMode) -> Result<SessionStatus, RunnerError> {
        match mode {
            GameMode::Chain => {
                let session = self.chain.session().ok_or(ChainError::NoSession)?;
                Ok(SessionStatus::Chain {
                    state: session.state(),
                    reference: session.reference().title.clone(),
                    challenge: session.challenge().display_text().to_string(),
                    rounds_completed: session.rounds_completed(),
                    score: self.chain.score(),
                    failure_reason: session.failure_reason().map(str::to_string),
                })
            }
            GameMode::Comparison => {
                let session = self
                    .comparison
                    .session()
                    .ok_or(ComparisonError::NoSession)?;
                let over = session.state().is_terminal();
                Ok(SessionStatus::Comparison {
                    state: session.state(),
                    attempts_used: session.attempts_used(),
                    attempts_remaining: session.attempts_remaining(),
                    tier: self.comparison.tier(),
                    skip_cost: if over {
                        None
                    } else {
                        self.comparison.skip_cost()
                    },
                    hints: self.comparison.hints(),
                    clues: session.clues().clone(),
                    score: self.comparison.score(),
                    answer: over.then(|| session.target().title.clone()),
                })
            }
        }
    }
}

impl std::fmt::Debug for SessionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRunner")
            .field("active", &self.active)
            .field("catalog_cached", &self.catalog.is_some())
            .field("chain", &self.chain)
            .field("comparison", &self.comparison)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_command_line;
    use guess_core::{CatalogError, ComparisonState, StaticCatalog};
    use guess_schema::EntityId;

    struct OfflineCatalog;

    impl CatalogProvider for OfflineCatalog {
        fn fetch_catalog(&self) -> Result<Vec<Entity>, CatalogError> {
            Err(CatalogError::Unavailable("timed out".to_string()))
        }

        fn fetch_entity_detail(&self, id: EntityId) -> Result<Entity, CatalogError> {
            Err(CatalogError::NotFound(id))
        }

        fn search_entities(&self, _query: &str) -> Result<Vec<Entity>, CatalogError> {
            Err(CatalogError::Unavailable("timed out".to_string()))
        }
    }

    fn catalog() -> Vec<Entity> {
        ["Akira", "Berserk", "Clannad", "Dororo"]
            .iter()
            .enumerate()
            .map(|(index, title)| {
                let mut entity = Entity::new(index as u64 + 1, *title);
                entity.score = Some(7.0 + index as f32 / 2.0);
                entity
            })
            .collect()
    }

    fn runner() -> SessionRunner {
        let provider: Rc<dyn CatalogProvider> = Rc::new(StaticCatalog::new(catalog()));
        SessionRunner::with_defaults(&GameConfig::default(), provider, Some(11))
    }

    fn run(runner: &mut SessionRunner, line: &str) -> Result<CommandOutcome, RunnerError> {
        runner.execute(parse_command_line(line).expect("command parses"))
    }

    #[test]
    fn commands_need_an_active_game() {
        let mut runner = runner();
        assert!(matches!(
            run(&mut runner, "guess Akira"),
            Err(RunnerError::NoActiveGame)
        ));
        assert!(matches!(
            run(&mut runner, "status"),
            Err(RunnerError::NoActiveGame)
        ));
        assert!(matches!(
            run(&mut runner, "resume"),
            Err(RunnerError::NothingToResume)
        ));
    }

    #[test]
    fn catalog_failure_is_fatal_to_start() {
        let config = GameConfig::default();
        let mut runner = SessionRunner::with_defaults(&config, Rc::new(OfflineCatalog), Some(1));
        let err = run(&mut runner, "start chain").expect_err("catalog is offline");
        assert!(!err.is_recoverable());
        assert_eq!(runner.active_mode(), None);
    }

    #[test]
    fn comparison_flow_through_commands() {
        let mut runner = runner();
        let started = run(&mut runner, "start comparison").expect("start");
        let CommandOutcome::Started { status } = started else {
            panic!("expected a started outcome");
        };
        assert_eq!(status.mode(), GameMode::Comparison);

        assert!(matches!(
            run(&mut runner, "draw"),
            Err(RunnerError::Unsupported { command: "draw", .. })
        ));

        let target = runner
            .comparison()
            .session()
            .expect("session")
            .target()
            .title
            .clone();
        let outcome = run(&mut runner, &format!("guess {target}")).expect("guess");
        let CommandOutcome::ComparisonGuess { turn } = outcome else {
            panic!("expected a comparison turn");
        };
        assert_eq!(turn.state, ComparisonState::Won);

        let CommandOutcome::Status { status } = run(&mut runner, "status").expect("status") else {
            panic!("expected status");
        };
        let SessionStatus::Comparison { answer, score, .. } = status else {
            panic!("expected comparison status");
        };
        assert_eq!(answer, Some(target));
        assert!(score > 0);
    }

    #[test]
    fn chain_rejects_skip() {
        let mut runner = runner();
        run(&mut runner, "start chain").expect("start");
        assert!(matches!(
            run(&mut runner, "skip"),
            Err(RunnerError::Unsupported { command: "skip", .. })
        ));
        assert!(matches!(
            run(&mut runner, "guess Nonexistent Show"),
            Err(RunnerError::Chain(ChainError::UnknownTitle(_)))
        ));
        assert_eq!(runner.active_mode(), Some(GameMode::Chain));
    }
}
