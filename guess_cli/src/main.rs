use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use guess_core::{
    load_game_config_from_env, session_rng, CatalogProvider, ChainGameController,
    ComparisonGameController, FileStore, GameReporter, NullReporter, SessionPersistence,
    StaticCatalog,
};
use guess_runtime::{parse_command_line, CommandOutcome, GameCommand, SessionRunner};
use guess_schema::GameMode;
use tracing::{info, warn};

mod backend;
mod render;

use backend::HttpBackend;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Chain,
    Comparison,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Chain => GameMode::Chain,
            ModeArg::Comparison => GameMode::Comparison,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal front end for the anime guessing games", long_about = None)]
struct Cli {
    /// JSON file with the catalog (an array of anime records).
    #[arg(long, conflicts_with = "backend")]
    catalog: Option<PathBuf>,
    /// Base URL of the game backend serving the catalog, scores and achievements.
    #[arg(long)]
    backend: Option<String>,
    /// Player name for score and achievement reporting. Guests report nothing.
    #[arg(long)]
    username: Option<String>,
    /// Seed for reproducible draws.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory holding the resumable chain session.
    #[arg(long, default_value = ".anime_guess")]
    save_dir: PathBuf,
    /// Start this mode immediately.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Backend request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// Print outcomes as JSON lines.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Scores go to the backend when one is configured and serves the catalog.
    fn reporter(&self) -> Result<Box<dyn GameReporter>> {
        let reporter: Box<dyn GameReporter> = match (&self.catalog, &self.backend) {
            (None, Some(url)) => Box::new(self.http_backend(url)?),
            _ => Box::new(NullReporter),
        };
        Ok(reporter)
    }

    fn http_backend(&self, url: &str) -> Result<HttpBackend> {
        HttpBackend::new(url, self.timeout()).wrap_err("building the HTTP client")
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_game_config_from_env();

    let provider: Rc<dyn CatalogProvider> = match (&cli.catalog, &cli.backend) {
        (Some(path), _) => {
            let catalog = StaticCatalog::from_file(path)
                .wrap_err_with(|| format!("loading catalog from {}", path.display()))?;
            info!(entries = catalog.entities().len(), "catalog.file_loaded");
            Rc::new(catalog)
        }
        (None, Some(url)) => {
            info!(backend = %url, "backend.configured");
            Rc::new(cli.http_backend(url)?)
        }
        (None, None) => bail!("pass --catalog <file> or --backend <url>"),
    };

    let persistence = SessionPersistence::new(
        Box::new(FileStore::new(&cli.save_dir)),
        &config.persistence,
    );
    let chain = ChainGameController::new(&config, Rc::clone(&provider), session_rng(cli.seed))
        .with_persistence(persistence)
        .with_reporter(&config, cli.reporter()?, cli.username.clone());
    let comparison = ComparisonGameController::new(
        &config,
        Rc::clone(&provider),
        session_rng(cli.seed.map(|seed| seed.wrapping_add(1))),
    )
    .with_reporter(&config, cli.reporter()?, cli.username.clone());
    let mut runner = SessionRunner::new(provider, chain, comparison);

    let mut stdout = io::stdout().lock();
    if let Some(mode) = cli.mode {
        dispatch(
            &mut runner,
            GameCommand::Start { mode: mode.into() },
            cli.json,
            &mut stdout,
        )?;
    } else {
        writeln!(
            stdout,
            "Commands: start chain|comparison, guess <title>, skip, draw, resume, status, quit"
        )?;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.wrap_err("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command_line(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(stdout, "{err}")?;
                continue;
            }
        };
        if !dispatch(&mut runner, command, cli.json, &mut stdout)? {
            break;
        }
    }

    Ok(())
}

/// Runs one command and prints its outcome. Returns `false` once the player
/// quits.
fn dispatch(
    runner: &mut SessionRunner,
    command: GameCommand,
    json: bool,
    out: &mut impl Write,
) -> Result<bool> {
    match runner.execute(command) {
        Ok(outcome) => {
            if json {
                writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
            } else {
                for line in render::render_outcome(&outcome) {
                    writeln!(out, "{line}")?;
                }
            }
            Ok(!matches!(outcome, CommandOutcome::Quit))
        }
        Err(err) => {
            if !err.is_recoverable() {
                warn!(error = %err, "command.failed");
            }
            writeln!(out, "{err}")?;
            Ok(true)
        }
    }
}
