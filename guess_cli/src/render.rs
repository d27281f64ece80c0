use guess_core::{ClueFlags, GuessOutcome, RevealedClues, RoundOutcome};
use guess_runtime::{CommandOutcome, SessionStatus};
use guess_schema::{AttributeMatch, ComparisonResult};

pub fn render_outcome(outcome: &CommandOutcome) -> Vec<String> {
    match outcome {
        CommandOutcome::Started { status } => {
            let mut lines = vec![format!("New {} game.", status.mode().as_str())];
            lines.extend(render_status(status));
            lines
        }
        CommandOutcome::Resumed { status } => {
            let mut lines = vec!["Resumed saved chain.".to_string()];
            lines.extend(render_status(status));
            lines
        }
        CommandOutcome::ChainGuess { result } => match result {
            GuessOutcome::Accepted {
                rounds_completed,
                challenge,
            } => vec![
                format!("Accepted! Chain length {rounds_completed}."),
                format!("Next: {challenge}"),
            ],
            GuessOutcome::AlreadyUsed => {
                vec!["That one is already in your chain. Try another.".to_string()]
            }
            GuessOutcome::Rejected { reason } => {
                vec![format!("Chain broken: {reason}"), "Game over.".to_string()]
            }
            GuessOutcome::Exhausted { rounds_completed } => vec![format!(
                "Accepted! No anime left to chain. Final length {rounds_completed}."
            )],
        },
        CommandOutcome::ComparisonGuess { turn } => {
            let mut lines = vec![format!(
                "{}: {}",
                turn.guess,
                render_comparison(&turn.result)
            )];
            lines.push(format!("{} attempts left.", turn.attempts_remaining));
            lines
        }
        CommandOutcome::Skipped { skip } => vec![format!(
            "Skipped {} attempts; {} left, hint tier {:?}.",
            skip.cost, skip.attempts_remaining, skip.tier
        )],
        CommandOutcome::Drawn { round } => match round {
            RoundOutcome::Drawn {
                reference,
                challenge,
            } => vec![format!("Reference: {reference}"), format!("Next: {challenge}")],
            RoundOutcome::Exhausted { rounds_completed } => vec![format!(
                "Nothing left to draw. Final length {rounds_completed}."
            )],
        },
        CommandOutcome::Status { status } => render_status(status),
        CommandOutcome::Quit => vec!["Bye.".to_string()],
    }
}

fn render_status(status: &SessionStatus) -> Vec<String> {
    match status {
        SessionStatus::Chain {
            state,
            reference,
            challenge,
            rounds_completed,
            score,
            failure_reason,
        } => {
            let mut lines = vec![
                format!("Reference: {reference}"),
                format!("Challenge: {challenge}"),
                format!("Chain length {rounds_completed}, score {score} ({state:?})"),
            ];
            if let Some(reason) = failure_reason {
                lines.push(format!("Last miss: {reason}"));
            }
            lines
        }
        SessionStatus::Comparison {
            state,
            attempts_used,
            attempts_remaining,
            tier,
            skip_cost,
            hints,
            clues,
            score,
            answer,
        } => {
            let mut lines = vec![format!(
                "{attempts_used} used, {attempts_remaining} left, hint tier {tier:?} ({state:?})"
            )];
            if let Some(cost) = skip_cost {
                lines.push(format!("`skip` unlocks the next hint for {cost} attempts."));
            }
            lines.extend(render_clues(clues));
            if let Some(url) = &hints.cover_image {
                lines.push(format!("Cover: {url}"));
            }
            if let Some(synopsis) = &hints.synopsis {
                lines.push(format!("Synopsis: {synopsis}"));
            }
            if let Some(character) = &hints.character {
                lines.push(format!("Character: {character}"));
            }
            if let Some(answer) = answer {
                lines.push(format!("Answer: {answer} (score {score})"));
            }
            lines
        }
    }
}

fn render_comparison(result: &ComparisonResult) -> String {
    if result.is_target {
        return "correct!".to_string();
    }
    let mark = |hit: bool| if hit { "=" } else { "x" };
    let arrow = |value: AttributeMatch| value.arrow();
    format!(
        "score {} | studio {} | year {} | source {} | episodes {} | genres {}/{} | tags {}",
        arrow(result.score),
        mark(result.studio_match),
        arrow(result.release),
        mark(result.source_match),
        arrow(result.episodes),
        result.genre_overlap.count(),
        result.genre_overlap.count() + result.genre_overlap.wrong.len(),
        result.tag_overlap.count(),
    )
}

fn render_clues(clues: &RevealedClues) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(score) = clues.score().filter(|_| clues.is_revealed(ClueFlags::SCORE)) {
        lines.push(format!("Score: {score:.2}"));
    }
    if clues.is_revealed(ClueFlags::STUDIO) {
        lines.push(format!("Studio: {}", join(clues.studios().iter())));
    }
    if let Some(year) = clues.year() {
        lines.push(format!("Year: {year}"));
    }
    if let Some(source) = clues.source() {
        lines.push(format!("Source: {source}"));
    }
    if let Some(episodes) = clues.episodes() {
        lines.push(format!("Episodes: {episodes}"));
    }
    if !clues.genres().is_empty() {
        lines.push(format!("Genres: {}", join(clues.genres().iter())));
    }
    if !clues.tags().is_empty() {
        lines.push(format!("Tags: {}", join(clues.tags().iter())));
    }
    lines
}

fn join<'a>(values: impl Iterator<Item = &'a String>) -> String {
    values.map(String::as_str).collect::<Vec<_>>().join(", ")
}
