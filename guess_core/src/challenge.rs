//! Chain-mode challenge generation and evaluation.
//!
//! A challenge is stored as a [`ChallengeRule`] (kind plus parameters). The
//! predicate is never held as a closure: [`evaluate`] dispatches on the rule.

use std::collections::{BTreeSet, HashSet};

use guess_schema::{ChallengeKind, ChallengeRule, Entity, EntityId};
use rand::{seq::SliceRandom, Rng};

use crate::config::ChainConfig;

const MIN_SCORE: f32 = 1.0;
const MAX_SCORE: f32 = 10.0;
const SHARED_GENRE_MINIMUM: usize = 2;

/// The challenge a chain session is currently asking the player to meet.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveChallenge {
    rule: ChallengeRule,
    display_text: String,
}

impl ActiveChallenge {
    pub fn new(rule: ChallengeRule) -> Self {
        let display_text = rule.display_text();
        Self { rule, display_text }
    }

    pub fn rule(&self) -> &ChallengeRule {
        &self.rule
    }

    pub fn kind(&self) -> ChallengeKind {
        self.rule.kind()
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn is_satisfied_by(&self, candidate: &Entity) -> bool {
        evaluate(&self.rule, candidate)
    }
}

#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    kinds: BTreeSet<ChallengeKind>,
    require_solvable: bool,
    score_window: f32,
    year_window: i32,
}

impl Default for ChallengeGenerator {
    fn default() -> Self {
        Self::new(&ChainConfig::default())
    }
}

impl ChallengeGenerator {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            kinds: config.challenge_kinds.iter().copied().collect(),
            require_solvable: config.require_solvable,
            score_window: config.score_window.abs(),
            year_window: config.year_window.abs(),
        }
    }

    fn enabled(&self, kind: ChallengeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Every challenge the reference supports. Kinds whose attribute is
    /// missing on the reference are skipped.
    pub fn eligible_rules<R: Rng + ?Sized>(
        &self,
        reference: &Entity,
        rng: &mut R,
    ) -> Vec<ChallengeRule> {
        let mut rules = Vec::new();

        if let Some(score) = reference.score {
            if self.enabled(ChallengeKind::HigherScore) {
                rules.push(ChallengeRule::HigherScore { score });
            }
            if self.enabled(ChallengeKind::LowerScore) {
                rules.push(ChallengeRule::LowerScore { score });
            }
            if self.enabled(ChallengeKind::ScoreRange) {
                rules.push(ChallengeRule::ScoreRange {
                    min: round_hundredths((score - self.score_window).max(MIN_SCORE)),
                    max: round_hundredths((score + self.score_window).min(MAX_SCORE)),
                });
            }
        }

        let genres = distinct(&reference.genres);
        if !genres.is_empty() {
            if self.enabled(ChallengeKind::HasGenre) {
                if let Some(genre) = genres.choose(rng) {
                    rules.push(ChallengeRule::HasGenre {
                        genre: genre.clone(),
                    });
                }
            }
            if self.enabled(ChallengeKind::NoSharedGenres) {
                rules.push(ChallengeRule::NoSharedGenres {
                    genres: genres.clone(),
                });
            }
            if genres.len() >= SHARED_GENRE_MINIMUM && self.enabled(ChallengeKind::SharedGenres) {
                rules.push(ChallengeRule::SharedGenres {
                    genres: genres.clone(),
                    minimum: SHARED_GENRE_MINIMUM,
                });
            }
        }

        if let Some(studio) = reference.primary_studio() {
            if self.enabled(ChallengeKind::SameStudio) {
                rules.push(ChallengeRule::SameStudio {
                    studio: studio.to_string(),
                });
            }
            if self.enabled(ChallengeKind::DifferentStudio) {
                rules.push(ChallengeRule::DifferentStudio {
                    studio: studio.to_string(),
                });
            }
        }

        let tags = distinct(&reference.tags);
        if self.enabled(ChallengeKind::HasTag) {
            if let Some(tag) = tags.choose(rng) {
                rules.push(ChallengeRule::HasTag { tag: tag.clone() });
            }
        }

        if let Some(source) = reference.source() {
            if self.enabled(ChallengeKind::SameSource) {
                rules.push(ChallengeRule::SameSource {
                    source: source.to_string(),
                });
            }
            if self.enabled(ChallengeKind::DifferentSource) {
                rules.push(ChallengeRule::DifferentSource {
                    source: source.to_string(),
                });
            }
        }

        if let Some(year) = reference.release_year() {
            if self.enabled(ChallengeKind::SameYear) {
                rules.push(ChallengeRule::SameYear { year });
            }
            if self.enabled(ChallengeKind::BeforeYear) {
                rules.push(ChallengeRule::BeforeYear { year });
            }
            if self.enabled(ChallengeKind::AfterYear) {
                rules.push(ChallengeRule::AfterYear { year });
            }
            if self.enabled(ChallengeKind::YearRange) {
                rules.push(ChallengeRule::YearRange {
                    min: year - self.year_window,
                    max: year + self.year_window,
                });
            }
        }

        if let Some(episodes) = reference.episode_count() {
            if self.enabled(ChallengeKind::MoreEpisodes) {
                rules.push(ChallengeRule::MoreEpisodes { episodes });
            }
            // Nothing has fewer than one episode.
            if episodes > 1 && self.enabled(ChallengeKind::FewerEpisodes) {
                rules.push(ChallengeRule::FewerEpisodes { episodes });
            }
        }

        rules
    }

    /// Draws one eligible challenge uniformly, or the always-true fallback.
    pub fn generate<R: Rng + ?Sized>(&self, reference: &Entity, rng: &mut R) -> ActiveChallenge {
        let rules = self.eligible_rules(reference, rng);
        pick(rules, rng)
    }

    /// Like [`generate`](Self::generate), but when solvability is required
    /// drops rules that no unused pool entity can satisfy before drawing.
    pub fn generate_for_pool<R: Rng + ?Sized>(
        &self,
        reference: &Entity,
        pool: &[Entity],
        used: &HashSet<EntityId>,
        rng: &mut R,
    ) -> ActiveChallenge {
        let mut rules = self.eligible_rules(reference, rng);
        if self.require_solvable {
            rules.retain(|rule| {
                pool.iter()
                    .any(|candidate| !used.contains(&candidate.id) && evaluate(rule, candidate))
            });
        }
        pick(rules, rng)
    }
}

fn pick<R: Rng + ?Sized>(rules: Vec<ChallengeRule>, rng: &mut R) -> ActiveChallenge {
    let rule = rules
        .choose(rng)
        .cloned()
        .unwrap_or(ChallengeRule::Anything);
    ActiveChallenge::new(rule)
}

fn distinct(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|value| !value.is_empty() && seen.insert(value.as_str()))
        .cloned()
        .collect()
}

fn round_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Evaluates a rule against a candidate. A candidate missing the attribute a
/// rule inspects never satisfies it.
pub fn evaluate(rule: &ChallengeRule, candidate: &Entity) -> bool {
    match rule {
        ChallengeRule::HigherScore { score } => candidate.score.is_some_and(|s| s > *score),
        ChallengeRule::LowerScore { score } => candidate.score.is_some_and(|s| s < *score),
        ChallengeRule::ScoreRange { min, max } => {
            candidate.score.is_some_and(|s| s >= *min && s <= *max)
        }
        ChallengeRule::HasGenre { genre } => candidate.has_genre(genre),
        ChallengeRule::NoSharedGenres { genres } => {
            !candidate.genres.is_empty() && !genres.iter().any(|g| candidate.has_genre(g))
        }
        ChallengeRule::SharedGenres { genres, minimum } => {
            shared_genres(genres, candidate).len() >= *minimum
        }
        ChallengeRule::SameStudio { studio } => candidate.has_studio(studio),
        ChallengeRule::DifferentStudio { studio } => {
            !candidate.studios.is_empty() && !candidate.has_studio(studio)
        }
        ChallengeRule::HasTag { tag } => candidate.has_tag(tag),
        ChallengeRule::SameSource { source } => candidate.source() == Some(source.as_str()),
        ChallengeRule::DifferentSource { source } => {
            candidate.source().is_some_and(|s| s != source.as_str())
        }
        ChallengeRule::SameYear { year } => candidate.release_year() == Some(*year),
        ChallengeRule::BeforeYear { year } => candidate.release_year().is_some_and(|y| y < *year),
        ChallengeRule::AfterYear { year } => candidate.release_year().is_some_and(|y| y > *year),
        ChallengeRule::YearRange { min, max } => candidate
            .release_year()
            .is_some_and(|y| y >= *min && y <= *max),
        ChallengeRule::MoreEpisodes { episodes } => {
            candidate.episode_count().is_some_and(|n| n > *episodes)
        }
        ChallengeRule::FewerEpisodes { episodes } => {
            candidate.episode_count().is_some_and(|n| n < *episodes)
        }
        ChallengeRule::Anything => true,
    }
}

fn shared_genres<'a>(genres: &'a [String], candidate: &Entity) -> Vec<&'a str> {
    genres
        .iter()
        .filter(|g| candidate.has_genre(g))
        .map(String::as_str)
        .collect()
}

fn list_or(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join(", ")
    }
}

/// Explains why `candidate` does not satisfy `rule`, citing the candidate's
/// actual value against the requirement.
pub fn failure_reason(rule: &ChallengeRule, candidate: &Entity) -> String {
    match rule {
        ChallengeRule::HigherScore { score } => match candidate.score {
            Some(s) => format!("{candidate} has a score of {s:.2}, which is not higher than {score:.2}"),
            None => format!("{candidate} has no score to compare against {score:.2}"),
        },
        ChallengeRule::LowerScore { score } => match candidate.score {
            Some(s) => format!("{candidate} has a score of {s:.2}, which is not lower than {score:.2}"),
            None => format!("{candidate} has no score to compare against {score:.2}"),
        },
        ChallengeRule::ScoreRange { min, max } => match candidate.score {
            Some(s) => format!(
                "{candidate} has a score of {s:.2}, which is outside {min:.2} to {max:.2}"
            ),
            None => format!("{candidate} has no score to compare against {min:.2} to {max:.2}"),
        },
        ChallengeRule::HasGenre { genre } => format!(
            "{candidate} does not have the genre {genre} (genres: {})",
            list_or(&candidate.genres, "none listed")
        ),
        ChallengeRule::NoSharedGenres { genres } => {
            if candidate.genres.is_empty() {
                format!("{candidate} has no genres listed")
            } else {
                format!(
                    "{candidate} shares {} with {}",
                    shared_genres(genres, candidate).join(", "),
                    genres.join(", ")
                )
            }
        }
        ChallengeRule::SharedGenres { genres, minimum } => {
            let shared = shared_genres(genres, candidate);
            format!(
                "{candidate} shares {} of {} (needs at least {minimum})",
                shared.len(),
                genres.join(", ")
            )
        }
        ChallengeRule::SameStudio { studio } => {
            if candidate.studios.is_empty() {
                format!("{candidate} has no studio listed")
            } else {
                format!(
                    "{candidate} was made by {}, not {studio}",
                    candidate.studios.join(", ")
                )
            }
        }
        ChallengeRule::DifferentStudio { studio } => {
            if candidate.studios.is_empty() {
                format!("{candidate} has no studio listed")
            } else {
                format!("{candidate} was also made by {studio}")
            }
        }
        ChallengeRule::HasTag { tag } => format!(
            "{candidate} does not have the tag {tag} (tags: {})",
            list_or(&candidate.tags, "none listed")
        ),
        ChallengeRule::SameSource { source } => match candidate.source() {
            Some(s) => format!("{candidate} has the source {s}, not {source}"),
            None => format!("{candidate} has no source listed"),
        },
        ChallengeRule::DifferentSource { source } => match candidate.source() {
            Some(_) => format!("{candidate} also has the source {source}"),
            None => format!("{candidate} has no source listed"),
        },
        ChallengeRule::SameYear { year } => match candidate.release_year() {
            Some(y) => format!("{candidate} was released in {y}, not {year}"),
            None => format!("{candidate} has no release year"),
        },
        ChallengeRule::BeforeYear { year } => match candidate.release_year() {
            Some(y) => format!("{candidate} was released in {y}, which is not before {year}"),
            None => format!("{candidate} has no release year"),
        },
        ChallengeRule::AfterYear { year } => match candidate.release_year() {
            Some(y) => format!("{candidate} was released in {y}, which is not after {year}"),
            None => format!("{candidate} has no release year"),
        },
        ChallengeRule::YearRange { min, max } => match candidate.release_year() {
            Some(y) => format!("{candidate} was released in {y}, which is outside {min} to {max}"),
            None => format!("{candidate} has no release year"),
        },
        ChallengeRule::MoreEpisodes { episodes } => match candidate.episode_count() {
            Some(n) => format!("{candidate} has {n} episodes, which is not more than {episodes}"),
            None => format!("{candidate} has no episode count"),
        },
        ChallengeRule::FewerEpisodes { episodes } => match candidate.episode_count() {
            Some(n) => format!("{candidate} has {n} episodes, which is not fewer than {episodes}"),
            None => format!("{candidate} has no episode count"),
        },
        ChallengeRule::Anything => format!("{candidate} was not accepted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn scored(id: u64, title: &str, score: Option<f32>) -> Entity {
        let mut entity = Entity::new(id, title);
        entity.score = score;
        entity
    }

    fn kinds(rules: &[ChallengeRule]) -> Vec<ChallengeKind> {
        rules.iter().map(ChallengeRule::kind).collect()
    }

    #[test]
    fn higher_score_rejects_equal_lower_and_unknown() {
        let rule = ChallengeRule::HigherScore { score: 8.0 };
        assert!(evaluate(&rule, &scored(1, "a", Some(8.01))));
        assert!(evaluate(&rule, &scored(2, "b", Some(9.5))));
        assert!(!evaluate(&rule, &scored(3, "c", Some(8.0))));
        assert!(!evaluate(&rule, &scored(4, "d", Some(7.99))));
        assert!(!evaluate(&rule, &scored(5, "e", None)));
    }

    #[test]
    fn higher_score_boundary_holds_across_reference_scores() {
        let mut rng = SmallRng::seed_from_u64(7);
        for step in 10..=100 {
            let reference_score = step as f32 / 10.0;
            let rule = ChallengeRule::HigherScore {
                score: reference_score,
            };
            for _ in 0..20 {
                let candidate_score: f32 = rng.gen_range(1.0..=10.0);
                let candidate = scored(9, "candidate", Some(candidate_score));
                assert_eq!(
                    evaluate(&rule, &candidate),
                    candidate_score > reference_score,
                    "candidate {candidate_score} vs reference {reference_score}"
                );
            }
        }
    }

    #[test]
    fn single_episode_never_offers_fewer_episodes() {
        let generator = ChallengeGenerator::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut entity = Entity::new(1, "Kimi no Na wa.");
        entity.episodes = Some(1);
        entity.score = Some(8.8);
        for _ in 0..50 {
            let rules = generator.eligible_rules(&entity, &mut rng);
            assert!(!kinds(&rules).contains(&ChallengeKind::FewerEpisodes));
            assert!(kinds(&rules).contains(&ChallengeKind::MoreEpisodes));
        }
    }

    #[test]
    fn eligible_set_skips_missing_attributes() {
        let generator = ChallengeGenerator::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut entity = Entity::new(1, "Only Genres");
        entity.genres = vec!["Drama".to_string()];
        let rules = generator.eligible_rules(&entity, &mut rng);
        assert_eq!(
            kinds(&rules),
            vec![ChallengeKind::HasGenre, ChallengeKind::NoSharedGenres]
        );
    }

    #[test]
    fn full_reference_offers_every_kind() {
        let generator = ChallengeGenerator::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut entity = Entity::new(1, "Full");
        entity.score = Some(7.9);
        entity.genres = vec!["Action".to_string(), "Drama".to_string()];
        entity.studios = vec!["Bones".to_string()];
        entity.tags = vec!["Military".to_string()];
        entity.source = Some("Manga".to_string());
        entity.year = Some(2009);
        entity.episodes = Some(64);
        let rules = generator.eligible_rules(&entity, &mut rng);
        assert_eq!(rules.len(), 17);
        assert!(!kinds(&rules).contains(&ChallengeKind::Anything));
    }

    #[test]
    fn empty_reference_falls_back_to_anything() {
        let generator = ChallengeGenerator::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let challenge = generator.generate(&Entity::new(1, "Bare"), &mut rng);
        assert_eq!(challenge.kind(), ChallengeKind::Anything);
        assert!(challenge.is_satisfied_by(&Entity::new(2, "Other")));
    }

    #[test]
    fn score_range_is_clamped_to_nominal_bounds() {
        let generator = ChallengeGenerator::new(&ChainConfig {
            challenge_kinds: vec![ChallengeKind::ScoreRange],
            ..ChainConfig::default()
        });
        let mut rng = SmallRng::seed_from_u64(5);
        let rules = generator.eligible_rules(&scored(1, "top", Some(9.8)), &mut rng);
        assert_eq!(rules, vec![ChallengeRule::ScoreRange { min: 9.3, max: 10.0 }]);
        let rules = generator.eligible_rules(&scored(2, "bottom", Some(1.2)), &mut rng);
        assert_eq!(rules, vec![ChallengeRule::ScoreRange { min: 1.0, max: 1.7 }]);
    }

    #[test]
    fn shared_genres_requires_two_reference_genres() {
        let generator = ChallengeGenerator::default();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut entity = Entity::new(1, "Dup");
        entity.genres = vec!["Action".to_string(), "Action".to_string()];
        let rules = generator.eligible_rules(&entity, &mut rng);
        assert!(!kinds(&rules).contains(&ChallengeKind::SharedGenres));
    }

    #[test]
    fn different_attribute_rules_require_candidate_attribute() {
        let studio = ChallengeRule::DifferentStudio {
            studio: "Madhouse".to_string(),
        };
        let source = ChallengeRule::DifferentSource {
            source: "Manga".to_string(),
        };
        let genres = ChallengeRule::NoSharedGenres {
            genres: vec!["Action".to_string()],
        };
        let bare = Entity::new(1, "Bare");
        assert!(!evaluate(&studio, &bare));
        assert!(!evaluate(&source, &bare));
        assert!(!evaluate(&genres, &bare));

        let mut other = Entity::new(2, "Other");
        other.studios = vec!["Kyoto Animation".to_string()];
        other.source = Some("Light novel".to_string());
        other.genres = vec!["Slice of Life".to_string()];
        assert!(evaluate(&studio, &other));
        assert!(evaluate(&source, &other));
        assert!(evaluate(&genres, &other));
    }

    #[test]
    fn solvable_generation_drops_unsatisfiable_rules() {
        let generator = ChallengeGenerator::new(&ChainConfig {
            challenge_kinds: vec![ChallengeKind::HigherScore, ChallengeKind::LowerScore],
            ..ChainConfig::default()
        });
        let reference = scored(1, "Reference", Some(8.0));
        let pool = vec![
            reference.clone(),
            scored(2, "Lower", Some(6.5)),
            scored(3, "Unscored", None),
        ];
        let used: HashSet<EntityId> = [EntityId(1)].into_iter().collect();
        let mut rng = SmallRng::seed_from_u64(8);
        for _ in 0..20 {
            let challenge = generator.generate_for_pool(&reference, &pool, &used, &mut rng);
            assert_eq!(challenge.kind(), ChallengeKind::LowerScore);
        }
    }

    #[test]
    fn unsolvable_pool_falls_back_to_anything() {
        let generator = ChallengeGenerator::new(&ChainConfig {
            challenge_kinds: vec![ChallengeKind::HigherScore],
            ..ChainConfig::default()
        });
        let reference = scored(1, "Reference", Some(9.9));
        let pool = vec![reference.clone(), scored(2, "Lower", Some(6.5))];
        let used: HashSet<EntityId> = [EntityId(1)].into_iter().collect();
        let mut rng = SmallRng::seed_from_u64(9);
        let challenge = generator.generate_for_pool(&reference, &pool, &used, &mut rng);
        assert_eq!(challenge.kind(), ChallengeKind::Anything);
    }

    #[test]
    fn failure_reason_cites_actual_value() {
        let rule = ChallengeRule::HigherScore { score: 8.0 };
        let reason = failure_reason(&rule, &scored(3, "Candidate C", Some(7.0)));
        insta::assert_snapshot!(
            reason,
            @r###""Candidate C" has a score of 7.00, which is not higher than 8.00"###
        );
    }

    #[test]
    fn failure_reason_for_missing_attribute() {
        let rule = ChallengeRule::FewerEpisodes { episodes: 12 };
        let reason = failure_reason(&rule, &Entity::new(4, "Unaired"));
        insta::assert_snapshot!(reason, @r###""Unaired" has no episode count"###);
    }

    #[test]
    fn failure_reason_lists_shared_genres() {
        let rule = ChallengeRule::NoSharedGenres {
            genres: vec!["Action".to_string(), "Drama".to_string()],
        };
        let mut candidate = Entity::new(5, "Overlap");
        candidate.genres = vec!["Drama".to_string(), "Romance".to_string()];
        assert_eq!(
            failure_reason(&rule, &candidate),
            "\"Overlap\" shares Drama with Action, Drama"
        );
    }

    fn with(title: &str, edit: impl FnOnce(&mut Entity)) -> Entity {
        let mut entity = Entity::new(1, title);
        edit(&mut entity);
        entity
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn with_score(score: f32) -> Entity {
        with(&format!("score {score}"), |e| e.score = Some(score))
    }

    fn with_genres(genres: &[&str]) -> Entity {
        with(&genres.join("/"), |e| e.genres = names(genres))
    }

    fn with_studios(studios: &[&str]) -> Entity {
        with(&studios.join("/"), |e| e.studios = names(studios))
    }

    fn with_source(source: &str) -> Entity {
        with(source, |e| e.source = Some(source.to_string()))
    }

    fn with_year(year: i32) -> Entity {
        with(&year.to_string(), |e| e.year = Some(year))
    }

    fn with_episodes(episodes: u32) -> Entity {
        with(&format!("{episodes} eps"), |e| e.episodes = Some(episodes))
    }

    #[test]
    fn every_rule_accepts_rejects_and_requires_its_attribute() {
        let cases: Vec<(ChallengeRule, Vec<Entity>, Vec<Entity>)> = vec![
            (
                ChallengeRule::HigherScore { score: 8.0 },
                vec![with_score(8.01), with_score(9.5)],
                vec![with_score(8.0), with_score(7.5)],
            ),
            (
                ChallengeRule::LowerScore { score: 8.0 },
                vec![with_score(7.99), with_score(5.0)],
                vec![with_score(8.0), with_score(9.0)],
            ),
            (
                ChallengeRule::ScoreRange {
                    min: 7.36,
                    max: 8.36,
                },
                vec![with_score(7.36), with_score(7.9), with_score(8.36)],
                vec![with_score(7.35), with_score(8.37)],
            ),
            (
                ChallengeRule::HasGenre {
                    genre: "Action".to_string(),
                },
                vec![with_genres(&["Drama", "Action"])],
                vec![with_genres(&["Drama"])],
            ),
            (
                ChallengeRule::NoSharedGenres {
                    genres: names(&["Action", "Drama"]),
                },
                vec![with_genres(&["Comedy", "Romance"])],
                vec![with_genres(&["Comedy", "Drama"])],
            ),
            (
                ChallengeRule::SharedGenres {
                    genres: names(&["Action", "Drama", "Comedy"]),
                    minimum: 2,
                },
                vec![
                    with_genres(&["Drama", "Action"]),
                    with_genres(&["Action", "Drama", "Comedy"]),
                ],
                vec![with_genres(&["Action", "Romance"])],
            ),
            (
                ChallengeRule::SameStudio {
                    studio: "Studio Kaze".to_string(),
                },
                vec![with_studios(&["Studio Kaze"]), with_studios(&["Bones", "Studio Kaze"])],
                vec![with_studios(&["Bones"])],
            ),
            (
                ChallengeRule::DifferentStudio {
                    studio: "Studio Kaze".to_string(),
                },
                vec![with_studios(&["Bones"])],
                vec![with_studios(&["Studio Kaze"]), with_studios(&["Bones", "Studio Kaze"])],
            ),
            (
                ChallengeRule::HasTag {
                    tag: "Revenge".to_string(),
                },
                vec![with("tagged", |e| e.tags = names(&["Swordplay", "Revenge"]))],
                vec![with("untagged", |e| e.tags = names(&["Swordplay"]))],
            ),
            (
                ChallengeRule::SameSource {
                    source: "Manga".to_string(),
                },
                vec![with_source("Manga")],
                vec![with_source("Original"), with_source("")],
            ),
            (
                ChallengeRule::DifferentSource {
                    source: "Manga".to_string(),
                },
                vec![with_source("Original")],
                vec![with_source("Manga"), with_source("")],
            ),
            (
                ChallengeRule::SameYear { year: 2016 },
                vec![
                    with_year(2016),
                    with("aired", |e| e.aired = Some("2016-04-02".to_string())),
                ],
                vec![with_year(2015), with_year(2017)],
            ),
            (
                ChallengeRule::BeforeYear { year: 2016 },
                vec![with_year(2015)],
                vec![with_year(2016), with_year(2017)],
            ),
            (
                ChallengeRule::AfterYear { year: 2016 },
                vec![with_year(2017)],
                vec![with_year(2016), with_year(2015)],
            ),
            (
                ChallengeRule::YearRange {
                    min: 2014,
                    max: 2018,
                },
                vec![with_year(2014), with_year(2016), with_year(2018)],
                vec![with_year(2013), with_year(2019)],
            ),
            (
                ChallengeRule::MoreEpisodes { episodes: 12 },
                vec![with_episodes(13)],
                vec![with_episodes(12), with_episodes(11)],
            ),
            (
                ChallengeRule::FewerEpisodes { episodes: 12 },
                vec![with_episodes(11)],
                vec![with_episodes(12), with_episodes(13), with_episodes(0)],
            ),
        ];

        for kind in ChallengeKind::ALL {
            if kind != ChallengeKind::Anything {
                assert!(
                    cases.iter().any(|(rule, _, _)| rule.kind() == kind),
                    "{kind:?} has no case"
                );
            }
        }

        let bare = Entity::new(99, "Bare");
        for (rule, passing, failing) in &cases {
            for candidate in passing {
                assert!(evaluate(rule, candidate), "{rule:?} should accept {candidate}");
            }
            for candidate in failing {
                assert!(!evaluate(rule, candidate), "{rule:?} should reject {candidate}");
                assert!(!failure_reason(rule, candidate).is_empty());
            }
            assert!(!evaluate(rule, &bare), "{rule:?} should reject {bare}");
            assert!(failure_reason(rule, &bare).starts_with("\"Bare\""));
        }
        assert!(evaluate(&ChallengeRule::Anything, &bare));
    }

    #[test]
    fn score_range_text_and_check_agree_at_hundredths() {
        let generator = ChallengeGenerator::new(&ChainConfig {
            challenge_kinds: vec![ChallengeKind::ScoreRange],
            ..ChainConfig::default()
        });
        let mut rng = SmallRng::seed_from_u64(11);
        let challenge = generator.generate(&scored(1, "Reference", Some(7.86)), &mut rng);
        assert_eq!(
            challenge.rule(),
            &ChallengeRule::ScoreRange {
                min: 7.36,
                max: 8.36
            }
        );
        assert_eq!(
            challenge.display_text(),
            "Name an anime with a score between 7.36 and 8.36"
        );

        let high = scored(2, "High", Some(8.38));
        assert!(!challenge.is_satisfied_by(&high));
        insta::assert_snapshot!(
            failure_reason(challenge.rule(), &high),
            @r###""High" has a score of 8.38, which is outside 7.36 to 8.36"###
        );
        assert!(challenge.is_satisfied_by(&scored(3, "Low", Some(7.37))));
    }
}
