use std::cmp::Ordering;
use std::collections::BTreeSet;

use bitflags::bitflags;
use guess_schema::{AttributeMatch, ComparisonResult, Entity, GenreOverlap, TagOverlap};
use serde::Serialize;

// f32 scores such as 8.4 and 8.5 differ by slightly more than 0.1.
const SCORE_EPSILON: f32 = 1e-4;

/// Pure diff of a guess against the hidden target.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine {
    score_tolerance: f32,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl ComparisonEngine {
    pub fn new(score_tolerance: f32) -> Self {
        Self {
            score_tolerance: score_tolerance.abs(),
        }
    }

    pub fn compare(&self, target: &Entity, guess: &Entity) -> ComparisonResult {
        let score = match (target.score, guess.score) {
            (Some(t), Some(g)) if (t - g).abs() <= self.score_tolerance + SCORE_EPSILON => {
                AttributeMatch::Match
            }
            (Some(t), Some(g)) if t > g => AttributeMatch::TargetHigher,
            (Some(_), Some(_)) => AttributeMatch::TargetLower,
            _ => AttributeMatch::Unknown,
        };

        let mut correct = Vec::new();
        let mut wrong = Vec::new();
        let mut seen = BTreeSet::new();
        for genre in &guess.genres {
            if !seen.insert(genre.as_str()) {
                continue;
            }
            if target.has_genre(genre) {
                correct.push(genre.clone());
            } else {
                wrong.push(genre.clone());
            }
        }

        let mut seen = BTreeSet::new();
        let matched_tags = guess
            .tags
            .iter()
            .filter(|tag| seen.insert(tag.as_str()) && target.has_tag(tag))
            .cloned()
            .collect();

        ComparisonResult {
            is_target: target.id == guess.id,
            score,
            studio_match: guess.studios.iter().any(|studio| target.has_studio(studio)),
            release: compare_ordered(target.release_year(), guess.release_year()),
            source_match: matches!(
                (target.source(), guess.source()),
                (Some(t), Some(g)) if t == g
            ),
            episodes: compare_ordered(target.episode_count(), guess.episode_count()),
            genre_overlap: GenreOverlap { correct, wrong },
            tag_overlap: TagOverlap {
                matched: matched_tags,
            },
        }
    }
}

fn compare_ordered<T: Ord>(target: Option<T>, guess: Option<T>) -> AttributeMatch {
    match (target, guess) {
        (Some(t), Some(g)) => match t.cmp(&g) {
            Ordering::Equal => AttributeMatch::Match,
            Ordering::Greater => AttributeMatch::TargetHigher,
            Ordering::Less => AttributeMatch::TargetLower,
        },
        _ => AttributeMatch::Unknown,
    }
}

bitflags! {
    /// Attribute groups of the target that have been disclosed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct ClueFlags: u16 {
        const SCORE = 1 << 0;
        const STUDIO = 1 << 1;
        const RELEASE = 1 << 2;
        const SOURCE = 1 << 3;
        const EPISODES = 1 << 4;
        const GENRES = 1 << 5;
        const TAGS = 1 << 6;
    }
}

/// Target facts learned so far in a comparison session. Only grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevealedClues {
    flags: ClueFlags,
    score: Option<f32>,
    studios: BTreeSet<String>,
    year: Option<i32>,
    source: Option<String>,
    episodes: Option<u32>,
    genres: BTreeSet<String>,
    tags: BTreeSet<String>,
}

impl RevealedClues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the matches of one comparison into the revealed set.
    pub fn merge(&mut self, target: &Entity, guess: &Entity, result: &ComparisonResult) {
        if result.score.is_match() {
            if let Some(score) = target.score {
                self.score.get_or_insert(score);
                self.flags |= ClueFlags::SCORE;
            }
        }
        if result.studio_match {
            for studio in guess.studios.iter().filter(|s| target.has_studio(s)) {
                self.studios.insert(studio.clone());
            }
            self.flags |= ClueFlags::STUDIO;
        }
        if result.release.is_match() {
            if let Some(year) = target.release_year() {
                self.year.get_or_insert(year);
                self.flags |= ClueFlags::RELEASE;
            }
        }
        if result.source_match {
            if let Some(source) = target.source() {
                self.source.get_or_insert_with(|| source.to_string());
                self.flags |= ClueFlags::SOURCE;
            }
        }
        if result.episodes.is_match() {
            if let Some(episodes) = target.episode_count() {
                self.episodes.get_or_insert(episodes);
                self.flags |= ClueFlags::EPISODES;
            }
        }
        if !result.genre_overlap.correct.is_empty() {
            self.genres
                .extend(result.genre_overlap.correct.iter().cloned());
            self.flags |= ClueFlags::GENRES;
        }
        if !result.tag_overlap.matched.is_empty() {
            self.tags.extend(result.tag_overlap.matched.iter().cloned());
            self.flags |= ClueFlags::TAGS;
        }
    }

    /// Discloses every attribute present on the target.
    pub fn reveal_all(&mut self, target: &Entity) {
        if let Some(score) = target.score {
            self.score = Some(score);
            self.flags |= ClueFlags::SCORE;
        }
        if !target.studios.is_empty() {
            self.studios.extend(target.studios.iter().cloned());
            self.flags |= ClueFlags::STUDIO;
        }
        if let Some(year) = target.release_year() {
            self.year = Some(year);
            self.flags |= ClueFlags::RELEASE;
        }
        if let Some(source) = target.source() {
            self.source = Some(source.to_string());
            self.flags |= ClueFlags::SOURCE;
        }
        if let Some(episodes) = target.episode_count() {
            self.episodes = Some(episodes);
            self.flags |= ClueFlags::EPISODES;
        }
        if !target.genres.is_empty() {
            self.genres.extend(target.genres.iter().cloned());
            self.flags |= ClueFlags::GENRES;
        }
        if !target.tags.is_empty() {
            self.tags.extend(target.tags.iter().cloned());
            self.flags |= ClueFlags::TAGS;
        }
    }

    pub fn flags(&self) -> ClueFlags {
        self.flags
    }

    pub fn is_revealed(&self, clue: ClueFlags) -> bool {
        self.flags.contains(clue)
    }

    pub fn score(&self) -> Option<f32> {
        self.score
    }

    pub fn studios(&self) -> &BTreeSet<String> {
        &self.studios
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn episodes(&self) -> Option<u32> {
        self.episodes
    }

    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// True when every clue in `self` is also present in `later`.
    pub fn is_subset_of(&self, later: &RevealedClues) -> bool {
        later.flags.contains(self.flags)
            && self.studios.is_subset(&later.studios)
            && self.genres.is_subset(&later.genres)
            && self.tags.is_subset(&later.tags)
            && (self.score.is_none() || self.score == later.score)
            && (self.year.is_none() || self.year == later.year)
            && (self.source.is_none() || self.source == later.source)
            && (self.episodes.is_none() || self.episodes == later.episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn target() -> Entity {
        let mut entity = Entity::new(1, "Fullmetal Alchemist: Brotherhood");
        entity.score = Some(9.1);
        entity.genres = strings(&["Action", "Adventure", "Drama", "Fantasy"]);
        entity.studios = strings(&["Bones"]);
        entity.tags = strings(&["Military", "Alchemy"]);
        entity.source = Some("Manga".to_string());
        entity.year = Some(2009);
        entity.episodes = Some(64);
        entity
    }

    #[test]
    fn identical_genres_are_all_correct() {
        let target = target();
        let mut guess = Entity::new(2, "Same Genres");
        guess.genres = target.genres.clone();
        let result = ComparisonEngine::default().compare(&target, &guess);
        assert_eq!(result.genre_overlap.count(), target.genres.len());
        assert!(result.genre_overlap.wrong.is_empty());
        assert!(!result.is_target);
    }

    #[test]
    fn score_within_tolerance_matches() {
        let target = target();
        let mut guess = Entity::new(2, "Close");
        guess.score = Some(9.0);
        let engine = ComparisonEngine::default();
        assert_eq!(engine.compare(&target, &guess).score, AttributeMatch::Match);

        guess.score = Some(8.5);
        assert_eq!(
            engine.compare(&target, &guess).score,
            AttributeMatch::TargetHigher
        );

        guess.score = Some(9.3);
        assert_eq!(
            engine.compare(&target, &guess).score,
            AttributeMatch::TargetLower
        );

        guess.score = None;
        assert_eq!(engine.compare(&target, &guess).score, AttributeMatch::Unknown);
    }

    #[test]
    fn directional_year_and_episodes() {
        let target = target();
        let mut guess = Entity::new(3, "Later, shorter");
        guess.year = Some(2015);
        guess.episodes = Some(12);
        let result = ComparisonEngine::default().compare(&target, &guess);
        assert_eq!(result.release, AttributeMatch::TargetLower);
        assert_eq!(result.episodes, AttributeMatch::TargetHigher);
    }

    #[test]
    fn studio_and_source_need_both_sides() {
        let target = target();
        let mut guess = Entity::new(4, "Co-production");
        guess.studios = strings(&["Aniplex", "Bones"]);
        let result = ComparisonEngine::default().compare(&target, &guess);
        assert!(result.studio_match);
        assert!(!result.source_match);

        guess.source = Some("Manga".to_string());
        assert!(ComparisonEngine::default().compare(&target, &guess).source_match);
    }

    #[test]
    fn tag_overlap_counts_distinct_matches() {
        let target = target();
        let mut guess = Entity::new(5, "Tags");
        guess.tags = strings(&["Military", "Military", "Mecha"]);
        let result = ComparisonEngine::default().compare(&target, &guess);
        assert_eq!(result.tag_overlap.count(), 1);
        assert_eq!(result.tag_overlap.matched, strings(&["Military"]));
    }

    #[test]
    fn revealed_clues_never_shrink() {
        let target = target();
        let engine = ComparisonEngine::default();
        let mut clues = RevealedClues::new();

        let mut first = Entity::new(6, "First");
        first.genres = strings(&["Action", "Comedy"]);
        first.year = Some(2009);
        let result = engine.compare(&target, &first);
        clues.merge(&target, &first, &result);
        let after_first = clues.clone();
        assert_eq!(clues.year(), Some(2009));
        assert!(clues.genres().contains("Action"));

        let mut second = Entity::new(7, "Second");
        second.genres = strings(&["Romance"]);
        second.year = Some(1999);
        let result = engine.compare(&target, &second);
        clues.merge(&target, &second, &result);

        assert!(after_first.is_subset_of(&clues));
        assert_eq!(clues.year(), Some(2009));
        assert!(clues.is_revealed(ClueFlags::RELEASE | ClueFlags::GENRES));
        assert!(!clues.is_revealed(ClueFlags::SCORE));
    }

    #[test]
    fn reveal_all_discloses_target_attributes() {
        let target = target();
        let mut clues = RevealedClues::new();
        clues.reveal_all(&target);
        assert_eq!(clues.flags(), ClueFlags::all());
        assert_eq!(clues.score(), Some(9.1));
        assert_eq!(clues.source(), Some("Manga"));
        assert_eq!(clues.episodes(), Some(64));
        assert_eq!(clues.genres().len(), 4);
    }

    #[test]
    fn reveal_all_skips_absent_attributes() {
        let mut sparse = Entity::new(8, "Sparse");
        sparse.year = Some(2020);
        let mut clues = RevealedClues::new();
        clues.reveal_all(&sparse);
        assert_eq!(clues.flags(), ClueFlags::RELEASE);
    }
}
