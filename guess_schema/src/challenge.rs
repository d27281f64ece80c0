use serde::{Deserialize, Serialize};

/// Discriminant of a chain-mode challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    HigherScore,
    LowerScore,
    ScoreRange,
    HasGenre,
    NoSharedGenres,
    SharedGenres,
    SameStudio,
    DifferentStudio,
    HasTag,
    SameSource,
    DifferentSource,
    SameYear,
    BeforeYear,
    AfterYear,
    YearRange,
    MoreEpisodes,
    FewerEpisodes,
    Anything,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 18] = [
        ChallengeKind::HigherScore,
        ChallengeKind::LowerScore,
        ChallengeKind::ScoreRange,
        ChallengeKind::HasGenre,
        ChallengeKind::NoSharedGenres,
        ChallengeKind::SharedGenres,
        ChallengeKind::SameStudio,
        ChallengeKind::DifferentStudio,
        ChallengeKind::HasTag,
        ChallengeKind::SameSource,
        ChallengeKind::DifferentSource,
        ChallengeKind::SameYear,
        ChallengeKind::BeforeYear,
        ChallengeKind::AfterYear,
        ChallengeKind::YearRange,
        ChallengeKind::MoreEpisodes,
        ChallengeKind::FewerEpisodes,
        ChallengeKind::Anything,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::HigherScore => "higher_score",
            ChallengeKind::LowerScore => "lower_score",
            ChallengeKind::ScoreRange => "score_range",
            ChallengeKind::HasGenre => "has_genre",
            ChallengeKind::NoSharedGenres => "no_shared_genres",
            ChallengeKind::SharedGenres => "shared_genres",
            ChallengeKind::SameStudio => "same_studio",
            ChallengeKind::DifferentStudio => "different_studio",
            ChallengeKind::HasTag => "has_tag",
            ChallengeKind::SameSource => "same_source",
            ChallengeKind::DifferentSource => "different_source",
            ChallengeKind::SameYear => "same_year",
            ChallengeKind::BeforeYear => "before_year",
            ChallengeKind::AfterYear => "after_year",
            ChallengeKind::YearRange => "year_range",
            ChallengeKind::MoreEpisodes => "more_episodes",
            ChallengeKind::FewerEpisodes => "fewer_episodes",
            ChallengeKind::Anything => "anything",
        }
    }
}

/// A challenge in its durable form: the kind plus the parameters captured
/// from the reference entity when the challenge was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeRule {
    HigherScore { score: f32 },
    LowerScore { score: f32 },
    ScoreRange { min: f32, max: f32 },
    HasGenre { genre: String },
    NoSharedGenres { genres: Vec<String> },
    SharedGenres { genres: Vec<String>, minimum: usize },
    SameStudio { studio: String },
    DifferentStudio { studio: String },
    HasTag { tag: String },
    SameSource { source: String },
    DifferentSource { source: String },
    SameYear { year: i32 },
    BeforeYear { year: i32 },
    AfterYear { year: i32 },
    YearRange { min: i32, max: i32 },
    MoreEpisodes { episodes: u32 },
    FewerEpisodes { episodes: u32 },
    Anything,
}

impl ChallengeRule {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            ChallengeRule::HigherScore { .. } => ChallengeKind::HigherScore,
            ChallengeRule::LowerScore { .. } => ChallengeKind::LowerScore,
            ChallengeRule::ScoreRange { .. } => ChallengeKind::ScoreRange,
            ChallengeRule::HasGenre { .. } => ChallengeKind::HasGenre,
            ChallengeRule::NoSharedGenres { .. } => ChallengeKind::NoSharedGenres,
            ChallengeRule::SharedGenres { .. } => ChallengeKind::SharedGenres,
            ChallengeRule::SameStudio { .. } => ChallengeKind::SameStudio,
            ChallengeRule::DifferentStudio { .. } => ChallengeKind::DifferentStudio,
            ChallengeRule::HasTag { .. } => ChallengeKind::HasTag,
            ChallengeRule::SameSource { .. } => ChallengeKind::SameSource,
            ChallengeRule::DifferentSource { .. } => ChallengeKind::DifferentSource,
            ChallengeRule::SameYear { .. } => ChallengeKind::SameYear,
            ChallengeRule::BeforeYear { .. } => ChallengeKind::BeforeYear,
            ChallengeRule::AfterYear { .. } => ChallengeKind::AfterYear,
            ChallengeRule::YearRange { .. } => ChallengeKind::YearRange,
            ChallengeRule::MoreEpisodes { .. } => ChallengeKind::MoreEpisodes,
            ChallengeRule::FewerEpisodes { .. } => ChallengeKind::FewerEpisodes,
            ChallengeRule::Anything => ChallengeKind::Anything,
        }
    }

    /// Player-facing prompt for the challenge.
    pub fn display_text(&self) -> String {
        match self {
            ChallengeRule::HigherScore { score } => {
                format!("Name an anime with a score higher than {score:.2}")
            }
            ChallengeRule::LowerScore { score } => {
                format!("Name an anime with a score lower than {score:.2}")
            }
            ChallengeRule::ScoreRange { min, max } => {
                format!("Name an anime with a score between {min:.2} and {max:.2}")
            }
            ChallengeRule::HasGenre { genre } => {
                format!("Name an anime with the genre {genre}")
            }
            ChallengeRule::NoSharedGenres { genres } => format!(
                "Name an anime that shares none of these genres: {}",
                genres.join(", ")
            ),
            ChallengeRule::SharedGenres { genres, minimum } => format!(
                "Name an anime that shares at least {minimum} of these genres: {}",
                genres.join(", ")
            ),
            ChallengeRule::SameStudio { studio } => {
                format!("Name an anime made by {studio}")
            }
            ChallengeRule::DifferentStudio { studio } => {
                format!("Name an anime not made by {studio}")
            }
            ChallengeRule::HasTag { tag } => format!("Name an anime with the tag {tag}"),
            ChallengeRule::SameSource { source } => {
                format!("Name an anime with the source {source}")
            }
            ChallengeRule::DifferentSource { source } => {
                format!("Name an anime whose source is not {source}")
            }
            ChallengeRule::SameYear { year } => format!("Name an anime released in {year}"),
            ChallengeRule::BeforeYear { year } => {
                format!("Name an anime released before {year}")
            }
            ChallengeRule::AfterYear { year } => format!("Name an anime released after {year}"),
            ChallengeRule::YearRange { min, max } => {
                format!("Name an anime released between {min} and {max}")
            }
            ChallengeRule::MoreEpisodes { episodes } => {
                format!("Name an anime with more than {episodes} episodes")
            }
            ChallengeRule::FewerEpisodes { episodes } => {
                format!("Name an anime with fewer than {episodes} episodes")
            }
            ChallengeRule::Anything => "Name any anime".to_string(),
        }
    }
}
