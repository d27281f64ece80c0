use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable catalog identifier for an anime record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable anime record supplied by the catalog.
///
/// Every attribute except the identifier and primary title is optional. An
/// absent attribute is never treated as a value: it cannot satisfy a challenge
/// and it never matches in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub alt_title: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub studios: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub aired: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub characters: Vec<String>,
}

impl Entity {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            title: title.into(),
            alt_title: None,
            score: None,
            genres: Vec::new(),
            studios: Vec::new(),
            tags: Vec::new(),
            source: None,
            year: None,
            aired: None,
            episodes: None,
            image_url: None,
            synopsis: None,
            characters: Vec::new(),
        }
    }

    /// Release year, preferring the explicit year over the aired date prefix.
    pub fn release_year(&self) -> Option<i32> {
        if self.year.is_some() {
            return self.year;
        }
        let aired = self.aired.as_deref()?.trim();
        let prefix = aired.get(0..4)?;
        if prefix.bytes().all(|b| b.is_ascii_digit()) {
            prefix.parse().ok()
        } else {
            None
        }
    }

    pub fn primary_studio(&self) -> Option<&str> {
        self.studios.first().map(String::as_str)
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|source| !source.is_empty())
    }

    /// Episode count, with zero treated as unknown.
    pub fn episode_count(&self) -> Option<u32> {
        self.episodes.filter(|count| *count > 0)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    pub fn has_studio(&self, studio: &str) -> bool {
        self.studios.iter().any(|s| s == studio)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn representative_character(&self) -> Option<&str> {
        self.characters.first().map(String::as_str)
    }

    /// Case-insensitive equality against the primary or alternate title.
    pub fn title_matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.title.to_lowercase() == query
            || self
                .alt_title
                .as_deref()
                .is_some_and(|alt| alt.to_lowercase() == query)
    }

    /// Case-insensitive substring match against the primary or alternate title.
    pub fn title_contains(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&query)
            || self
                .alt_title
                .as_deref()
                .is_some_and(|alt| alt.to_lowercase().contains(&query))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.title)
    }
}
