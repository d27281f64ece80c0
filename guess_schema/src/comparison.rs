use serde::{Deserialize, Serialize};

/// Outcome of comparing one ordered attribute of a guess against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMatch {
    Match,
    /// The target's value is greater than the guess's value.
    TargetHigher,
    /// The target's value is smaller than the guess's value.
    TargetLower,
    /// One side lacks the attribute.
    #[default]
    Unknown,
}

impl AttributeMatch {
    pub fn is_match(&self) -> bool {
        matches!(self, AttributeMatch::Match)
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            AttributeMatch::Match => "=",
            AttributeMatch::TargetHigher => "↑",
            AttributeMatch::TargetLower => "↓",
            AttributeMatch::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenreOverlap {
    pub correct: Vec<String>,
    pub wrong: Vec<String>,
}

impl GenreOverlap {
    pub fn count(&self) -> usize {
        self.correct.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TagOverlap {
    pub matched: Vec<String>,
}

impl TagOverlap {
    pub fn count(&self) -> usize {
        self.matched.len()
    }
}

/// Multi-attribute diff between a guess and the hidden target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComparisonResult {
    pub is_target: bool,
    pub score: AttributeMatch,
    pub studio_match: bool,
    pub release: AttributeMatch,
    pub source_match: bool,
    pub episodes: AttributeMatch,
    pub genre_overlap: GenreOverlap,
    pub tag_overlap: TagOverlap,
}
