use guess_schema::Entity;
use serde::Serialize;
use thiserror::Error;

/// Progressive disclosure stages, unlocked by attempts used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HintTier {
    #[default]
    None,
    Cover,
    Synopsis,
    Character,
}

impl HintTier {
    const ORDER: [HintTier; 3] = [HintTier::Cover, HintTier::Synopsis, HintTier::Character];

    fn from_unlocked(count: usize) -> Self {
        match count {
            0 => HintTier::None,
            n => HintTier::ORDER[n.min(HintTier::ORDER.len()) - 1],
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkipError {
    #[error("session is over")]
    SessionOver,
    #[error("every hint is already unlocked")]
    NoFurtherHints,
    #[error("skipping costs {cost} attempts but only {remaining} remain")]
    InsufficientAttempts { cost: u32, remaining: u32 },
}

/// Maps attempts used to a disclosure tier and prices skipping ahead.
#[derive(Debug, Clone)]
pub struct HintScheduler {
    thresholds: Vec<u32>,
}

impl Default for HintScheduler {
    fn default() -> Self {
        Self::new(&[10, 15, 20])
    }
}

impl HintScheduler {
    pub fn new(thresholds: &[u32]) -> Self {
        Self {
            thresholds: thresholds
                .iter()
                .copied()
                .take(HintTier::ORDER.len())
                .collect(),
        }
    }

    pub fn tier_for(&self, attempts_used: u32) -> HintTier {
        let unlocked = self
            .thresholds
            .iter()
            .take_while(|threshold| attempts_used >= **threshold)
            .count();
        HintTier::from_unlocked(unlocked)
    }

    pub fn next_threshold(&self, attempts_used: u32) -> Option<u32> {
        self.thresholds
            .iter()
            .copied()
            .find(|threshold| attempts_used < *threshold)
    }

    /// Attempts needed to reach the next tier, or `None` at the final tier.
    pub fn skip_cost(&self, attempts_used: u32) -> Option<u32> {
        self.next_threshold(attempts_used)
            .map(|threshold| threshold - attempts_used)
    }

    /// Validates a skip request and returns its cost without mutating anything.
    pub fn plan_skip(&self, attempts_used: u32, attempts_remaining: u32) -> Result<u32, SkipError> {
        let cost = self
            .skip_cost(attempts_used)
            .ok_or(SkipError::NoFurtherHints)?;
        if cost > attempts_remaining {
            return Err(SkipError::InsufficientAttempts {
                cost,
                remaining: attempts_remaining,
            });
        }
        Ok(cost)
    }
}

/// Hint material unlocked for a target at a given tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HintSet {
    pub cover_image: Option<String>,
    pub synopsis: Option<String>,
    pub character: Option<String>,
}

pub fn hints_for(target: &Entity, tier: HintTier) -> HintSet {
    HintSet {
        cover_image: (tier >= HintTier::Cover)
            .then(|| target.image_url.clone())
            .flatten(),
        synopsis: (tier >= HintTier::Synopsis)
            .then(|| target.synopsis.clone())
            .flatten(),
        character: (tier >= HintTier::Character)
            .then(|| target.representative_character().map(str::to_string))
            .flatten(),
    }
}
