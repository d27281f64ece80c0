use crate::config::ScoringConfig;

/// Pure score formulas for both modes.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    config: ScoringConfig,
}

impl ScoreCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn chain(&self, rounds_completed: u32) -> u32 {
        rounds_completed
    }

    /// `max(0, base - attempts_used * attempt_penalty - floor(elapsed / bucket) * time_penalty)`
    /// for a won session, zero otherwise.
    pub fn comparison(&self, won: bool, attempts_used: u32, elapsed_secs: u64) -> u32 {
        if !won {
            return 0;
        }
        let buckets = elapsed_secs / self.config.time_bucket_secs.max(1);
        let penalty = (u64::from(attempts_used) * u64::from(self.config.attempt_penalty))
            .saturating_add(buckets.saturating_mul(u64::from(self.config.time_penalty)));
        u64::from(self.config.base).saturating_sub(penalty) as u32
    }
}
