//! Run-indexed exploration schedule

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

/// Per-episode exploit/explore weighting.
///
/// Out of `explore + exploit` parts, `exploit` parts pick the greedy action
/// and `explore` parts pick uniformly among the legal actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationBias {
    pub explore: u32,
    pub exploit: u32,
}

impl ExplorationBias {
    pub const fn new(explore: u32, exploit: u32) -> Self {
        Self { explore, exploit }
    }

    /// Probability of choosing the greedy action
    pub fn exploit_probability(&self) -> f64 {
        let total = self.explore + self.exploit;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.exploit) / f64::from(total)
    }

    /// Flip the biased coin: `true` means exploit
    pub fn should_exploit<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let total = self.explore + self.exploit;
        total > 0 && rng.random_ratio(self.exploit, total)
    }
}

/// Exploitation increases in steps of 50 runs.
///
/// | runs    | explore | exploit |
/// |---------|---------|---------|
/// | 0-49    | 7       | 3       |
/// | 50-99   | 6       | 4       |
/// | 100-149 | 4       | 6       |
/// | 150-249 | 3       | 7       |
/// | 250+    | one of the above, drawn per episode |
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplorationSchedule;

impl ExplorationSchedule {
    pub const BUCKETS: [ExplorationBias; 4] = [
        ExplorationBias::new(7, 3),
        ExplorationBias::new(6, 4),
        ExplorationBias::new(4, 6),
        ExplorationBias::new(3, 7),
    ];

    /// Runs per bucket
    pub const BUCKET_WIDTH: i64 = 50;

    /// Bucket index past which the bias is drawn at random
    pub const RANDOM_AFTER: i64 = 4;

    /// Bias for the episode with run counter `run`.
    ///
    /// Drawn once per episode; every step of that episode reuses it.
    pub fn bias_for_run<R: Rng + ?Sized>(&self, run: i64, rng: &mut R) -> ExplorationBias {
        let bucket = run.max(0) / Self::BUCKET_WIDTH;
        if bucket > Self::RANDOM_AFTER {
            return *Self::BUCKETS
                .choose(rng)
                .unwrap_or(&Self::BUCKETS[Self::BUCKETS.len() - 1]);
        }
        let index = usize::try_from(bucket)
            .unwrap_or(0)
            .min(Self::BUCKETS.len() - 1);
        Self::BUCKETS[index]
    }
}
