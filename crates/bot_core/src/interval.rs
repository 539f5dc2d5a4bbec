//! Re-arm delay arithmetic.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Random jitter added to every re-arm; never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jitter {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for Jitter {
    fn default() -> Self {
        Self {
            min_secs: 5,
            max_secs: 60,
        }
    }
}

impl Jitter {
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let lo = self.min_secs.max(1);
        let hi = self.max_secs.max(lo);
        Duration::from_secs(rng.gen_range(lo..=hi))
    }
}

/// Bounds of a feature's periodic check, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl CheckWindow {
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let lo = self.min_secs.max(1);
        let hi = self.max_secs.max(lo);
        Duration::from_secs(rng.gen_range(lo..=hi))
    }

    pub fn max(&self) -> Duration {
        Duration::from_secs(self.max_secs.max(self.min_secs).max(1))
    }
}

/// Next delay: the earliest known "nothing happens before" hint, capped by
/// the check window's maximum, plus jitter. Without hints a random value
/// inside the check window is used instead of the cap.
pub fn next_delay(
    hints: impl IntoIterator<Item = Duration>,
    window: &CheckWindow,
    jitter: &Jitter,
    rng: &mut impl Rng,
) -> Duration {
    let base = match hints.into_iter().min() {
        Some(earliest) => earliest.min(window.max()),
        None => window.sample(rng),
    };
    base + jitter.sample(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const WINDOW: CheckWindow = CheckWindow {
        min_secs: 600,
        max_secs: 1200,
    };
    const JITTER: Jitter = Jitter {
        min_secs: 1,
        max_secs: 10,
    };

    #[test]
    fn earliest_hint_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let hints = [Duration::from_secs(300), Duration::from_secs(90)];
        let delay = next_delay(hints, &WINDOW, &JITTER, &mut rng);
        assert!(delay > Duration::from_secs(90));
        assert!(delay <= Duration::from_secs(100));
    }

    #[test]
    fn hints_are_capped_by_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let delay = next_delay([Duration::from_secs(86_400)], &WINDOW, &JITTER, &mut rng);
        assert!(delay <= Duration::from_secs(1210));
    }

    #[test]
    fn zero_hint_still_gets_jitter() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let delay = next_delay([Duration::ZERO], &WINDOW, &JITTER, &mut rng);
        assert!(delay >= Duration::from_secs(1));
    }

    #[test]
    fn no_hints_falls_back_to_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let delay = next_delay(std::iter::empty(), &WINDOW, &JITTER, &mut rng);
            assert!(delay >= Duration::from_secs(601));
            assert!(delay <= Duration::from_secs(1210));
        }
    }
}
