use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Outcome source for routed deliveries over simulated channels
pub struct DeliverySimulator {
    delay: Duration,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl DeliverySimulator {
    /// `success_rate` is clamped to `[0, 1]`; a seed makes draws reproducible
    pub fn new(delay: Duration, success_rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };

        Self {
            delay,
            success_rate,
            rng: Mutex::new(rng),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Draw one outcome; `true` means delivered
    pub fn draw(&self) -> bool {
        self.rng.lock().gen_bool(self.success_rate)
    }
}

impl Default for DeliverySimulator {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 0.9, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_success_rate() {
        let sim = DeliverySimulator::new(Duration::ZERO, 0.9, Some(42));
        let trials = 10_000;
        let delivered = (0..trials).filter(|_| sim.draw()).count();
        let rate = delivered as f64 / trials as f64;

        assert!((rate - 0.9).abs() <= 0.02, "observed rate {rate}");
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = DeliverySimulator::new(Duration::ZERO, 0.5, Some(7));
        let b = DeliverySimulator::new(Duration::ZERO, 0.5, Some(7));

        let draws_a: Vec<bool> = (0..64).map(|_| a.draw()).collect();
        let draws_b: Vec<bool> = (0..64).map(|_| b.draw()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_rate_clamped() {
        let always = DeliverySimulator::new(Duration::ZERO, 1.5, None);
        assert_eq!(always.success_rate(), 1.0);
        assert!((0..100).all(|_| always.draw()));

        let never = DeliverySimulator::new(Duration::ZERO, -1.0, None);
        assert!((0..100).all(|_| !never.draw()));
    }
}
