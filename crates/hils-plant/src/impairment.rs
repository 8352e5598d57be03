//! Network-impairment layer (§4.6 / C6): configurable delay + jitter applied
//! to every reply, mirroring the noise-injection style of `uwb_physics.rs`
//! (draw from a `rand_distr` distribution per call, no persistent noise
//! state) rather than a stateful shaping queue.

use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Uniform};

use crate::config::JitterKind;

const DELAY_HISTORY_LEN: usize = 1000;

#[derive(Debug, Clone)]
pub struct ImpairmentConfig {
    pub enabled: bool,
    pub base_delay_ms: f64,
    pub network_delay_ms: f64,
    pub jitter_ms: f64,
    pub jitter_kind: JitterKind,
}

pub struct Impairment {
    config: ImpairmentConfig,
    recent_delays_ms: VecDeque<f64>,
}

impl Impairment {
    pub fn new(config: ImpairmentConfig) -> Self {
        Self { config, recent_delays_ms: VecDeque::with_capacity(DELAY_HISTORY_LEN) }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Draw this reply's jitter sample in milliseconds.
    fn sample_jitter(&self, rng: &mut impl Rng) -> f64 {
        let j = self.config.jitter_ms;
        if j <= 0.0 {
            return 0.0;
        }
        match self.config.jitter_kind {
            JitterKind::Uniform => Uniform::new_inclusive(-j, j).sample(rng),
            JitterKind::Gaussian => Normal::new(0.0, j / 3.0).unwrap().sample(rng),
            JitterKind::Exponential => {
                let mean = j / 2.0;
                let sample: f64 = Exp::new(1.0 / mean).unwrap().sample(rng);
                sample.clamp(0.0, j)
            }
        }
    }

    /// Compute and record this reply's total delay, clamped at zero.
    pub fn sample_delay(&mut self, rng: &mut impl Rng) -> Duration {
        let jitter = self.sample_jitter(rng);
        let total_ms = (self.config.base_delay_ms + self.config.network_delay_ms + jitter).max(0.0);

        if self.recent_delays_ms.len() == DELAY_HISTORY_LEN {
            self.recent_delays_ms.pop_front();
        }
        self.recent_delays_ms.push_back(total_ms);

        Duration::from_secs_f64(total_ms / 1000.0)
    }

    /// Last up-to-1000 applied delays, for periodic logging.
    pub fn recent_delays_ms(&self) -> impl Iterator<Item = f64> + '_ {
        self.recent_delays_ms.iter().copied()
    }
}
