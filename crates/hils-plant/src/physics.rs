//! 1-DOF point-mass physics model (§4.5 / C5).
//!
//! Forward-Euler integration, deterministic given a fixed `dt`; sensor noise
//! is added only on read, the way `uwb_physics.rs`'s DS-TWR noise is added on
//! top of a true geometric range without feeding back into the scene state.

use rand::Rng;
use rand_distr::{Distribution, Normal};

const SIGMA_POS: f64 = 5e-3;
const SIGMA_VEL: f64 = 5e-3;
const SIGMA_ACC: f64 = 1e-2;

#[derive(Debug, Clone, Copy)]
pub struct PhysicsState {
    pub mass: f64,
    pub gravity: f64,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

/// Noisy reading of the plant state, as handed back over the wire.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl PhysicsState {
    pub fn new(mass: f64, gravity: f64, initial_position: f64, initial_velocity: f64) -> Self {
        Self { mass, gravity, position: initial_position, velocity: initial_velocity, acceleration: 0.0 }
    }

    /// Reset position/velocity/acceleration to the configured initial
    /// conditions, keeping mass and gravity. Used by `reset_on_seq_zero`.
    pub fn reset(&mut self, initial_position: f64, initial_velocity: f64) {
        self.position = initial_position;
        self.velocity = initial_velocity;
        self.acceleration = 0.0;
    }

    /// Advance one tick under the given vertical thrust.
    pub fn step(&mut self, thrust: f64, dt: f64) {
        self.acceleration = (thrust - self.mass * self.gravity) / self.mass;
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Read the current state with additive Gaussian sensor noise. The noise
    /// is applied to the reading only; `self` is not mutated.
    pub fn sample(&self, rng: &mut impl Rng) -> Sample {
        let pos_noise = Normal::new(0.0, SIGMA_POS).unwrap();
        let vel_noise = Normal::new(0.0, SIGMA_VEL).unwrap();
        let acc_noise = Normal::new(0.0, SIGMA_ACC).unwrap();
        Sample {
            position: self.position + pos_noise.sample(rng),
            velocity: self.velocity + vel_noise.sample(rng),
            acceleration: self.acceleration + acc_noise.sample(rng),
        }
    }
}
