//! Discrete-time PID with integral anti-windup and gravity feedforward
//! (§4.4 / C4). Grounded in the altitude controller this codebase's
//! `realtime_simulator.py` implements: same clamp-then-multiply anti-windup,
//! same "prev_error defaults to current error on the first call" rule for a
//! clean `d = 0` first tick.

pub const MAX_THRUST: f64 = 1000.0;

#[derive(Debug, Clone, Copy)]
pub struct PidState {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint: f64,
    pub error_sum: f64,
    pub prev_error: Option<f64>,
    pub integral_limit: f64,
}

impl PidState {
    pub fn new(kp: f64, ki: f64, kd: f64, setpoint: f64, integral_limit: f64) -> Self {
        Self { kp, ki, kd, setpoint, error_sum: 0.0, prev_error: None, integral_limit }
    }

    pub fn reset(&mut self) {
        self.error_sum = 0.0;
        self.prev_error = None;
    }

    /// One PID step; returns the raw control output (before gravity
    /// feedforward and saturation).
    pub fn step(&mut self, measured_altitude: f64, dt: f64) -> f64 {
        let e = self.setpoint - measured_altitude;
        let prev_error = self.prev_error.unwrap_or(e);

        let p = self.kp * e;

        self.error_sum = (self.error_sum + e * dt).clamp(-self.integral_limit, self.integral_limit);
        let i = self.ki * self.error_sum;

        let d = if dt > 0.0 { self.kd * (e - prev_error) / dt } else { 0.0 };

        self.prev_error = Some(e);

        p + i + d
    }
}

/// Gravity feedforward plus saturation: `thrust = clamp(output + mass *
/// gravity, 0, MAX_THRUST)`.
pub fn command_thrust(output: f64, mass: f64, gravity: f64) -> f64 {
    (output + mass * gravity).clamp(0.0, MAX_THRUST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_error_yields_zero_output() {
        let mut pid = PidState::new(10.0, 1.0, 1.0, 10.0, 300.0);
        pid.error_sum = 0.0;
        pid.prev_error = Some(0.0);
        let output = pid.step(10.0, 0.01);
        assert_eq!(output, 0.0);
    }

    #[test]
    fn reset_clears_integral_and_derivative_history() {
        let mut pid = PidState::new(10.0, 1.0, 1.0, 10.0, 300.0);
        pid.step(0.0, 0.01);
        pid.step(1.0, 0.01);
        assert!(pid.error_sum != 0.0);
        assert!(pid.prev_error.is_some());

        pid.reset();

        assert_eq!(pid.error_sum, 0.0);
        assert!(pid.prev_error.is_none());
        // Resuming after a reset behaves exactly like a fresh PidState: `d`
        // is zero on the next step, same as the very first call ever.
        let output = pid.step(7.0, 0.01);
        assert_eq!(pid.prev_error, Some(3.0));
        assert_eq!(output, 10.0 * 3.0 + 1.0 * 0.03);
    }

    #[test]
    fn integral_never_exceeds_limit() {
        let mut pid = PidState::new(0.0, 10.0, 0.0, 100.0, 5.0);
        for _ in 0..10_000 {
            pid.step(0.0, 0.01);
            assert!(pid.error_sum.abs() <= 5.0 + 1e-9);
        }
    }

    #[test]
    fn on_target_scenario() {
        // Scenario 2: kp=10, ki=0, kd=0, setpoint=10, mass=1, gravity=9.81.
        let mut pid = PidState::new(10.0, 0.0, 0.0, 10.0, 300.0);
        let output = pid.step(10.0, 0.01);
        let thrust = command_thrust(output, 1.0, 9.81);
        assert!((thrust - 9.81).abs() < 1e-9);
    }

    #[test]
    fn rising_scenario() {
        // Scenario 3: same gains, measured altitude 0.0, first tick.
        let mut pid = PidState::new(10.0, 0.0, 0.0, 10.0, 300.0);
        let output = pid.step(0.0, 0.01);
        assert!((output - 100.0).abs() < 1e-9);
        let thrust = command_thrust(output, 1.0, 9.81);
        assert!((thrust - 109.81).abs() < 1e-9);
    }

    #[test]
    fn first_tick_derivative_is_zero() {
        let mut pid = PidState::new(1.0, 0.0, 5.0, 10.0, 300.0);
        assert!(pid.prev_error.is_none());
        let output = pid.step(3.0, 0.01);
        // d = kd * (e - e) / dt = 0 on the first tick.
        assert_eq!(output, 1.0 * 7.0);
    }

    #[test]
    fn thrust_never_negative_or_over_max() {
        assert_eq!(command_thrust(-1_000_000.0, 1.0, 9.81), 0.0);
        assert_eq!(command_thrust(1_000_000.0, 1.0, 9.81), MAX_THRUST);
    }
}
