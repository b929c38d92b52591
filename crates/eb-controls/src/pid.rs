//! Discrete PID controller with bounded output.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// PID gains and output bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain, applied per run.
    pub ki: f64,
    /// Derivative gain, applied per run.
    pub kd: f64,
    /// Output bounds `(lo, hi)`; the integral is held to the same range.
    pub output_limits: Option<(f64, f64)>,
    /// Negate the error, for loops where more output lowers the measurement.
    pub reversed: bool,
}

impl PidConfig {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_limits: None,
            reversed: false,
        }
    }

    pub fn with_limits(mut self, lo: f64, hi: f64) -> Self {
        self.output_limits = Some((lo, hi));
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        if ![self.kp, self.ki, self.kd].iter().all(|g| g.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "pid gains must be finite",
            });
        }
        if let Some((lo, hi)) = self.output_limits
            && !(lo < hi)
        {
            return Err(ControlError::InvalidArg {
                what: "pid lower limit must be below the upper limit",
            });
        }
        Ok(())
    }

    fn clamp(&self, value: f64) -> f64 {
        match self.output_limits {
            Some((lo, hi)) => value.clamp(lo, hi),
            None => value,
        }
    }
}

/// PID state. Each run returns a new controller instead of mutating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pid {
    pub config: PidConfig,
    pub integral: f64,
    pub previous_error: f64,
}

impl Pid {
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Compute the output for one sample.
    ///
    /// The integral is clamped to the output limits so a long saturation does
    /// not wind it up.
    pub fn run(&self, setpoint: f64, measurement: f64) -> (Pid, f64) {
        let config = &self.config;
        let error = if config.reversed {
            measurement - setpoint
        } else {
            setpoint - measurement
        };

        let integral = config.clamp(self.integral + config.ki * error);
        let output = config.clamp(
            config.kp * error + integral + config.kd * (error - self.previous_error),
        );

        (
            Pid {
                config: self.config,
                integral,
                previous_error: error,
            },
            output,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_error_gives_zero_output() {
        let pid = Pid::new(PidConfig::new(1.0, 1.0, 1.0));
        let (_, out) = pid.run(20.0, 20.0);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn proportional_only() {
        let pid = Pid::new(PidConfig::new(2.0, 0.0, 0.0));
        let (_, out) = pid.run(10.0, 7.0);
        assert_relative_eq!(out, 6.0);
    }

    #[test]
    fn integral_accumulates() {
        let pid = Pid::new(PidConfig::new(0.0, 1.0, 0.0));
        let (pid, first) = pid.run(1.0, 0.0);
        let (_, second) = pid.run(1.0, 0.0);
        assert_relative_eq!(first, 1.0);
        assert_relative_eq!(second, 2.0);
        let (pid, _) = pid.run(1.0, 0.0);
        let (_, third) = pid.run(1.0, 0.0);
        assert_relative_eq!(third, 3.0);
    }

    #[test]
    fn derivative_reacts_to_change() {
        let pid = Pid::new(PidConfig::new(0.0, 0.0, 1.0));
        let (pid, first) = pid.run(2.0, 0.0);
        let (_, second) = pid.run(2.0, 1.0);
        assert_relative_eq!(first, 2.0);
        assert_relative_eq!(second, -1.0);
    }

    #[test]
    fn output_is_bounded() {
        let pid = Pid::new(PidConfig::new(10.0, 0.0, 0.0).with_limits(0.0, 1.0));
        assert_eq!(pid.run(100.0, 0.0).1, 1.0);
        assert_eq!(pid.run(0.0, 100.0).1, 0.0);
    }

    #[test]
    fn integral_does_not_wind_up() {
        let mut pid = Pid::new(PidConfig::new(0.0, 1.0, 0.0).with_limits(0.0, 1.0));
        for _ in 0..5 {
            pid = pid.run(10.0, 0.0).0;
        }
        assert_eq!(pid.integral, 1.0);

        let (pid, out) = pid.run(0.0, 0.5);
        assert_relative_eq!(pid.integral, 0.5);
        assert_relative_eq!(out, 0.5);
    }

    #[test]
    fn reversed_flips_the_error() {
        let pid = Pid::new(PidConfig::new(1.0, 0.0, 0.0).reversed());
        assert_relative_eq!(pid.run(10.0, 12.0).1, 2.0);
    }

    #[test]
    fn validate_rejects_inverted_limits() {
        assert!(PidConfig::new(1.0, 0.0, 0.0).with_limits(1.0, 0.0).validate().is_err());
        assert!(PidConfig::new(1.0, 0.0, 0.0).with_limits(0.0, 1.0).validate().is_ok());
    }
}
