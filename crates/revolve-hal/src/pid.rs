//! PID (Proportional–Integral–Derivative) controller used by position motors.
//!
//! The caller supplies the measurement and elapsed time and receives a
//! corrective command it can apply as a joint force.
//!
//! # Example
//!
//! ```rust
//! use revolve_hal::pid::PidController;
//!
//! let mut pid = PidController::new(1.0, 0.1, 0.05);
//! pid.set_set_point(0.5);
//!
//! let output = pid.update(0.0, 0.01);
//! assert!(output > 0.0);
//! ```

use revolve_config::ConfigElement;
use revolve_types::RevolveError;

/// Gains and clamps for a [`PidController`], as read from an `rv:pid`
/// element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub i_max: f64,
    pub i_min: f64,
    pub cmd_max: f64,
    pub cmd_min: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            p: 1.0,
            i: 0.0,
            d: 0.0,
            i_max: 0.0,
            i_min: 0.0,
            cmd_max: f64::INFINITY,
            cmd_min: f64::NEG_INFINITY,
        }
    }
}

impl PidGains {
    /// Read gains from an `rv:pid` element. Missing attributes keep their
    /// defaults; malformed ones are errors.
    pub fn from_config(pid: &ConfigElement) -> Result<Self, RevolveError> {
        let d = Self::default();
        Ok(Self {
            p: pid.attribute_or("p", d.p)?,
            i: pid.attribute_or("i", d.i)?,
            d: pid.attribute_or("d", d.d)?,
            i_max: pid.attribute_or("i_max", d.i_max)?,
            i_min: pid.attribute_or("i_min", d.i_min)?,
            cmd_max: pid.attribute_or("cmd_max", d.cmd_max)?,
            cmd_min: pid.attribute_or("cmd_min", d.cmd_min)?,
        })
    }
}

/// A PID controller for closed-loop joint control.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    set_point: f64,
    integral: f64,
    last_error: Option<f64>,
}

impl PidController {
    /// Create a controller with the given gains and no clamping.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_gains(PidGains {
            p: kp,
            i: ki,
            d: kd,
            ..PidGains::default()
        })
    }

    pub fn with_gains(gains: PidGains) -> Self {
        Self {
            gains,
            set_point: 0.0,
            integral: 0.0,
            last_error: None,
        }
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn set_set_point(&mut self, set_point: f64) {
        self.set_point = set_point;
    }

    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    /// Compute the next command.
    ///
    /// The integral term is clamped to `[i_min, i_max]` and the command to
    /// `[cmd_min, cmd_max]`, each only when its range is well formed. A
    /// non-positive `dt` returns 0.0 and leaves the state untouched.
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }

        let error = self.set_point - measurement;

        self.integral += error * dt;
        if self.gains.i_max > self.gains.i_min {
            self.integral = self.integral.clamp(self.gains.i_min, self.gains.i_max);
        }

        let derivative = match self.last_error {
            Some(prev) => (error - prev) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        let output =
            self.gains.p * error + self.gains.i * self.integral + self.gains.d * derivative;
        if self.gains.cmd_min <= self.gains.cmd_max {
            output.clamp(self.gains.cmd_min, self.gains.cmd_max)
        } else {
            output
        }
    }

    /// Clear the accumulated integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
    }
}
