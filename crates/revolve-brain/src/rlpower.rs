//! RLPower spline brain (`rlpower` + `spline`).
//!
//! The policy is a cyclic spline per motor: `init_spline_size` control
//! points, linearly interpolated to `interpolation_spline_size` samples and
//! traversed once every `evaluation_rate` seconds. Each full traversal closes
//! one evaluation window. Policy improvement between windows is left to an
//! external learner; this brain only plays back the current policy.
//!
//! Parameters are attributes of `rv:learner`:
//!
//! | attribute | default |
//! |---|---|
//! | `init_spline_size` | 3 |
//! | `interpolation_spline_size` | 100 |
//! | `evaluation_rate` | 30.0 |
//! | `seed` | 0 |

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use revolve_config::ConfigElement;
use revolve_hal::{Motor, Sensor};
use revolve_types::RevolveError;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RlPowerParams {
    pub init_spline_size: usize,
    pub interpolation_spline_size: usize,
    pub evaluation_rate: f64,
    pub seed: u64,
}

impl Default for RlPowerParams {
    fn default() -> Self {
        Self {
            init_spline_size: 3,
            interpolation_spline_size: 100,
            evaluation_rate: 30.0,
            seed: 0,
        }
    }
}

impl RlPowerParams {
    /// Read overrides from `rv:learner`.
    pub fn from_config(learner: &ConfigElement) -> Result<Self, RevolveError> {
        let d = Self::default();
        let params = Self {
            init_spline_size: learner.attribute_or("init_spline_size", d.init_spline_size)?,
            interpolation_spline_size: learner
                .attribute_or("interpolation_spline_size", d.interpolation_spline_size)?,
            evaluation_rate: learner.attribute_or("evaluation_rate", d.evaluation_rate)?,
            seed: learner.attribute_or("seed", d.seed)?,
        };
        if params.init_spline_size == 0 || params.interpolation_spline_size == 0 {
            return Err(RevolveError::Brain("spline sizes must be positive".to_string()));
        }
        if params.evaluation_rate <= 0.0 {
            return Err(RevolveError::Brain(format!(
                "evaluation_rate must be positive, got {}",
                params.evaluation_rate
            )));
        }
        Ok(params)
    }
}

#[derive(Debug, Clone)]
pub struct RlPower {
    params: RlPowerParams,
    /// One row of control points per motor.
    policy: Vec<Vec<f64>>,
    /// One row of interpolated samples per motor.
    cache: Vec<Vec<f64>>,
    window_start: f64,
    evaluations: usize,
}

impl RlPower {
    /// Sample an initial policy for `n_motors` motors.
    pub fn new(params: RlPowerParams, n_motors: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(params.seed);
        let policy: Vec<Vec<f64>> = (0..n_motors)
            .map(|_| (0..params.init_spline_size).map(|_| rng.gen_range(0.0..1.0)).collect())
            .collect();
        let cache = interpolate_cyclic(&policy, params.interpolation_spline_size);
        Self {
            params,
            policy,
            cache,
            window_start: 0.0,
            evaluations: 0,
        }
    }

    pub fn params(&self) -> &RlPowerParams {
        &self.params
    }

    pub fn policy(&self) -> &[Vec<f64>] {
        &self.policy
    }

    /// Replace the control points, e.g. with a learner's next candidate.
    ///
    /// # Errors
    ///
    /// [`RevolveError::Brain`] if the shape differs from the current policy.
    pub fn set_policy(&mut self, policy: Vec<Vec<f64>>) -> Result<(), RevolveError> {
        let same_shape = policy.len() == self.policy.len()
            && policy.iter().all(|row| row.len() == self.params.init_spline_size);
        if !same_shape {
            return Err(RevolveError::Brain("policy shape does not match motors".to_string()));
        }
        self.cache = interpolate_cyclic(&policy, self.params.interpolation_spline_size);
        self.policy = policy;
        Ok(())
    }

    /// Number of completed evaluation windows.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Interpolated output of `motor` at controller time `time`.
    pub fn sample(&self, motor: usize, time: f64) -> f64 {
        let Some(row) = self.cache.get(motor) else {
            return 0.0;
        };
        let period = self.params.evaluation_rate;
        let phase = time.rem_euclid(period) / period;
        let idx = ((phase * row.len() as f64) as usize).min(row.len() - 1);
        row[idx]
    }

    pub fn update(&mut self, motors: &mut [Motor], _sensors: &[Sensor], time: f64, step: f64) {
        if time - self.window_start >= self.params.evaluation_rate {
            self.evaluations += 1;
            self.window_start = time;
            debug!(evaluation = self.evaluations, time, "rlpower evaluation window closed");
        }
        for (i, motor) in motors.iter_mut().enumerate() {
            motor.update(self.sample(i, time), step);
        }
    }
}

/// Resample every row to `size` points, treating the row as a closed loop.
fn interpolate_cyclic(policy: &[Vec<f64>], size: usize) -> Vec<Vec<f64>> {
    policy
        .iter()
        .map(|points| {
            let k = points.len();
            (0..size)
                .map(|j| {
                    let x = j as f64 * k as f64 / size as f64;
                    let i0 = (x.floor() as usize) % k;
                    let i1 = (i0 + 1) % k;
                    let frac = x - x.floor();
                    points[i0] * (1.0 - frac) + points[i1] * frac
                })
                .collect()
        })
        .collect()
}
