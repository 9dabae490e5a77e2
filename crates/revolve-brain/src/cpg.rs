//! Differential central pattern generators.
//!
//! Every motor owns one oscillator made of two neurons, `x` and `y`:
//!
//! ```text
//! dx_i/dt =  w_i * y_i + Σ_j w_ij * x_j
//! dy_i/dt = -w_i * x_i
//! ```
//!
//! Couplings are antisymmetric (`w_ji = -w_ij`) and exist between
//! neighbouring motors: motors whose `coordinates` lie within
//! `connection_range` of each other (Chebyshev distance), or consecutive
//! motors when coordinates are missing. The weight vector lists the `n`
//! intra-oscillator weights first, then one weight per connection in
//! discovery order.
//!
//! The `x` neuron drives the motor after scaling by the signal factors and
//! clamping to `±abs_output_bound`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use revolve_config::ConfigElement;
use revolve_hal::{Motor, Sensor};
use revolve_types::RevolveError;
use tracing::{debug, warn};

/// Weights of the fixed forward gait of the spider morphology.
pub const SPIDER_FORWARD_WEIGHTS: [f64; 18] = [
    0.482167, 0.560357, 0.753772, 0.221536, 0.44513, 0.667353, 0.580933, 0.246228, 0.111797,
    0.110425, 0.667353, 0.519204, 0.11134, 0.667353, 0.70439, 0.000228624, 0.444673, 0.287837,
];

const DEFAULT_CONNECTION_RANGE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CpgParams {
    pub reset_neuron_random: bool,
    pub use_frame_of_reference: bool,
    pub init_neuron_state: f64,
    pub range_ub: f64,
    pub signal_factor_all: f64,
    pub signal_factor_mid: f64,
    pub signal_factor_left_right: f64,
    pub abs_output_bound: f64,
    pub connection_range: f64,
    pub weights: Vec<f64>,
}

impl CpgParams {
    /// The named parameter set used by the `offline` + `cpg` brain.
    pub fn spider_forward() -> Self {
        Self {
            reset_neuron_random: false,
            use_frame_of_reference: false,
            init_neuron_state: 0.707,
            range_ub: 1.0,
            signal_factor_all: 1.0,
            signal_factor_mid: 2.5,
            signal_factor_left_right: 2.5,
            abs_output_bound: 1.0,
            connection_range: DEFAULT_CONNECTION_RANGE,
            weights: SPIDER_FORWARD_WEIGHTS.to_vec(),
        }
    }

    /// Apply the attribute overrides present on `rv:controller`.
    pub fn with_overrides(self, controller: &ConfigElement) -> Result<Self, RevolveError> {
        Ok(Self {
            reset_neuron_random: controller
                .attribute_or("reset_neuron_random", self.reset_neuron_random)?,
            use_frame_of_reference: controller
                .attribute_or("use_frame_of_reference", self.use_frame_of_reference)?,
            init_neuron_state: controller.attribute_or("init_neuron_state", self.init_neuron_state)?,
            range_ub: controller.attribute_or("range_ub", self.range_ub)?,
            signal_factor_all: controller.attribute_or("signal_factor_all", self.signal_factor_all)?,
            signal_factor_mid: controller.attribute_or("signal_factor_mid", self.signal_factor_mid)?,
            signal_factor_left_right: controller
                .attribute_or("signal_factor_left_right", self.signal_factor_left_right)?,
            abs_output_bound: controller.attribute_or("abs_output_bound", self.abs_output_bound)?,
            connection_range: controller.attribute_or("connection_range", self.connection_range)?,
            weights: self.weights,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DifferentialCpg
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DifferentialCpg {
    params: CpgParams,
    connections: Vec<(usize, usize)>,
    intra: Vec<f64>,
    coupling: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    factors: Vec<f64>,
    last_time: Option<f64>,
}

impl DifferentialCpg {
    /// Build the oscillator network for `motors` with `params.weights`.
    ///
    /// A weight vector whose length differs from [`Self::weight_count`] is
    /// accepted: missing weights read as 0 and extra weights are ignored.
    pub fn new(params: CpgParams, motors: &[Motor], seed: u64) -> Self {
        let n = motors.len();
        let connections = topology(motors, params.connection_range);
        let expected = n + connections.len();
        if params.weights.len() != expected {
            warn!(
                expected,
                provided = params.weights.len(),
                "CPG weight count does not match topology"
            );
        }

        let factors = motors
            .iter()
            .map(|m| match m.coordinates() {
                Some((x, _)) if x == 0.0 => params.signal_factor_all * params.signal_factor_mid,
                Some(_) => params.signal_factor_all * params.signal_factor_left_right,
                None => params.signal_factor_all,
            })
            .collect();

        let (x, y) = if params.reset_neuron_random {
            let mut rng = SmallRng::seed_from_u64(seed);
            let s = params.init_neuron_state.abs();
            let mut draw = |_: usize| if s > 0.0 { rng.gen_range(-s..=s) } else { 0.0 };
            ((0..n).map(&mut draw).collect(), (0..n).map(&mut draw).collect())
        } else {
            (vec![params.init_neuron_state; n], vec![params.init_neuron_state; n])
        };

        let mut cpg = Self {
            params,
            connections,
            intra: Vec::new(),
            coupling: Vec::new(),
            x,
            y,
            factors,
            last_time: None,
        };
        cpg.load_weights();
        cpg
    }

    fn load_weights(&mut self) {
        let n = self.x.len();
        let w = |i: usize| self.params.weights.get(i).copied().unwrap_or(0.0);
        self.intra = (0..n).map(w).collect();
        self.coupling = (0..self.connections.len()).map(|k| w(n + k)).collect();
    }

    pub fn params(&self) -> &CpgParams {
        &self.params
    }

    /// Number of weights the topology consumes.
    pub fn weight_count(&self) -> usize {
        self.x.len() + self.connections.len()
    }

    pub fn connections(&self) -> &[(usize, usize)] {
        &self.connections
    }

    /// Install a new weight vector without resetting the neuron states.
    pub fn set_weights(&mut self, weights: Vec<f64>) {
        self.params.weights = weights;
        self.load_weights();
    }

    /// Current `(x, y)` state of oscillator `i`.
    pub fn state(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(i)?, *self.y.get(i)?))
    }

    /// Motor output in `[0, 1]` for oscillator `i`.
    pub fn output(&self, i: usize) -> f64 {
        let bound = self.params.abs_output_bound;
        if bound <= 0.0 {
            return 0.5;
        }
        let raw = (self.factors[i] * self.x[i]).clamp(-bound, bound);
        (raw / bound + 1.0) / 2.0
    }

    /// Advance the oscillators to `time` and drive `motors`.
    ///
    /// The integration step is the time since the previous update, so the
    /// first update only applies the initial state.
    pub fn update(&mut self, motors: &mut [Motor], _sensors: &[Sensor], time: f64, step: f64) {
        let dt = self.last_time.map_or(0.0, |last| (time - last).max(0.0));
        self.last_time = Some(time);
        if dt > 0.0 {
            self.integrate(dt);
        }
        for (i, motor) in motors.iter_mut().enumerate().take(self.x.len()) {
            motor.update(self.output(i), step);
        }
    }

    fn integrate(&mut self, dt: f64) {
        let mut dx: Vec<f64> = self
            .intra
            .iter()
            .zip(&self.y)
            .map(|(w, y)| w * y)
            .collect();
        for (&(a, b), &w) in self.connections.iter().zip(&self.coupling) {
            dx[a] += w * self.x[b];
            dx[b] -= w * self.x[a];
        }
        for i in 0..self.x.len() {
            self.x[i] += dt * dx[i];
            // Semi-implicit: y sees the updated x, which keeps the cycle bounded.
            self.y[i] -= dt * self.intra[i] * self.x[i];
        }
    }
}

fn topology(motors: &[Motor], range: f64) -> Vec<(usize, usize)> {
    let coords: Option<Vec<(f64, f64)>> = motors.iter().map(Motor::coordinates).collect();
    match coords {
        Some(coords) => {
            let mut pairs = Vec::new();
            for a in 0..coords.len() {
                for b in a + 1..coords.len() {
                    let (xa, ya) = coords[a];
                    let (xb, yb) = coords[b];
                    if (xa - xb).abs().max((ya - yb).abs()) <= range {
                        pairs.push((a, b));
                    }
                }
            }
            pairs
        }
        None => (1..motors.len()).map(|i| (i - 1, i)).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BayesianCpg
// ────────────────────────────────────────────────────────────────────────────

/// Sampling schedule of the Bayesian-optimised CPG, read from `rv:learner`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoSchedule {
    pub evaluation_rate: f64,
    pub n_init_samples: usize,
    pub n_learning_iterations: usize,
    pub seed: u64,
}

impl BoSchedule {
    pub fn from_config(learner: &ConfigElement) -> Result<Self, RevolveError> {
        let schedule = Self {
            evaluation_rate: learner.attribute_or("evaluation_rate", 15.0)?,
            n_init_samples: learner.attribute_or("n_init_samples", 20)?,
            n_learning_iterations: learner.attribute_or("n_learning_iterations", 50)?,
            seed: learner.attribute_or("seed", 0)?,
        };
        if schedule.evaluation_rate <= 0.0 {
            return Err(RevolveError::Brain(format!(
                "evaluation_rate must be positive, got {}",
                schedule.evaluation_rate
            )));
        }
        Ok(schedule)
    }
}

/// A [`DifferentialCpg`] whose weights are proposed sample by sample.
///
/// The first `n_init_samples` windows each run a fresh random weight vector
/// drawn from `[0, range_ub]`. Proposals after that come from
/// [`BayesianCpg::propose`]; until one arrives the last sample keeps
/// running.
#[derive(Debug, Clone)]
pub struct BayesianCpg {
    cpg: DifferentialCpg,
    schedule: BoSchedule,
    rng: SmallRng,
    window_start: Option<f64>,
    evaluations: usize,
    samples: Vec<Vec<f64>>,
}

impl BayesianCpg {
    pub fn new(mut params: CpgParams, schedule: BoSchedule, motors: &[Motor]) -> Self {
        let mut rng = SmallRng::seed_from_u64(schedule.seed);
        let count = motors.len() + topology(motors, params.connection_range).len();
        let first = random_weights(&mut rng, count, params.range_ub);
        params.weights = first.clone();
        let cpg = DifferentialCpg::new(params, motors, schedule.seed);
        Self {
            cpg,
            schedule,
            rng,
            window_start: None,
            evaluations: 0,
            samples: vec![first],
        }
    }

    pub fn cpg(&self) -> &DifferentialCpg {
        &self.cpg
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Every weight vector run so far, oldest first.
    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// Whether the sampling budget is spent.
    pub fn finished(&self) -> bool {
        self.evaluations >= self.schedule.n_init_samples + self.schedule.n_learning_iterations
    }

    /// Run `weights` from the next window on.
    pub fn propose(&mut self, weights: Vec<f64>) {
        self.samples.push(weights.clone());
        self.cpg.set_weights(weights);
    }

    pub fn update(&mut self, motors: &mut [Motor], sensors: &[Sensor], time: f64, step: f64) {
        let start = *self.window_start.get_or_insert(time);
        if time - start >= self.schedule.evaluation_rate && !self.finished() {
            self.evaluations += 1;
            self.window_start = Some(time);
            debug!(evaluation = self.evaluations, time, "cpg evaluation window closed");
            if self.evaluations < self.schedule.n_init_samples {
                let next = random_weights(
                    &mut self.rng,
                    self.cpg.weight_count(),
                    self.cpg.params().range_ub,
                );
                self.propose(next);
            }
        }
        self.cpg.update(motors, sensors, time, step);
    }
}

fn random_weights(rng: &mut SmallRng, n: usize, range_ub: f64) -> Vec<f64> {
    if range_ub <= 0.0 {
        return vec![0.0; n];
    }
    (0..n).map(|_| rng.gen_range(0.0..=range_ub)).collect()
}
