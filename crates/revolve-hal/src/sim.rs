//! In-process stand-in for the physics host.
//!
//! [`StubModel`] implements [`SimModel`] with a small kinematic joint table
//! and a settable sensor table. It records every joint command, so the full
//! controller stack can run in headless tests and in the `revolve-sim`
//! driver without a physics engine.
//!
//! # Example
//!
//! ```rust
//! use revolve_hal::model::SimModel;
//! use revolve_hal::sim::StubModel;
//!
//! let model = StubModel::builder("spider")
//!     .with_joint("hip", -1.0, 1.0)
//!     .with_sensor("core_imu", vec![0.0; 6])
//!     .build();
//!
//! model.set_joint_velocity("hip", 0.5);
//! model.step(1.0);
//! assert!((model.joint_position("hip") - 0.5).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::model::SimModel;

// ────────────────────────────────────────────────────────────────────────────
// Joint state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct StubJoint {
    lower: f64,
    upper: f64,
    position: f64,
    velocity: f64,
    force: Option<f64>,
    commands: usize,
}

#[derive(Debug, Default)]
struct StubState {
    joints: BTreeMap<String, StubJoint>,
    sensors: BTreeMap<String, Vec<f64>>,
}

// ────────────────────────────────────────────────────────────────────────────
// StubModel
// ────────────────────────────────────────────────────────────────────────────

/// A recording, kinematic [`SimModel`].
///
/// Joints integrate with unit inertia: an applied force changes the joint
/// velocity, the velocity changes the position, and the position is clamped
/// to the joint limits.
#[derive(Debug)]
pub struct StubModel {
    name: String,
    scoped_name: String,
    state: Mutex<StubState>,
}

impl StubModel {
    /// Start building a model called `name`.
    pub fn builder(name: impl Into<String>) -> StubModelBuilder {
        StubModelBuilder {
            name: name.into(),
            scope: None,
            joints: Vec::new(),
            sensors: Vec::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the readings reported for `sensor`, registering it if needed.
    pub fn set_sensor_values(&self, sensor: &str, values: Vec<f64>) {
        self.state().sensors.insert(sensor.to_string(), values);
    }

    /// Teleport `joint` to `position` (clamped to its limits).
    pub fn set_joint_position(&self, joint: &str, position: f64) {
        if let Some(j) = self.state().joints.get_mut(joint) {
            j.position = position.clamp(j.lower, j.upper);
        }
    }

    /// Most recent force applied to `joint`.
    pub fn joint_force(&self, joint: &str) -> Option<f64> {
        self.state().joints.get(joint).and_then(|j| j.force)
    }

    /// Current velocity of `joint`.
    pub fn joint_velocity(&self, joint: &str) -> Option<f64> {
        self.state().joints.get(joint).map(|j| j.velocity)
    }

    /// Number of commands (force or velocity) `joint` has received.
    pub fn command_count(&self, joint: &str) -> usize {
        self.state().joints.get(joint).map_or(0, |j| j.commands)
    }

    /// Advance every joint by `dt` seconds.
    pub fn step(&self, dt: f64) {
        for joint in self.state().joints.values_mut() {
            if let Some(force) = joint.force.take() {
                joint.velocity += force * dt;
            }
            let next = joint.position + joint.velocity * dt;
            joint.position = next.clamp(joint.lower, joint.upper);
            if joint.position != next {
                joint.velocity = 0.0;
            }
        }
    }
}

impl SimModel for StubModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn scoped_name(&self) -> &str {
        &self.scoped_name
    }

    fn joint_limits(&self, joint: &str) -> Option<(f64, f64)> {
        self.state().joints.get(joint).map(|j| (j.lower, j.upper))
    }

    fn joint_position(&self, joint: &str) -> f64 {
        self.state().joints.get(joint).map_or(0.0, |j| j.position)
    }

    fn apply_joint_force(&self, joint: &str, force: f64) {
        if let Some(j) = self.state().joints.get_mut(joint) {
            j.force = Some(force);
            j.commands += 1;
        }
    }

    fn set_joint_velocity(&self, joint: &str, velocity: f64) {
        if let Some(j) = self.state().joints.get_mut(joint) {
            j.velocity = velocity;
            j.commands += 1;
        }
    }

    fn has_sensor(&self, sensor: &str) -> bool {
        self.state().sensors.contains_key(sensor)
    }

    fn read_sensor(&self, sensor: &str, out: &mut [f64]) -> bool {
        match self.state().sensors.get(sensor) {
            Some(values) => {
                for (dst, src) in out.iter_mut().zip(values) {
                    *dst = *src;
                }
                true
            }
            None => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder returned by [`StubModel::builder`].
pub struct StubModelBuilder {
    name: String,
    scope: Option<String>,
    joints: Vec<(String, f64, f64)>,
    sensors: Vec<(String, Vec<f64>)>,
}

impl StubModelBuilder {
    /// World scope prepended to the scoped name (default `"default"`).
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Register a joint with position limits `[lower, upper]`.
    pub fn with_joint(mut self, joint: impl Into<String>, lower: f64, upper: f64) -> Self {
        self.joints.push((joint.into(), lower, upper));
        self
    }

    /// Register a sensor with its initial readings.
    pub fn with_sensor(mut self, sensor: impl Into<String>, values: Vec<f64>) -> Self {
        self.sensors.push((sensor.into(), values));
        self
    }

    pub fn build(self) -> Arc<StubModel> {
        let scope = self.scope.unwrap_or_else(|| "default".to_string());
        let mut state = StubState::default();
        for (joint, lower, upper) in self.joints {
            state.joints.insert(
                joint,
                StubJoint {
                    lower,
                    upper,
                    position: 0.0_f64.clamp(lower, upper),
                    ..StubJoint::default()
                },
            );
        }
        state.sensors.extend(self.sensors);

        Arc::new(StubModel {
            scoped_name: format!("{scope}::{}", self.name),
            name: self.name,
            state: Mutex::new(state),
        })
    }
}
