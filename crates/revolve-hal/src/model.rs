//! [`SimModel`] – the simulated robot model owned by the host.
//!
//! The physics host (world stepping, joints, sensors) lives outside this
//! workspace. Devices only ever talk to it through this trait, so any host
//! binding can drive the controller as long as it exposes these queries and
//! commands.

/// Handle onto the host's simulated model.
///
/// Command methods take `&self`: the host owns the physics state and is
/// responsible for its own interior mutability.
pub trait SimModel: Send + Sync {
    /// Short model name, e.g. `"spider"`.
    fn name(&self) -> &str;

    /// Fully scoped model name, e.g. `"default::spider"`.
    fn scoped_name(&self) -> &str;

    /// Lower and upper position limits of `joint`, or `None` when the model
    /// has no such joint.
    fn joint_limits(&self, joint: &str) -> Option<(f64, f64)>;

    /// Current position of `joint` in radians.
    fn joint_position(&self, joint: &str) -> f64;

    /// Apply `force` to `joint` for the next physics step.
    fn apply_joint_force(&self, joint: &str, force: f64);

    /// Command `joint` to move at `velocity` rad/s.
    fn set_joint_velocity(&self, joint: &str, velocity: f64);

    /// `true` when the host has a sensor called `sensor`.
    fn has_sensor(&self, sensor: &str) -> bool;

    /// Copy the latest readings of `sensor` into `out`.
    ///
    /// Returns `false` when the sensor is unknown; `out` is left untouched.
    fn read_sensor(&self, sensor: &str, out: &mut [f64]) -> bool;
}
