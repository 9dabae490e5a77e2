//! `revolve-hal` – devices bound to the simulated robot model.
//!
//! # Modules
//!
//! - [`model`] – [`SimModel`][model::SimModel]: the trait through which
//!   devices reach the physics host (joints and sensors).
//! - [`motor`] – [`Motor`][motor::Motor]: position and velocity joint
//!   actuators.
//! - [`sensor`] – [`Sensor`][sensor::Sensor]: touch, IMU, light, battery and
//!   point-intensity sensors.
//! - [`factory`] – [`MotorFactory`][factory::MotorFactory] and
//!   [`SensorFactory`][factory::SensorFactory]: build devices from
//!   `rv:servomotor` / `rv:sensor` configuration elements.
//! - [`pid`] – [`PidController`][pid::PidController] used by position motors.
//! - [`sim`] – [`StubModel`][sim::StubModel]: a recording, kinematic host
//!   model for tests and headless runs.

pub mod factory;
pub mod model;
pub mod motor;
pub mod pid;
pub mod sensor;
pub mod sim;

pub use factory::{MotorFactory, SensorFactory};
pub use model::SimModel;
pub use motor::{Motor, MotorDrive, MotorInfo};
pub use pid::{PidController, PidGains};
pub use sensor::{Sensor, SensorInfo, SensorKind};
pub use sim::StubModel;
