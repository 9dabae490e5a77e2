//! `revolve-runtime` – the per-robot controller a simulation host drives.
//!
//! # Modules
//!
//! - [`controller`] – [`RobotController`][controller::RobotController]: loads
//!   devices, brain and battery from the robot configuration, then executes
//!   host ticks and battery requests.
//! - [`scheduler`] – [`ActuationScheduler`][scheduler::ActuationScheduler]:
//!   decides which ticks run the brain, from simulated-time deltas only.
//! - [`battery`] – [`BatteryState`][battery::BatteryState]: the persisted
//!   battery level and the get/set request handler.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: subscriber
//!   setup with optional OTLP span export.

pub mod battery;
pub mod controller;
pub mod scheduler;
pub mod telemetry;

pub use battery::BatteryState;
pub use controller::RobotController;
pub use scheduler::ActuationScheduler;
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
