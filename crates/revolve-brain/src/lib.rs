//! `revolve-brain` – control policies that turn sensor readings into motor
//! commands.
//!
//! # Modules
//!
//! - [`selector`] – the `(learner, controller)` dispatch table.
//! - [`factory`] – [`create_brain`][factory::create_brain]: build the brain
//!   an `rv:brain` element selects.
//! - [`brain`] – [`Brain`][brain::Brain], the closed set of policies.
//! - [`neural_network`] – fixed neural network (`offline` + `ann`).
//! - [`rlpower`] – cyclic spline policy (`rlpower` + `spline`).
//! - [`cpg`] – differential CPGs, fixed (`offline` + `cpg`) and sampled
//!   (`bo` + `cpg`).

pub mod brain;
pub mod cpg;
pub mod factory;
pub mod neural_network;
pub mod rlpower;
pub mod selector;

pub use brain::Brain;
pub use cpg::{BayesianCpg, BoSchedule, CpgParams, DifferentialCpg, SPIDER_FORWARD_WEIGHTS};
pub use factory::create_brain;
pub use neural_network::NeuralNetwork;
pub use rlpower::{RlPower, RlPowerParams};
pub use selector::{BrainKind, BrainSelection, DISPATCH_TABLE, select};
