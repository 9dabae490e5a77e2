//! `revolve-middleware` – message plumbing between robots and the outside
//! world.
//!
//! # Modules
//!
//! - [`bus`] – topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels, usable from synchronous host callbacks.
//! - [`channel`] – [`BatteryChannel`][channel::BatteryChannel]: one robot's
//!   battery request subscription and response publisher, owned together.

pub mod bus;
pub mod channel;

pub use bus::{EventBus, Topic, TopicReceiver};
pub use channel::BatteryChannel;
