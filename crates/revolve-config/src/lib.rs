//! `revolve-config` – the robot configuration tree.
//!
//! A robot is described by a hierarchy of named elements, each carrying
//! string attributes, an optional text value, and ordered children. Children
//! may repeat under the same name (`rv:servomotor`, `rv:sensor`, …) and their
//! document order is significant.
//!
//! # Modules
//!
//! - [`element`] – [`ConfigElement`][element::ConfigElement] and its
//!   read-only accessor API: presence tests, required lookups, repeated
//!   sibling iteration, and typed scalar extraction.
//! - [`loader`] – load a tree from a JSON or TOML document.
//!
//! The rest of the workspace never inspects the tree's structure directly; it
//! only consumes resolved child handles through this API.

pub mod element;
pub mod loader;

pub use element::{ConfigElement, Elements};
pub use loader::{from_json_str, from_toml_str, load_from};
