use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opcode that asks a robot controller to overwrite its battery level.
pub const SET_BATTERY_LEVEL: &str = "set_battery_level";

/// Conventional opcode for a battery level query. Any opcode other than
/// [`SET_BATTERY_LEVEL`] is answered as a query.
pub const GET_BATTERY_LEVEL: &str = "get_battery_level";

/// Literal response payload for an applied `set_battery_level` request.
pub const SUCCESS_RESPONSE: &str = "success";

/// Inbound request on the battery channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryRequest {
    /// Opaque correlation token, echoed in the response.
    pub id: i64,
    /// Opcode, e.g. `"set_battery_level"`.
    pub request: String,
    /// Addressee: the model's short name or its fully scoped name.
    pub data: String,
    /// Numeric payload for `set_battery_level`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbl_data: Option<f64>,
}

impl BatteryRequest {
    /// Build a level query addressed to `target`.
    pub fn query(id: i64, target: impl Into<String>) -> Self {
        Self {
            id,
            request: GET_BATTERY_LEVEL.to_string(),
            data: target.into(),
            dbl_data: None,
        }
    }

    /// Build a `set_battery_level` request addressed to `target`.
    pub fn set_level(id: i64, target: impl Into<String>, level: f64) -> Self {
        Self {
            id,
            request: SET_BATTERY_LEVEL.to_string(),
            data: target.into(),
            dbl_data: Some(level),
        }
    }
}

/// Outbound response on the battery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryResponse {
    pub id: i64,
    pub request: String,
    /// Either [`SUCCESS_RESPONSE`] or the textual battery level.
    pub response: String,
}

/// Envelope for everything routed over the controller's event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. "revolve-runtime::controller"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Wrap `payload` in a fresh envelope stamped with the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    BatteryRequest(BatteryRequest),
    BatteryResponse(BatteryResponse),
}

/// Error type shared by every revolve crate.
#[derive(Error, Debug)]
pub enum RevolveError {
    #[error("Missing element `{name}` under `{parent}`")]
    MissingElement { parent: String, name: String },

    #[error("Missing attribute `{attribute}` on `{element}`")]
    MissingAttribute { element: String, attribute: String },

    #[error("Type mismatch on `{element}`: cannot read {text:?} as {expected}")]
    TypeMismatch {
        element: String,
        expected: &'static str,
        text: String,
    },

    #[error("Unknown {kind} type `{type_name}`")]
    UnknownDeviceType { kind: &'static str, type_name: String },

    #[error("Model has no {kind} named `{name}`")]
    UnknownModelEntity { kind: &'static str, name: String },

    #[error("Robot brain is not defined (controller `{controller}`, learner `{learner}`)")]
    BrainNotDefined { controller: String, learner: String },

    #[error("Brain construction failed: {0}")]
    Brain(String),

    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}
