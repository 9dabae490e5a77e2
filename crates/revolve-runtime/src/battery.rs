//! [`BatteryState`] – the persisted battery level and its remote service.
//!
//! The level lives in the `rv:battery/rv:level` element of the robot
//! configuration. The controller keeps its own copy of the `rv:battery`
//! subtree behind a mutex; when the robot has no battery (or no level),
//! reads return 0.0 and writes are dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use revolve_config::ConfigElement;
use revolve_types::{
    BatteryRequest, BatteryResponse, RevolveError, SET_BATTERY_LEVEL, SUCCESS_RESPONSE,
};
use tracing::{debug, warn};

const LEVEL: &str = "rv:level";

#[derive(Debug, Default)]
pub struct BatteryState {
    battery: Mutex<Option<ConfigElement>>,
}

impl BatteryState {
    /// Take a copy of `rv:battery` from `robot_config`, if present.
    ///
    /// # Errors
    ///
    /// [`RevolveError::TypeMismatch`] when `rv:level` is not a number.
    pub fn from_robot_config(robot_config: &ConfigElement) -> Result<Self, RevolveError> {
        let battery = robot_config.find("rv:battery").cloned();
        if let Some(level) = battery.as_ref().and_then(|b| b.find(LEVEL)) {
            level.get::<f64>()?;
        }
        Ok(Self::new(battery))
    }

    pub fn new(battery: Option<ConfigElement>) -> Self {
        Self {
            battery: Mutex::new(battery),
        }
    }

    fn battery(&self) -> MutexGuard<'_, Option<ConfigElement>> {
        self.battery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a level element exists to read from and write to.
    pub fn is_present(&self) -> bool {
        self.battery().as_ref().is_some_and(|b| b.has_element(LEVEL))
    }

    /// Current level, or 0.0 without a battery or an unreadable level.
    pub fn get(&self) -> f64 {
        let battery = self.battery();
        let Some(level) = battery.as_ref().and_then(|b| b.find(LEVEL)) else {
            return 0.0;
        };
        level.get::<f64>().unwrap_or_else(|e| {
            warn!(error = %e, "battery level unreadable; reporting 0");
            0.0
        })
    }

    /// Store `level`; a no-op without a battery level element.
    pub fn set(&self, level: f64) {
        if let Some(node) = self.battery().as_mut().and_then(|b| b.find_mut(LEVEL)) {
            node.set(level);
        }
    }

    /// Answer a remote request addressed to `name` or `scoped_name`.
    ///
    /// Requests for other robots get no response.
    pub fn handle_request(
        &self,
        request: &BatteryRequest,
        name: &str,
        scoped_name: &str,
    ) -> Option<BatteryResponse> {
        if request.data != name && request.data != scoped_name {
            return None;
        }

        let response = if request.request == SET_BATTERY_LEVEL {
            self.set(request.dbl_data.unwrap_or(0.0));
            SUCCESS_RESPONSE.to_string()
        } else {
            self.get().to_string()
        };
        debug!(id = request.id, request = %request.request, response = %response, "battery request served");

        Some(BatteryResponse {
            id: request.id,
            request: request.request.clone(),
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(level: f64) -> BatteryState {
        BatteryState::new(Some(
            ConfigElement::new("rv:battery").with_child(ConfigElement::new(LEVEL).with_value(level)),
        ))
    }

    #[test]
    fn get_and_set_with_level() {
        let battery = with_level(0.5);
        assert!(battery.is_present());
        assert_eq!(battery.get(), 0.5);
        battery.set(42.0);
        assert_eq!(battery.get(), 42.0);
    }

    #[test]
    fn missing_battery_reads_zero_and_ignores_writes() {
        let battery = BatteryState::new(None);
        assert!(!battery.is_present());
        battery.set(3.0);
        assert_eq!(battery.get(), 0.0);

        let no_level = BatteryState::new(Some(ConfigElement::new("rv:battery")));
        no_level.set(3.0);
        assert_eq!(no_level.get(), 0.0);
    }

    #[test]
    fn from_robot_config_copies_subtree() {
        let config = ConfigElement::new("rv:robot_config").with_child(
            ConfigElement::new("rv:battery").with_child(ConfigElement::new(LEVEL).with_value(7.5)),
        );
        assert_eq!(BatteryState::from_robot_config(&config).unwrap().get(), 7.5);
        let empty = BatteryState::from_robot_config(&ConfigElement::new("rv:robot_config")).unwrap();
        assert!(!empty.is_present());
    }

    #[test]
    fn unparsable_level_fails_to_load() {
        let config = ConfigElement::new("rv:robot_config").with_child(
            ConfigElement::new("rv:battery").with_child(ConfigElement::new(LEVEL).with_value("full")),
        );
        assert!(matches!(
            BatteryState::from_robot_config(&config),
            Err(RevolveError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unreadable_level_reads_zero() {
        let battery = BatteryState::new(Some(
            ConfigElement::new("rv:battery").with_child(ConfigElement::new(LEVEL).with_value("full")),
        ));
        assert_eq!(battery.get(), 0.0);
    }

    #[test]
    fn set_request_then_query() {
        let battery = with_level(1.0);
        let set = battery
            .handle_request(&BatteryRequest::set_level(1, "spider", 42.0), "spider", "default::spider")
            .unwrap();
        assert_eq!(set.id, 1);
        assert_eq!(set.request, SET_BATTERY_LEVEL);
        assert_eq!(set.response, SUCCESS_RESPONSE);

        let get = battery
            .handle_request(&BatteryRequest::query(2, "default::spider"), "spider", "default::spider")
            .unwrap();
        assert_eq!(get.id, 2);
        assert_eq!(get.response, "42");
    }

    #[test]
    fn set_without_value_stores_zero() {
        let battery = with_level(5.0);
        let mut request = BatteryRequest::set_level(3, "spider", 1.0);
        request.dbl_data = None;
        battery.handle_request(&request, "spider", "default::spider");
        assert_eq!(battery.get(), 0.0);
    }

    #[test]
    fn misaddressed_request_is_ignored() {
        let battery = with_level(5.0);
        let request = BatteryRequest::set_level(4, "gecko", 9.0);
        assert!(battery.handle_request(&request, "spider", "default::spider").is_none());
        assert_eq!(battery.get(), 5.0);
    }

    #[test]
    fn unknown_opcode_answers_with_level() {
        let battery = with_level(0.25);
        let mut request = BatteryRequest::query(6, "spider");
        request.request = "status".to_string();
        let response = battery.handle_request(&request, "spider", "default::spider").unwrap();
        assert_eq!(response.response, "0.25");
        assert_eq!(response.request, "status");
    }
}
