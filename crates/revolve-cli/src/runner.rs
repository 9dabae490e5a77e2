//! Headless run loop: a [`StubModel`] stands in for the physics host.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use revolve_config::ConfigElement;
use revolve_hal::{SimModel, StubModel};
use revolve_middleware::{EventBus, Topic};
use revolve_runtime::RobotController;
use revolve_types::{BatteryRequest, Event, EventPayload, RevolveError};
use tracing::{debug, info};

use crate::config::SimSettings;

/// Readings width given to every stub sensor (enough for an IMU).
const SENSOR_CHANNELS: usize = 6;

/// What a run did, for the closing report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub simulated_time: f64,
    pub ticks: u64,
    pub executed_ticks: u64,
    pub brain_updates: u64,
    pub battery_queries: u64,
    pub battery_responses: u64,
    pub last_battery_level: Option<String>,
    pub interrupted: bool,
}

/// Build a stub host model exposing every joint and sensor `plugin` refers
/// to.
pub fn stub_model_for(plugin: &ConfigElement, settings: &SimSettings) -> Arc<StubModel> {
    let limit = settings.joint_limit.abs();
    let mut builder = StubModel::builder(settings.model_name.clone());
    let Some(brain) = plugin.find("rv:robot_config").and_then(|c| c.find("rv:brain")) else {
        return builder.build();
    };
    if let Some(actuators) = brain.find("rv:actuators") {
        for joint in actuators
            .elements("rv:servomotor")
            .filter_map(|m| m.attributes.get("joint"))
        {
            builder = builder.with_joint(joint.clone(), -limit, limit);
        }
    }
    if let Some(sensors) = brain.find("rv:sensors") {
        for sensor in sensors
            .elements("rv:sensor")
            .filter_map(|s| s.attributes.get("sensor"))
        {
            builder = builder.with_sensor(sensor.clone(), vec![0.0; SENSOR_CHANNELS]);
        }
    }
    builder.build()
}

/// Step `model` and `controller` until `settings.duration` or until
/// `shutdown` is raised.
pub fn run(
    settings: &SimSettings,
    model: &Arc<StubModel>,
    controller: &mut RobotController,
    bus: &EventBus,
    shutdown: &AtomicBool,
) -> Result<RunSummary, RevolveError> {
    if settings.step_size <= 0.0 {
        return Err(RevolveError::InvalidSetting {
            name: "step_size",
            reason: format!("must be positive, got {}", settings.step_size),
        });
    }

    let mut responses = bus.subscribe_to(Topic::BatteryResponse);
    let mut summary = RunSummary::default();
    let mut next_query = settings.battery_query_interval;
    let mut time = controller.init_time();
    let end = time + settings.duration;

    while time < end {
        if shutdown.load(Ordering::SeqCst) {
            summary.interrupted = true;
            info!(time, "shutdown requested");
            break;
        }

        model.step(settings.step_size);
        time += settings.step_size;
        summary.ticks += 1;
        if controller.on_tick(time) {
            summary.executed_ticks += 1;
        }

        if settings.battery_query_interval > 0.0 && time >= next_query {
            next_query += settings.battery_query_interval;
            let request = BatteryRequest::query(summary.battery_queries as i64, model.name());
            bus.publish_to(
                Topic::BatteryRequest,
                Event::new("revolve-sim", EventPayload::BatteryRequest(request)),
            )?;
            summary.battery_queries += 1;
        }
        controller.poll_battery_requests()?;

        while let Some(event) = responses.try_recv() {
            if let EventPayload::BatteryResponse(response) = event.payload {
                debug!(id = response.id, level = %response.response, "battery level");
                summary.battery_responses += 1;
                summary.last_battery_level = Some(response.response);
            }
        }
    }

    summary.simulated_time = time - controller.init_time();
    summary.brain_updates = controller.brain_updates();
    Ok(summary)
}

/// Load a controller for `plugin` on a fresh stub model and run it.
pub fn run_plugin(
    plugin: &ConfigElement,
    settings: &SimSettings,
    shutdown: &AtomicBool,
) -> Result<RunSummary, RevolveError> {
    let model = stub_model_for(plugin, settings);
    let bus = EventBus::default();
    let mut controller =
        RobotController::load(Arc::clone(&model) as Arc<dyn SimModel>, plugin, &bus, 0.0)?;
    run(settings, &model, &mut controller, &bus, shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin() -> ConfigElement {
        let servo = |id: &str, joint: &str| {
            ConfigElement::new("rv:servomotor")
                .with_attribute("type", "position")
                .with_attribute("id", id)
                .with_attribute("part_id", id)
                .with_attribute("joint", joint)
        };
        ConfigElement::new("plugin").with_child(
            ConfigElement::new("rv:robot_config")
                .with_child(ConfigElement::new("rv:update_rate").with_value(10))
                .with_child(
                    ConfigElement::new("rv:brain")
                        .with_child(ConfigElement::new("rv:learner").with_attribute("type", "offline"))
                        .with_child(ConfigElement::new("rv:controller").with_attribute("type", "cpg"))
                        .with_child(
                            ConfigElement::new("rv:actuators")
                                .with_child(servo("m0", "hip"))
                                .with_child(servo("m1", "knee")),
                        )
                        .with_child(
                            ConfigElement::new("rv:sensors").with_child(
                                ConfigElement::new("rv:sensor")
                                    .with_attribute("type", "imu")
                                    .with_attribute("id", "s0")
                                    .with_attribute("part_id", "core")
                                    .with_attribute("sensor", "core_imu"),
                            ),
                        ),
                )
                .with_child(
                    ConfigElement::new("rv:battery")
                        .with_child(ConfigElement::new("rv:level").with_value(0.75)),
                ),
        )
    }

    fn settings() -> SimSettings {
        SimSettings {
            step_size: 0.01,
            duration: 2.0,
            battery_query_interval: 0.5,
            ..SimSettings::default()
        }
    }

    #[test]
    fn stub_model_exposes_configured_devices() {
        let model = stub_model_for(&plugin(), &settings());
        assert_eq!(model.joint_limits("hip"), Some((-1.0, 1.0)));
        assert!(model.joint_limits("knee").is_some());
        assert!(model.has_sensor("core_imu"));
        assert_eq!(model.name(), "spider");
    }

    #[test]
    fn short_run_drives_brain_and_battery() {
        let shutdown = AtomicBool::new(false);
        let summary = run_plugin(&plugin(), &settings(), &shutdown).unwrap();
        assert!(!summary.interrupted);
        assert!(summary.ticks >= 199);
        assert!(summary.executed_ticks >= 15 && summary.executed_ticks <= 20);
        assert_eq!(summary.brain_updates, summary.executed_ticks);
        assert!(summary.battery_queries >= 3);
        assert_eq!(summary.battery_responses, summary.battery_queries);
        assert_eq!(summary.last_battery_level.as_deref(), Some("0.75"));
    }

    #[test]
    fn raised_shutdown_stops_immediately() {
        let shutdown = AtomicBool::new(true);
        let summary = run_plugin(&plugin(), &settings(), &shutdown).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.ticks, 0);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let shutdown = AtomicBool::new(false);
        let bad = SimSettings {
            step_size: 0.0,
            ..settings()
        };
        assert!(matches!(
            run_plugin(&plugin(), &bad, &shutdown),
            Err(RevolveError::InvalidSetting { name: "step_size", .. })
        ));
    }
}
