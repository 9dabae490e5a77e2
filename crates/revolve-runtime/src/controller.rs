//! [`RobotController`] – the per-robot orchestrator driven by the host.
//!
//! Loading runs once, in a fixed order:
//!
//! 1. the battery request/response channel
//! 2. `rv:robot_config` (absent → inert controller, logged, not an error)
//! 3. `rv:update_rate` → actuation period
//! 4. motors from `rv:brain/rv:actuators/rv:servomotor*`
//! 5. sensors from `rv:brain/rv:sensors/rv:sensor*`
//! 6. the brain selected by `rv:brain`
//! 7. the battery level
//!
//! An inert controller still answers battery requests, with a level of 0.
//!
//! After that the host calls [`RobotController::on_tick`] with the simulated
//! time on every world update, and [`RobotController::poll_battery_requests`]
//! whenever it wants pending battery traffic answered. Both are plain
//! synchronous calls.

use std::sync::Arc;

use revolve_brain::{Brain, create_brain};
use revolve_config::ConfigElement;
use revolve_hal::{Motor, MotorFactory, Sensor, SensorFactory, SimModel};
use revolve_middleware::{BatteryChannel, EventBus};
use revolve_types::{BatteryRequest, BatteryResponse, RevolveError};
use tracing::{debug, error, info, instrument, warn};

use crate::battery::BatteryState;
use crate::scheduler::ActuationScheduler;

const ROBOT_CONFIG: &str = "rv:robot_config";
const BRAIN: &str = "rv:brain";

pub struct RobotController {
    model: Arc<dyn SimModel>,
    loaded: bool,
    motors: Vec<Motor>,
    sensors: Vec<Sensor>,
    brain: Option<Brain>,
    scheduler: ActuationScheduler,
    init_time: f64,
    battery: BatteryState,
    channel: BatteryChannel,
    brain_updates: u64,
}

impl RobotController {
    /// Attach a controller to `model` using the plugin element that holds
    /// `rv:robot_config`.
    ///
    /// # Errors
    ///
    /// Any device or brain construction failure, including a missing
    /// `rv:brain` element. A missing `rv:robot_config` is not an error: the
    /// controller comes up inert but keeps serving battery requests.
    #[instrument(skip(model, plugin, bus), fields(robot = %model.scoped_name()))]
    pub fn load(
        model: Arc<dyn SimModel>,
        plugin: &ConfigElement,
        bus: &EventBus,
        init_time: f64,
    ) -> Result<Self, RevolveError> {
        let channel = BatteryChannel::attach(bus, model.scoped_name());

        let Some(robot_config) = plugin.find(ROBOT_CONFIG) else {
            error!(
                robot = %model.scoped_name(),
                "`{ROBOT_CONFIG}` element not found; controller will stay inert"
            );
            return Ok(Self::inert(model, init_time, channel));
        };

        let scheduler = match robot_config.find("rv:update_rate") {
            Some(node) => {
                let update_rate = node.get::<f64>()?;
                if update_rate <= 0.0 {
                    warn!(update_rate, "non-positive update rate; brain timing is degenerate");
                }
                ActuationScheduler::from_update_rate(update_rate)
            }
            None => ActuationScheduler::new(0.0),
        };

        let motor_factory = MotorFactory::new(Arc::clone(&model));
        let motors = load_devices(robot_config, "rv:actuators", "rv:servomotor", |node| {
            motor_factory.create(node)
        })?;
        let sensor_factory = SensorFactory::new(Arc::clone(&model));
        let sensors = load_devices(robot_config, "rv:sensors", "rv:sensor", |node| {
            sensor_factory.create(node)
        })?;

        let brain = create_brain(robot_config.element(BRAIN)?, &motors, &sensors)?;

        let battery = BatteryState::from_robot_config(robot_config)?;

        info!(
            period = scheduler.period(),
            motors = motors.len(),
            sensors = sensors.len(),
            brain = ?brain.as_ref().map(Brain::kind),
            battery = battery.is_present(),
            "robot controller loaded"
        );

        Ok(Self {
            model,
            loaded: true,
            motors,
            sensors,
            brain,
            scheduler,
            init_time,
            battery,
            channel,
            brain_updates: 0,
        })
    }

    fn inert(model: Arc<dyn SimModel>, init_time: f64, channel: BatteryChannel) -> Self {
        Self {
            model,
            loaded: false,
            motors: Vec::new(),
            sensors: Vec::new(),
            brain: None,
            scheduler: ActuationScheduler::new(0.0),
            init_time,
            battery: BatteryState::default(),
            channel,
            brain_updates: 0,
        }
    }

    /// Host world-update callback. Returns whether this tick executed.
    ///
    /// An executed tick runs the brain with the time elapsed since attach
    /// and the actuation period as its step.
    pub fn on_tick(&mut self, now: f64) -> bool {
        if !self.loaded || !self.scheduler.tick(now) {
            return false;
        }
        if let Some(brain) = self.brain.as_mut() {
            brain.update(
                &mut self.motors,
                &self.sensors,
                now - self.init_time,
                self.scheduler.period(),
            );
            self.brain_updates += 1;
        }
        true
    }

    /// Answer one battery request addressed to this robot.
    pub fn handle_battery_request(&self, request: &BatteryRequest) -> Option<BatteryResponse> {
        self.battery
            .handle_request(request, self.model.name(), self.model.scoped_name())
    }

    /// Drain pending battery requests and publish the responses.
    ///
    /// Returns the number of responses published.
    pub fn poll_battery_requests(&mut self) -> Result<usize, RevolveError> {
        let mut answered = 0;
        while let Some(request) = self.channel.next_request() {
            let Some(response) = self.battery.handle_request(
                &request,
                self.model.name(),
                self.model.scoped_name(),
            ) else {
                debug!(id = request.id, target = %request.data, "battery request for another robot");
                continue;
            };
            self.channel.respond(response)?;
            answered += 1;
        }
        Ok(answered)
    }

    /// `false` when `rv:robot_config` was missing.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn model(&self) -> &Arc<dyn SimModel> {
        &self.model
    }

    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn brain(&self) -> Option<&Brain> {
        self.brain.as_ref()
    }

    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    pub fn scheduler(&self) -> &ActuationScheduler {
        &self.scheduler
    }

    pub fn init_time(&self) -> f64 {
        self.init_time
    }

    /// Number of ticks that ran a brain.
    pub fn brain_updates(&self) -> u64 {
        self.brain_updates
    }
}

/// Build one device per `robot_config/rv:brain/<group>/<item>`, in order.
///
/// A missing brain or group yields no devices.
fn load_devices<T>(
    robot_config: &ConfigElement,
    group: &str,
    item: &str,
    mut create: impl FnMut(&ConfigElement) -> Result<T, RevolveError>,
) -> Result<Vec<T>, RevolveError> {
    let Some(brain) = robot_config.find(BRAIN) else {
        warn!(group, "`{BRAIN}` element not found; no devices loaded");
        return Ok(Vec::new());
    };
    let Some(group_node) = brain.find(group) else {
        debug!(group, "device group not configured");
        return Ok(Vec::new());
    };
    group_node.elements(item).map(&mut create).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use revolve_hal::StubModel;

    fn model() -> Arc<dyn SimModel> {
        StubModel::builder("spider").with_joint("hip", -1.0, 1.0).build()
    }

    #[test]
    fn missing_robot_config_is_inert() {
        let bus = EventBus::default();
        let mut controller =
            RobotController::load(model(), &ConfigElement::new("plugin"), &bus, 0.0).unwrap();
        assert!(!controller.is_loaded());
        assert!(controller.brain().is_none());
        assert!(!controller.on_tick(100.0));
        assert_eq!(controller.poll_battery_requests().unwrap(), 0);
        assert_eq!(bus.subscriber_count(revolve_middleware::Topic::BatteryRequest), 1);
    }

    #[test]
    fn missing_update_rate_fires_whenever_time_advances() {
        let plugin = ConfigElement::new("plugin").with_child(
            ConfigElement::new(ROBOT_CONFIG).with_child(
                ConfigElement::new(BRAIN)
                    .with_child(ConfigElement::new("rv:learner").with_attribute("type", "offline"))
                    .with_child(ConfigElement::new("rv:controller").with_attribute("type", "cpg")),
            ),
        );
        let mut controller = RobotController::load(model(), &plugin, &EventBus::default(), 0.0).unwrap();
        assert_eq!(controller.scheduler().period(), 0.0);
        assert!(controller.on_tick(0.001));
        assert!(!controller.on_tick(0.001));
        assert!(controller.on_tick(0.002));
    }

    #[test]
    fn malformed_update_rate_is_fatal() {
        let plugin = ConfigElement::new("plugin").with_child(
            ConfigElement::new(ROBOT_CONFIG)
                .with_child(ConfigElement::new("rv:update_rate").with_value("fast")),
        );
        let err = RobotController::load(model(), &plugin, &EventBus::default(), 0.0)
            .err()
            .expect("unparsable update rate must fail");
        assert!(matches!(err, RevolveError::TypeMismatch { .. }));
    }

    #[test]
    fn load_devices_without_brain_is_empty() {
        let config = ConfigElement::new(ROBOT_CONFIG);
        let devices: Vec<String> =
            load_devices(&config, "rv:sensors", "rv:sensor", |n| Ok(n.name.clone())).unwrap();
        assert!(devices.is_empty());
    }
}
