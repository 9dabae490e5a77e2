//! [`MotorFactory`] and [`SensorFactory`] – build devices from configuration.
//!
//! Each factory is bound to one host model and turns an `rv:servomotor` /
//! `rv:sensor` element into a device, dispatching on the element's `type`
//! attribute. Construction only allocates; nothing is sent to the host.

use std::sync::Arc;

use revolve_config::ConfigElement;
use revolve_types::RevolveError;
use tracing::debug;

use crate::model::SimModel;
use crate::motor::{Motor, MotorDrive, MotorInfo};
use crate::pid::{PidController, PidGains};
use crate::sensor::{Sensor, SensorInfo, SensorKind};

const DEFAULT_MAX_VELOCITY: f64 = 1.0;

/// Builds [`Motor`]s for a single host model.
pub struct MotorFactory {
    model: Arc<dyn SimModel>,
}

impl MotorFactory {
    pub fn new(model: Arc<dyn SimModel>) -> Self {
        Self { model }
    }

    /// Create the motor described by `node`.
    ///
    /// # Errors
    ///
    /// - [`RevolveError::MissingAttribute`] if `type`, `id`, `part_id` or
    ///   `joint` is absent.
    /// - [`RevolveError::UnknownDeviceType`] for an unrecognised `type`.
    /// - [`RevolveError::UnknownModelEntity`] if the joint does not exist.
    /// - [`RevolveError::TypeMismatch`] for malformed numeric attributes.
    pub fn create(&self, node: &ConfigElement) -> Result<Motor, RevolveError> {
        let kind = node.attribute_str("type")?;
        let info = MotorInfo {
            id: node.attribute_str("id")?.to_string(),
            part_id: node.attribute_str("part_id")?.to_string(),
            joint: node.attribute_str("joint")?.to_string(),
            coordinates: parse_coordinates(node)?,
        };

        let drive = match kind {
            "position" => {
                let (lower, upper) = self.joint_limits(&info.joint)?;
                let gains = match node.find("rv:pid") {
                    Some(pid) => PidGains::from_config(pid)?,
                    None => PidGains::default(),
                };
                MotorDrive::Position {
                    lower,
                    upper,
                    pid: PidController::with_gains(gains),
                }
            }
            "velocity" => {
                self.joint_limits(&info.joint)?;
                MotorDrive::Velocity {
                    min_velocity: node.attribute_or("min_velocity", -DEFAULT_MAX_VELOCITY)?,
                    max_velocity: node.attribute_or("max_velocity", DEFAULT_MAX_VELOCITY)?,
                }
            }
            other => {
                return Err(RevolveError::UnknownDeviceType {
                    kind: "motor",
                    type_name: other.to_string(),
                });
            }
        };

        debug!(motor = %info.id, joint = %info.joint, kind, "motor created");
        Ok(Motor::new(info, drive, Arc::clone(&self.model)))
    }

    fn joint_limits(&self, joint: &str) -> Result<(f64, f64), RevolveError> {
        self.model
            .joint_limits(joint)
            .ok_or_else(|| RevolveError::UnknownModelEntity {
                kind: "joint",
                name: joint.to_string(),
            })
    }
}

/// Builds [`Sensor`]s for a single host model.
pub struct SensorFactory {
    model: Arc<dyn SimModel>,
}

impl SensorFactory {
    pub fn new(model: Arc<dyn SimModel>) -> Self {
        Self { model }
    }

    /// Create the sensor described by `node`.
    ///
    /// # Errors
    ///
    /// - [`RevolveError::MissingAttribute`] if `type`, `id`, `part_id` or
    ///   `sensor` is absent.
    /// - [`RevolveError::UnknownDeviceType`] for an unrecognised `type`.
    /// - [`RevolveError::UnknownModelEntity`] if the host has no such sensor.
    pub fn create(&self, node: &ConfigElement) -> Result<Sensor, RevolveError> {
        let type_name = node.attribute_str("type")?;
        let kind = match type_name {
            "touch" => SensorKind::Touch,
            "imu" => SensorKind::Imu,
            "light" => SensorKind::Light,
            "basic_battery" => SensorKind::BasicBattery,
            "point_intensity" => SensorKind::PointIntensity {
                i_max: node.attribute_or("i_max", 1.0)?,
                r: node.attribute_or("r", 1.0)?,
            },
            other => {
                return Err(RevolveError::UnknownDeviceType {
                    kind: "sensor",
                    type_name: other.to_string(),
                });
            }
        };

        let info = SensorInfo {
            id: node.attribute_str("id")?.to_string(),
            part_id: node.attribute_str("part_id")?.to_string(),
            sensor: node.attribute_str("sensor")?.to_string(),
        };
        if !self.model.has_sensor(&info.sensor) {
            return Err(RevolveError::UnknownModelEntity {
                kind: "sensor",
                name: info.sensor,
            });
        }

        debug!(sensor = %info.id, kind = kind.name(), "sensor created");
        Ok(Sensor::new(info, kind, Arc::clone(&self.model)))
    }
}

fn parse_coordinates(node: &ConfigElement) -> Result<Option<(f64, f64)>, RevolveError> {
    let Some(text) = node.attributes.get("coordinates") else {
        return Ok(None);
    };
    let mismatch = || RevolveError::TypeMismatch {
        element: node.name.clone(),
        expected: "coordinates \"x;y\"",
        text: text.clone(),
    };
    let (x, y) = text.split_once(';').ok_or_else(mismatch)?;
    let x = x.trim().parse::<f64>().map_err(|_| mismatch())?;
    let y = y.trim().parse::<f64>().map_err(|_| mismatch())?;
    Ok(Some((x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::StubModel;

    fn servo(id: &str, kind: &str, joint: &str) -> ConfigElement {
        ConfigElement::new("rv:servomotor")
            .with_attribute("id", id)
            .with_attribute("part_id", format!("{id}_part"))
            .with_attribute("type", kind)
            .with_attribute("joint", joint)
    }

    fn model() -> Arc<StubModel> {
        StubModel::builder("spider")
            .with_joint("hip", -0.5, 0.5)
            .with_joint("knee", -1.0, 1.0)
            .with_sensor("core_imu", vec![0.0; 6])
            .build()
    }

    #[test]
    fn creates_position_motor_with_joint_limits_and_pid() {
        let factory = MotorFactory::new(model());
        let node = servo("m1", "position", "hip")
            .with_child(ConfigElement::new("rv:pid").with_attribute("p", "0.7"));
        let motor = factory.create(&node).unwrap();
        assert_eq!(motor.kind(), "position");
        match motor.drive() {
            MotorDrive::Position { lower, upper, pid } => {
                assert_eq!((*lower, *upper), (-0.5, 0.5));
                assert_eq!(pid.gains().p, 0.7);
            }
            other => panic!("unexpected drive: {other:?}"),
        }
    }

    #[test]
    fn creates_velocity_motor_with_defaults() {
        let factory = MotorFactory::new(model());
        let motor = factory.create(&servo("m2", "velocity", "knee")).unwrap();
        assert!(matches!(
            motor.drive(),
            MotorDrive::Velocity { min_velocity, max_velocity }
                if *min_velocity == -1.0 && *max_velocity == 1.0
        ));
    }

    #[test]
    fn unknown_motor_type_fails() {
        let factory = MotorFactory::new(model());
        let err = factory.create(&servo("m3", "stepper", "hip")).unwrap_err();
        assert!(matches!(err, RevolveError::UnknownDeviceType { kind: "motor", .. }));
    }

    #[test]
    fn missing_joint_fails() {
        let factory = MotorFactory::new(model());
        let err = factory.create(&servo("m4", "position", "elbow")).unwrap_err();
        assert!(matches!(err, RevolveError::UnknownModelEntity { kind: "joint", .. }));
    }

    #[test]
    fn missing_type_attribute_fails() {
        let factory = MotorFactory::new(model());
        let node = ConfigElement::new("rv:servomotor").with_attribute("id", "m5");
        assert!(matches!(
            factory.create(&node),
            Err(RevolveError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn coordinates_are_parsed() {
        let factory = MotorFactory::new(model());
        let node = servo("m6", "position", "hip").with_attribute("coordinates", "1;-2");
        assert_eq!(factory.create(&node).unwrap().coordinates(), Some((1.0, -2.0)));

        let bad = servo("m7", "position", "hip").with_attribute("coordinates", "1,2");
        assert!(matches!(
            factory.create(&bad),
            Err(RevolveError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn creates_sensor_and_rejects_unknown_type() {
        let factory = SensorFactory::new(model());
        let imu = ConfigElement::new("rv:sensor")
            .with_attribute("id", "s1")
            .with_attribute("part_id", "core")
            .with_attribute("type", "imu")
            .with_attribute("sensor", "core_imu");
        let sensor = factory.create(&imu).unwrap();
        assert_eq!(sensor.kind(), SensorKind::Imu);
        assert_eq!(sensor.inputs(), 6);

        let sonar = imu.clone().with_attribute("type", "sonar");
        assert!(matches!(
            factory.create(&sonar),
            Err(RevolveError::UnknownDeviceType { kind: "sensor", .. })
        ));
    }

    #[test]
    fn sensor_missing_on_host_fails() {
        let factory = SensorFactory::new(model());
        let node = ConfigElement::new("rv:sensor")
            .with_attribute("id", "s2")
            .with_attribute("part_id", "leg")
            .with_attribute("type", "touch")
            .with_attribute("sensor", "foot_contact");
        assert!(matches!(
            factory.create(&node),
            Err(RevolveError::UnknownModelEntity { kind: "sensor", .. })
        ));
    }
}
