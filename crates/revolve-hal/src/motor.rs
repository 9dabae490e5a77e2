//! [`Motor`] – joint actuators bound to the host model.
//!
//! Every motor receives a single brain output per actuation step, expected in
//! `[0, 1]`, and turns it into a joint command:
//!
//! | kind | command |
//! |---|---|
//! | `position` | PID force driving the joint toward `lower + output * (upper - lower)` |
//! | `velocity` | joint velocity `min + output * (max - min)` |

use std::fmt;
use std::sync::Arc;

use crate::model::SimModel;
use crate::pid::PidController;

/// Identity of a motor, taken from its `rv:servomotor` element.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorInfo {
    pub id: String,
    pub part_id: String,
    pub joint: String,
    /// Optional body-plan coordinates (`"x;y"`), used by CPG brains to find
    /// neighbouring motors.
    pub coordinates: Option<(f64, f64)>,
}

/// How a motor turns a brain output into a joint command.
#[derive(Debug, Clone)]
pub enum MotorDrive {
    Position {
        lower: f64,
        upper: f64,
        pid: PidController,
    },
    Velocity {
        min_velocity: f64,
        max_velocity: f64,
    },
}

/// A joint actuator. Constructed by
/// [`MotorFactory`][crate::factory::MotorFactory].
pub struct Motor {
    info: MotorInfo,
    drive: MotorDrive,
    model: Arc<dyn SimModel>,
    last_output: Option<f64>,
}

impl Motor {
    pub(crate) fn new(info: MotorInfo, drive: MotorDrive, model: Arc<dyn SimModel>) -> Self {
        Self {
            info,
            drive,
            model,
            last_output: None,
        }
    }

    pub fn info(&self) -> &MotorInfo {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn part_id(&self) -> &str {
        &self.info.part_id
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.info.coordinates
    }

    /// `"position"` or `"velocity"`.
    pub fn kind(&self) -> &'static str {
        match self.drive {
            MotorDrive::Position { .. } => "position",
            MotorDrive::Velocity { .. } => "velocity",
        }
    }

    pub fn drive(&self) -> &MotorDrive {
        &self.drive
    }

    /// Most recent (clamped) brain output, `None` before the first update.
    pub fn last_output(&self) -> Option<f64> {
        self.last_output
    }

    /// Apply one brain output. Values outside `[0, 1]` are clamped; NaN is
    /// treated as 0.
    pub fn update(&mut self, output: f64, step: f64) {
        let output = if output.is_nan() { 0.0 } else { output.clamp(0.0, 1.0) };
        self.last_output = Some(output);

        let joint = self.info.joint.as_str();
        match &mut self.drive {
            MotorDrive::Position { lower, upper, pid } => {
                pid.set_set_point(*lower + output * (*upper - *lower));
                let force = pid.update(self.model.joint_position(joint), step);
                self.model.apply_joint_force(joint, force);
            }
            MotorDrive::Velocity {
                min_velocity,
                max_velocity,
            } => {
                let velocity = *min_velocity + output * (*max_velocity - *min_velocity);
                self.model.set_joint_velocity(joint, velocity);
            }
        }
    }
}

impl fmt::Debug for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motor")
            .field("info", &self.info)
            .field("drive", &self.drive)
            .field("model", &self.model.scoped_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::StubModel;

    fn info(joint: &str) -> MotorInfo {
        MotorInfo {
            id: "m".to_string(),
            part_id: "p".to_string(),
            joint: joint.to_string(),
            coordinates: None,
        }
    }

    #[test]
    fn position_motor_pushes_toward_target() {
        let model = StubModel::builder("bot").with_joint("hip", -1.0, 1.0).build();
        let mut motor = Motor::new(
            info("hip"),
            MotorDrive::Position {
                lower: -1.0,
                upper: 1.0,
                pid: PidController::new(2.0, 0.0, 0.0),
            },
            model.clone(),
        );

        // output 1.0 → target 1.0, joint at 0.0 → positive force.
        motor.update(1.0, 0.1);
        let force = model.joint_force("hip").unwrap();
        assert!((force - 2.0).abs() < 1e-9);

        // output 0.0 → target -1.0 → negative force.
        motor.update(0.0, 0.1);
        assert!(model.joint_force("hip").unwrap() < 0.0);
    }

    #[test]
    fn velocity_motor_maps_output_linearly() {
        let model = StubModel::builder("bot").with_joint("wheel", -3.0, 3.0).build();
        let mut motor = Motor::new(
            info("wheel"),
            MotorDrive::Velocity {
                min_velocity: -2.0,
                max_velocity: 2.0,
            },
            model.clone(),
        );
        motor.update(0.75, 0.1);
        assert!((model.joint_velocity("wheel").unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(motor.kind(), "velocity");
    }

    #[test]
    fn out_of_range_and_nan_outputs_are_clamped() {
        let model = StubModel::builder("bot").with_joint("wheel", -3.0, 3.0).build();
        let mut motor = Motor::new(
            info("wheel"),
            MotorDrive::Velocity {
                min_velocity: 0.0,
                max_velocity: 1.0,
            },
            model.clone(),
        );
        motor.update(7.0, 0.1);
        assert_eq!(motor.last_output(), Some(1.0));
        motor.update(f64::NAN, 0.1);
        assert_eq!(motor.last_output(), Some(0.0));
    }
}
