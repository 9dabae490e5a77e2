//! [`Brain`] – the closed set of control policies a robot can run.

use revolve_hal::{Motor, Sensor};

use crate::cpg::{BayesianCpg, DifferentialCpg};
use crate::neural_network::NeuralNetwork;
use crate::rlpower::RlPower;
use crate::selector::BrainKind;

/// A constructed control policy.
///
/// Every variant is driven the same way: on each executed tick the
/// controller calls [`Brain::update`] with its motors and sensors, the time
/// elapsed since the controller attached, and the actuation period.
#[derive(Debug)]
pub enum Brain {
    NeuralNetwork(NeuralNetwork),
    RlPower(RlPower),
    BayesianCpg(BayesianCpg),
    FixedCpg(DifferentialCpg),
}

impl Brain {
    pub fn kind(&self) -> BrainKind {
        match self {
            Brain::NeuralNetwork(_) => BrainKind::NeuralNetwork,
            Brain::RlPower(_) => BrainKind::RlPower,
            Brain::BayesianCpg(_) => BrainKind::BayesianCpg,
            Brain::FixedCpg(_) => BrainKind::FixedCpg,
        }
    }

    /// Read `sensors`, compute one output per motor and apply it.
    pub fn update(&mut self, motors: &mut [Motor], sensors: &[Sensor], time: f64, step: f64) {
        match self {
            Brain::NeuralNetwork(nn) => nn.update(motors, sensors, time, step),
            Brain::RlPower(rl) => rl.update(motors, sensors, time, step),
            Brain::BayesianCpg(cpg) => cpg.update(motors, sensors, time, step),
            Brain::FixedCpg(cpg) => cpg.update(motors, sensors, time, step),
        }
    }
}

/// Flatten every sensor's readings into `buf`, in sensor order.
pub(crate) fn read_inputs(sensors: &[Sensor], buf: &mut Vec<f64>) {
    let total: usize = sensors.iter().map(Sensor::inputs).sum();
    buf.clear();
    buf.resize(total, 0.0);
    let mut offset = 0;
    for sensor in sensors {
        let n = sensor.inputs();
        sensor.read(&mut buf[offset..offset + n]);
        offset += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sensors, stub_model};

    #[test]
    fn inputs_are_flattened_in_sensor_order() {
        let model = stub_model(
            0,
            &[
                ("light", vec![0.25]),
                ("imu", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
                ("foot", vec![0.7]),
            ],
        );
        let sensors = sensors(&model, &[("light", "light"), ("imu", "imu"), ("foot", "touch")]);
        let mut buf = vec![9.0; 3];
        read_inputs(&sensors, &mut buf);
        assert_eq!(buf, vec![0.25, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 1.0]);
    }

    #[test]
    fn no_sensors_means_no_inputs() {
        let mut buf = vec![1.0];
        read_inputs(&[], &mut buf);
        assert!(buf.is_empty());
    }
}
