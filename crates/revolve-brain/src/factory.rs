//! [`create_brain`] – instantiate the brain named by an `rv:brain` element.

use revolve_config::ConfigElement;
use revolve_hal::{Motor, Sensor};
use revolve_types::RevolveError;
use tracing::{info, warn};

use crate::brain::Brain;
use crate::cpg::{BayesianCpg, BoSchedule, CpgParams, DifferentialCpg};
use crate::neural_network::NeuralNetwork;
use crate::rlpower::{RlPower, RlPowerParams};
use crate::selector::{BrainKind, BrainSelection};

/// Build the brain described by `brain` for the given devices.
///
/// Returns `Ok(None)` for the RLPower brain when there are no motors to
/// drive; the robot then runs without a brain.
///
/// # Errors
///
/// - [`RevolveError::MissingElement`] / [`RevolveError::MissingAttribute`]
///   if `rv:controller@type` or `rv:learner@type` is absent.
/// - [`RevolveError::BrainNotDefined`] for an unsupported pair.
/// - Any error raised while reading the selected brain's own parameters.
pub fn create_brain(
    brain: &ConfigElement,
    motors: &[Motor],
    sensors: &[Sensor],
) -> Result<Option<Brain>, RevolveError> {
    let selection = BrainSelection::from_config(brain)?;
    let kind = selection.kind()?;
    info!(
        controller = %selection.controller,
        learner = %selection.learner,
        brain = %kind,
        motors = motors.len(),
        sensors = sensors.len(),
        "brain selected"
    );

    let controller = brain.element("rv:controller")?;
    let learner = brain.element("rv:learner")?;

    let built = match kind {
        BrainKind::NeuralNetwork => {
            Brain::NeuralNetwork(NeuralNetwork::from_config(brain, motors, sensors)?)
        }
        BrainKind::RlPower => {
            if motors.is_empty() {
                warn!("rlpower brain requested for a robot without motors; running without a brain");
                return Ok(None);
            }
            Brain::RlPower(RlPower::new(RlPowerParams::from_config(learner)?, motors.len()))
        }
        BrainKind::BayesianCpg => {
            let params = CpgParams::spider_forward().with_overrides(controller)?;
            Brain::BayesianCpg(BayesianCpg::new(params, BoSchedule::from_config(learner)?, motors))
        }
        BrainKind::FixedCpg => {
            let params = CpgParams::spider_forward().with_overrides(controller)?;
            let seed = learner.attribute_or("seed", 0)?;
            Brain::FixedCpg(DifferentialCpg::new(params, motors, seed))
        }
    };
    Ok(Some(built))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{motors, stub_model};

    fn brain(learner: &str, controller: &str) -> ConfigElement {
        ConfigElement::new("rv:brain")
            .with_child(ConfigElement::new("rv:learner").with_attribute("type", learner))
            .with_child(ConfigElement::new("rv:controller").with_attribute("type", controller))
    }

    #[test]
    fn dispatches_each_supported_pair() {
        let model = stub_model(2, &[]);
        let motors = motors(&model, 2);

        let rl = create_brain(&brain("rlpower", "spline"), &motors, &[]).unwrap();
        assert_eq!(rl.map(|b| b.kind()), Some(BrainKind::RlPower));

        let bo = create_brain(&brain("bo", "cpg"), &motors, &[]).unwrap();
        assert_eq!(bo.map(|b| b.kind()), Some(BrainKind::BayesianCpg));

        let fixed = create_brain(&brain("offline", "cpg"), &motors, &[]).unwrap();
        assert_eq!(fixed.map(|b| b.kind()), Some(BrainKind::FixedCpg));

        let ann = brain("offline", "ann").with_child(ConfigElement::new("rv:neural_network"));
        let nn = create_brain(&ann, &motors, &[]).unwrap();
        assert_eq!(nn.map(|b| b.kind()), Some(BrainKind::NeuralNetwork));
    }

    #[test]
    fn rlpower_without_motors_yields_no_brain() {
        let result = create_brain(&brain("rlpower", "spline"), &[], &[]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn undefined_pair_is_fatal() {
        let err = create_brain(&brain("bo", "spline"), &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            RevolveError::BrainNotDefined { ref controller, ref learner }
                if controller == "spline" && learner == "bo"
        ));
    }

    #[test]
    fn fixed_cpg_keeps_spider_weights() {
        let model = stub_model(8, &[]);
        let motors = motors(&model, 8);
        let Some(Brain::FixedCpg(cpg)) =
            create_brain(&brain("offline", "cpg"), &motors, &[]).unwrap()
        else {
            panic!("expected a fixed CPG");
        };
        assert_eq!(cpg.params().weights, crate::cpg::SPIDER_FORWARD_WEIGHTS.to_vec());
    }
}
