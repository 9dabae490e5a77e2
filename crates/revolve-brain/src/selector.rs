//! Brain selection: which control policy a (learner, controller) pair means.
//!
//! The supported pairs form a small closed table, evaluated top to bottom;
//! the first exact match wins. Anything else is a configuration error.
//!
//! | learner | controller | brain |
//! |---|---|---|
//! | `offline` | `ann` | [`BrainKind::NeuralNetwork`] |
//! | `rlpower` | `spline` | [`BrainKind::RlPower`] |
//! | `bo` | `cpg` | [`BrainKind::BayesianCpg`] |
//! | `offline` | `cpg` | [`BrainKind::FixedCpg`] |

use std::fmt;

use revolve_config::ConfigElement;
use revolve_types::RevolveError;

/// The closed set of brain variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrainKind {
    /// Fixed neural network read from `rv:neural_network`.
    NeuralNetwork,
    /// Spline policy of the RLPower learner.
    RlPower,
    /// Differential CPG tuned by Bayesian optimisation.
    BayesianCpg,
    /// Differential CPG with a fixed, named weight set.
    FixedCpg,
}

impl fmt::Display for BrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrainKind::NeuralNetwork => write!(f, "neural-network"),
            BrainKind::RlPower => write!(f, "rlpower-spline"),
            BrainKind::BayesianCpg => write!(f, "bo-cpg"),
            BrainKind::FixedCpg => write!(f, "fixed-cpg"),
        }
    }
}

/// Ordered dispatch table: `(learner, controller, brain)`.
pub const DISPATCH_TABLE: [(&str, &str, BrainKind); 4] = [
    ("offline", "ann", BrainKind::NeuralNetwork),
    ("rlpower", "spline", BrainKind::RlPower),
    ("bo", "cpg", BrainKind::BayesianCpg),
    ("offline", "cpg", BrainKind::FixedCpg),
];

/// Look up the brain for a `(learner, controller)` pair.
pub fn select(learner: &str, controller: &str) -> Option<BrainKind> {
    DISPATCH_TABLE
        .iter()
        .find(|(l, c, _)| *l == learner && *c == controller)
        .map(|(_, _, kind)| *kind)
}

/// The controller and learner named by an `rv:brain` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainSelection {
    pub controller: String,
    pub learner: String,
}

impl BrainSelection {
    /// Read `rv:controller@type` and `rv:learner@type` from `brain`.
    ///
    /// # Errors
    ///
    /// [`RevolveError::MissingElement`] / [`RevolveError::MissingAttribute`]
    /// when either is absent.
    pub fn from_config(brain: &ConfigElement) -> Result<Self, RevolveError> {
        Ok(Self {
            controller: brain.element("rv:controller")?.attribute_str("type")?.to_string(),
            learner: brain.element("rv:learner")?.attribute_str("type")?.to_string(),
        })
    }

    /// Resolve the selection against [`DISPATCH_TABLE`].
    ///
    /// # Errors
    ///
    /// [`RevolveError::BrainNotDefined`] for a pair outside the table.
    pub fn kind(&self) -> Result<BrainKind, RevolveError> {
        select(&self.learner, &self.controller).ok_or_else(|| RevolveError::BrainNotDefined {
            controller: self.controller.clone(),
            learner: self.learner.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brain(controller: &str, learner: &str) -> ConfigElement {
        ConfigElement::new("rv:brain")
            .with_child(ConfigElement::new("rv:learner").with_attribute("type", learner))
            .with_child(ConfigElement::new("rv:controller").with_attribute("type", controller))
    }

    #[test]
    fn every_table_row_resolves() {
        assert_eq!(select("offline", "ann"), Some(BrainKind::NeuralNetwork));
        assert_eq!(select("rlpower", "spline"), Some(BrainKind::RlPower));
        assert_eq!(select("bo", "cpg"), Some(BrainKind::BayesianCpg));
        assert_eq!(select("offline", "cpg"), Some(BrainKind::FixedCpg));
    }

    #[test]
    fn undefined_pairs_do_not_resolve() {
        assert_eq!(select("bo", "spline"), None);
        assert_eq!(select("rlpower", "cpg"), None);
        assert_eq!(select("OFFLINE", "ann"), None);
        assert_eq!(select("", ""), None);
    }

    #[test]
    fn selection_reads_both_types() {
        let selection = BrainSelection::from_config(&brain("cpg", "bo")).unwrap();
        assert_eq!(selection.controller, "cpg");
        assert_eq!(selection.learner, "bo");
        assert_eq!(selection.kind().unwrap(), BrainKind::BayesianCpg);
    }

    #[test]
    fn undefined_selection_is_brain_not_defined() {
        let selection = BrainSelection::from_config(&brain("spline", "bo")).unwrap();
        assert!(matches!(
            selection.kind(),
            Err(RevolveError::BrainNotDefined { .. })
        ));
    }

    #[test]
    fn missing_learner_is_an_error() {
        let node = ConfigElement::new("rv:brain")
            .with_child(ConfigElement::new("rv:controller").with_attribute("type", "ann"));
        assert!(matches!(
            BrainSelection::from_config(&node),
            Err(RevolveError::MissingElement { .. })
        ));
    }
}
