//! Fixed-topology neural network brain (`offline` + `ann`).
//!
//! The network is read from `rv:brain/rv:neural_network`:
//!
//! ```text
//! rv:neural_network
//!   rv:neuron id="in0" layer="input"
//!   rv:neuron id="h0"  layer="hidden" type="sigmoid" bias="0.1" gain="2"
//!   rv:neuron id="out0" layer="output" type="oscillator" period="2" phase_offset="0.25"
//!   rv:neural_connection src="in0" dst="h0" weight="0.8"
//! ```
//!
//! Input neurons take the flattened sensor readings in order; output neurons
//! drive the motors in order. All non-input neurons update synchronously from
//! the previous step's states, so recurrent connections are allowed.

use std::collections::HashMap;
use std::f64::consts::PI;

use revolve_config::ConfigElement;
use revolve_hal::{Motor, Sensor};
use revolve_types::RevolveError;
use tracing::warn;

use crate::brain::read_inputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Input,
    Hidden,
    Output,
}

/// Transfer function of a non-input neuron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// `gain * (x - bias)`
    Simple { bias: f64, gain: f64 },
    /// Logistic `1 / (1 + e^(-gain * (x - bias)))`, in `(0, 1)`.
    Sigmoid { bias: f64, gain: f64 },
    /// Input-free `0.5 + 0.5 * amplitude * sin(2π (t / period - phase_offset))`.
    Oscillator {
        period: f64,
        phase_offset: f64,
        amplitude: f64,
    },
}

impl Activation {
    fn apply(&self, x: f64, time: f64) -> f64 {
        match *self {
            Activation::Simple { bias, gain } => gain * (x - bias),
            Activation::Sigmoid { bias, gain } => 1.0 / (1.0 + (-gain * (x - bias)).exp()),
            Activation::Oscillator {
                period,
                phase_offset,
                amplitude,
            } => {
                if period <= 0.0 {
                    return 0.5;
                }
                0.5 + 0.5 * amplitude * (2.0 * PI * (time / period - phase_offset)).sin()
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Neuron {
    id: String,
    layer: Layer,
    activation: Option<Activation>,
}

/// A neural network controller.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    neurons: Vec<Neuron>,
    /// `weights[dst * n + src]`
    weights: Vec<f64>,
    state: Vec<f64>,
    next: Vec<f64>,
    input_idx: Vec<usize>,
    output_idx: Vec<usize>,
    inputs: Vec<f64>,
}

impl NeuralNetwork {
    /// Build the network described under `brain`.
    ///
    /// # Errors
    ///
    /// - [`RevolveError::MissingElement`] if `rv:neural_network` is absent.
    /// - [`RevolveError::Brain`] for unknown layers, neuron types, duplicate
    ///   ids, or connections to undeclared neurons.
    pub fn from_config(
        brain: &ConfigElement,
        motors: &[Motor],
        sensors: &[Sensor],
    ) -> Result<Self, RevolveError> {
        let network = brain.element("rv:neural_network")?;

        let mut neurons = Vec::new();
        let mut index = HashMap::new();
        for node in network.elements("rv:neuron") {
            let neuron = parse_neuron(node)?;
            if index.insert(neuron.id.clone(), neurons.len()).is_some() {
                return Err(RevolveError::Brain(format!("duplicate neuron id `{}`", neuron.id)));
            }
            neurons.push(neuron);
        }

        let n = neurons.len();
        let mut weights = vec![0.0; n * n];
        for conn in network.elements("rv:neural_connection") {
            let src = lookup(&index, conn.attribute_str("src")?)?;
            let dst = lookup(&index, conn.attribute_str("dst")?)?;
            if neurons[dst].layer == Layer::Input {
                return Err(RevolveError::Brain(format!(
                    "connection into input neuron `{}`",
                    neurons[dst].id
                )));
            }
            weights[dst * n + src] = conn.attribute::<f64>("weight")?;
        }

        let input_idx: Vec<usize> = (0..n).filter(|&i| neurons[i].layer == Layer::Input).collect();
        let output_idx: Vec<usize> = (0..n).filter(|&i| neurons[i].layer == Layer::Output).collect();

        let sensor_inputs: usize = sensors.iter().map(Sensor::inputs).sum();
        if input_idx.len() != sensor_inputs {
            warn!(
                input_neurons = input_idx.len(),
                sensor_inputs, "input neuron count does not match sensor inputs"
            );
        }
        if output_idx.len() != motors.len() {
            warn!(
                output_neurons = output_idx.len(),
                motors = motors.len(),
                "output neuron count does not match motors"
            );
        }

        Ok(Self {
            neurons,
            weights,
            state: vec![0.0; n],
            next: vec![0.0; n],
            input_idx,
            output_idx,
            inputs: Vec::with_capacity(sensor_inputs),
        })
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Current state of every output neuron, in declaration order.
    pub fn outputs(&self) -> Vec<f64> {
        self.output_idx.iter().map(|&i| self.state[i]).collect()
    }

    /// Run one network step and push the outputs to `motors`.
    pub fn update(&mut self, motors: &mut [Motor], sensors: &[Sensor], time: f64, step: f64) {
        read_inputs(sensors, &mut self.inputs);

        let n = self.neurons.len();
        for (k, &i) in self.input_idx.iter().enumerate() {
            self.next[i] = self.inputs.get(k).copied().unwrap_or(0.0);
        }
        for (i, neuron) in self.neurons.iter().enumerate() {
            let Some(activation) = neuron.activation else {
                continue;
            };
            let row = &self.weights[i * n..(i + 1) * n];
            let x: f64 = row.iter().zip(&self.state).map(|(w, s)| w * s).sum();
            self.next[i] = activation.apply(x, time);
        }
        std::mem::swap(&mut self.state, &mut self.next);

        for (motor, &i) in motors.iter_mut().zip(&self.output_idx) {
            motor.update(self.state[i], step);
        }
    }
}

fn parse_neuron(node: &ConfigElement) -> Result<Neuron, RevolveError> {
    let id = node.attribute_str("id")?.to_string();
    let layer = match node.attribute_str("layer")? {
        "input" => Layer::Input,
        "hidden" => Layer::Hidden,
        "output" => Layer::Output,
        other => {
            return Err(RevolveError::Brain(format!("neuron `{id}` has unknown layer `{other}`")));
        }
    };
    if layer == Layer::Input {
        return Ok(Neuron {
            id,
            layer,
            activation: None,
        });
    }

    let bias = node.attribute_or("bias", 0.0)?;
    let gain = node.attribute_or("gain", 1.0)?;
    let activation = match node.attributes.get("type").map(String::as_str).unwrap_or("simple") {
        "simple" => Activation::Simple { bias, gain },
        "sigmoid" => Activation::Sigmoid { bias, gain },
        "oscillator" => Activation::Oscillator {
            period: node.attribute_or("period", 1.0)?,
            phase_offset: node.attribute_or("phase_offset", 0.0)?,
            amplitude: node.attribute_or("amplitude", 1.0)?,
        },
        other => {
            return Err(RevolveError::Brain(format!("neuron `{id}` has unknown type `{other}`")));
        }
    };
    Ok(Neuron {
        id,
        layer,
        activation: Some(activation),
    })
}

fn lookup(index: &HashMap<String, usize>, id: &str) -> Result<usize, RevolveError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| RevolveError::Brain(format!("connection references unknown neuron `{id}`")))
}
