//! [`Sensor`] – host sensors exposed to the brain as flat input channels.

use std::fmt;
use std::sync::Arc;

use crate::model::SimModel;

/// Identity of a sensor, taken from its `rv:sensor` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfo {
    pub id: String,
    pub part_id: String,
    /// Name of the sensor on the host model.
    pub sensor: String,
}

/// Closed set of supported sensor kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorKind {
    /// Contact switch: 1.0 while touching, 0.0 otherwise.
    Touch,
    /// Linear acceleration (xyz) followed by angular velocity (xyz).
    Imu,
    /// Light intensity.
    Light,
    /// Battery charge reported by the host.
    BasicBattery,
    /// Intensity of a point source. The host reports the distance to the
    /// point; intensity is `i_max` inside radius `r` and falls off with the
    /// inverse square beyond it.
    PointIntensity { i_max: f64, r: f64 },
}

impl SensorKind {
    /// Number of input channels this kind contributes to the brain.
    pub fn inputs(&self) -> usize {
        match self {
            SensorKind::Imu => 6,
            _ => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Touch => "touch",
            SensorKind::Imu => "imu",
            SensorKind::Light => "light",
            SensorKind::BasicBattery => "basic_battery",
            SensorKind::PointIntensity { .. } => "point_intensity",
        }
    }
}

/// A sensor bound to the host model. Constructed by
/// [`SensorFactory`][crate::factory::SensorFactory].
pub struct Sensor {
    info: SensorInfo,
    kind: SensorKind,
    model: Arc<dyn SimModel>,
}

impl Sensor {
    pub(crate) fn new(info: SensorInfo, kind: SensorKind, model: Arc<dyn SimModel>) -> Self {
        Self { info, kind, model }
    }

    pub fn info(&self) -> &SensorInfo {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn part_id(&self) -> &str {
        &self.info.part_id
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn inputs(&self) -> usize {
        self.kind.inputs()
    }

    /// Write this sensor's current readings into `out[..self.inputs()]`.
    ///
    /// Channels the host cannot provide read as 0.0.
    pub fn read(&self, out: &mut [f64]) {
        let n = self.inputs().min(out.len());
        let out = &mut out[..n];
        out.fill(0.0);
        if !self.model.read_sensor(&self.info.sensor, out) {
            return;
        }

        match self.kind {
            SensorKind::Touch => {
                if let Some(v) = out.first_mut() {
                    *v = if *v > 0.0 { 1.0 } else { 0.0 };
                }
            }
            SensorKind::PointIntensity { i_max, r } => {
                if let Some(v) = out.first_mut() {
                    let distance = *v;
                    *v = if distance <= r {
                        i_max
                    } else {
                        i_max * (r / distance).powi(2)
                    };
                }
            }
            SensorKind::Imu | SensorKind::Light | SensorKind::BasicBattery => {}
        }
    }
}

impl fmt::Debug for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sensor")
            .field("info", &self.info)
            .field("kind", &self.kind)
            .field("model", &self.model.scoped_name())
            .finish()
    }
}
