use std::f64::consts::PI;

/// Gaussian-modulated sinusoid driven into a single node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianPulse {
    pub wavelength: f64,  // Carrier wavelength (m)
    pub width: f64,       // Full pulse width (s)
    pub time_offset: f64, // Envelope peak time (s)
    pub wave_speed: f64,  // Propagation speed (m/s)
}

impl GaussianPulse {
    pub fn new(wavelength: f64, width: f64, time_offset: f64, wave_speed: f64) -> Self {
        Self {
            wavelength,
            width,
            time_offset,
            wave_speed,
        }
    }

    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI * self.wave_speed / self.wavelength
    }

    pub fn envelope(&self, t: f64) -> f64 {
        let tau = (t - self.time_offset) / (self.width / 2.0);
        (-tau * tau).exp()
    }

    pub fn carrier(&self, t: f64) -> f64 {
        (self.angular_frequency() * t).sin()
    }

    /// Source amplitude at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        self.envelope(t) * self.carrier(t)
    }
}
