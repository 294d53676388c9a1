//! Lowpass design inputs

use serde::{Deserialize, Serialize};

use crate::error::{WavlabError, Result};

/// Band edges and tolerances of a digital lowpass filter.
///
/// Edges are in Hz; they are normalized against the Nyquist frequency
/// before design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub sampling_frequency: f64,
    pub passband_edge: f64,
    pub stopband_edge: f64,
    /// Maximum passband loss (dB)
    pub passband_max_loss: f64,
    /// Minimum stopband attenuation (dB)
    pub stopband_min_attenuation: f64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            sampling_frequency: 44_100.0,
            passband_edge: 1000.0,
            stopband_edge: 1200.0,
            passband_max_loss: 1.0,
            stopband_min_attenuation: 40.0,
        }
    }
}

impl FilterSpec {
    pub fn nyquist(&self) -> f64 {
        self.sampling_frequency / 2.0
    }

    /// Passband edge as a fraction of Nyquist
    pub fn normalized_passband(&self) -> f64 {
        self.passband_edge / self.nyquist()
    }

    /// Stopband edge as a fraction of Nyquist
    pub fn normalized_stopband(&self) -> f64 {
        self.stopband_edge / self.nyquist()
    }

    /// Convert a frequency in Hz to rad/sample
    pub fn hz_to_omega(&self, hz: f64) -> f64 {
        std::f64::consts::PI * hz / self.nyquist()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_frequency.is_finite() && self.sampling_frequency > 0.0) {
            return Err(WavlabError::design("Sampling frequency must be greater than 0"));
        }

        let nyquist = self.nyquist();
        for (name, edge) in [("Passband", self.passband_edge), ("Stopband", self.stopband_edge)] {
            if !(edge > 0.0 && edge < nyquist) {
                return Err(WavlabError::design(format!(
                    "{} edge {} Hz must lie in (0, {}) Hz", name, edge, nyquist
                )));
            }
        }

        if self.passband_edge >= self.stopband_edge {
            return Err(WavlabError::design("Lowpass requires passband edge below stopband edge"));
        }

        for (name, db) in [
            ("Passband loss", self.passband_max_loss),
            ("Stopband attenuation", self.stopband_min_attenuation),
        ] {
            if !db.is_finite() {
                return Err(WavlabError::design(format!("{} must be a finite number of dB, got {}", name, db)));
            }
        }

        if !(self.passband_max_loss > 0.0) {
            return Err(WavlabError::design("Passband loss must be greater than 0 dB"));
        }
        if self.passband_max_loss >= self.stopband_min_attenuation {
            return Err(WavlabError::design("Passband loss must be less than stopband attenuation"));
        }

        Ok(())
    }
}
