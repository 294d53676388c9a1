//! Frequency response of a digital filter

use std::f64::consts::{PI, TAU};

use num_complex::Complex64;
use serde::Serialize;

use super::design::{TransferFunction, Zpk};

/// Magnitudes at or below this are reported as this many dB.
const MAGNITUDE_FLOOR_DB: f64 = -400.0;

/// Complex response sampled at frequencies in rad/sample.
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    pub frequencies: Vec<f64>,
    pub response: Vec<Complex64>,
}

impl FrequencyResponse {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn magnitude_db(&self) -> Vec<f64> {
        self.response.iter().map(|h| to_db(h.norm())).collect()
    }

    pub fn phase(&self) -> Vec<f64> {
        self.response.iter().map(|h| h.arg()).collect()
    }

    pub fn unwrapped_phase(&self) -> Vec<f64> {
        unwrap(&self.phase())
    }

    /// Frequencies converted to Hz for sample rate `fs`.
    pub fn frequencies_hz(&self, fs: f64) -> Vec<f64> {
        self.frequencies.iter().map(|w| w * fs / TAU).collect()
    }

    pub fn to_points(&self, fs: f64) -> Vec<ResponsePoint> {
        let magnitude = self.magnitude_db();
        let phase = self.unwrapped_phase();
        self.frequencies
            .iter()
            .zip(magnitude)
            .zip(phase)
            .map(|((&omega, magnitude_db), phase)| ResponsePoint {
                omega,
                hz: omega * fs / TAU,
                magnitude_db,
                phase,
            })
            .collect()
    }
}

/// One row of a tabulated response
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResponsePoint {
    pub omega: f64,
    pub hz: f64,
    pub magnitude_db: f64,
    pub phase: f64,
}

pub fn to_db(magnitude: f64) -> f64 {
    if magnitude > 0.0 {
        (20.0 * magnitude.log10()).max(MAGNITUDE_FLOOR_DB)
    } else {
        MAGNITUDE_FLOOR_DB
    }
}

/// Evaluate a polynomial in z^-1 with Horner's rule.
fn polyval_inverse(coeffs: &[f64], z_inv: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
}

/// Response at arbitrary frequencies (rad/sample).
pub fn evaluate(tf: &TransferFunction, omegas: &[f64]) -> FrequencyResponse {
    let response = omegas
        .iter()
        .map(|&w| {
            let z_inv = Complex64::from_polar(1.0, -w);
            polyval_inverse(tf.b(), z_inv) / polyval_inverse(tf.a(), z_inv)
        })
        .collect();

    FrequencyResponse { frequencies: omegas.to_vec(), response }
}

/// Response of the factored form, `k * prod(z - z_i) / prod(z - p_i)`.
///
/// Stays accurate where expanding high-order polynomials does not.
pub fn evaluate_zpk(zpk: &Zpk, omegas: &[f64]) -> FrequencyResponse {
    let response = omegas
        .iter()
        .map(|&w| {
            let z = Complex64::from_polar(1.0, w);
            let num: Complex64 = zpk.zeros.iter().map(|zero| z - zero).product();
            let den: Complex64 = zpk.poles.iter().map(|pole| z - pole).product();
            num / den * zpk.gain
        })
        .collect();

    FrequencyResponse { frequencies: omegas.to_vec(), response }
}

fn grid(points: usize) -> Vec<f64> {
    (0..points).map(|k| PI * k as f64 / points as f64).collect()
}

/// Response at `points` equally spaced frequencies over [0, pi).
pub fn freqz(tf: &TransferFunction, points: usize) -> FrequencyResponse {
    evaluate(tf, &grid(points))
}

/// [`freqz`] on the factored form.
pub fn freqz_zpk(zpk: &Zpk, points: usize) -> FrequencyResponse {
    evaluate_zpk(zpk, &grid(points))
}

/// Remove 2*pi jumps between consecutive phase samples.
pub fn unwrap(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut correction = 0.0;

    for (i, &p) in phase.iter().enumerate() {
        if i > 0 {
            let delta = p - phase[i - 1];
            // Map the jump into [-pi, pi), keeping +pi for positive jumps
            let mut wrapped = (delta + PI).rem_euclid(TAU) - PI;
            if wrapped == -PI && delta > 0.0 {
                wrapped = PI;
            }
            if delta.abs() >= PI {
                correction += wrapped - delta;
            }
        }
        out.push(p + correction);
    }

    out
}
