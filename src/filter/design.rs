//! Elliptic (Cauer) lowpass design
//!
//! Order selection, analog prototype, frequency scaling and the bilinear
//! transform, producing both zeros/poles/gain and transfer-function forms.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use super::elliptic::{arc_sc_complement, ellipdeg, ellipj, ellipk, ellipkm1};
use super::response::{evaluate, evaluate_zpk};
use super::spec::FilterSpec;
use crate::error::{WavlabError, Result};

const EPSILON: f64 = 2e-16;

/// Sample rate the normalized design works at: edges are fractions of
/// Nyquist, so Nyquist is 1 and fs is 2.
const DESIGN_FS: f64 = 2.0;

/// Largest gap (dB) between the polynomial and the pole/zero response at the
/// band edges before the coefficients are flagged as inaccurate.
pub const COEFFICIENT_TOLERANCE_DB: f64 = 0.01;

/// Numerator / denominator polynomial coefficients in powers of z^-1.
///
/// Both polynomials are non-empty and `a[0]` is finite and non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferFunction {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl TransferFunction {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() {
            return Err(WavlabError::design("Numerator cannot be empty"));
        }
        match a.first() {
            Some(&a0) if a0 != 0.0 && a0.is_finite() => Ok(Self { b, a }),
            _ => Err(WavlabError::design("Leading denominator coefficient must be non-zero")),
        }
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Scale both polynomials so that `a[0] == 1`.
    pub fn normalized(&self) -> Self {
        let a0 = self.a[0];
        Self {
            b: self.b.iter().map(|c| c / a0).collect(),
            a: self.a.iter().map(|c| c / a0).collect(),
        }
    }

    pub fn order(&self) -> usize {
        self.a.len().max(self.b.len()) - 1
    }
}

/// Zeros, poles and gain.
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    /// Excess of poles over zeros
    pub fn relative_degree(&self) -> usize {
        self.poles.len().saturating_sub(self.zeros.len())
    }

    /// Digital stability: every pole strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }

    pub fn to_transfer_function(&self) -> TransferFunction {
        // Roots come in conjugate pairs, so the imaginary parts cancel.
        let b = poly(&self.zeros).iter().map(|c| self.gain * c.re).collect();
        let a = poly(&self.poles).iter().map(|c| c.re).collect();
        TransferFunction { b, a }
    }
}

/// Monic polynomial coefficients from its roots, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= root * prev;
        }
    }
    coeffs
}

/// Outcome of a lowpass design.
#[derive(Debug, Clone)]
pub struct FilterDesign {
    pub spec: FilterSpec,
    pub order: usize,
    /// Natural frequency as a fraction of Nyquist
    pub wn: f64,
    pub zpk: Zpk,
    pub tf: TransferFunction,
    /// Worst gap between `tf` and `zpk` responses at the band edges (dB)
    pub coefficient_error_db: f64,
}

impl FilterDesign {
    /// Whether the expanded (b, a) polynomials still reproduce the pole/zero
    /// response. High orders with narrow transition bands lose this.
    pub fn coefficients_accurate(&self) -> bool {
        self.coefficient_error_db <= COEFFICIENT_TOLERANCE_DB
    }
}

/// Minimum elliptic order meeting the tolerances, and its natural frequency.
///
/// `wp` and `ws` are normalized to Nyquist.
pub fn ellipord(wp: f64, ws: f64, gpass: f64, gstop: f64) -> Result<(usize, f64)> {
    if !(wp > 0.0 && wp < 1.0 && ws > 0.0 && ws < 1.0) {
        return Err(WavlabError::design("Band edges must lie strictly between 0 and Nyquist"));
    }
    if wp >= ws {
        return Err(WavlabError::design("Passband edge must be below stopband edge"));
    }
    if gpass <= 0.0 {
        return Err(WavlabError::design("gpass must be positive"));
    }
    if gpass > gstop {
        return Err(WavlabError::design("gpass must not exceed gstop"));
    }

    // prewarp
    let passb = (PI * wp / 2.0).tan();
    let stopb = (PI * ws / 2.0).tan();
    let nat = stopb / passb;

    let gstop_lin = 10f64.powf(0.1 * gstop);
    let gpass_lin = 10f64.powf(0.1 * gpass);
    let arg1 = ((gpass_lin - 1.0) / (gstop_lin - 1.0)).sqrt();
    let arg0 = 1.0 / nat;

    let m0 = arg0 * arg0;
    let m1 = arg1 * arg1;
    let ratio = ellipk(m0) * ellipkm1(m1) / (ellipkm1(m0) * ellipk(m1));
    if !ratio.is_finite() {
        return Err(WavlabError::design("Order estimate did not converge"));
    }

    let order = ratio.ceil() as usize;
    log::debug!("elliptic order estimate {:.4} -> {}", ratio, order);

    Ok((order, wp))
}

/// Analog elliptic lowpass prototype with cutoff 1 rad/s.
///
/// `rp` is the passband ripple and `rs` the stopband attenuation, in dB.
pub fn ellipap(order: usize, rp: f64, rs: f64) -> Result<Zpk> {
    if order == 0 {
        return Ok(Zpk { zeros: vec![], poles: vec![], gain: 10f64.powf(-rp / 20.0) });
    }
    if order == 1 {
        let p = -(1.0 / (10f64.powf(0.1 * rp) - 1.0)).sqrt();
        return Ok(Zpk { zeros: vec![], poles: vec![Complex64::new(p, 0.0)], gain: -p });
    }

    let eps_sq = 10f64.powf(0.1 * rp) - 1.0;
    let eps = eps_sq.sqrt();
    let ck1_sq = eps_sq / (10f64.powf(0.1 * rs) - 1.0);
    if ck1_sq == 0.0 {
        return Err(WavlabError::design("Cannot design a filter with given rp and rs specifications"));
    }

    let k_ck1 = ellipk(ck1_sq);
    let m = ellipdeg(order, ck1_sq);
    let capk = ellipk(m);

    let n = order as f64;
    let start = 1 - order % 2;
    let jacobi: Vec<_> = (start..order)
        .step_by(2)
        .map(|j| ellipj(j as f64 * capk / n, m))
        .collect();

    let mut zeros: Vec<Complex64> = jacobi
        .iter()
        .filter(|jf| jf.sn.abs() > EPSILON)
        .map(|jf| Complex64::new(0.0, 1.0 / (m.sqrt() * jf.sn)))
        .collect();
    let conj: Vec<_> = zeros.iter().map(|z| z.conj()).collect();
    zeros.extend(conj);

    let r = arc_sc_complement(1.0 / eps, ck1_sq);
    let v0 = capk * r / (n * k_ck1);
    let jv = ellipj(v0, 1.0 - m);

    let mut poles: Vec<Complex64> = jacobi
        .iter()
        .map(|jf| {
            let denom = 1.0 - (jf.dn * jv.sn).powi(2);
            -Complex64::new(jf.cn * jf.dn * jv.sn * jv.cn, jf.sn * jv.dn) / denom
        })
        .collect();

    let conj: Vec<_> = if order % 2 == 1 {
        let norm = poles.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        poles.iter().filter(|p| p.im.abs() > EPSILON * norm).map(|p| p.conj()).collect()
    } else {
        poles.iter().map(|p| p.conj()).collect()
    };
    poles.extend(conj);

    let num: Complex64 = poles.iter().map(|p| -p).product();
    let den: Complex64 = zeros.iter().map(|z| -z).product();
    let mut gain = (num / den).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }

    Ok(Zpk { zeros, poles, gain })
}

/// Move the cutoff of a unit-cutoff analog lowpass to `wo` rad/s.
pub fn lp2lp_zpk(zpk: &Zpk, wo: f64) -> Zpk {
    let degree = zpk.relative_degree() as i32;
    Zpk {
        zeros: zpk.zeros.iter().map(|z| z * wo).collect(),
        poles: zpk.poles.iter().map(|p| p * wo).collect(),
        gain: zpk.gain * wo.powi(degree),
    }
}

/// Bilinear transform from the s-plane to the z-plane at sample rate `fs`.
pub fn bilinear_zpk(zpk: &Zpk, fs: f64) -> Zpk {
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let degree = zpk.relative_degree();

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
    let poles: Vec<Complex64> = zpk.poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();

    // Zeros at infinity land on Nyquist
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    let num: Complex64 = zpk.zeros.iter().map(|z| fs2 - z).product();
    let den: Complex64 = zpk.poles.iter().map(|p| fs2 - p).product();
    let gain = zpk.gain * (num / den).re;

    Zpk { zeros, poles, gain }
}

/// Design the minimum-order elliptic lowpass meeting `spec`.
pub fn lowpass(spec: &FilterSpec) -> Result<FilterDesign> {
    spec.validate()?;

    let wp = spec.normalized_passband();
    let ws = spec.normalized_stopband();
    let (order, wn) = ellipord(wp, ws, spec.passband_max_loss, spec.stopband_min_attenuation)?;

    let prototype = ellipap(order, spec.passband_max_loss, spec.stopband_min_attenuation)?;
    let warped = 2.0 * DESIGN_FS * (PI * wn / DESIGN_FS).tan();
    let analog = lp2lp_zpk(&prototype, warped);
    let zpk = bilinear_zpk(&analog, DESIGN_FS);
    let tf = zpk.to_transfer_function();

    if tf.b.iter().chain(tf.a.iter()).any(|c| !c.is_finite()) {
        return Err(WavlabError::design("Design produced non-finite coefficients"));
    }

    let edges = [PI * wp, PI * ws];
    let expected = evaluate_zpk(&zpk, &edges).magnitude_db();
    let actual = evaluate(&tf, &edges).magnitude_db();
    let coefficient_error_db = expected
        .iter()
        .zip(&actual)
        .map(|(e, a)| {
            let gap = (e - a).abs();
            if gap.is_nan() { f64::INFINITY } else { gap }
        })
        .fold(0.0, f64::max);

    log::info!(
        "Designed order-{} elliptic lowpass: wp={:.6}, ws={:.6}, stable={}",
        order, wp, ws, zpk.is_stable()
    );
    if coefficient_error_db > COEFFICIENT_TOLERANCE_DB {
        log::warn!(
            "b/a coefficients deviate from the pole/zero response by {:.2} dB at the band edges; \
             filtering uses second-order sections instead",
            coefficient_error_db
        );
    }

    Ok(FilterDesign { spec: spec.clone(), order, wn, zpk, tf, coefficient_error_db })
}
