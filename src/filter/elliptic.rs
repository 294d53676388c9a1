//! Elliptic integrals and Jacobi elliptic functions used by the Cauer design.
//!
//! All functions take the parameter `m = k^2`, not the modulus `k`.

use std::f64::consts::{FRAC_PI_2, PI};

const MACHEP: f64 = 1.11022302462515654042e-16;

/// Arithmetic-geometric mean of two non-negative numbers.
fn agm(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..64 {
        if (a - b).abs() <= f64::EPSILON * a {
            break;
        }
        let next_a = 0.5 * (a + b);
        b = (a * b).sqrt();
        a = next_a;
    }
    a
}

/// Complete elliptic integral of the first kind, K(m).
pub fn ellipk(m: f64) -> f64 {
    if m.is_nan() || m > 1.0 {
        return f64::NAN;
    }
    if m == 1.0 {
        return f64::INFINITY;
    }
    FRAC_PI_2 / agm(1.0, (1.0 - m).sqrt())
}

/// K(1 - p), accurate for small `p` where `1 - p` would round to 1.
pub fn ellipkm1(p: f64) -> f64 {
    if p.is_nan() || p < 0.0 {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::INFINITY;
    }
    FRAC_PI_2 / agm(1.0, p.sqrt())
}

/// Values of the Jacobi elliptic functions at one argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jacobi {
    pub sn: f64,
    pub cn: f64,
    pub dn: f64,
    /// Amplitude, am(u | m)
    pub ph: f64,
}

/// Jacobi elliptic functions sn, cn, dn and the amplitude, via descending
/// Landen transformation on the AGM scale.
pub fn ellipj(u: f64, m: f64) -> Jacobi {
    if !(0.0..=1.0).contains(&m) {
        return Jacobi { sn: f64::NAN, cn: f64::NAN, dn: f64::NAN, ph: f64::NAN };
    }

    if m < 1.0e-9 {
        let t = u.sin();
        let b = u.cos();
        let ai = 0.25 * m * (u - t * b);
        return Jacobi {
            sn: t - ai * b,
            cn: b + ai * t,
            dn: 1.0 - 0.5 * m * t * t,
            ph: u - ai,
        };
    }

    if m >= 0.9999999999 {
        let mut ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let phi = 1.0 / b;
        let twon = b * u.sinh();
        let sn = t + ai * (twon - u) / (b * b);
        let ph = 2.0 * u.exp().atan() - FRAC_PI_2 + ai * (twon - u) / b;
        ai *= t * phi;
        return Jacobi {
            sn,
            cn: phi - ai * (twon - u),
            dn: phi + ai * (twon + u),
            ph,
        };
    }

    let mut a = [0.0f64; 9];
    let mut c = [0.0f64; 9];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut twon = 1.0;
    let mut i = 0;

    while (c[i] / a[i]).abs() > MACHEP && i < 8 {
        let ai = a[i];
        i += 1;
        c[i] = 0.5 * (ai - b);
        let t = (ai * b).sqrt();
        a[i] = 0.5 * (ai + b);
        b = t;
        twon *= 2.0;
    }

    // backward recurrence
    let mut phi = twon * a[i] * u;
    let mut prev = phi;
    while i > 0 {
        let t = c[i] * phi.sin() / a[i];
        prev = phi;
        phi = 0.5 * (t.asin() + phi);
        i -= 1;
    }

    let sn = phi.sin();
    let cn = phi.cos();
    let dn_fix = cn / (phi - prev).cos();
    let dn = if dn_fix.abs() < 0.1 {
        (1.0 - m * sn * sn).sqrt()
    } else {
        dn_fix
    };

    Jacobi { sn, cn, dn, ph: phi }
}

/// Carlson's symmetric integral R_F(x, y, z).
fn carlson_rf(mut x: f64, mut y: f64, mut z: f64) -> f64 {
    const ERRTOL: f64 = 0.0008;
    const C1: f64 = 1.0 / 24.0;
    const C2: f64 = 0.1;
    const C3: f64 = 3.0 / 44.0;
    const C4: f64 = 1.0 / 14.0;

    let mut mean;
    let (mut dx, mut dy, mut dz);
    loop {
        let (sx, sy, sz) = (x.sqrt(), y.sqrt(), z.sqrt());
        let lambda = sx * (sy + sz) + sy * sz;
        x = 0.25 * (x + lambda);
        y = 0.25 * (y + lambda);
        z = 0.25 * (z + lambda);
        mean = (x + y + z) / 3.0;
        dx = (mean - x) / mean;
        dy = (mean - y) / mean;
        dz = (mean - z) / mean;
        if dx.abs().max(dy.abs()).max(dz.abs()) <= ERRTOL {
            break;
        }
    }

    let e2 = dx * dy - dz * dz;
    let e3 = dx * dy * dz;
    (1.0 + (C1 * e2 - C2 - C3 * e3) * e2 + C4 * e3) / mean.sqrt()
}

/// Incomplete elliptic integral of the first kind, F(phi | m), for
/// `|phi| <= pi/2`.
pub fn ellipf(phi: f64, m: f64) -> f64 {
    let (s, c) = phi.sin_cos();
    s * carlson_rf(c * c, 1.0 - m * s * s, 1.0)
}

/// Solve `sc(z | 1 - m1) = w` for real `w`.
///
/// Written in terms of the complementary parameter so that tiny `m1`
/// keeps full precision.
pub fn arc_sc_complement(w: f64, m1: f64) -> f64 {
    let phi = w.atan();
    let (s, c) = phi.sin_cos();
    s * carlson_rf(c * c, c * c + m1 * s * s, 1.0)
}

/// Solve the degree equation: the parameter `m` of an order-`n` elliptic
/// filter whose discrimination parameter is `m1`.
pub fn ellipdeg(n: usize, m1: f64) -> f64 {
    const MMAX: i32 = 7;

    let k1 = ellipk(m1);
    let k1p = ellipkm1(m1);
    let q1 = (-PI * k1p / k1).exp();
    let q = q1.powf(1.0 / n as f64);

    let num: f64 = (0..=MMAX).map(|i| q.powi(i * (i + 1))).sum();
    let den: f64 = 1.0 + 2.0 * (1..=MMAX + 1).map(|i| q.powi(i * i)).sum::<f64>();

    16.0 * q * (num / den).powi(4)
}
