//! Elliptic (Cauer) analog prototype design
//!
//! Jacobi elliptic functions are evaluated through descending Landen
//! transformations, which keeps everything in closed form and works on
//! complex arguments. The prototype has its passband edge at 1 rad/s.
//!
//! ## Outline
//!
//! 1. `k1 = ep / es` from the passband/stopband ripple factors
//! 2. solve the degree equation for the selectivity `k` at the requested order
//! 3. zeros at `j / (k cd(u_i K, k))`, poles at `j cd((u_i - j v0) K, k)`
//!    with `u_i = (2i + 1) / N` and `v0 = -j asn(j / ep, k1) / N`
//! 4. odd orders get one real pole at `j sn(j v0 K, k)`

use num_complex::Complex64;
use std::f64::consts::PI;

/// Number of Landen iterations; the moduli shrink quadratically so this is
/// well below single-precision epsilon for any practical design.
pub const LANDEN_ITERATIONS: usize = 7;

/// Analog zero/pole/gain description, `H(s) = k Π(s - z) / Π(s - p)`.
#[derive(Debug, Clone)]
pub struct AnalogPrototype {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

/// Descending Landen sequence of elliptic moduli starting from `k`.
pub fn landen(k: f64, iterations: usize) -> Vec<f64> {
    let mut v = Vec::with_capacity(iterations);
    let mut k = k;
    for _ in 0..iterations {
        let kp = (1.0 - k * k).sqrt();
        k = (k / (1.0 + kp)).powi(2);
        v.push(k);
    }
    v
}

/// Complete elliptic integral of the first kind, returns `(K(k), K(k'))`.
pub fn ellipk(k: f64, iterations: usize) -> (f64, f64) {
    let kmin: f64 = 4e-4;
    let kmax = (1.0 - kmin * kmin).sqrt();
    let kp = (1.0 - k * k).sqrt();

    let complete = |k: f64, kp: f64| -> f64 {
        if k > kmax {
            // asymptotic form near k = 1
            let l = -(kp / 4.0).ln();
            l + (l - 1.0) * kp * kp / 4.0
        } else {
            let v = landen(k, iterations);
            PI / 2.0 * v.iter().map(|vi| 1.0 + vi).product::<f64>()
        }
    };

    (complete(k, kp), complete(kp, k))
}

/// Solve the degree equation `N K'/K = K1'/K1` for `k` via the nome series.
pub fn ellipdeg(order: f64, k1: f64, iterations: usize) -> f64 {
    let (big_k1, big_k1p) = ellipk(k1, iterations);
    let q1 = (-PI * big_k1p / big_k1).exp();
    let q = q1.powf(1.0 / order);

    let b: f64 = (0..iterations)
        .map(|m| q.powi((m * (m + 1)) as i32))
        .sum();
    let a: f64 = (1..iterations)
        .map(|m| q.powi((m * m) as i32))
        .sum();
    let g = b / (1.0 + 2.0 * a);
    4.0 * q.sqrt() * g * g
}

/// `cd(u K, k)` for complex `u`.
pub fn cde(u: Complex64, k: f64, iterations: usize) -> Complex64 {
    let v = landen(k, iterations);
    let mut w = (u * (PI / 2.0)).cos();
    for &vi in v.iter().rev() {
        w = w * (1.0 + vi) / (1.0 + vi * w * w);
    }
    w
}

/// `sn(u K, k)` for complex `u`.
pub fn sne(u: Complex64, k: f64, iterations: usize) -> Complex64 {
    let v = landen(k, iterations);
    let mut w = (u * (PI / 2.0)).sin();
    for &vi in v.iter().rev() {
        w = w * (1.0 + vi) / (1.0 + vi * w * w);
    }
    w
}

/// Inverse of [`cde`]: returns `u` such that `cd(u K, k) = w`.
pub fn acde(w: Complex64, k: f64, iterations: usize) -> Complex64 {
    let v = landen(k, iterations);
    let one = Complex64::new(1.0, 0.0);
    let mut w = w;
    for i in 0..iterations {
        let v1 = if i == 0 { k } else { v[i - 1] };
        w = w / (one + (one - w * w * (v1 * v1)).sqrt()) * (2.0 / (1.0 + v[i]));
    }
    w.acos() * (2.0 / PI)
}

/// Inverse of [`sne`]: returns `u` such that `sn(u K, k) = w`.
pub fn asne(w: Complex64, k: f64, iterations: usize) -> Complex64 {
    Complex64::new(1.0, 0.0) - acde(w, k, iterations)
}

/// Elliptic low-pass prototype of the given order.
///
/// * `ep` - passband ripple factor, `sqrt(10^(Ap/10) - 1)`
/// * `es` - stopband ripple factor, `sqrt(10^(As/10) - 1)`
///
/// Zeros and poles come in conjugate pairs `(x, x*)`; an odd order appends a
/// single real pole last. The gain is left at one and normalized after the
/// bilinear transform.
pub fn ellip_prototype(order: usize, ep: f64, es: f64) -> AnalogPrototype {
    let j = Complex64::new(0.0, 1.0);
    let n = order as f64;
    let k1 = ep / es;
    let k = ellipdeg(n, k1, LANDEN_ITERATIONS);

    let half = order / 2;
    let mut zeros = Vec::with_capacity(2 * half);
    let mut poles = Vec::with_capacity(order);

    let v0 = -j * asne(j / ep, k1, LANDEN_ITERATIONS) / n;

    for i in 0..half {
        let u = Complex64::new((2 * i + 1) as f64 / n, 0.0);

        let zeta = cde(u, k, LANDEN_ITERATIONS);
        let zero = j / (zeta * k);
        zeros.push(zero);
        zeros.push(zero.conj());

        let pole = j * cde(u - j * v0, k, LANDEN_ITERATIONS);
        poles.push(pole);
        poles.push(pole.conj());
    }

    if order % 2 == 1 {
        let pole = j * sne(j * v0, k, LANDEN_ITERATIONS);
        poles.push(Complex64::new(pole.re, 0.0));
    }

    AnalogPrototype {
        zeros,
        poles,
        gain: 1.0,
    }
}
