//! Real roots of low-degree polynomials.
//!
//! Leading coefficients that are negligible relative to the largest coefficient are treated as
//! zero, so a cubic that degenerates into a quadratic or a line (collinear Bézier control
//! points, for example) still reports its roots.

const RELATIVE_EPSILON: f64 = 1e-12;

/// Real roots of `a·t³ + b·t² + c·t + d = 0`, unordered, possibly repeated.
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    if scale == 0.0 || !scale.is_finite() {
        return Vec::new();
    }
    let eps = scale * RELATIVE_EPSILON;
    if a.abs() <= eps {
        return quadratic_roots_eps(b, c, d, eps);
    }

    let b = b / a;
    let c = c / a;
    let d = d / a;
    let shift = -b / 3.0;

    let q = (3.0 * c - b * b) / 9.0;
    let r = (9.0 * b * c - 27.0 * d - 2.0 * b * b * b) / 54.0;
    let disc = q * q * q + r * r;

    if disc > 0.0 {
        let sq = disc.sqrt();
        let s = (r + sq).cbrt();
        let t = (r - sq).cbrt();
        vec![shift + s + t]
    } else if disc == 0.0 {
        let s = r.cbrt();
        vec![shift + 2.0 * s, shift - s]
    } else {
        let theta = (r / (-q * q * q).sqrt()).clamp(-1.0, 1.0).acos();
        let m = 2.0 * (-q).sqrt();
        let tau = std::f64::consts::TAU;
        vec![
            shift + m * (theta / 3.0).cos(),
            shift + m * ((theta + tau) / 3.0).cos(),
            shift + m * ((theta + 2.0 * tau) / 3.0).cos(),
        ]
    }
}

/// Real roots of `a·t² + b·t + c = 0`.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 || !scale.is_finite() {
        return Vec::new();
    }
    quadratic_roots_eps(a, b, c, scale * RELATIVE_EPSILON)
}

fn quadratic_roots_eps(a: f64, b: f64, c: f64, eps: f64) -> Vec<f64> {
    if a.abs() <= eps {
        if b.abs() <= eps {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // Numerically stable form: avoid subtracting nearly equal quantities.
    let sq = disc.sqrt();
    let q = -0.5 * (b + b.signum() * sq);
    let first = q / a;
    if q == 0.0 {
        return vec![first, -first];
    }
    vec![first, c / q]
}
