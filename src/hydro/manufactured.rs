//! The manufactured solution `h = 1 + A sin(πx) cos(πt)`, `u = A cos(πx)
//! sin(πt)` and the source terms derived from it. Height and velocity (and
//! their derivatives) are defined exactly once, here; everything else is
//! composed from them.

use std::f64::consts::PI;

use super::swe::{Conserved, ShallowWater};

/// Amplitude of the height and velocity perturbations.
pub const AMPLITUDE: f64 = 0.1;




// ============================================================================
pub fn height(x: f64, t: f64) -> f64 {
    1.0 + AMPLITUDE * (PI * x).sin() * (PI * t).cos()
}

pub fn velocity(x: f64, t: f64) -> f64 {
    AMPLITUDE * (PI * x).cos() * (PI * t).sin()
}

pub fn height_dt(x: f64, t: f64) -> f64 {
    -AMPLITUDE * PI * (PI * x).sin() * (PI * t).sin()
}

pub fn velocity_dt(x: f64, t: f64) -> f64 {
    AMPLITUDE * PI * (PI * x).cos() * (PI * t).cos()
}

pub fn height_dx(x: f64, t: f64) -> f64 {
    AMPLITUDE * PI * (PI * x).cos() * (PI * t).cos()
}

pub fn velocity_dx(x: f64, t: f64) -> f64 {
    -AMPLITUDE * PI * (PI * x).sin() * (PI * t).sin()
}




// ============================================================================
/**
 * The exact conserved state `(h, hu)` at position `x` and time `t`.
 */
pub fn solution(x: f64, t: f64) -> Conserved {
    let h = height(x, t);
    Conserved(h, h * velocity(x, t))
}

/**
 * The source terms `(S_h, S_hu) = (∂h/∂t, ∂(hu)/∂t)`, with the momentum term
 * expanded by the product rule.
 */
pub fn time_derivative(x: f64, t: f64) -> Conserved {
    let h = height(x, t);
    let u = velocity(x, t);
    let h_t = height_dt(x, t);
    Conserved(h_t, h * velocity_dt(x, t) + u * h_t)
}

pub fn source_height(x: f64, t: f64) -> f64 {
    time_derivative(x, t).height()
}

pub fn source_momentum(x: f64, t: f64) -> f64 {
    time_derivative(x, t).momentum()
}

/**
 * The exact spatial derivative of the flux vector, `(∂(hu)/∂x, ∂(hu^2/h +
 * g h^2 / 2)/∂x)`.
 */
pub fn flux_divergence(x: f64, t: f64, swe: &ShallowWater) -> Conserved {
    let h = height(x, t);
    let u = velocity(x, t);
    let h_x = height_dx(x, t);
    let u_x = velocity_dx(x, t);

    Conserved(
        h_x * u + h * u_x,
        h_x * u * u + 2.0 * h * u * u_x + swe.gravity() * h * h_x)
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    fn samples() -> impl Iterator<Item = (f64, f64)> {
        (0..=20).flat_map(|i| (0..=20).map(move |j| (i as f64 / 20.0, j as f64 * 0.17 - 1.0)))
    }

    #[test]
    fn height_stays_positive() {
        for (x, t) in samples() {
            assert!(solution(x, t).height() > 0.0);
        }
    }

    #[test]
    fn source_terms_match_finite_difference_in_time() {
        let eps = 1e-6;

        for (x, t) in samples() {
            let up = solution(x, t + eps);
            let um = solution(x, t - eps);
            let dh = (up.height() - um.height()) / (2.0 * eps);
            let dhu = (up.momentum() - um.momentum()) / (2.0 * eps);
            assert!((source_height(x, t) - dh).abs() < 1e-7);
            assert!((source_momentum(x, t) - dhu).abs() < 1e-7);
        }
    }

    #[test]
    fn flux_divergence_matches_finite_difference_in_space() {
        let eps = 1e-6;
        let swe = ShallowWater::new(9.81);

        for (x, t) in samples() {
            let fp = swe.flux_vector(&solution(x + eps, t)).unwrap();
            let fm = swe.flux_vector(&solution(x - eps, t)).unwrap();
            let expected = (fp - fm) * (0.5 / eps);
            let actual = flux_divergence(x, t, &swe);
            assert!((actual.height() - expected.height()).abs() < 1e-6);
            assert!((actual.momentum() - expected.momentum()).abs() < 1e-6);
        }
    }

    #[test]
    fn solution_is_a_pure_function() {
        for (x, t) in samples() {
            let a = solution(x, t);
            let b = solution(x, t);
            assert_eq!(a.height().to_bits(), b.height().to_bits());
            assert_eq!(a.momentum().to_bits(), b.momentum().to_bits());
        }
    }
}
