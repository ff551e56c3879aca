//! Slope-limited derivative estimates.
//!
//! The limiter is the generalized minmod (monotonized central) limiter with
//! `THETA = 2`, written branch-free: the sign agreement test is folded into
//! `copysign`, so a derivative is zero whenever the one-sided differences
//! disagree in sign and otherwise has magnitude
//! `min(THETA |du_left|, THETA |du_right|, |du_center| / 2)`.
//!
//! Derivatives are undivided (they are slopes times the cell width), which
//! is the form the predictor and corrector consume.

/// Limiter steepness. Larger values let steeper one-sided slopes through.
pub const THETA: f32 = 2.0;

const QUARTER: f32 = 0.25;




/// `2 s minmod(a, b)`: zero when `a` and `b` have opposite signs, otherwise
/// `2 s` times the smaller magnitude, signed like the arguments.
#[inline]
pub fn xmin2s(s: f32, a: f32, b: f32) -> f32 {
    let sa = s.copysign(a);
    let sb = s.copysign(b);
    (sa + sb) * a.abs().min(b.abs())
}




/// Limited slope at `u0` given its left and right neighbours.
#[inline]
pub fn limdiff(um: f32, u0: f32, up: f32) -> f32 {
    let du_left = u0 - um;
    let du_right = up - u0;
    let du_center = up - um;
    xmin2s(QUARTER, xmin2s(THETA, du_left, du_right), du_center)
}




/**
 * Limited derivatives along a row: `du[i] = limdiff(u[i-1], u[i], u[i+1])`
 * for `i` in `1..n-1`, where `n = u.len()`. The end points of `du` are not
 * touched; they are never limiter targets.
 */
pub fn limited_deriv_row(du: &mut [f32], u: &[f32]) {
    debug_assert_eq!(du.len(), u.len());

    if u.len() < 3 {
        return;
    }
    let n = u.len();

    for (d, w) in du[1..n - 1].iter_mut().zip(u.windows(3)) {
        *d = limdiff(w[0], w[1], w[2]);
    }
}




/**
 * Limited derivatives across rows: `du[i] = limdiff(um[i], u0[i], up[i])`
 * for `i` in `1..n-1`, where `um`, `u0`, `up` are consecutive rows of the
 * same field.
 */
pub fn limited_deriv_across(du: &mut [f32], um: &[f32], u0: &[f32], up: &[f32]) {
    debug_assert!(um.len() == u0.len() && u0.len() == up.len() && du.len() == u0.len());

    if u0.len() < 3 {
        return;
    }
    let n = u0.len();

    for (d, ((m, c), p)) in du[1..n - 1]
        .iter_mut()
        .zip(um[1..n - 1].iter().zip(&u0[1..n - 1]).zip(&up[1..n - 1]))
    {
        *d = limdiff(*m, *c, *p);
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{limdiff, limited_deriv_across, limited_deriv_row, THETA};
    use proptest::prelude::*;

    #[test]
    fn extremum_gives_zero_slope() {
        assert_eq!(limdiff(0.0, 1.0, 0.0), 0.0);
        assert_eq!(limdiff(1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn linear_data_is_reproduced() {
        assert_eq!(limdiff(1.0, 2.0, 3.0), 1.0);
        assert_eq!(limdiff(3.0, 2.0, 1.0), -1.0);
    }

    #[test]
    fn steep_side_is_capped_by_central_difference() {
        // One-sided differences 1 and 3: MC gives min(2, 6, 2) = 2.
        assert_eq!(limdiff(0.0, 1.0, 4.0), 2.0);
        // One-sided differences 1 and 9: MC gives min(2, 18, 5) = 2.
        assert_eq!(limdiff(0.0, 1.0, 10.0), 2.0);
    }

    #[test]
    fn row_derivative_skips_end_points() {
        let u = [0.0, 1.0, 2.0, 3.0, 2.0];
        let mut du = [9.0; 5];
        limited_deriv_row(&mut du, &u);
        assert_eq!(du, [9.0, 1.0, 1.0, 0.0, 9.0]);
    }

    #[test]
    fn across_derivative_matches_pointwise_limiter() {
        let um = [0.0, 0.0, 0.0, 0.0];
        let u0 = [1.0, 1.0, 1.0, 1.0];
        let up = [2.0, 0.0, 4.0, 2.0];
        let mut du = [9.0; 4];
        limited_deriv_across(&mut du, &um, &u0, &up);
        assert_eq!(du, [9.0, 0.0, 2.0, 9.0]);
    }

    proptest! {
        #[test]
        fn limited_slope_is_bounded(
            um in -1.0e3f32..1.0e3,
            u0 in -1.0e3f32..1.0e3,
            up in -1.0e3f32..1.0e3)
        {
            let du_left = u0 - um;
            let du_right = up - u0;
            let du_center = up - um;
            let d = limdiff(um, u0, up);
            let slack = 1.0e-4 * (1.0 + du_left.abs() + du_right.abs());

            prop_assert!(d.abs() <= THETA * du_left.abs().min(du_right.abs()) + slack);
            prop_assert!(d.abs() <= 0.5 * du_center.abs() + slack);
        }

        #[test]
        fn slope_vanishes_at_sign_change(
            um in -1.0e3f32..1.0e3,
            u0 in -1.0e3f32..1.0e3,
            up in -1.0e3f32..1.0e3)
        {
            prop_assume!((u0 - um) * (up - u0) < 0.0);
            prop_assert_eq!(limdiff(um, u0, up), 0.0);
        }

        #[test]
        fn slope_follows_monotone_data(
            um in -1.0e3f32..1.0e3,
            u0 in -1.0e3f32..1.0e3,
            up in -1.0e3f32..1.0e3)
        {
            prop_assume!((u0 - um) * (up - u0) > 0.0);
            let d = limdiff(um, u0, up);
            prop_assert!(d * (up - um) >= 0.0);
        }
    }
}
