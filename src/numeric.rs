//! Floating point helpers: tolerance comparisons (convenience wrappers around the `approx`
//! crate), Simpson quadrature over sub-windows via `reikna`, and Brent root finding via `roots`.

use std::rc::Rc;

use approx::AbsDiffEq;
use reikna::func;
use reikna::func::Function;
use reikna::integral::integrate_wp;
use roots::{find_root_brent, SimpleConvergency};

use crate::error::RiskError;

/// Default relative tolerance for comparing integrated doses.
pub const REL_ACC: f64 = 1e-8;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Compares if two floats are close via `approx::relative_eq!` with `max_relative = rel`.
#[must_use]
pub fn relative_eq(a: f64, b: f64, rel: f64) -> bool {
    approx::relative_eq!(a, b, max_relative = rel)
}

/// Simpson subintervals per window. `reikna::integral::integrate` scales its subinterval count
/// with the rounded window width and returns zero for windows narrower than half a unit, so the
/// count is fixed here instead.
pub const SIMPSON_SUBINTERVALS: u64 = 64;

/// Integrates `f` over `[a, b]` by splitting the interval into `pieces` equal windows and
/// applying `reikna`'s Simpson rule with [`SIMPSON_SUBINTERVALS`] to each one.
///
/// Returns `0.0` for an empty interval.
#[must_use]
pub fn integrate_windows<F>(f: F, a: f64, b: f64, pieces: usize) -> f64
where
    F: Fn(f64) -> f64 + 'static,
{
    if b <= a {
        return 0.0;
    }
    let pieces = pieces.max(1);
    let f: Function = func!(f);
    #[allow(clippy::cast_precision_loss)]
    let width = (b - a) / pieces as f64;
    (0..pieces)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let lo = a + width * i as f64;
            let hi = if i + 1 == pieces { b } else { lo + width };
            integrate_wp(&f, lo, hi, SIMPSON_SUBINTERVALS)
        })
        .sum()
}

/// Iteration cap for [`find_root`].
const MAX_ROOT_ITERATIONS: usize = 200;

/// Finds a root of `f` inside `[lo, hi]` with Brent's method. The bracket must
/// straddle a sign change. `tolerance` bounds both `|f(x)|` and the bracket width.
///
/// # Errors
/// `NumericalError` when the bracket is invalid or the search fails to converge.
pub fn find_root<F>(lo: f64, hi: f64, f: F, tolerance: f64) -> Result<f64, RiskError>
where
    F: Fn(f64) -> f64,
{
    let mut convergency = SimpleConvergency {
        eps: tolerance,
        max_iter: MAX_ROOT_ITERATIONS,
    };
    find_root_brent(lo, hi, f, &mut convergency)
        .map_err(|e| RiskError::NumericalError(format!("{e:?} in [{lo}, {hi}]")))
}
