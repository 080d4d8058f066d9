/// Asserts that two `f64` expressions differ by less than an absolute tolerance.
#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, $a, $b
            );
        }
    };
}
pub use assert_almost_eq;

/// Asserts that two `f64` expressions agree to within a relative tolerance.
#[macro_export]
macro_rules! assert_rel_eq {
    ($a:expr, $b:expr, $rel:expr $(,)?) => {
        if !$crate::numeric::relative_eq($a, $b, $rel) {
            panic!(
                "assertion failed: `relative difference < {:e}`, (left: `{}`, right: `{}`)",
                $rel, $a, $b
            );
        }
    };
}
pub use assert_rel_eq;
