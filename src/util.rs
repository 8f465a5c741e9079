use na::{DVector, SVector};

use crate::types::Float;

/// Copy a fixed-size vector into a dynamically sized one
pub fn to_dvector<const N: usize>(v: &SVector<Float, N>) -> DVector<Float> {
    DVector::from_column_slice(v.as_slice())
}

/// Largest absolute value of a slice, 0 for an empty slice
pub fn max_abs(values: &[Float]) -> Float {
    values.iter().fold(0., |acc: Float, v| acc.max(v.abs()))
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        let diff = (left - right).abs();
        if diff > tol {
            panic!(
                "assertion failed: {} ~= {} \
                (tolerance: {}, difference: {})",
                left, right, tol, diff
            );
        }
    };
}

#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (a, b) in left.iter().zip(right.iter()) {
            $crate::assert_close!(a, b, tol);
        }
    };
}
