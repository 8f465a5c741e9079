use na::{DMatrix, DVector};

use crate::{
    error::{Error, Result},
    params::check_bound_order,
    types::Float,
};

/// Convex polytope in half-space representation
///     { x | A x <= b }
#[derive(Clone, Debug, PartialEq)]
pub struct Polyhedron {
    A: DMatrix<Float>,
    b: DVector<Float>,
}

impl Polyhedron {
    pub fn new(A: DMatrix<Float>, b: DVector<Float>) -> Result<Self> {
        if A.nrows() != b.len() {
            return Err(Error::DimensionMismatch {
                what: "polyhedron rows",
                expected: A.nrows(),
                got: b.len(),
            });
        }
        Ok(Polyhedron { A, b })
    }

    /// Axis-aligned box lower <= x <= upper, written as
    ///     |  I | x <= |  upper |
    ///     | -I |      | -lower |
    pub fn from_bounds(lower: &[Float], upper: &[Float]) -> Result<Self> {
        check_bound_order("polyhedron", lower, upper)?;
        let n = lower.len();
        let mut A = DMatrix::zeros(2 * n, n);
        A.view_mut((0, 0), (n, n)).fill_with_identity();
        A.view_mut((n, 0), (n, n)).copy_from(&-DMatrix::<Float>::identity(n, n));
        let b = DVector::from_iterator(
            2 * n,
            upper.iter().cloned().chain(lower.iter().map(|l| -l)),
        );
        Ok(Polyhedron { A, b })
    }

    pub fn dimension(&self) -> usize {
        self.A.ncols()
    }

    pub fn A(&self) -> &DMatrix<Float> {
        &self.A
    }

    pub fn b(&self) -> &DVector<Float> {
        &self.b
    }

    /// True if every inequality holds up to tol
    pub fn contains(&self, x: &[Float], tol: Float) -> bool {
        if x.len() != self.dimension() {
            return false;
        }
        let x = DVector::from_column_slice(x);
        (&self.A * x - &self.b).iter().all(|r| *r <= tol)
    }

    /// Tightest per-axis upper bound, if the polytope has one for every axis.
    /// Only single-variable rows are considered.
    pub fn upper(&self) -> Option<DVector<Float>> {
        self.axis_bounds(1.)
    }

    /// Tightest per-axis lower bound, see `upper`.
    pub fn lower(&self) -> Option<DVector<Float>> {
        self.axis_bounds(-1.).map(|v| -v)
    }

    fn axis_bounds(&self, sign: Float) -> Option<DVector<Float>> {
        let n = self.dimension();
        let mut bounds = DVector::from_element(n, Float::INFINITY);
        for (row, b) in self.A.row_iter().zip(self.b.iter()) {
            let nonzero: Vec<(usize, Float)> = row
                .iter()
                .enumerate()
                .filter(|(_, a)| **a != 0.)
                .map(|(i, a)| (i, *a))
                .collect();
            if let [(i, a)] = nonzero.as_slice() {
                if a.signum() == sign {
                    bounds[*i] = bounds[*i].min(b / a.abs());
                }
            }
        }
        if bounds.iter().all(|b| b.is_finite()) {
            Some(bounds)
        } else {
            None
        }
    }

    /// True if the polytope's axis bounds lie inside [lower, upper]
    pub fn is_within_box(&self, lower: &[Float], upper: &[Float]) -> bool {
        match (self.lower(), self.upper()) {
            (Some(lo), Some(up)) => {
                lo.len() == lower.len()
                    && up.len() == upper.len()
                    && lo.iter().zip(lower.iter()).all(|(a, b)| a >= b)
                    && up.iter().zip(upper.iter()).all(|(a, b)| a <= b)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod polytope_tests {
    use rand::Rng;

    use crate::assert_vec_close;

    use super::*;

    #[test]
    fn box_structure() {
        let P = Polyhedron::from_bounds(&[0., -1.], &[1., 2.]).unwrap();
        assert_eq!(P.A().shape(), (4, 2));
        assert_eq!(P.b().as_slice(), &[1., 2., 0., 1.]);
        assert_eq!(P.A()[(0, 0)], 1.);
        assert_eq!(P.A()[(2, 0)], -1.);
        assert_eq!(P.A()[(3, 1)], -1.);
        assert_eq!(P.A()[(0, 1)], 0.);
    }

    #[test]
    fn box_contains_corners_and_center() {
        let lower = [0., -1., 3.];
        let upper = [1., 2., 3.5];
        let P = Polyhedron::from_bounds(&lower, &upper).unwrap();

        assert!(P.contains(&lower, 1e-12));
        assert!(P.contains(&upper, 1e-12));
        assert!(P.contains(&[0.5, 0.5, 3.25], 0.));
        assert!(!P.contains(&[1.1, 0., 3.2], 1e-12));
        assert!(!P.contains(&[0.5, 0., 2.9], 1e-12));
        assert!(!P.contains(&[0.5, 0.], 1e-12));
    }

    #[test]
    fn random_points_match_box_test() {
        let mut rng = rand::rng();
        let lower = [-0.3, -0.2, 0.];
        let upper = [0.3, 0.2, 0.1];
        let P = Polyhedron::from_bounds(&lower, &upper).unwrap();

        for _ in 0..200 {
            let x: Vec<Float> = (0..3).map(|_| rng.random_range(-0.5..0.5)).collect();
            let in_box = x
                .iter()
                .zip(lower.iter().zip(upper.iter()))
                .all(|(x, (lo, up))| x >= lo && x <= up);
            assert_eq!(P.contains(&x, 0.), in_box, "x: {:?}", x);
        }
    }

    #[test]
    fn recovers_bounds() {
        let P = Polyhedron::from_bounds(&[0., -1.], &[1., 2.]).unwrap();
        assert_vec_close!(P.lower().unwrap(), [0., -1.], 1e-12);
        assert_vec_close!(P.upper().unwrap(), [1., 2.], 1e-12);
        assert!(P.is_within_box(&[-1., -1.], &[1., 3.]));
        assert!(!P.is_within_box(&[0.5, -1.], &[1., 3.]));
    }

    #[test]
    fn rejects_reversed_bounds() {
        assert!(matches!(
            Polyhedron::from_bounds(&[1.], &[0.]),
            Err(Error::BoundOrder { index: 0, .. })
        ));
        assert!(Polyhedron::from_bounds(&[1., 2.], &[3.]).is_err());
    }

    #[test]
    fn unbounded_axis_has_no_box() {
        let A = DMatrix::from_row_slice(2, 2, &[1., 0., 1., 1.]);
        let b = DVector::from_column_slice(&[1., 1.]);
        let P = Polyhedron::new(A, b).unwrap();
        assert!(P.upper().is_none());
        assert!(P.contains(&[0., 0.], 0.));
    }
}
