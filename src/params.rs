use na::{DMatrix, SMatrix, SVector, Vector2};
use serde::{Deserialize, Serialize};

use crate::{
    control::mpc::{AffineModel, MpcProblem},
    error::{Error, Result},
    polytope::Polyhedron,
    types::Float,
    PI,
};

/// Number of states of the ball-and-floor system
pub const NX: usize = 10;
/// Number of inputs (floor acceleration)
pub const NU: usize = 2;

pub type StateVector = SVector<Float, NX>;
pub type InputVector = Vector2<Float>;

/// Positions of each quantity in the state vector
/// [xb, yb, tb, xf, yf, xdb, ydb, tdb, xdf, ydf]
pub mod idx {
    pub const XB: usize = 0;
    pub const YB: usize = 1;
    pub const TB: usize = 2;
    pub const XF: usize = 3;
    pub const YF: usize = 4;
    pub const XDB: usize = 5;
    pub const YDB: usize = 6;
    pub const TDB: usize = 7;
    pub const XDF: usize = 8;
    pub const YDF: usize = 9;
}

/// Numeric parameters of the ball bouncing between a floor and a ceiling,
/// together with the MPC settings built on top of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceParams {
    pub m: Float,  // mass
    pub r: Float,  // radius
    pub d: Float,  // nominal floor-ceiling distance
    pub l: Float,  // floor and ceiling width
    pub mu: Float, // friction coefficient
    pub g: Float,  // gravity acceleration
    pub h: Float,  // discretization time step. The finer, the slower to simulate.
    pub coeff_rest: Float,

    /// MPC time steps
    pub horizon: usize,
    /// Floor acceleration limit, symmetric
    pub u_max: [Float; NU],
    /// Diagonal of the state weight, before the factor 2
    pub q_diag: [Float; NX],
    /// Diagonal of the input weight, before the factor 2
    pub r_diag: [Float; NU],
}

impl Default for BounceParams {
    fn default() -> Self {
        BounceParams {
            m: 1.,
            r: 0.1,
            d: 0.4,
            l: 0.3,
            mu: 0.2,
            g: 10.,
            h: 0.01,
            coeff_rest: 1.,
            horizon: 20,
            u_max: [30., 30.],
            q_diag: [1., 1., 0.01, 1., 1., 1., 1., 0.01, 1., 1.],
            r_diag: [0.01, 0.001],
        }
    }
}

impl BounceParams {
    /// Moment of inertia of the ball, solid sphere
    pub fn j(&self) -> Float {
        0.4 * self.m * self.r.powi(2)
    }

    /// State lower and upper bounds
    pub fn state_bounds(&self) -> (StateVector, StateVector) {
        let (l, d, r) = (self.l, self.d, self.r);
        #[rustfmt::skip]
        let x_max = StateVector::from_column_slice(&[
        //  xb, yb,        tb,       xf, yf,        xdb, ydb, tdb, xdf, ydf
            l,  d - 2. * r, 1.2 * PI, l,  d - 2. * r, 2.,  2.,  10., 2.,  2.,
        ]);
        (-x_max, x_max)
    }

    /// Terminal state lower and upper bounds
    pub fn terminal_bounds(&self) -> (StateVector, StateVector) {
        #[rustfmt::skip]
        let xn_max = StateVector::from_column_slice(&[
            0.1, 0.1, 1.2 * PI, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1,
        ]);
        (StateVector::zeros(), xn_max)
    }

    /// Box polytope the MPC must reach at the end of the horizon
    pub fn terminal_set(&self) -> Result<Polyhedron> {
        let (xn_min, xn_max) = self.terminal_bounds();
        Polyhedron::from_bounds(xn_min.as_slice(), xn_max.as_slice())
    }

    pub fn input_bounds(&self) -> (InputVector, InputVector) {
        let u_max = InputVector::from_column_slice(&self.u_max);
        (-u_max, u_max)
    }

    /// State weight. Scaled by 2 to cancel out the 1/2 in the QP objective.
    pub fn Q(&self) -> SMatrix<Float, NX, NX> {
        SMatrix::<Float, NX, NX>::from_diagonal(&SVector::from(self.q_diag)) * 2.
    }

    /// Input weight. Scaled by 2 to cancel out the 1/2 in the QP objective.
    pub fn R(&self) -> SMatrix<Float, NU, NU> {
        SMatrix::<Float, NU, NU>::from_diagonal(&SVector::from(self.r_diag)) * 2.
    }

    /// Terminal weight
    pub fn P(&self) -> SMatrix<Float, NX, NX> {
        SMatrix::zeros()
    }

    /// Check the constants and the bound vectors derived from them.
    pub fn validate(&self) -> Result<()> {
        let positives = [
            ("m", self.m),
            ("r", self.r),
            ("d", self.d),
            ("l", self.l),
            ("h", self.h),
        ];
        for (name, value) in positives {
            if !value.is_finite() || value <= 0. {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and positive",
                });
            }
        }
        for (name, value) in [("mu", self.mu), ("g", self.g)] {
            if !value.is_finite() || value < 0. {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }
        if !(0. ..=1.).contains(&self.coeff_rest) {
            return Err(Error::InvalidParameter {
                name: "coeff_rest",
                value: self.coeff_rest,
                reason: "must lie in [0, 1]",
            });
        }
        if self.horizon == 0 {
            return Err(Error::InvalidParameter {
                name: "horizon",
                value: 0.,
                reason: "must be at least one step",
            });
        }
        for (name, value) in self.q_diag.iter().chain(self.r_diag.iter()).map(|w| ("weight", *w)) {
            if !value.is_finite() || value < 0. {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "weights must be finite and non-negative",
                });
            }
        }

        let (x_min, x_max) = self.state_bounds();
        check_bound_order("state", x_min.as_slice(), x_max.as_slice())?;
        let (xn_min, xn_max) = self.terminal_bounds();
        check_bound_order("terminal", xn_min.as_slice(), xn_max.as_slice())?;
        let (u_min, u_max) = self.input_bounds();
        check_bound_order("input", u_min.as_slice(), u_max.as_slice())?;

        for i in 0..NX {
            if xn_min[i] < x_min[i] || xn_max[i] > x_max[i] {
                return Err(Error::TerminalOutsideStateBounds {
                    index: i,
                    lower: xn_min[i],
                    upper: xn_max[i],
                });
            }
        }

        Ok(())
    }

    /// Package the bounds, weights and terminal set into an MPC problem over
    /// the given discrete model.
    pub fn mpc_problem(&self, model: AffineModel) -> Result<MpcProblem> {
        let (x_min, x_max) = self.state_bounds();
        let (u_min, u_max) = self.input_bounds();
        MpcProblem::new(
            model,
            self.horizon,
            to_dmatrix(&self.Q()),
            to_dmatrix(&self.R()),
            to_dmatrix(&self.P()),
            (x_min.as_slice().to_vec(), x_max.as_slice().to_vec()),
            (u_min.as_slice().to_vec(), u_max.as_slice().to_vec()),
            self.terminal_set()?,
        )
    }
}

fn to_dmatrix<const R: usize, const C: usize>(m: &SMatrix<Float, R, C>) -> DMatrix<Float> {
    DMatrix::from_column_slice(R, C, m.as_slice())
}

/// Elementwise lower <= upper
pub fn check_bound_order(what: &'static str, lower: &[Float], upper: &[Float]) -> Result<()> {
    if lower.len() != upper.len() {
        return Err(Error::DimensionMismatch {
            what,
            expected: lower.len(),
            got: upper.len(),
        });
    }
    for (index, (lo, up)) in lower.iter().zip(upper.iter()).enumerate() {
        if !(lo <= up) {
            return Err(Error::BoundOrder {
                what,
                index,
                lower: *lo,
                upper: *up,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod params_tests {
    use crate::assert_close;

    use super::*;

    #[test]
    fn default_constants() {
        let params = BounceParams::default();
        assert_close!(params.j(), 0.004, 1e-12);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn state_bounds_are_ordered() {
        let params = BounceParams::default();
        let (x_min, x_max) = params.state_bounds();
        for i in 0..NX {
            assert!(x_max[i] >= x_min[i], "index {}", i);
        }
        assert_close!(x_max[idx::XB], 0.3, 1e-12);
        assert_close!(x_max[idx::YB], 0.2, 1e-12);
        assert_close!(x_max[idx::TB], 1.2 * PI, 1e-12);
        assert_close!(x_max[idx::TDB], 10., 1e-12);
        assert_eq!(x_min, -x_max);
    }

    #[test]
    fn terminal_bounds_within_state_bounds() {
        let params = BounceParams::default();
        let (x_min, x_max) = params.state_bounds();
        let (xn_min, xn_max) = params.terminal_bounds();
        for i in 0..NX {
            assert!(xn_min[i] >= x_min[i]);
            assert!(xn_max[i] <= x_max[i]);
            assert!(xn_max[i] >= xn_min[i]);
        }
    }

    #[test]
    fn weights_are_doubled() {
        let params = BounceParams::default();
        let Q = params.Q();
        let R = params.R();
        assert_close!(Q[(0, 0)], 2., 1e-12);
        assert_close!(Q[(idx::TB, idx::TB)], 0.02, 1e-12);
        assert_close!(Q[(idx::TDB, idx::TDB)], 0.02, 1e-12);
        assert_close!(Q[(0, 1)], 0., 1e-12);
        assert_close!(R[(0, 0)], 0.02, 1e-12);
        assert_close!(R[(1, 1)], 0.002, 1e-12);
        assert_eq!(params.P(), SMatrix::<Float, NX, NX>::zeros());
    }

    #[test]
    fn terminal_set_from_bounds() {
        let params = BounceParams::default();
        let X_N = params.terminal_set().unwrap();
        assert_eq!(X_N.dimension(), NX);
        assert!(X_N.contains(&[0.05; NX], 0.));
        assert!(!X_N.contains(&[-0.05; NX], 0.));
    }

    #[test]
    fn narrow_gap_is_rejected() {
        // ball wider than the gap flips the y bounds
        let params = BounceParams {
            d: 0.1,
            ..Default::default()
        };
        match params.validate() {
            Err(Error::BoundOrder { what, index, .. }) => {
                assert_eq!(what, "state");
                assert_eq!(index, idx::YB);
            }
            other => panic!("expected bound order error, got {:?}", other),
        }
    }

    #[test]
    fn small_room_excludes_terminal_set() {
        // y bound d - 2r = 0.05 < terminal upper bound 0.1
        let params = BounceParams {
            d: 0.25,
            ..Default::default()
        };
        match params.validate() {
            Err(Error::TerminalOutsideStateBounds { index, .. }) => assert_eq!(index, idx::YB),
            other => panic!("expected terminal error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_constants() {
        let params = BounceParams {
            m: -1.,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter { name: "m", .. })
        ));

        let params = BounceParams {
            coeff_rest: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter {
                name: "coeff_rest",
                ..
            })
        ));
    }
}
