use clarabel::{
    algebra::CscMatrix,
    solver::{
        DefaultSettings, DefaultSolver, IPSolver, SolverStatus,
        SupportedConeT::{self, NonnegativeConeT, ZeroConeT},
    },
};
use na::{DMatrix, DVector, SMatrix, SVector};

use crate::{
    error::{Error, Result},
    params::{InputVector, StateVector, NU, NX},
    polytope::Polyhedron,
    types::Float,
    util::to_dvector,
};

use super::Controller;

/// Discrete-time affine model
///     x+ = A x + B u + c
#[derive(Clone, Debug, PartialEq)]
pub struct AffineModel {
    pub A: DMatrix<Float>,
    pub B: DMatrix<Float>,
    pub c: DVector<Float>,
}

impl AffineModel {
    pub fn new(A: DMatrix<Float>, B: DMatrix<Float>, c: DVector<Float>) -> Result<Self> {
        let nx = A.nrows();
        for (what, got) in [
            ("model A columns", A.ncols()),
            ("model B rows", B.nrows()),
            ("model c length", c.len()),
        ] {
            if got != nx {
                return Err(Error::DimensionMismatch {
                    what,
                    expected: nx,
                    got,
                });
            }
        }
        Ok(AffineModel { A, B, c })
    }

    pub fn from_static<const N: usize, const M: usize>(
        A: &SMatrix<Float, N, N>,
        B: &SMatrix<Float, N, M>,
        c: &SVector<Float, N>,
    ) -> Self {
        AffineModel {
            A: DMatrix::from_column_slice(N, N, A.as_slice()),
            B: DMatrix::from_column_slice(N, M, B.as_slice()),
            c: to_dvector(c),
        }
    }

    pub fn nx(&self) -> usize {
        self.A.nrows()
    }

    pub fn nu(&self) -> usize {
        self.B.ncols()
    }

    pub fn next(&self, x: &DVector<Float>, u: &DVector<Float>) -> DVector<Float> {
        &self.A * x + &self.B * u + &self.c
    }
}

/// Finite-horizon linear MPC problem
///     min  1/2 sum_{k=1}^{N-1} x_k' Q x_k + 1/2 sum_{k=0}^{N-1} u_k' R u_k + 1/2 x_N' P x_N
///     s.t. x_{k+1} = A x_k + B u_k + c
///          x_min <= x_k <= x_max,  u_min <= u_k <= u_max
///          x_N in X_N
#[derive(Clone, Debug)]
pub struct MpcProblem {
    pub model: AffineModel,
    pub horizon: usize,
    pub Q: DMatrix<Float>,
    pub R: DMatrix<Float>,
    pub P: DMatrix<Float>,
    pub x_min: Vec<Float>,
    pub x_max: Vec<Float>,
    pub u_min: Vec<Float>,
    pub u_max: Vec<Float>,
    pub terminal_set: Polyhedron,
}

/// Predicted trajectory of a solved MPC problem
#[derive(Clone, Debug)]
pub struct MpcSolution {
    /// x_0 ..= x_N
    pub states: Vec<DVector<Float>>,
    /// u_0 .. u_{N-1}
    pub inputs: Vec<DVector<Float>>,
    pub cost: Float,
}

impl MpcProblem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model: AffineModel,
        horizon: usize,
        Q: DMatrix<Float>,
        R: DMatrix<Float>,
        P: DMatrix<Float>,
        x_bounds: (Vec<Float>, Vec<Float>),
        u_bounds: (Vec<Float>, Vec<Float>),
        terminal_set: Polyhedron,
    ) -> Result<Self> {
        let (nx, nu) = (model.nx(), model.nu());
        if horizon == 0 {
            return Err(Error::InvalidParameter {
                name: "horizon",
                value: 0.,
                reason: "must be at least one step",
            });
        }
        for (what, expected, got) in [
            ("Q rows", nx, Q.nrows()),
            ("Q columns", nx, Q.ncols()),
            ("P rows", nx, P.nrows()),
            ("P columns", nx, P.ncols()),
            ("R rows", nu, R.nrows()),
            ("R columns", nu, R.ncols()),
            ("terminal set dimension", nx, terminal_set.dimension()),
        ] {
            if expected != got {
                return Err(Error::DimensionMismatch {
                    what,
                    expected,
                    got,
                });
            }
        }
        let (x_min, x_max) = x_bounds;
        let (u_min, u_max) = u_bounds;
        for (what, expected, got) in [
            ("state lower bound", nx, x_min.len()),
            ("state upper bound", nx, x_max.len()),
            ("input lower bound", nu, u_min.len()),
            ("input upper bound", nu, u_max.len()),
        ] {
            if expected != got {
                return Err(Error::DimensionMismatch {
                    what,
                    expected,
                    got,
                });
            }
        }

        Ok(MpcProblem {
            model,
            horizon,
            Q,
            R,
            P,
            x_min,
            x_max,
            u_min,
            u_max,
            terminal_set,
        })
    }

    /// Number of QP decision variables, [x_1, ..., x_N, u_0, ..., u_{N-1}]
    fn n_vars(&self) -> usize {
        self.horizon * (self.model.nx() + self.model.nu())
    }

    /// Column offset of x_k, k in 1..=N
    fn ix(&self, k: usize) -> usize {
        (k - 1) * self.model.nx()
    }

    /// Column offset of u_k, k in 0..N
    fn iu(&self, k: usize) -> usize {
        self.horizon * self.model.nx() + k * self.model.nu()
    }

    /// Solve the QP from initial state x0
    pub fn solve(&self, x0: &DVector<Float>) -> Result<MpcSolution> {
        let (nx, nu, N) = (self.model.nx(), self.model.nu(), self.horizon);
        if x0.len() != nx {
            return Err(Error::DimensionMismatch {
                what: "initial state",
                expected: nx,
                got: x0.len(),
            });
        }
        let dim = self.n_vars();

        // Objective
        let mut P_qp = DMatrix::<Float>::zeros(dim, dim);
        for k in 1..N {
            P_qp.view_mut((self.ix(k), self.ix(k)), (nx, nx))
                .copy_from(&self.Q);
        }
        P_qp.view_mut((self.ix(N), self.ix(N)), (nx, nx))
            .copy_from(&self.P);
        for k in 0..N {
            P_qp.view_mut((self.iu(k), self.iu(k)), (nu, nu))
                .copy_from(&self.R);
        }
        let P_qp = CscMatrix::from(P_qp.upper_triangle().row_iter());
        let q_qp = vec![0.; dim];

        // Equality constraints, the dynamics
        let n_eq = N * nx;
        let mut A_eq = DMatrix::<Float>::zeros(n_eq, dim);
        let mut b_eq = DVector::<Float>::zeros(n_eq);
        for k in 0..N {
            let row = k * nx;
            A_eq.view_mut((row, self.ix(k + 1)), (nx, nx))
                .fill_with_identity();
            A_eq.view_mut((row, self.iu(k)), (nx, nu))
                .copy_from(&-&self.model.B);
            if k == 0 {
                b_eq.rows_mut(row, nx)
                    .copy_from(&(&self.model.A * x0 + &self.model.c));
            } else {
                A_eq.view_mut((row, self.ix(k)), (nx, nx))
                    .copy_from(&-&self.model.A);
                b_eq.rows_mut(row, nx).copy_from(&self.model.c);
            }
        }

        // Inequality constraints, G z <= h
        let mut G_rows: Vec<DVector<Float>> = vec![];
        let mut h: Vec<Float> = vec![];
        let mut add_bound = |col: usize, sign: Float, bound: Float| {
            if bound.is_finite() {
                let mut row = DVector::zeros(dim);
                row[col] = sign;
                G_rows.push(row);
                h.push(sign * bound);
            }
        };
        for k in 1..=N {
            for i in 0..nx {
                add_bound(self.ix(k) + i, 1., self.x_max[i]);
                add_bound(self.ix(k) + i, -1., self.x_min[i]);
            }
        }
        for k in 0..N {
            for i in 0..nu {
                add_bound(self.iu(k) + i, 1., self.u_max[i]);
                add_bound(self.iu(k) + i, -1., self.u_min[i]);
            }
        }
        let H = self.terminal_set.A();
        for (H_row, h_i) in H.row_iter().zip(self.terminal_set.b().iter()) {
            let mut row = DVector::zeros(dim);
            row.rows_mut(self.ix(N), nx).copy_from(&H_row.transpose());
            G_rows.push(row);
            h.push(*h_i);
        }
        let n_ineq = G_rows.len();

        let mut A_qp = DMatrix::<Float>::zeros(n_eq + n_ineq, dim);
        A_qp.rows_mut(0, n_eq).copy_from(&A_eq);
        for (i, row) in G_rows.iter().enumerate() {
            A_qp.row_mut(n_eq + i).copy_from(&row.transpose());
        }
        let A_qp = CscMatrix::from(A_qp.row_iter());
        let b_qp: Vec<Float> = b_eq.iter().chain(h.iter()).cloned().collect();

        let cones: [SupportedConeT<Float>; 2] = [ZeroConeT(n_eq), NonnegativeConeT(n_ineq)];

        let settings = DefaultSettings {
            verbose: false,
            ..DefaultSettings::default()
        };
        let mut solver = DefaultSolver::new(&P_qp, &q_qp, &A_qp, &b_qp, &cones, settings);
        solver.solve();

        let status = solver.solution.status;
        if !matches!(status, SolverStatus::Solved | SolverStatus::AlmostSolved) {
            return Err(Error::Solver(format!("{:?}", status)));
        }
        let z = &solver.solution.x;

        let mut states = Vec::with_capacity(N + 1);
        states.push(x0.clone());
        for k in 1..=N {
            states.push(DVector::from_column_slice(&z[self.ix(k)..self.ix(k) + nx]));
        }
        let inputs: Vec<DVector<Float>> = (0..N)
            .map(|k| DVector::from_column_slice(&z[self.iu(k)..self.iu(k) + nu]))
            .collect();

        let cost = solver.solution.obj_val + 0.5 * (x0.transpose() * &self.Q * x0)[(0, 0)];

        Ok(MpcSolution {
            states,
            inputs,
            cost,
        })
    }
}

/// Receding-horizon controller: solves the MPC problem at every call and
/// applies the first input.
pub struct MpcController {
    pub problem: MpcProblem,
    /// Number of calls where the QP failed and zero input was applied
    pub failures: usize,
}

impl MpcController {
    /// The problem must be posed over the ball-paddle state and input
    pub fn new(problem: MpcProblem) -> Result<Self> {
        for (what, expected, got) in [
            ("controller state size", NX, problem.model.nx()),
            ("controller input size", NU, problem.model.nu()),
        ] {
            if expected != got {
                return Err(Error::DimensionMismatch {
                    what,
                    expected,
                    got,
                });
            }
        }
        Ok(MpcController {
            problem,
            failures: 0,
        })
    }
}

impl Controller for MpcController {
    fn control(&mut self, state: &StateVector) -> InputVector {
        match self.problem.solve(&to_dvector(state)) {
            Ok(solution) => InputVector::from_column_slice(solution.inputs[0].as_slice()),
            Err(e) => {
                self.failures += 1;
                log::warn!("MPC failed ({}), applying zero input", e);
                InputVector::zeros()
            }
        }
    }
}
