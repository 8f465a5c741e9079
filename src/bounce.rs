//! Planar ball bouncing between an actuated floor and a fixed ceiling.
//!
//! The ball position (xb, yb) is measured at its lowest point, and tb is its
//! orientation. The floor is a flat paddle of width l whose acceleration is
//! the control input. The ceiling is fixed, with its lower surface at y = d,
//! so the ball touches it when yb + 2r reaches d. Contacts are resolved with
//! impulses: restitution along the normal, Coulomb friction along the
//! surface.

use na::{DVector, SMatrix};

use crate::{
    control::mpc::AffineModel,
    params::{idx, BounceParams, InputVector, StateVector, NU, NX},
    simulate::Plant,
    types::Float,
    util::to_dvector,
};

/// Which surface the ball touched during a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Floor,
    Ceiling,
}

#[derive(Clone, Debug)]
pub struct BallPaddle {
    pub params: BounceParams,
    pub x: StateVector,
    pub t: Float,
    /// Contacts resolved during the last step
    pub contacts: Vec<Surface>,
}

impl BallPaddle {
    pub fn new(params: BounceParams, x: StateVector) -> Self {
        BallPaddle {
            params,
            x,
            t: 0.,
            contacts: vec![],
        }
    }

    /// Height of the ceiling's lower surface
    pub fn ceiling_height(&self) -> Float {
        self.params.d
    }

    /// Step the system by dt with floor acceleration u.
    ///
    /// Semi-implicit Euler: velocities are updated first, contact impulses
    /// act on the updated velocities, positions use the final velocities.
    pub fn step_with(&mut self, dt: Float, u: &InputVector) {
        let g = self.params.g;
        self.contacts.clear();

        self.x[idx::YDB] -= g * dt;
        self.x[idx::XDF] += u[0] * dt;
        self.x[idx::YDF] += u[1] * dt;

        if self.floor_contact() {
            self.resolve_contact(Surface::Floor);
        }
        if self.ceiling_contact() {
            self.resolve_contact(Surface::Ceiling);
        }

        for (p, v) in [
            (idx::XB, idx::XDB),
            (idx::YB, idx::YDB),
            (idx::TB, idx::TDB),
            (idx::XF, idx::XDF),
            (idx::YF, idx::YDF),
        ] {
            self.x[p] += self.x[v] * dt;
        }
        self.t += dt;
    }

    /// Ball touches or penetrates the floor, is above it, and approaches it
    fn floor_contact(&self) -> bool {
        let x = &self.x;
        let gap = x[idx::YB] - x[idx::YF];
        let approaching = x[idx::YDB] - x[idx::YDF] < 0.;
        let above = (x[idx::XB] - x[idx::XF]).abs() <= self.params.l / 2.;
        gap <= 0. && approaching && above
    }

    fn ceiling_contact(&self) -> bool {
        let x = &self.x;
        let gap = self.ceiling_height() - (x[idx::YB] + 2. * self.params.r);
        let approaching = x[idx::YDB] > 0.;
        let below = x[idx::XB].abs() <= self.params.l / 2.;
        gap <= 0. && approaching && below
    }

    /// Apply the normal and friction impulses of one contact.
    ///
    /// The floor is kinematic, so the ball takes the whole impulse.
    fn resolve_contact(&mut self, surface: Surface) {
        let (m, r, j) = (self.params.m, self.params.r, self.params.j());
        let e = self.params.coeff_rest;
        let mu = self.params.mu;

        // n: outward normal of the surface along y.
        // arm: y-offset of the contact point from the ball centre, which
        // sits r above yb.
        let (n, arm, surface_vx, surface_vy) = match surface {
            Surface::Floor => (1., -r, self.x[idx::XDF], self.x[idx::YDF]),
            Surface::Ceiling => (-1., r, 0., 0.),
        };

        // Normal impulse
        let v_n = (self.x[idx::YDB] - surface_vy) * n;
        let P_n = -(1. + e) * m * v_n;
        self.x[idx::YDB] += P_n * n / m;

        // Tangential slip of the contact point, ω × p = (-ω p_y, ω p_x)
        let v_t = self.x[idx::XDB] - self.x[idx::TDB] * arm - surface_vx;
        let k_t = 1. / m + arm * arm / j;
        let P_t_max = (mu * P_n).abs();
        let P_t = (-v_t / k_t).clamp(-P_t_max, P_t_max);
        self.x[idx::XDB] += P_t / m;
        // torque of a force along x at offset (0, arm)
        self.x[idx::TDB] -= arm * P_t / j;

        log::debug!(
            "t = {:.3}: {:?} contact, P_n = {:.4}, P_t = {:.4}",
            self.t,
            surface,
            P_n,
            P_t
        );
        self.contacts.push(surface);
    }

    /// Discrete model of the step without contacts:
    ///     x+ = A x + B u + c
    pub fn free_flight_model(params: &BounceParams) -> AffineModel {
        let h = params.h;
        let mut A = SMatrix::<Float, NX, NX>::identity();
        let mut B = SMatrix::<Float, NX, NU>::zeros();
        let mut c = StateVector::zeros();

        for (p, v) in [
            (idx::XB, idx::XDB),
            (idx::YB, idx::YDB),
            (idx::TB, idx::TDB),
            (idx::XF, idx::XDF),
            (idx::YF, idx::YDF),
        ] {
            A[(p, v)] = h;
        }

        // floor velocity and position driven by acceleration
        B[(idx::XDF, 0)] = h;
        B[(idx::YDF, 1)] = h;
        B[(idx::XF, 0)] = h * h;
        B[(idx::YF, 1)] = h * h;

        // gravity on the ball
        c[idx::YDB] = -params.g * h;
        c[idx::YB] = -params.g * h * h;

        AffineModel::from_static(&A, &B, &c)
    }
}

impl Plant for BallPaddle {
    type Input = InputVector;

    fn step(&mut self, dt: Float, input: &InputVector) {
        self.step_with(dt, input);
    }

    fn state_vector(&self) -> DVector<Float> {
        to_dvector(&self.x)
    }

    fn time(&self) -> Float {
        self.t
    }
}
