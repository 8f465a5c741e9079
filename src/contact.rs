use na::{UnitVector3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{spatial::pose::Pose, types::Float};

#[derive(Clone, PartialEq, Debug)]
pub struct ContactPoint {
    pub frame: String, // the frame the contact point is expressed in
    pub location: Vector3<Float>,
}

impl ContactPoint {
    pub fn new(frame: &str, location: Vector3<Float>) -> Self {
        ContactPoint {
            frame: frame.to_string(),
            location,
        }
    }

    /// Location of the contact point in world frame, given the pose of its body
    pub fn world_location(&self, pose: &Pose) -> Vector3<Float> {
        pose.rotation * self.location + pose.translation
    }
}

/// Surface friction of a contact, in the Coulomb sense
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct CoulombFriction {
    pub static_friction: Float,
    pub dynamic_friction: Float,
}

impl CoulombFriction {
    pub fn new(static_friction: Float, dynamic_friction: Float) -> Self {
        CoulombFriction {
            static_friction,
            dynamic_friction,
        }
    }

    /// Friction coefficient as a function of slip speed.
    ///
    /// Below the stiction tolerance the coefficient ramps from 0 up to the
    /// static value; between 1x and 3x the tolerance it blends down to the
    /// dynamic value.
    pub fn coefficient(&self, slip_speed: Float, stiction_tolerance: Float) -> Float {
        let (mu_s, mu_d) = (self.static_friction, self.dynamic_friction);
        let s = slip_speed / stiction_tolerance;
        if s <= 1. {
            mu_s * s * (2. - s)
        } else if s < 3. {
            let t = (s - 1.) / 2.;
            mu_s - (mu_s - mu_d) * t * t * (3. - 2. * t)
        } else {
            mu_d
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HalfSpace {
    pub point: Vector3<Float>,      // A point on the half-space
    pub normal: UnitVector3<Float>, // Outward normal direction of the half-space
    pub friction: CoulombFriction,
}

impl HalfSpace {
    // Create a half-space that is moved along normal by distance, from origin
    pub fn new(normal: UnitVector3<Float>, distance: Float, friction: CoulombFriction) -> Self {
        HalfSpace {
            point: normal.scale(distance),
            normal,
            friction,
        }
    }

    /// Penetration depth of a point, positive when inside
    pub fn penetration(&self, point: &Vector3<Float>) -> Float {
        -(point - self.point).dot(&self.normal)
    }

    // True if the point is inside the half-space
    pub fn has_inside(&self, point: &Vector3<Float>) -> bool {
        self.penetration(point) >= 0.
    }
}

/// Compliant contact model parameters
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactModel {
    pub stiffness: Float,
    pub alpha: Float, // roughly how much velocity is lost, coefficient of restitution e ~= 1-a*v_in
    pub stiction_tolerance: Float,
}

impl Default for ContactModel {
    fn default() -> Self {
        ContactModel {
            stiffness: 50e3,
            alpha: 0.9,
            stiction_tolerance: 0.1,
        }
    }
}

impl ContactModel {
    /// Calculate the contact force expressed in world frame, for a point at
    /// the given penetration depth moving with velocity v.
    /// Ref:
    ///     1. Coeﬀicient of restitution interpreted as damping in vibroimpact,
    ///         K. H. Hunt and F. R. E. Crossley, 1975
    ///     2. A Compliant Contact Model with Nonlinear Damping for Simulation of Robotic Systems,
    ///         D. W. Marhefka and D. E. Orin, 1999
    pub fn contact_force(
        &self,
        halfspace: &HalfSpace,
        penetration: Float,
        velocity: &Vector3<Float>,
    ) -> Vector3<Float> {
        if penetration <= 0. {
            return Vector3::zeros();
        }
        let normal = halfspace.normal.into_inner();
        let z = penetration;
        let z_dot = -velocity.dot(&normal);

        // Hunt-Crossley model for normal force
        let zn = z.powf(3.0 / 2.0);
        let k = self.stiffness;
        let λ = 3.0 / 2.0 * self.alpha * k;
        let f_n = (λ * zn * z_dot + k * zn).max(0.0);

        // Regularized Coulomb friction opposing tangential slip
        let v_t = velocity - velocity.dot(&normal) * normal;
        let slip = v_t.norm();
        let f_t = if slip > 0. {
            let mu = halfspace
                .friction
                .coefficient(slip, self.stiction_tolerance);
            -mu * f_n * v_t / slip
        } else {
            Vector3::zeros()
        };

        f_n * normal + f_t
    }
}
