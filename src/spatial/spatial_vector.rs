use std::ops::{Add, AddAssign, Mul};

use crate::types::Float;
use na::{zero, Vector3};

/// Pair of angular and linear 3-vectors: a spatial velocity (ω, v) or a
/// wrench (torque, force), both expressed in world frame
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct SpatialVector {
    pub angular: Vector3<Float>,
    pub linear: Vector3<Float>,
}

impl SpatialVector {
    pub fn zero() -> Self {
        SpatialVector {
            angular: zero(),
            linear: zero(),
        }
    }

    pub fn new(angular: Vector3<Float>, linear: Vector3<Float>) -> Self {
        SpatialVector { angular, linear }
    }

    /// Wrench about `about` of a force applied at `point`
    pub fn from_force(
        point: &Vector3<Float>,
        force: &Vector3<Float>,
        about: &Vector3<Float>,
    ) -> Self {
        SpatialVector {
            angular: (point - about).cross(force),
            linear: *force,
        }
    }

    /// Velocity of a point rigidly attached to a body moving with this
    /// spatial velocity, where `origin` is the point whose velocity is `linear`
    pub fn point_velocity(
        &self,
        point: &Vector3<Float>,
        origin: &Vector3<Float>,
    ) -> Vector3<Float> {
        self.linear + self.angular.cross(&(point - origin))
    }
}

impl Mul<Float> for &SpatialVector {
    type Output = SpatialVector;

    fn mul(self, rhs: Float) -> Self::Output {
        SpatialVector {
            angular: self.angular * rhs,
            linear: self.linear * rhs,
        }
    }
}

impl Add for SpatialVector {
    type Output = SpatialVector;

    fn add(self, rhs: Self) -> Self::Output {
        SpatialVector {
            angular: self.angular + rhs.angular,
            linear: self.linear + rhs.linear,
        }
    }
}

impl AddAssign for SpatialVector {
    fn add_assign(&mut self, rhs: Self) {
        self.angular += rhs.angular;
        self.linear += rhs.linear;
    }
}

#[cfg(test)]
mod spatial_vector_tests {
    use na::vector;

    use super::*;

    #[test]
    fn force_off_center_makes_torque() {
        let (point, force) = (vector![1., 0., 0.], vector![0., 0., 2.]);
        let w = SpatialVector::from_force(&point, &force, &Vector3::zeros());
        assert_eq!(w.angular, vector![0., -2., 0.]);
        assert_eq!(w.linear, vector![0., 0., 2.]);
    }

    #[test]
    fn spinning_body_point_velocity() {
        let v = SpatialVector::new(vector![0., 0., 1.], vector![1., 0., 0.]);
        let p = v.point_velocity(&vector![1., 1., 0.], &vector![1., 0., 0.]);
        assert_eq!(p, vector![0., 0., 0.]);
    }

    #[test]
    fn sum_of_wrenches() {
        let mut w = SpatialVector::zero();
        w += SpatialVector::new(vector![1., 0., 0.], vector![0., 1., 0.]);
        w += &SpatialVector::new(vector![1., 0., 0.], vector![0., 1., 0.]) * 2.;
        assert_eq!(w, SpatialVector::new(vector![3., 0., 0.], vector![0., 3., 0.]));
    }
}
