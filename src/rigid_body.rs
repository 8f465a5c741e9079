use na::{vector, Matrix3, Vector3};

use crate::{
    contact::ContactPoint,
    error::{Error, Result},
    types::Float,
};

/// Rigid body with its inertia about the center of mass, expressed in body
/// frame, and the points where it can touch the environment
#[derive(Clone, PartialEq, Debug)]
pub struct RigidBody {
    pub frame: String,
    pub mass: Float,
    pub moment: Matrix3<Float>,
    pub contact_points: Vec<ContactPoint>,
}

impl RigidBody {
    pub fn new(mass: Float, moment: Matrix3<Float>, frame: &str) -> Self {
        RigidBody {
            frame: frame.to_string(),
            mass,
            moment,
            contact_points: vec![],
        }
    }

    /// Cuboid of width w (x), depth d (y) and height h (z)
    pub fn new_cuboid(m: Float, w: Float, d: Float, h: Float, frame: &str) -> RigidBody {
        let moment_x = m * (d * d + h * h) / 12.0;
        let moment_y = m * (w * w + h * h) / 12.0;
        let moment_z = m * (w * w + d * d) / 12.0;
        let moment = Matrix3::from_diagonal(&vector![moment_x, moment_y, moment_z]);
        RigidBody::new(m, moment, frame)
    }

    pub fn add_contact_point(&mut self, contact_point: ContactPoint) -> Result<()> {
        if self.frame != contact_point.frame {
            return Err(Error::FrameMismatch {
                point: contact_point.frame,
                body: self.frame.clone(),
            });
        }
        self.contact_points.push(contact_point);
        Ok(())
    }

    /// Add contact points on the 8 corners of a cuboid
    pub fn add_cuboid_contacts(&mut self, w: Float, d: Float, h: Float) -> Result<()> {
        for sx in [-1., 1.] {
            for sy in [-1., 1.] {
                for sz in [-1., 1.] {
                    let corner = Vector3::new(sx * w / 2., sy * d / 2., sz * h / 2.);
                    self.add_contact_point(ContactPoint::new(&self.frame, corner))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod rigid_body_tests {
    use crate::assert_close;

    use super::*;

    #[test]
    fn cuboid_inertia() {
        let body = RigidBody::new_cuboid(12., 1., 2., 3., "block");
        assert_close!(body.moment[(0, 0)], 13., 1e-12);
        assert_close!(body.moment[(1, 1)], 10., 1e-12);
        assert_close!(body.moment[(2, 2)], 5., 1e-12);
    }

    #[test]
    fn cuboid_corners() {
        let mut body = RigidBody::new_cuboid(1., 0.2, 0.1, 0.05, "block");
        body.add_cuboid_contacts(0.2, 0.1, 0.05).unwrap();
        assert_eq!(body.contact_points.len(), 8);
        for cp in body.contact_points.iter() {
            assert_close!(cp.location.x.abs(), 0.1, 1e-12);
            assert_close!(cp.location.y.abs(), 0.05, 1e-12);
            assert_close!(cp.location.z.abs(), 0.025, 1e-12);
        }
    }

    #[test]
    fn contact_point_in_wrong_frame() {
        let mut body = RigidBody::new_cuboid(1., 0.1, 0.1, 0.1, "block");
        let result = body.add_contact_point(ContactPoint::new("ball", Vector3::zeros()));
        assert!(matches!(result, Err(Error::FrameMismatch { .. })));
        assert!(body.contact_points.is_empty());
    }
}
