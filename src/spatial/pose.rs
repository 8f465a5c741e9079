use na::{UnitQuaternion, Vector3};

use crate::types::Float;

/// Pose of a body frame in world frame
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Pose {
    pub rotation: UnitQuaternion<Float>,
    pub translation: Vector3<Float>,
}

impl Pose {
    pub fn identity() -> Self {
        Pose {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Rotation about the x axis by angle, no translation
    pub fn from_x_rotation(angle: Float) -> Self {
        Pose {
            rotation: UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle),
            translation: Vector3::zeros(),
        }
    }
}

#[cfg(test)]
mod pose_tests {
    use na::vector;

    use crate::{assert_vec_close, PI};

    use super::*;

    #[test]
    fn x_rotation_maps_y_to_z() {
        let mut pose = Pose::from_x_rotation(PI / 2.);
        pose.translation = vector![0., 0., 0.1];
        let p = pose.rotation * vector![0., 1., 0.] + pose.translation;
        assert_vec_close!(p, [0., 0., 1.1], 1e-12);
    }
}
