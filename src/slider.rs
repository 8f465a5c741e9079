//! Slider block resting on a table.
//!
//! A single free-floating cuboid falls onto a ground half-space with Coulomb
//! friction. The state is logged in the layout
//!     [qw, qx, qy, qz, x, y, z, ωx, ωy, ωz, vx, vy, vz]
//! with angular and linear velocities expressed in world frame.

use na::{dvector, DVector, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    contact::{ContactModel, CoulombFriction, HalfSpace},
    error::{Error, Result},
    rigid_body::RigidBody,
    simulate::Plant,
    spatial::{pose::Pose, spatial_vector::SpatialVector},
    types::Float,
    GRAVITY, PI,
};

/// Number of entries of the logged free-body state
pub const FREE_BODY_STATE_SIZE: usize = 13;

/// Scenario parameters of the slider simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub mass: Float,
    /// Block size along its own x, y, z axes
    pub size: [Float; 3],
    pub time_step: Float,
    pub final_time: Float,
    /// Initial position of the block
    pub initial_position: [Float; 3],
    /// Initial rotation about the world x axis
    pub initial_x_rotation: Float,
    pub ground_friction: CoulombFriction,
    pub contact: ContactModel,
    /// Pace against wall-clock time, 0 runs as fast as possible
    pub realtime_rate: Float,
    pub show_plots: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        SliderConfig {
            mass: 0.5,
            size: [0.1, 0.05, 0.1],
            time_step: 1e-3,
            final_time: 15.,
            initial_position: [0., 0., 0.1],
            initial_x_rotation: PI / 2.,
            ground_friction: CoulombFriction::new(0.7, 0.5),
            contact: ContactModel::default(),
            realtime_rate: 0.,
            show_plots: true,
        }
    }
}

/// A rigid body moving freely in space, in contact with half-spaces
#[derive(Clone, Debug)]
pub struct FreeBody {
    pub body: RigidBody,
    pub pose: Pose,
    /// Angular and linear velocity of the center of mass, world frame
    pub velocity: SpatialVector,
    pub halfspaces: Vec<HalfSpace>,
    pub contact_model: ContactModel,
    pub t: Float,
}

impl FreeBody {
    pub fn new(body: RigidBody, contact_model: ContactModel) -> Self {
        FreeBody {
            body,
            pose: Pose::identity(),
            velocity: SpatialVector::zero(),
            halfspaces: vec![],
            contact_model,
            t: 0.,
        }
    }

    pub fn add_halfspace(&mut self, halfspace: HalfSpace) {
        self.halfspaces.push(halfspace);
    }

    pub fn set_free_body_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn set_free_body_spatial_velocity(&mut self, velocity: SpatialVector) {
        self.velocity = velocity;
    }

    /// Total external wrench about the center of mass, world frame
    fn external_wrench(&self) -> SpatialVector {
        let com = self.pose.translation;
        let mut wrench = SpatialVector::new(
            Vector3::zeros(),
            Vector3::new(0., 0., -self.body.mass * GRAVITY),
        );

        for contact_point in self.body.contact_points.iter() {
            let location = contact_point.world_location(&self.pose);
            let velocity = self.velocity.point_velocity(&location, &com);
            for halfspace in self.halfspaces.iter() {
                let penetration = halfspace.penetration(&location);
                if penetration <= 0. {
                    continue;
                }
                let force = self
                    .contact_model
                    .contact_force(halfspace, penetration, &velocity);
                wrench += SpatialVector::from_force(&location, &force, &com);
            }
        }
        wrench
    }

    /// Semi-implicit Euler step of the Newton-Euler equations
    ///     m v̇ = f
    ///     I ω̇ = τ - ω × I ω
    /// with the inertia rotated to world frame.
    pub fn step_with(&mut self, dt: Float) {
        let wrench = self.external_wrench();

        let R = self.pose.rotation.to_rotation_matrix();
        let I_world = R.matrix() * self.body.moment * R.matrix().transpose();
        let w = self.velocity.angular;
        let gyroscopic = w.cross(&(I_world * w));
        let w_dot = I_world
            .try_inverse()
            .map(|I_inv| I_inv * (wrench.angular - gyroscopic))
            .unwrap_or_else(Vector3::zeros);
        let v_dot = wrench.linear / self.body.mass;

        self.velocity.angular += w_dot * dt;
        self.velocity.linear += v_dot * dt;

        self.pose.translation += self.velocity.linear * dt;
        self.pose.rotation =
            UnitQuaternion::from_scaled_axis(self.velocity.angular * dt) * self.pose.rotation;
        self.t += dt;
    }
}

impl Plant for FreeBody {
    type Input = ();

    fn step(&mut self, dt: Float, _input: &()) {
        self.step_with(dt);
    }

    fn state_vector(&self) -> DVector<Float> {
        let q = self.pose.rotation.quaternion();
        let p = self.pose.translation;
        let w = self.velocity.angular;
        let v = self.velocity.linear;
        dvector![q.w, q.i, q.j, q.k, p.x, p.y, p.z, w.x, w.y, w.z, v.x, v.y, v.z]
    }

    fn time(&self) -> Float {
        self.t
    }
}

/// Build the slider block on a flat ground, at its initial pose and at rest
pub fn build_slider(config: &SliderConfig) -> Result<FreeBody> {
    let [w, d, h] = config.size;
    for (name, value) in [("mass", config.mass), ("width", w), ("depth", d), ("height", h)] {
        if !value.is_finite() || value <= 0. {
            return Err(Error::InvalidParameter {
                name,
                value,
                reason: "must be finite and positive",
            });
        }
    }

    let mut block = RigidBody::new_cuboid(config.mass, w, d, h, "body");
    block.add_cuboid_contacts(w, d, h)?;

    let mut slider = FreeBody::new(block, config.contact);
    slider.add_halfspace(HalfSpace::new(Vector3::z_axis(), 0., config.ground_friction));

    let mut pose = Pose::from_x_rotation(config.initial_x_rotation);
    pose.translation = Vector3::from_column_slice(&config.initial_position);
    slider.set_free_body_pose(pose);
    slider.set_free_body_spatial_velocity(SpatialVector::zero());

    Ok(slider)
}
