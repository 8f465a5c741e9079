use itertools::izip;
use na::Vector4;

use crate::{
    params::{idx, BounceParams, StateVector},
    types::Float,
};

/// Indices of the positional states [xb, yb, xf, yf]
pub const POSITION_INDEX: [usize; 4] = [idx::XB, idx::YB, idx::XF, idx::YF];

pub type PositionVector = Vector4<Float>;

/// Extract the positional subset of a full state vector
pub fn positional(x: &StateVector) -> PositionVector {
    PositionVector::from_iterator(POSITION_INDEX.iter().map(|i| x[*i]))
}

/// Axis-aligned region described by its elementwise bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub min: PositionVector,
    pub max: PositionVector,
}

impl Region {
    pub fn new(max: PositionVector, min: PositionVector) -> Self {
        Region { min, max }
    }

    /// Elementwise midpoint of max and min
    pub fn center(&self) -> PositionVector {
        (self.max + self.min) / 2.
    }

    /// Elementwise |max - min|
    pub fn extent(&self) -> PositionVector {
        (self.max - self.min).abs()
    }

    pub fn half_extent(&self) -> PositionVector {
        self.extent() / 2.
    }

    /// Rectangle of the ball position, as (origin corner, width, height)
    pub fn ball_rect(&self) -> ((Float, Float), Float, Float) {
        self.rect(0)
    }

    /// Rectangle of the floor position, as (origin corner, width, height)
    pub fn floor_rect(&self) -> ((Float, Float), Float, Float) {
        self.rect(2)
    }

    fn rect(&self, offset: usize) -> ((Float, Float), Float, Float) {
        let extent = self.extent();
        (
            (self.min[offset], self.min[offset + 1]),
            extent[offset],
            extent[offset + 1],
        )
    }
}

/// Safety and target regions of the ball and the floor, for plotting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Regions {
    pub safety: Region,
    pub target: Region,
}

impl Regions {
    pub fn from_params(params: &BounceParams) -> Self {
        let (x_min, x_max) = params.state_bounds();
        let (xn_min, xn_max) = params.terminal_bounds();
        Regions {
            safety: Region::new(positional(&x_max), positional(&x_min)),
            target: Region::new(positional(&xn_max), positional(&xn_min)),
        }
    }

    /// Symmetric axis limit that fits every region with a 10% margin
    pub fn axis_limit(&self) -> Float {
        let max_abs = izip!(
            self.safety.max.iter(),
            self.target.max.iter(),
            self.safety.min.iter(),
            self.target.min.iter()
        )
        .flat_map(|(a, b, c, d)| [a, b, c, d])
        .fold(0., |acc: Float, v| acc.max(v.abs()));
        max_abs * 1.1
    }
}
