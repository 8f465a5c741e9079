use crate::{
    bounce::BallPaddle,
    params::{InputVector, StateVector},
};

pub mod mpc;

pub trait Controller {
    fn control(&mut self, state: &StateVector) -> InputVector;
}

/// Leaves the floor unactuated
pub struct NullController {}

impl Controller for NullController {
    fn control(&mut self, _state: &StateVector) -> InputVector {
        InputVector::zeros()
    }
}

/// Adapt a controller to the simulator's control callback
pub fn control_fn<C: Controller>(
    controller: &mut C,
) -> impl FnMut(&BallPaddle) -> InputVector + '_ {
    move |system: &BallPaddle| controller.control(&system.x)
}
