#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod bounce;
pub mod config;
pub mod contact;
pub mod control;
pub mod error;
pub mod logger;
pub mod params;
pub mod plot;
pub mod polytope;
pub mod region;
pub mod rigid_body;
pub mod simulate;
pub mod slider;
pub mod spatial;
pub mod types;
pub mod util;
pub mod vision;

pub use error::{Error, Result};

pub const GRAVITY: Float = 9.81;

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;
