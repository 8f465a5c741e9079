//! Error type shared by every module of the crate.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Float;

#[derive(Debug, Error)]
pub enum Error {
    /// A scalar parameter is out of its admissible range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: Float,
        reason: &'static str,
    },

    /// Lower bound above upper bound.
    #[error("{what} bound at index {index}: lower {lower} > upper {upper}")]
    BoundOrder {
        what: &'static str,
        index: usize,
        lower: Float,
        upper: Float,
    },

    /// Terminal bounds leave the state bounds.
    #[error("terminal bound at index {index} ([{lower}, {upper}]) is outside the state bounds")]
    TerminalOutsideStateBounds {
        index: usize,
        lower: Float,
        upper: Float,
    },

    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("contact point frame {point} does not match body frame {body}")]
    FrameMismatch { point: String, body: String },

    /// The QP solver did not reach a solution.
    #[error("solver failed: {0}")]
    Solver(String),

    #[error("config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stream read error: {0}")]
    Stream(#[from] std::io::Error),

    /// Frame buffers with incompatible shapes.
    #[error("frame shape mismatch: {0}")]
    FrameShape(String),

    #[error("capture `{0}` already released")]
    Released(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BoundOrder {
            what: "state",
            index: 3,
            lower: 1.0,
            upper: -1.0,
        };
        assert_eq!(
            format!("{err}"),
            "state bound at index 3: lower 1 > upper -1"
        );

        let err = Error::Released("color".to_string());
        assert!(format!("{err}").contains("color"));
    }
}
