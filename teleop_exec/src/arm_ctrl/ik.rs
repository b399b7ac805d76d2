//! Inverse kinematics seam
//!
//! The IK solver itself is an external physics service. Arm control only
//! consumes it through this trait: given the last commanded joint angles and
//! a desired end-effector offset, produce an absolute joint-angle target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A desired 3-D offset of the arm's end effector from its current pose.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PoseDelta {
    /// Offset along the x axis.
    ///
    /// Units: meters
    pub dx_m: f64,

    /// Offset along the y axis.
    ///
    /// Units: meters
    pub dy_m: f64,

    /// Offset along the z axis.
    ///
    /// Units: meters
    pub dz_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by an inverse kinematics solver.
#[derive(Debug, thiserror::Error)]
pub enum IkError {
    #[error("The IK solver could not produce a solution: {0}")]
    NoSolution(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An external inverse kinematics service.
pub trait IkSolver {
    /// Solve for an absolute joint-angle target.
    ///
    /// # Inputs
    /// - `current_angles`: the last commanded joint angles in radians.
    /// - `delta`: the desired end-effector offset.
    ///
    /// # Outputs
    /// - On success the absolute target joint angles in radians, one per
    ///   joint of the arm.
    fn solve(&mut self, current_angles: &[f64], delta: &PoseDelta) -> Result<Vec<f64>, IkError>;
}
