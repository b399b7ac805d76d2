//! Arm control module
//!
//! Turns absolute joint-angle targets (from the operator or the external
//! inverse kinematics service) into a smoothly rate-limited, limit-clipped
//! sequence of commanded angles.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod blend;
mod cmd;
mod ik;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use blend::*;
pub use cmd::*;
pub use ik::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Target has {found} joints but the arm has {expected}")]
    TargetLengthMismatch { expected: usize, found: usize },

    #[error("No inverse kinematics solver is attached")]
    NoIkSolver,

    #[error(transparent)]
    IkError(#[from] IkError),
}
