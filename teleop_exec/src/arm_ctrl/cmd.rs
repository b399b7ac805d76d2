//! Commands passed into ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::PoseDelta;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to be executed by ArmCtrl.
#[derive(Clone, Debug, PartialEq)]
pub enum ArmCmd {
    /// Set an absolute joint-angle target to blend towards.
    SetTarget {
        /// Target joint angles in radians, one per joint.
        angles_rad: Vec<f64>,
    },

    /// Move the end effector by an offset, resolved to a joint-angle target
    /// through the attached IK solver.
    PoseDelta(PoseDelta),

    /// Nudge the currently selected joint by the configured step angle.
    /// Manual stepping is immediate and unblended, and clears any active
    /// target.
    StepSelected(StepDirection),

    /// Select the next joint, clamped at the last joint.
    SelectNext,

    /// Select the previous joint, clamped at the first joint.
    SelectPrevious,

    /// Drop the active target, holding the arm at its current angles.
    Stop,
}

/// Direction of a manual joint step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepDirection {
    Increase,
    Decrease,
}
