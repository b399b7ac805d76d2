//! Commands passed into DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::NUM_WHEELS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Normalised operator drive intent, recomputed every cycle from the axis
/// state after dead-zone filtering.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct DriveIntent {
    /// Forward motion demand.
    ///
    /// Units: normalised, -1 (full reverse) to +1 (full forward)
    pub forward: f64,

    /// Sideways (strafe) motion demand.
    ///
    /// Units: normalised, -1 (full left) to +1 (full right)
    pub strafe: f64,

    /// Rotation demand about the base's vertical axis.
    ///
    /// Units: normalised, -1 (full counter-clockwise) to +1 (full clockwise)
    pub rotate: f64,
}

/// Speed demand for all four wheels, in the fixed order front left, front
/// right, rear left, rear right.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct WheelCommand {
    pub front_left: f64,
    pub front_right: f64,
    pub rear_left: f64,
    pub rear_right: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to be executed by DriveCtrl.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriveCmd {
    /// Continuous drive from the operator's axis state.
    Intent(DriveIntent),

    /// One of the fixed discrete manoeuvres.
    Directive(DriveDirective),

    /// Raise the speed scalar by the configured increment.
    IncreaseSpeed,

    /// Lower the speed scalar by the configured increment.
    DecreaseSpeed,
}

/// Discrete drive manoeuvres mapped from operator buttons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriveDirective {
    /// Drive straight forwards.
    Advance,
    /// Drive straight backwards.
    Retreat,
    /// Rotate on the spot to the left.
    PivotLeft,
    /// Rotate on the spot to the right.
    PivotRight,
    /// Bring all wheels to zero speed.
    Halt,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveIntent {
    /// Determine if the intent is valid (all components finite and
    /// normalised).
    pub fn is_valid(&self) -> bool {
        [self.forward, self.strafe, self.rotate]
            .iter()
            .all(|v| v.is_finite() && (-1.0..=1.0).contains(v))
    }
}

impl WheelCommand {
    /// The command as an array in the fixed wheel order.
    pub fn as_array(&self) -> [f64; NUM_WHEELS] {
        [
            self.front_left,
            self.front_right,
            self.rear_left,
            self.rear_right,
        ]
    }
}
