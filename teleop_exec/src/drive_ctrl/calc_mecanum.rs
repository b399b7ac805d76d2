//! Mecanum drive inverse kinematics
//!
//! Pure functions mapping operator intent onto four independently signed
//! wheel speeds. No clamping is performed here: speed limiting is applied to
//! the velocity scalar before the intent is computed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::{DriveDirective, DriveIntent, WheelCommand};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the wheel speeds for a continuous drive intent.
///
/// The mapping is the standard mecanum linear combination of the forward,
/// strafe and rotate demands, scaled by `velocity_scale`. Total over its
/// domain, no state, no error conditions.
pub fn calc_mecanum(intent: &DriveIntent, velocity_scale: f64) -> WheelCommand {
    let DriveIntent {
        forward: f,
        strafe: s,
        rotate: r,
    } = *intent;

    WheelCommand {
        front_left: (f + s + r) * velocity_scale,
        front_right: (f - s - r) * velocity_scale,
        rear_left: (f - s + r) * velocity_scale,
        rear_right: (f + s - r) * velocity_scale,
    }
}

/// Compute the wheel speeds for a discrete drive directive.
///
/// Each directive drives all four wheels at `velocity_scale`, with the signs
/// fixed per directive, or at zero for `Halt`.
pub fn calc_directive(directive: DriveDirective, velocity_scale: f64) -> WheelCommand {
    let v = velocity_scale;

    let (fl, fr, rl, rr) = match directive {
        DriveDirective::Advance => (v, v, v, v),
        DriveDirective::Retreat => (-v, -v, -v, -v),
        DriveDirective::PivotLeft => (-v, v, -v, v),
        DriveDirective::PivotRight => (v, -v, v, -v),
        DriveDirective::Halt => (0.0, 0.0, 0.0, 0.0),
    };

    WheelCommand {
        front_left: fl,
        front_right: fr,
        rear_left: rl,
        rear_right: rr,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
