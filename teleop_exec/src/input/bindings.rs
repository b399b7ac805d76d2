//! Operator input bindings

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bindings from raw controller buttons and axes onto teleop commands.
///
/// Loaded from `input.toml`, with the defaults matching the operator
/// controller layout in use.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Bindings {
    /// Button driving the base straight forwards.
    pub advance_button: u8,

    /// Button driving the base straight backwards.
    pub retreat_button: u8,

    /// Button pivoting the base on the spot to the left.
    pub pivot_left_button: u8,

    /// Button pivoting the base on the spot to the right.
    pub pivot_right_button: u8,

    /// Button halting all wheels.
    pub halt_button: u8,

    /// Button raising the speed scalar.
    pub speed_up_button: u8,

    /// Button lowering the speed scalar.
    pub speed_down_button: u8,

    /// Button selecting the next arm joint.
    pub select_next_button: u8,

    /// Button selecting the previous arm joint.
    pub select_previous_button: u8,

    /// Button stepping the selected arm joint up.
    pub step_increase_button: u8,

    /// Button stepping the selected arm joint down.
    pub step_decrease_button: u8,

    /// Raw axis index for the forward demand.
    pub forward_axis: usize,

    /// Raw axis index for the strafe demand.
    pub strafe_axis: usize,

    /// Raw axis index for the rotation demand.
    pub rotate_axis: usize,

    /// Axis magnitudes below this threshold read as centred.
    ///
    /// Units: normalised axis deflection
    pub dead_zone: f64,

    /// Negate the forward axis after dead-zone filtering.
    pub invert_forward: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Bindings {
    fn default() -> Self {
        Self {
            advance_button: 11,
            retreat_button: 12,
            pivot_left_button: 13,
            pivot_right_button: 14,
            halt_button: 7,
            speed_up_button: 10,
            speed_down_button: 9,
            select_next_button: 5,
            select_previous_button: 4,
            step_increase_button: 3,
            step_decrease_button: 0,
            forward_axis: 1,
            strafe_axis: 0,
            rotate_axis: 2,
            dead_zone: 0.1,
            invert_forward: true,
        }
    }
}
