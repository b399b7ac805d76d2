//! Operator input mapping
//!
//! Raw controller and keyboard event sourcing lives outside this software;
//! what arrives here are already-sourced events (button indices, axis
//! values, text lines). This module turns them into teleop commands using
//! the configured bindings, applying dead-zone filtering to the continuous
//! axes.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bindings;
mod stdin_source;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use bindings::*;
pub use stdin_source::*;

use crate::arm_ctrl::{ArmCmd, StepDirection};
use crate::drive_ctrl::{DriveCmd, DriveDirective, DriveIntent};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An already-sourced operator input event.
#[derive(Clone, Debug, PartialEq)]
pub enum OperatorEvent {
    /// A controller button was pressed.
    ButtonPressed(u8),

    /// The continuous axis state for this cycle, indexed by raw axis number.
    AxisState(Vec<f64>),
}

/// A command for the control loop, mapped from operator input.
#[derive(Clone, Debug, PartialEq)]
pub enum TeleopCmd {
    Drive(DriveCmd),

    Arm(ArmCmd),

    /// Connect to the bridge at the given host.
    Connect { host: String },

    /// Drop the bridge connection.
    Disconnect,

    /// End the session.
    Quit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Maps operator events onto teleop commands using the configured bindings.
pub struct InputMapper {
    bindings: Bindings,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputMapper {
    pub fn new(bindings: Bindings) -> Self {
        Self { bindings }
    }

    /// Map an operator event onto a command, or `None` for unbound input.
    pub fn map_event(&self, event: &OperatorEvent) -> Option<TeleopCmd> {
        match event {
            OperatorEvent::ButtonPressed(button) => self.map_button(*button),
            OperatorEvent::AxisState(axes) => {
                Some(TeleopCmd::Drive(DriveCmd::Intent(self.map_axes(axes))))
            }
        }
    }

    /// Map a button index onto its bound command.
    fn map_button(&self, button: u8) -> Option<TeleopCmd> {
        let b = &self.bindings;

        let cmd = match button {
            _ if button == b.advance_button => {
                TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Advance))
            }
            _ if button == b.retreat_button => {
                TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Retreat))
            }
            _ if button == b.pivot_left_button => {
                TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::PivotLeft))
            }
            _ if button == b.pivot_right_button => {
                TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::PivotRight))
            }
            _ if button == b.halt_button => {
                TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Halt))
            }
            _ if button == b.speed_up_button => TeleopCmd::Drive(DriveCmd::IncreaseSpeed),
            _ if button == b.speed_down_button => TeleopCmd::Drive(DriveCmd::DecreaseSpeed),
            _ if button == b.select_next_button => TeleopCmd::Arm(ArmCmd::SelectNext),
            _ if button == b.select_previous_button => TeleopCmd::Arm(ArmCmd::SelectPrevious),
            _ if button == b.step_increase_button => {
                TeleopCmd::Arm(ArmCmd::StepSelected(StepDirection::Increase))
            }
            _ if button == b.step_decrease_button => {
                TeleopCmd::Arm(ArmCmd::StepSelected(StepDirection::Decrease))
            }
            _ => return None,
        };

        Some(cmd)
    }

    /// Build a drive intent from the raw axis state, applying the dead zone.
    ///
    /// Axes outside the supplied state read as centred. The forward axis is
    /// inverted when so configured (sticks usually report forward as
    /// negative).
    pub fn map_axes(&self, axes: &[f64]) -> DriveIntent {
        let b = &self.bindings;

        let axis = |index: usize| -> f64 {
            let raw = axes.get(index).copied().unwrap_or(0.0);
            apply_dead_zone(raw, b.dead_zone)
        };

        let mut forward = axis(b.forward_axis);
        if b.invert_forward {
            forward = -forward;
        }

        DriveIntent {
            forward,
            strafe: axis(b.strafe_axis),
            rotate: axis(b.rotate_axis),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Zero out axis values whose magnitude is below the threshold.
pub fn apply_dead_zone(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold {
        0.0
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dead_zone() {
        assert_eq!(apply_dead_zone(0.05, 0.1), 0.0);
        assert_eq!(apply_dead_zone(-0.05, 0.1), 0.0);
        assert_eq!(apply_dead_zone(0.5, 0.1), 0.5);
        assert_eq!(apply_dead_zone(-0.5, 0.1), -0.5);
    }

    #[test]
    fn test_button_table() {
        let mapper = InputMapper::new(Bindings::default());

        assert_eq!(
            mapper.map_event(&OperatorEvent::ButtonPressed(11)),
            Some(TeleopCmd::Drive(DriveCmd::Directive(
                DriveDirective::Advance
            )))
        );
        assert_eq!(
            mapper.map_event(&OperatorEvent::ButtonPressed(7)),
            Some(TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Halt)))
        );
        assert_eq!(
            mapper.map_event(&OperatorEvent::ButtonPressed(10)),
            Some(TeleopCmd::Drive(DriveCmd::IncreaseSpeed))
        );

        // Unbound button
        assert_eq!(mapper.map_event(&OperatorEvent::ButtonPressed(200)), None);
    }

    #[test]
    fn test_axis_mapping_with_dead_zone_and_inversion() {
        let mapper = InputMapper::new(Bindings::default());

        // Default bindings: strafe axis 0, forward axis 1 (inverted),
        // rotate axis 2, dead zone 0.1
        let intent = mapper.map_axes(&[0.5, -0.8, 0.05]);

        assert_eq!(intent.strafe, 0.5);
        assert_eq!(intent.forward, 0.8);
        assert_eq!(intent.rotate, 0.0);
    }

    #[test]
    fn test_missing_axes_read_centred() {
        let mapper = InputMapper::new(Bindings::default());

        let intent = mapper.map_axes(&[]);

        assert_eq!(intent, DriveIntent::default());
    }
}
