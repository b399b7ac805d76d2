//! # Teleop library.
//!
//! This library exposes the operator-side control modules so that other
//! crates (and the integration tests) can access items defined inside the
//! executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - blends absolute joint-angle targets into rate-limited commanded angles
pub mod arm_ctrl;

/// Drive control module - converts operator intents into individual wheel speed commands
pub mod drive_ctrl;

/// Operator input mapping - turns raw controller/keyboard events into teleop commands
pub mod input;

/// Command router - forwards module outputs to the bridge on their configured topics
pub mod router;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one control cycle.
pub const CYCLE_PERIOD_S: f64 = 1.0 / 30.0;

/// Number of control cycles per second.
pub const CYCLE_FREQUENCY_HZ: f64 = 30.0;
