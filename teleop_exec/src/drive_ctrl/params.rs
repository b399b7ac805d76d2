//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Drive control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Speed scalar applied to wheel commands at session start.
    ///
    /// Units: wheel speed units (controller defined)
    pub default_speed: f64,

    /// Amount the speed scalar changes per increase/decrease command.
    ///
    /// Units: wheel speed units
    pub speed_increment: f64,

    /// Lowest allowed speed scalar.
    ///
    /// Units: wheel speed units
    pub min_speed: f64,

    /// Highest allowed speed scalar.
    ///
    /// Units: wheel speed units
    pub max_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            default_speed: 10.0,
            speed_increment: 5.0,
            min_speed: 0.0,
            max_speed: 30.0,
        }
    }
}
