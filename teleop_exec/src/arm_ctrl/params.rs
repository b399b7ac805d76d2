//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The number of articulated joints on the arm.
    pub joint_count: usize,

    /// Lower joint position limit, one entry per joint.
    ///
    /// Units: degrees
    pub lower_limits_deg: Vec<f64>,

    /// Upper joint position limit, one entry per joint.
    ///
    /// Units: degrees
    pub upper_limits_deg: Vec<f64>,

    /// Joint angles commanded at session start, one entry per joint.
    ///
    /// Units: degrees
    pub initial_angles_deg: Vec<f64>,

    // ---- MOTION POLICY ----
    /// Fraction of the remaining angular delta applied per cycle when
    /// blending towards a target.
    ///
    /// Units: normalised, in (0, 1]
    pub blend_factor: f64,

    /// Largest angular change any joint may make in one cycle, or `None`
    /// for no rate limit.
    ///
    /// Units: degrees
    pub max_step_deg: Option<f64>,

    /// Threshold below which the full remaining delta is committed in one
    /// cycle, or `None` to disable snapping.
    ///
    /// Units: degrees
    pub min_step_deg: Option<f64>,

    /// Angle applied by one manual joint step command.
    ///
    /// Units: degrees
    pub step_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            joint_count: 7,
            lower_limits_deg: vec![-180.0; 7],
            upper_limits_deg: vec![180.0; 7],
            initial_angles_deg: vec![0.0, -80.0, 90.0, 0.0, 0.0, 0.0, 0.0],
            blend_factor: 0.5,
            max_step_deg: Some(10.0),
            min_step_deg: Some(0.5),
            step_deg: 5.0,
        }
    }
}

impl Params {
    /// Determine if the parameter set is internally consistent.
    pub fn is_valid(&self) -> bool {
        self.lower_limits_deg.len() == self.joint_count
            && self.upper_limits_deg.len() == self.joint_count
            && self.initial_angles_deg.len() == self.joint_count
            && self
                .lower_limits_deg
                .iter()
                .zip(self.upper_limits_deg.iter())
                .all(|(lo, up)| lo <= up)
            && self.blend_factor > 0.0
            && self.blend_factor <= 1.0
            && self.max_step_deg.map_or(true, |v| v > 0.0)
            && self.min_step_deg.map_or(true, |v| v >= 0.0)
            && self.step_deg > 0.0
    }
}
