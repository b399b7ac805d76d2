//! Incremental arm-motion blending
//!
//! The blender owns the authoritative "last commanded" joint-angle vector and
//! turns an absolute target into a sequence of limit-clipped steps. Each step
//! applies one of three policies, decided in priority order:
//!
//!   1. Snap - the remaining delta is below the configured minimum step, so
//!      the full target is committed in one cycle.
//!   2. Rate limit - the blended step of the largest joint would exceed the
//!      configured maximum, so the fraction is shrunk until it equals it.
//!   3. Blend - the configured blend factor is applied unchanged.
//!
//! The chosen fraction is applied uniformly to every joint, preserving the
//! shape of the motion.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position limits of a single joint.
///
/// Invariant: `lower_rad <= upper_rad`. Every angle the blender commands lies
/// inside this interval.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct JointLimits {
    /// Units: radians
    pub lower_rad: f64,

    /// Units: radians
    pub upper_rad: f64,
}

/// Immutable blending policy, supplied at construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BlendConfig {
    /// Fraction of the remaining delta applied per step.
    ///
    /// Units: normalised, in (0, 1]
    pub blend_factor: f64,

    /// Largest per-joint step allowed per cycle, or `None` for no limit.
    ///
    /// Units: degrees, > 0 when present
    pub max_step_deg: Option<f64>,

    /// Threshold below which the full delta is committed at once, or `None`
    /// to disable snapping.
    ///
    /// Units: degrees, >= 0 when present
    pub min_step_deg: Option<f64>,
}

/// The arm-motion blending controller.
///
/// Owns the arm state exclusively: the commanded angle vector is only ever
/// mutated through the operations below, and every mutation ends with a clip
/// into the joint limits.
#[derive(Default)]
pub struct ArmMotionBlender {
    /// The authoritative last commanded joint angles.
    ///
    /// Units: radians
    current_angles: Vec<f64>,

    limits: Vec<JointLimits>,

    config: BlendConfig,

    /// The joint addressed by manual step commands. Always in
    /// `[0, joint_count)`.
    selected_index: usize,

    /// The active absolute target, or `None` when there is no motion.
    target: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The policy a blend step ended up applying.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub enum BlendOutcome {
    /// The full remaining delta was committed (fraction = 1).
    Snap,

    /// The fraction was shrunk so the largest joint stepped exactly the
    /// configured maximum.
    RateLimited,

    /// The configured blend factor was applied unchanged.
    Blended,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmMotionBlender {
    /// Create a new blender.
    ///
    /// The initial angles are clipped into the limits, so the commanded
    /// vector starts valid regardless of what was configured.
    ///
    /// # Panics
    ///
    /// In debug builds if `initial_angles` and `limits` differ in length.
    pub fn new(initial_angles: Vec<f64>, limits: Vec<JointLimits>, config: BlendConfig) -> Self {
        debug_assert_eq!(initial_angles.len(), limits.len());

        let mut blender = Self {
            current_angles: initial_angles,
            limits,
            config,
            selected_index: 0,
            target: None,
        };

        blender.clip();

        blender
    }

    /// The number of joints on the arm.
    pub fn joint_count(&self) -> usize {
        self.current_angles.len()
    }

    /// The last commanded joint angles in radians.
    pub fn current_angles(&self) -> &[f64] {
        &self.current_angles
    }

    /// The joint currently addressed by manual step commands.
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Whether a target is currently being blended towards.
    pub fn target_active(&self) -> bool {
        self.target.is_some()
    }

    /// Set the absolute target to blend towards on subsequent steps.
    ///
    /// Callers must supply one angle per joint.
    pub fn set_target(&mut self, target: Vec<f64>) {
        debug_assert_eq!(target.len(), self.joint_count());

        self.target = Some(target);
    }

    /// Drop the active target. The arm holds its current angles.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Blend one step towards the given target and return the new commanded
    /// angles.
    ///
    /// Equivalent to [`set_target`](Self::set_target) followed by
    /// [`step`](Self::step).
    pub fn update(&mut self, target: Vec<f64>) -> &[f64] {
        self.set_target(target);
        self.step();

        &self.current_angles
    }

    /// Blend one step towards the active target.
    ///
    /// A no-op returning `None` when no target has ever been set: there is
    /// no motion without an active target. Once the target is reached,
    /// further steps compute zero deltas and leave the angles unchanged.
    pub fn step(&mut self) -> Option<BlendOutcome> {
        let target = self.target.as_ref()?;

        // Largest per-joint change magnitude, in degrees
        let max_delta_deg = target
            .iter()
            .zip(self.current_angles.iter())
            .map(|(t, c)| (t - c).abs().to_degrees())
            .fold(0.0, f64::max);

        let (outcome, fraction) = decide_fraction(max_delta_deg, &self.config);

        for (current, t) in self.current_angles.iter_mut().zip(target.iter()) {
            *current += (t - *current) * fraction;
        }

        self.clip();

        Some(outcome)
    }

    /// Directly nudge one joint by `delta_rad`, bypassing the blend policy.
    ///
    /// Callers must only supply indices in `[0, joint_count)`; the selected
    /// index satisfies this by construction.
    pub fn step_joint(&mut self, index: usize, delta_rad: f64) {
        debug_assert!(index < self.joint_count());

        if let Some(angle) = self.current_angles.get_mut(index) {
            *angle += delta_rad;
        }

        self.clip();
    }

    /// Clamp every commanded angle into its joint limits. Idempotent.
    pub fn clip(&mut self) {
        for (angle, limits) in self.current_angles.iter_mut().zip(self.limits.iter()) {
            *angle = maths::clamp(angle, &limits.lower_rad, &limits.upper_rad);
        }
    }

    /// Select the next joint, clamped at the last joint (no wraparound).
    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.joint_count() {
            self.selected_index += 1;
        }
    }

    /// Select the previous joint, clamped at the first joint (no
    /// wraparound).
    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Change the number of joints on the arm.
    ///
    /// All angles are reset to zero (then clipped), the selection returns to
    /// the first joint and any active target is dropped. New limits must be
    /// supplied alongside, one per joint.
    pub fn set_joint_count(&mut self, joint_count: usize, limits: Vec<JointLimits>) {
        debug_assert_eq!(limits.len(), joint_count);

        self.current_angles = vec![0.0; joint_count];
        self.limits = limits;
        self.selected_index = 0;
        self.target = None;

        self.clip();
    }
}

impl JointLimits {
    pub fn from_degrees(lower_deg: f64, upper_deg: f64) -> Self {
        Self {
            lower_rad: lower_deg.to_radians(),
            upper_rad: upper_deg.to_radians(),
        }
    }
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            blend_factor: 0.5,
            max_step_deg: None,
            min_step_deg: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Decide which policy applies to a step and the fraction of the delta to
/// apply.
///
/// Snap takes priority over rate limiting: a delta below the minimum step is
/// committed in full even when a maximum step is also configured.
fn decide_fraction(max_delta_deg: f64, config: &BlendConfig) -> (BlendOutcome, f64) {
    if let Some(min_step_deg) = config.min_step_deg {
        if max_delta_deg < min_step_deg {
            return (BlendOutcome::Snap, 1.0);
        }
    }

    if let Some(max_step_deg) = config.max_step_deg {
        if max_delta_deg > 0.0 && max_step_deg / max_delta_deg < config.blend_factor {
            return (BlendOutcome::RateLimited, max_step_deg / max_delta_deg);
        }
    }

    (BlendOutcome::Blended, config.blend_factor)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    fn assert_angles_eq(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(
                (a - e).abs() < EPSILON,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    fn three_joint_blender(config: BlendConfig) -> ArmMotionBlender {
        ArmMotionBlender::new(
            vec![0.0; 3],
            vec![
                JointLimits {
                    lower_rad: 0.0,
                    upper_rad: PI,
                };
                3
            ],
            config,
        )
    }

    #[test]
    fn test_step_without_target_is_noop() {
        let mut blender = three_joint_blender(BlendConfig::default());

        assert_eq!(blender.step(), None);
        assert_angles_eq(blender.current_angles(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_plain_blend() {
        // blend factor 0.5, no min/max step: one update halves the delta
        let mut blender = three_joint_blender(BlendConfig::default());

        let angles = blender.update(vec![PI, PI / 2.0, 0.0]).to_vec();

        assert_angles_eq(&angles, &[PI / 2.0, PI / 4.0, 0.0]);
    }

    #[test]
    fn test_rate_limited_blend() {
        // Largest raw delta is 180 deg, max step 10 deg: fraction becomes
        // 10/180, giving steps of 10, 5 and 0 degrees
        let mut blender = three_joint_blender(BlendConfig {
            blend_factor: 0.5,
            max_step_deg: Some(10.0),
            min_step_deg: None,
        });

        let angles = blender.update(vec![PI, PI / 2.0, 0.0]).to_vec();

        assert_angles_eq(
            &angles,
            &[10f64.to_radians(), 5f64.to_radians(), 0.0],
        );
    }

    #[test]
    fn test_max_step_bounds_every_update() {
        // Even with blend factor 1.0 no joint may move more than the max
        // step in a single update
        let mut blender = three_joint_blender(BlendConfig {
            blend_factor: 1.0,
            max_step_deg: Some(10.0),
            min_step_deg: None,
        });

        let before = blender.current_angles().to_vec();
        let after = blender.update(vec![PI, PI / 2.0, 0.0]).to_vec();

        for (b, a) in before.iter().zip(after.iter()) {
            assert!((a - b).abs().to_degrees() <= 10.0 + EPSILON);
        }
    }

    #[test]
    fn test_snap_below_min_step() {
        // A delta below the min step is committed in exactly one update
        let mut blender = three_joint_blender(BlendConfig {
            blend_factor: 0.5,
            max_step_deg: Some(10.0),
            min_step_deg: Some(2.0),
        });

        let target = vec![1f64.to_radians(), 0.5f64.to_radians(), 0.0];
        let angles = blender.update(target.clone()).to_vec();

        assert_angles_eq(&angles, &target);
    }

    #[test]
    fn test_snap_takes_priority_over_rate_limit() {
        // min step greater than max step: snap wins for small deltas
        let (outcome, fraction) = {
            let config = BlendConfig {
                blend_factor: 0.5,
                max_step_deg: Some(1.0),
                min_step_deg: Some(5.0),
            };
            super::decide_fraction(3.0, &config)
        };

        assert_eq!(outcome, BlendOutcome::Snap);
        assert_eq!(fraction, 1.0);
    }

    #[test]
    fn test_decide_fraction_outcomes() {
        let config = BlendConfig {
            blend_factor: 0.5,
            max_step_deg: Some(10.0),
            min_step_deg: Some(1.0),
        };

        // Below min: snap
        assert_eq!(super::decide_fraction(0.5, &config).0, BlendOutcome::Snap);

        // Blended step under the max: blend factor applies
        let (outcome, fraction) = super::decide_fraction(15.0, &config);
        assert_eq!(outcome, BlendOutcome::Blended);
        assert_eq!(fraction, 0.5);

        // Blended step over the max: rate limited to exactly the max
        let (outcome, fraction) = super::decide_fraction(180.0, &config);
        assert_eq!(outcome, BlendOutcome::RateLimited);
        assert!((fraction * 180.0 - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_update_idempotent_once_reached() {
        let mut blender = three_joint_blender(BlendConfig {
            blend_factor: 0.5,
            max_step_deg: None,
            min_step_deg: Some(1.0),
        });

        let target = vec![PI / 2.0, PI / 4.0, 0.0];

        // Converge
        for _ in 0..64 {
            blender.update(target.clone());
        }
        let reached = blender.current_angles().to_vec();
        assert_angles_eq(&reached, &target);

        // Further updates with the same target change nothing
        blender.update(target.clone());
        assert_angles_eq(blender.current_angles(), &reached);
    }

    #[test]
    fn test_clip_is_fixed_point() {
        let mut blender = three_joint_blender(BlendConfig::default());

        blender.step_joint(0, -1.0);
        let once = blender.current_angles().to_vec();

        blender.clip();
        assert_angles_eq(blender.current_angles(), &once);
    }

    #[test]
    fn test_step_joint_clips_into_limits() {
        let mut blender = three_joint_blender(BlendConfig::default());

        blender.step_joint(1, 2.0 * PI);
        assert!((blender.current_angles()[1] - PI).abs() < EPSILON);

        blender.step_joint(1, -10.0 * PI);
        assert!(blender.current_angles()[1].abs() < EPSILON);
    }

    #[test]
    fn test_selection_clamps_without_wraparound() {
        let mut blender = three_joint_blender(BlendConfig::default());

        blender.select_previous();
        assert_eq!(blender.selected_index(), 0);

        for _ in 0..10 {
            blender.select_next();
        }
        assert_eq!(blender.selected_index(), 2);
    }

    #[test]
    fn test_set_joint_count_resets_state() {
        let mut blender = three_joint_blender(BlendConfig::default());

        blender.set_target(vec![1.0, 1.0, 1.0]);
        blender.select_next();

        blender.set_joint_count(
            2,
            vec![
                JointLimits {
                    lower_rad: -1.0,
                    upper_rad: 1.0,
                };
                2
            ],
        );

        assert_eq!(blender.joint_count(), 2);
        assert_eq!(blender.selected_index(), 0);
        assert!(!blender.target_active());
        assert_angles_eq(blender.current_angles(), &[0.0, 0.0]);
    }
}
