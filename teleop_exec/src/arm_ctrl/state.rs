//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::Serialize;

// Internal
use super::{
    ArmCmd, ArmMotionBlender, BlendConfig, BlendOutcome, IkSolver, JointLimits, Params,
    StepDirection,
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// The blending controller, which exclusively owns the commanded angle
    /// vector.
    blender: ArmMotionBlender,

    /// The external IK service, attached after init.
    ik_solver: Option<Box<dyn IkSolver>>,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// The arm commands pending this cycle, in arrival order. Empty when no
    /// new command arrived.
    pub cmds: Vec<ArmCmd>,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The blend policy applied this cycle, or `None` if no target is
    /// active.
    pub outcome: Option<BlendOutcome>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = Option<Vec<f64>>;
    type StatusReport = StatusReport;
    type ProcError = super::ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file. A file that is
    /// missing, malformed or internally inconsistent is reported and
    /// substituted with the documented defaults, it is never fatal.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = match params::load::<Params>(init_data) {
            Ok(p) => {
                if p.is_valid() {
                    p
                } else {
                    warn!("ArmCtrl params are inconsistent, using defaults");
                    Params::default()
                }
            }
            Err(e) => {
                warn!("Could not load ArmCtrl params ({}), using defaults", e);
                Params::default()
            }
        };

        let limits: Vec<JointLimits> = self
            .params
            .lower_limits_deg
            .iter()
            .zip(self.params.upper_limits_deg.iter())
            .map(|(lo, up)| JointLimits::from_degrees(*lo, *up))
            .collect();

        let initial: Vec<f64> = self
            .params
            .initial_angles_deg
            .iter()
            .map(|deg| deg.to_radians())
            .collect();

        self.blender = ArmMotionBlender::new(
            initial,
            limits,
            BlendConfig {
                blend_factor: self.params.blend_factor,
                max_step_deg: self.params.max_step_deg,
                min_step_deg: self.params.min_step_deg,
            },
        );

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    ///
    /// Executes every pending command in arrival order, then advances the
    /// blender exactly one step towards its active target. The output is the
    /// new commanded angle vector when it changed this cycle, `None`
    /// otherwise.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let before = self.blender.current_angles().to_vec();

        for cmd in &input_data.cmds {
            debug!("New ArmCtrl ArmCmd::{:?}", cmd);
            self.exec_cmd(cmd)?;
        }

        self.report.outcome = self.blender.step();

        let output = if self.blender.current_angles() != before.as_slice() {
            Some(self.blender.current_angles().to_vec())
        } else {
            None
        };

        Ok((output, self.report))
    }
}

impl ArmCtrl {
    /// Attach the external inverse kinematics service.
    pub fn set_ik_solver(&mut self, solver: Box<dyn IkSolver>) {
        self.ik_solver = Some(solver);
    }

    /// The last commanded joint angles in radians.
    pub fn current_angles(&self) -> &[f64] {
        self.blender.current_angles()
    }

    /// The joint currently addressed by manual step commands.
    pub fn selected_index(&self) -> usize {
        self.blender.selected_index()
    }

    /// Execute a single arm command against the blender.
    fn exec_cmd(&mut self, cmd: &ArmCmd) -> Result<(), super::ArmCtrlError> {
        match cmd {
            ArmCmd::SetTarget { angles_rad } => {
                self.check_target_len(angles_rad.len())?;
                self.blender.set_target(angles_rad.clone());
            }
            ArmCmd::PoseDelta(delta) => {
                let solver = self
                    .ik_solver
                    .as_mut()
                    .ok_or(super::ArmCtrlError::NoIkSolver)?;

                let target = solver.solve(self.blender.current_angles(), delta)?;

                self.check_target_len(target.len())?;
                self.blender.set_target(target);
            }
            ArmCmd::StepSelected(direction) => {
                // Manual stepping overrides any in-progress blend
                self.blender.clear_target();

                let step_rad = match direction {
                    StepDirection::Increase => self.params.step_deg.to_radians(),
                    StepDirection::Decrease => -self.params.step_deg.to_radians(),
                };

                self.blender
                    .step_joint(self.blender.selected_index(), step_rad);
            }
            ArmCmd::SelectNext => self.blender.select_next(),
            ArmCmd::SelectPrevious => self.blender.select_previous(),
            ArmCmd::Stop => self.blender.clear_target(),
        }

        Ok(())
    }

    fn check_target_len(&self, found: usize) -> Result<(), super::ArmCtrlError> {
        let expected = self.blender.joint_count();

        if found == expected {
            Ok(())
        } else {
            Err(super::ArmCtrlError::TargetLengthMismatch { expected, found })
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::{ArmCtrlError, IkError, PoseDelta};
    use super::*;

    /// IK double returning a fixed target.
    struct FixedIk {
        target: Vec<f64>,
    }

    impl IkSolver for FixedIk {
        fn solve(&mut self, _current: &[f64], _delta: &PoseDelta) -> Result<Vec<f64>, IkError> {
            Ok(self.target.clone())
        }
    }

    fn arm_ctrl() -> ArmCtrl {
        let mut ctrl = ArmCtrl::default();

        ctrl.params = Params {
            joint_count: 3,
            lower_limits_deg: vec![-180.0; 3],
            upper_limits_deg: vec![180.0; 3],
            initial_angles_deg: vec![0.0; 3],
            blend_factor: 0.5,
            max_step_deg: None,
            min_step_deg: None,
            step_deg: 5.0,
        };

        let limits = vec![JointLimits::from_degrees(-180.0, 180.0); 3];

        ctrl.blender = ArmMotionBlender::new(
            vec![0.0; 3],
            limits,
            BlendConfig {
                blend_factor: 0.5,
                max_step_deg: None,
                min_step_deg: None,
            },
        );

        ctrl
    }

    #[test]
    fn test_no_cmd_no_target_produces_no_output() {
        let mut ctrl = arm_ctrl();

        let (output, report) = ctrl.proc(&InputData { cmds: vec![] }).unwrap();

        assert!(output.is_none());
        assert!(report.outcome.is_none());
    }

    #[test]
    fn test_set_target_blends_across_cycles() {
        let mut ctrl = arm_ctrl();

        let (output, report) = ctrl
            .proc(&InputData {
                cmds: vec![ArmCmd::SetTarget {
                    angles_rad: vec![1.0, 0.0, 0.0],
                }],
            })
            .unwrap();

        assert_eq!(report.outcome, Some(BlendOutcome::Blended));
        let angles = output.expect("expected motion on the first cycle");
        assert!((angles[0] - 0.5).abs() < 1e-9);

        // Target persists: the next cycle keeps moving without a new command
        let (output, _) = ctrl.proc(&InputData { cmds: vec![] }).unwrap();
        let angles = output.expect("expected motion on the second cycle");
        assert!((angles[0] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_target_length_mismatch_is_rejected() {
        let mut ctrl = arm_ctrl();

        let result = ctrl.proc(&InputData {
            cmds: vec![ArmCmd::SetTarget {
                angles_rad: vec![1.0, 0.0],
            }],
        });

        match result {
            Err(ArmCtrlError::TargetLengthMismatch { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected TargetLengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_pose_delta_without_solver_is_rejected() {
        let mut ctrl = arm_ctrl();

        let result = ctrl.proc(&InputData {
            cmds: vec![ArmCmd::PoseDelta(PoseDelta::default())],
        });

        assert!(matches!(result, Err(ArmCtrlError::NoIkSolver)));
    }

    #[test]
    fn test_pose_delta_routes_through_solver() {
        let mut ctrl = arm_ctrl();
        ctrl.set_ik_solver(Box::new(FixedIk {
            target: vec![0.4, 0.2, 0.0],
        }));

        let (output, _) = ctrl
            .proc(&InputData {
                cmds: vec![ArmCmd::PoseDelta(PoseDelta {
                    dx_m: 0.01,
                    dy_m: 0.0,
                    dz_m: 0.0,
                })],
            })
            .unwrap();

        let angles = output.expect("expected motion towards the IK target");
        assert!((angles[0] - 0.2).abs() < 1e-9);
        assert!((angles[1] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_manual_step_clears_target() {
        let mut ctrl = arm_ctrl();

        ctrl.proc(&InputData {
            cmds: vec![ArmCmd::SetTarget {
                angles_rad: vec![1.0, 0.0, 0.0],
            }],
        })
        .unwrap();

        let (output, report) = ctrl
            .proc(&InputData {
                cmds: vec![ArmCmd::StepSelected(StepDirection::Increase)],
            })
            .unwrap();

        // The step landed and no blend ran afterwards
        assert!(report.outcome.is_none());
        let angles = output.expect("expected the manual step to move the joint");
        assert!((angles[0] - (0.5 + 5f64.to_radians())).abs() < 1e-9);

        // With the target cleared the next cycle is quiet
        let (output, _) = ctrl.proc(&InputData { cmds: vec![] }).unwrap();
        assert!(output.is_none());
    }

    #[test]
    fn test_selection_commands() {
        let mut ctrl = arm_ctrl();

        ctrl.proc(&InputData {
            cmds: vec![ArmCmd::SelectNext],
        })
        .unwrap();
        assert_eq!(ctrl.selected_index(), 1);

        ctrl.proc(&InputData {
            cmds: vec![ArmCmd::SelectPrevious],
        })
        .unwrap();
        assert_eq!(ctrl.selected_index(), 0);

        // Clamped at the first joint
        ctrl.proc(&InputData {
            cmds: vec![ArmCmd::SelectPrevious],
        })
        .unwrap();
        assert_eq!(ctrl.selected_index(), 0);
    }

    #[test]
    fn test_every_pending_command_executes_in_order() {
        let mut ctrl = arm_ctrl();

        // A selection change queued in the same cycle as the step must land
        // before it, so the step moves the newly selected joint
        let (output, report) = ctrl
            .proc(&InputData {
                cmds: vec![
                    ArmCmd::SelectNext,
                    ArmCmd::StepSelected(StepDirection::Increase),
                ],
            })
            .unwrap();

        assert_eq!(ctrl.selected_index(), 1);
        assert!(report.outcome.is_none());

        let angles = output.expect("expected the step to move the selected joint");
        assert!((angles[1] - 5f64.to_radians()).abs() < 1e-9);
        assert!(angles[0].abs() < 1e-9);
    }

    #[test]
    fn test_stop_drops_the_target() {
        let mut ctrl = arm_ctrl();

        ctrl.proc(&InputData {
            cmds: vec![ArmCmd::SetTarget {
                angles_rad: vec![1.0, 0.0, 0.0],
            }],
        })
        .unwrap();

        let (output, _) = ctrl
            .proc(&InputData {
                cmds: vec![ArmCmd::Stop],
            })
            .unwrap();
        assert!(output.is_none());

        let (output, _) = ctrl.proc(&InputData { cmds: vec![] }).unwrap();
        assert!(output.is_none());
    }
}
