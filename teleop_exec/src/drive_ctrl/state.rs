//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{calc_directive, calc_mecanum, DriveCmd, Params, WheelCommand};
use util::{maths, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// The speed scalar applied to all wheel commands.
    velocity_scale: f64,
}

/// Input data to Drive Control.
#[derive(Default)]
pub struct InputData {
    /// The drive commands pending this cycle, in arrival order. Empty when
    /// no new command arrived.
    pub cmds: Vec<DriveCmd>,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Raised when a speed change command hit the configured limit.
    pub speed_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = Option<WheelCommand>;
    type StatusReport = StatusReport;
    type ProcError = super::DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file. A file that
    /// cannot be loaded is reported and substituted with the documented
    /// defaults, it is never fatal.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    "Could not load DriveCtrl params ({}), using defaults",
                    e
                );
                Params::default()
            }
        };

        self.velocity_scale = self.params.default_speed;

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    ///
    /// Executes every pending command in arrival order. Speed change
    /// commands mutate the scalar and produce no wheel command of their own;
    /// of the motion commands only the last one's wheel command survives, so
    /// at most one wheel command leaves per cycle, computed at the scalar
    /// current when that command is reached.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let mut output = None;

        for cmd in &input_data.cmds {
            match cmd {
                DriveCmd::Intent(intent) => {
                    if !intent.is_valid() {
                        return Err(super::DriveCtrlError::InvalidIntent(*intent));
                    }

                    output = Some(calc_mecanum(intent, self.velocity_scale));
                }
                DriveCmd::Directive(directive) => {
                    output = Some(calc_directive(*directive, self.velocity_scale));
                }
                DriveCmd::IncreaseSpeed => self.change_speed(self.params.speed_increment),
                DriveCmd::DecreaseSpeed => self.change_speed(-self.params.speed_increment),
            }
        }

        if let Some(ref cmd) = output {
            trace!("DriveCtrl output: {:?}", cmd.as_array());
        }

        Ok((output, self.report))
    }
}

impl DriveCtrl {
    /// The current speed scalar.
    pub fn velocity_scale(&self) -> f64 {
        self.velocity_scale
    }

    /// Apply a speed change, clamping into the configured speed range.
    fn change_speed(&mut self, delta: f64) {
        let demanded = self.velocity_scale + delta;

        self.velocity_scale = maths::clamp(&demanded, &self.params.min_speed, &self.params.max_speed);

        if self.velocity_scale != demanded {
            self.report.speed_limited = true;
        }

        trace!("DriveCtrl velocity scale now {}", self.velocity_scale);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::{DriveDirective, DriveIntent};
    use super::*;

    fn drive_ctrl() -> DriveCtrl {
        let mut ctrl = DriveCtrl::default();
        ctrl.params = Params::default();
        ctrl.velocity_scale = ctrl.params.default_speed;
        ctrl
    }

    #[test]
    fn test_no_cmd_produces_no_output() {
        let mut ctrl = drive_ctrl();

        let (output, _) = ctrl.proc(&InputData { cmds: vec![] }).unwrap();

        assert!(output.is_none());
    }

    #[test]
    fn test_directive_uses_current_scale() {
        let mut ctrl = drive_ctrl();

        let (output, _) = ctrl
            .proc(&InputData {
                cmds: vec![DriveCmd::Directive(DriveDirective::Advance)],
            })
            .unwrap();

        assert_eq!(output.unwrap().as_array(), [10.0; 4]);
    }

    #[test]
    fn test_speed_increment_and_limit() {
        let mut ctrl = drive_ctrl();

        // Default 10, increment 5, max 30: five increases should limit
        for _ in 0..4 {
            let (output, report) = ctrl
                .proc(&InputData {
                    cmds: vec![DriveCmd::IncreaseSpeed],
                })
                .unwrap();
            assert!(output.is_none());
            assert!(!report.speed_limited);
        }
        assert_eq!(ctrl.velocity_scale(), 30.0);

        let (_, report) = ctrl
            .proc(&InputData {
                cmds: vec![DriveCmd::IncreaseSpeed],
            })
            .unwrap();
        assert!(report.speed_limited);
        assert_eq!(ctrl.velocity_scale(), 30.0);
    }

    #[test]
    fn test_speed_decrement_floor() {
        let mut ctrl = drive_ctrl();

        for _ in 0..2 {
            ctrl.proc(&InputData {
                cmds: vec![DriveCmd::DecreaseSpeed],
            })
            .unwrap();
        }
        assert_eq!(ctrl.velocity_scale(), 0.0);

        let (_, report) = ctrl
            .proc(&InputData {
                cmds: vec![DriveCmd::DecreaseSpeed],
            })
            .unwrap();
        assert!(report.speed_limited);
        assert_eq!(ctrl.velocity_scale(), 0.0);
    }

    #[test]
    fn test_every_pending_command_executes() {
        let mut ctrl = drive_ctrl();

        // A speed change queued alongside a motion command in the same cycle
        // must still be applied, and a motion command after it sees the new
        // scalar
        let (output, _) = ctrl
            .proc(&InputData {
                cmds: vec![
                    DriveCmd::IncreaseSpeed,
                    DriveCmd::Intent(DriveIntent {
                        forward: 1.0,
                        strafe: 0.0,
                        rotate: 0.0,
                    }),
                ],
            })
            .unwrap();

        assert_eq!(ctrl.velocity_scale(), 15.0);
        assert_eq!(output.unwrap().as_array(), [15.0; 4]);

        // Ordered the other way the motion command is computed before the
        // scalar changes
        let (output, _) = ctrl
            .proc(&InputData {
                cmds: vec![
                    DriveCmd::Directive(DriveDirective::Advance),
                    DriveCmd::DecreaseSpeed,
                ],
            })
            .unwrap();

        assert_eq!(output.unwrap().as_array(), [15.0; 4]);
        assert_eq!(ctrl.velocity_scale(), 10.0);
    }

    #[test]
    fn test_last_motion_command_wins() {
        let mut ctrl = drive_ctrl();

        let (output, _) = ctrl
            .proc(&InputData {
                cmds: vec![
                    DriveCmd::Directive(DriveDirective::Advance),
                    DriveCmd::Directive(DriveDirective::Halt),
                ],
            })
            .unwrap();

        assert_eq!(output.unwrap().as_array(), [0.0; 4]);
    }

    #[test]
    fn test_invalid_intent_is_rejected() {
        let mut ctrl = drive_ctrl();

        let intent = DriveIntent {
            forward: 1.5,
            strafe: 0.0,
            rotate: 0.0,
        };

        assert!(ctrl
            .proc(&InputData {
                cmds: vec![DriveCmd::Intent(intent)],
            })
            .is_err());
    }
}
