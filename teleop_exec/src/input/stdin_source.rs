//! Line-based operator command source
//!
//! Reads lines from stdin on a background thread and parses them into
//! teleop commands, so the control loop can drain pending commands each
//! cycle without blocking.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use thiserror::Error;

// Internal
use super::{InputMapper, OperatorEvent, TeleopCmd};
use crate::arm_ctrl::{ArmCmd, PoseDelta, StepDirection};
use crate::drive_ctrl::{DriveCmd, DriveDirective, DriveIntent};

// Std
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Operator command source backed by stdin.
pub struct StdinSource {
    rx: Receiver<TeleopCmd>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when parsing an operator command line.
#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("Empty command line")]
    Empty,

    #[error("Unknown command {0:?}")]
    UnknownCommand(String),

    #[error("Command {0:?} expects {1}")]
    WrongArguments(&'static str, &'static str),

    #[error("Could not parse {0:?} as a number")]
    InvalidNumber(String),

    #[error("Button {0} is not bound to a command")]
    UnboundButton(u8),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StdinSource {
    /// Start the background reader thread.
    ///
    /// Controller events entered as `button`/`axes` lines are mapped
    /// through the given mapper. When stdin reaches end of file a `Quit`
    /// command is emitted so the control loop shuts down cleanly.
    pub fn start(mapper: InputMapper) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let stdin = std::io::stdin();

            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(_) => break,
                };

                match parse_line(&line, &mapper) {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            return;
                        }
                    }
                    Err(CommandParseError::Empty) => (),
                    Err(e) => warn!("Ignoring command line: {}", e),
                }
            }

            tx.send(TeleopCmd::Quit).ok();
        });

        Self { rx }
    }

    /// All commands received since the last call, in arrival order.
    pub fn drain(&self) -> Vec<TeleopCmd> {
        let mut cmds = Vec::new();

        loop {
            match self.rx.try_recv() {
                Ok(cmd) => cmds.push(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    cmds.push(TeleopCmd::Quit);
                    break;
                }
            }
        }

        cmds
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse a single operator command line.
pub fn parse_line(line: &str, mapper: &InputMapper) -> Result<TeleopCmd, CommandParseError> {
    let mut parts = line.split_whitespace();

    let word = match parts.next() {
        Some(w) => w,
        None => return Err(CommandParseError::Empty),
    };

    let cmd = match word {
        "connect" => {
            let host = parts
                .next()
                .ok_or(CommandParseError::WrongArguments("connect", "a host"))?;
            require_end(&mut parts, "connect", "a host")?;
            TeleopCmd::Connect {
                host: host.to_string(),
            }
        }
        "disconnect" => TeleopCmd::Disconnect,
        "quit" => TeleopCmd::Quit,
        "advance" => TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Advance)),
        "retreat" => TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Retreat)),
        "pivot-left" => TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::PivotLeft)),
        "pivot-right" => TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::PivotRight)),
        "halt" => TeleopCmd::Drive(DriveCmd::Directive(DriveDirective::Halt)),
        "speed" => match parts.next() {
            Some("+") => TeleopCmd::Drive(DriveCmd::IncreaseSpeed),
            Some("-") => TeleopCmd::Drive(DriveCmd::DecreaseSpeed),
            _ => return Err(CommandParseError::WrongArguments("speed", "+ or -")),
        },
        "axis" => {
            let values = parse_numbers(parts)?;
            if values.len() != 3 {
                return Err(CommandParseError::WrongArguments(
                    "axis",
                    "forward, strafe and rotate values",
                ));
            }
            TeleopCmd::Drive(DriveCmd::Intent(DriveIntent {
                forward: values[0],
                strafe: values[1],
                rotate: values[2],
            }))
        }
        "button" => {
            let arg = parts
                .next()
                .ok_or(CommandParseError::WrongArguments("button", "a button index"))?;
            let button = arg
                .parse::<u8>()
                .map_err(|_| CommandParseError::InvalidNumber(arg.to_string()))?;

            mapper
                .map_event(&OperatorEvent::ButtonPressed(button))
                .ok_or(CommandParseError::UnboundButton(button))?
        }
        "axes" => {
            let values = parse_numbers(parts)?;
            TeleopCmd::Drive(DriveCmd::Intent(mapper.map_axes(&values)))
        }
        "select" => match parts.next() {
            Some("+") => TeleopCmd::Arm(ArmCmd::SelectNext),
            Some("-") => TeleopCmd::Arm(ArmCmd::SelectPrevious),
            _ => return Err(CommandParseError::WrongArguments("select", "+ or -")),
        },
        "step" => match parts.next() {
            Some("+") => TeleopCmd::Arm(ArmCmd::StepSelected(StepDirection::Increase)),
            Some("-") => TeleopCmd::Arm(ArmCmd::StepSelected(StepDirection::Decrease)),
            _ => return Err(CommandParseError::WrongArguments("step", "+ or -")),
        },
        "target" => {
            let angles_rad = parse_numbers(parts)?;
            if angles_rad.is_empty() {
                return Err(CommandParseError::WrongArguments(
                    "target",
                    "one angle per joint",
                ));
            }
            TeleopCmd::Arm(ArmCmd::SetTarget { angles_rad })
        }
        "pose" => {
            let values = parse_numbers(parts)?;
            if values.len() != 3 {
                return Err(CommandParseError::WrongArguments(
                    "pose",
                    "dx, dy and dz values",
                ));
            }
            TeleopCmd::Arm(ArmCmd::PoseDelta(PoseDelta {
                dx_m: values[0],
                dy_m: values[1],
                dz_m: values[2],
            }))
        }
        "stop" => TeleopCmd::Arm(ArmCmd::Stop),
        other => return Err(CommandParseError::UnknownCommand(other.to_string())),
    };

    Ok(cmd)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_numbers<'a>(
    parts: impl Iterator<Item = &'a str>,
) -> Result<Vec<f64>, CommandParseError> {
    parts
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| CommandParseError::InvalidNumber(p.to_string()))
        })
        .collect()
}

fn require_end<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    cmd: &'static str,
    expects: &'static str,
) -> Result<(), CommandParseError> {
    match parts.next() {
        Some(_) => Err(CommandParseError::WrongArguments(cmd, expects)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
