//! Main operator-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Operator command acquisition (stdin command lines)
//!         - Session handling (connect/disconnect/quit)
//!         - Drive control processing
//!         - Arm control processing
//!         - Routing of module outputs to the bridge
//!
//! # Modules
//!
//! All modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use bridge_if::client::{BridgeClient, BridgeClientError, NetParams};
use teleop_lib::{
    arm_ctrl::{ArmCmd, ArmCtrl},
    drive_ctrl::{DriveCmd, DriveCtrl},
    input::{Bindings, InputMapper, StdinSource, TeleopCmd},
    router::{CommandRouter, RouterParams},
    CYCLE_PERIOD_S,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use structopt::StructOpt;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    module::State,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options for the executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "teleop_exec", about = "Operator-side teleop executable")]
struct Opt {
    /// Bridge host to connect to at startup. When omitted no connection is
    /// made until an operator `connect` command arrives.
    #[structopt(long)]
    host: Option<String>,

    /// Bridge port, overriding the network parameter file.
    #[structopt(long)]
    port: Option<u16>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "teleop_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Teleop Bridge Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams = match util::params::load("net.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load net params ({}), using defaults", e);
            NetParams::default()
        }
    };

    let router_params: RouterParams = match util::params::load("router.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load router params ({}), using defaults", e);
            RouterParams::default()
        }
    };

    let bindings: Bindings = match util::params::load("input.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load input bindings ({}), using defaults", e);
            Bindings::default()
        }
    };

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut drive_ctrl = DriveCtrl::default();
    drive_ctrl.init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    let mut arm_ctrl = ArmCtrl::default();
    arm_ctrl.init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let port = opt.port.unwrap_or(net_params.bridge_port);
    let mut client = BridgeClient::new(port, (&net_params).into());
    let router = CommandRouter::new(router_params);

    if let Some(ref host) = opt.host {
        connect(&mut client, &router, host);
    } else {
        info!("No host given, waiting for an operator connect command");
    }

    info!("Network initialisation complete");

    // ---- INITIALISE OPERATOR INPUT ----

    let input_source = StdinSource::start(InputMapper::new(bindings));

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    'main: loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- OPERATOR COMMAND PROCESSING ----

        // Every pending command is handled this cycle. Session commands take
        // effect immediately, drive and arm commands are queued for their
        // modules in arrival order.
        let mut drive_cmds: Vec<DriveCmd> = Vec::new();
        let mut arm_cmds: Vec<ArmCmd> = Vec::new();

        for cmd in input_source.drain() {
            match cmd {
                TeleopCmd::Drive(c) => drive_cmds.push(c),
                TeleopCmd::Arm(c) => arm_cmds.push(c),
                TeleopCmd::Connect { host } => connect(&mut client, &router, &host),
                TeleopCmd::Disconnect => {
                    info!("Disconnecting from the bridge");
                    client.disconnect();
                }
                TeleopCmd::Quit => {
                    info!("Quit command recieved");
                    break 'main;
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // DriveCtrl processing
        let wheel_output = match drive_ctrl.proc(&teleop_lib::drive_ctrl::InputData {
            cmds: drive_cmds,
        }) {
            Ok((output, report)) => {
                if report.speed_limited {
                    info!(
                        "Speed change limited, scale remains {}",
                        drive_ctrl.velocity_scale()
                    );
                }
                output
            }
            Err(e) => {
                // DriveCtrl errors mean a malformed operator command, so just
                // issue the warning and continue.
                warn!("Error during DriveCtrl processing: {}", e);
                None
            }
        };

        // ArmCtrl processing
        let arm_output = match arm_ctrl.proc(&teleop_lib::arm_ctrl::InputData {
            cmds: arm_cmds,
        }) {
            Ok((output, _)) => output,
            Err(e) => {
                warn!("Error during ArmCtrl processing: {}", e);
                None
            }
        };

        // ---- OUTPUT ROUTING ----

        if let Some(ref wheel_cmd) = wheel_output {
            match router.publish_wheels(&mut client, wheel_cmd) {
                Ok(()) => (),
                Err(BridgeClientError::NotConnected) => {
                    debug!("Wheel command dropped, not connected")
                }
                Err(e) => warn!("Could not publish wheel command: {}", e),
            }
        }

        if let Some(ref angles) = arm_output {
            match router.publish_arm(&mut client, angles) {
                Ok(()) => (),
                Err(BridgeClientError::NotConnected) => {
                    debug!("Arm command dropped, not connected")
                }
                Err(e) => warn!("Could not publish arm command: {}", e),
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    client.disconnect();

    info!("End of execution");

    Ok(())
}

/// Connect the client to the bridge and advertise the command topics.
///
/// Failures are reported but never fatal, the operator can retry with
/// another connect command.
fn connect(client: &mut BridgeClient, router: &CommandRouter, host: &str) {
    info!("Connecting to bridge at {}", host);

    match client.connect(host) {
        Ok(()) => info!("Connected to the bridge"),
        Err(e) => {
            warn!("Could not connect to the bridge: {}", e);
            return;
        }
    }

    match router.advertise_all(client) {
        Ok(()) => info!("Command topics advertised"),
        Err(e) => {
            warn!("Could not advertise command topics: {}", e);
            client.disconnect();
        }
    }
}
