//! Command router
//!
//! Forwards the control modules' outputs to the bridge on their configured
//! topics. The wheel command vector is split into a front and a rear numeric
//! array frame, each built from its own configured index range; the arm
//! command is a joint positions frame. No algorithmic content lives here
//! beyond composition.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::drive_ctrl::WheelCommand;
use bridge_if::client::{BridgeClient, BridgeClientError};
use bridge_if::msg::{Float32MultiArray, JointTrajectoryPoint};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Bridge payload type of the wheel command topics.
pub const WHEEL_TYPE_NAME: &str = "std_msgs/Float32MultiArray";

/// Bridge payload type of the arm command topic.
pub const ARM_TYPE_NAME: &str = "trajectory_msgs/JointTrajectoryPoint";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the command router.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterParams {
    /// Topic carrying the front wheel pair.
    pub front_wheel_topic: String,

    /// Topic carrying the rear wheel pair.
    pub rear_wheel_topic: String,

    /// Topic carrying the arm joint positions.
    pub arm_topic: String,

    /// Index range `[start, end)` of the wheel command vector published on
    /// the front topic.
    pub front_range: (usize, usize),

    /// Index range `[start, end)` of the wheel command vector published on
    /// the rear topic.
    pub rear_range: (usize, usize),

    /// Dimension label of the front wheel frame.
    pub front_label: String,

    /// Dimension label of the rear wheel frame.
    pub rear_label: String,
}

/// Routes module outputs to their bridge topics.
pub struct CommandRouter {
    params: RouterParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RouterParams {
    fn default() -> Self {
        Self {
            front_wheel_topic: "/front_wheel_controller/command".into(),
            rear_wheel_topic: "/rear_wheel_controller/command".into(),
            arm_topic: "/arm_controller/command".into(),
            front_range: (0, 2),
            rear_range: (2, 4),
            front_label: "front_wheels".into(),
            rear_label: "rear_wheels".into(),
        }
    }
}

impl CommandRouter {
    pub fn new(params: RouterParams) -> Self {
        Self { params }
    }

    /// Advertise all routed topics on the given (connected) client.
    pub fn advertise_all(&self, client: &mut BridgeClient) -> Result<(), BridgeClientError> {
        client.advertise(&self.params.front_wheel_topic, WHEEL_TYPE_NAME)?;
        client.advertise(&self.params.rear_wheel_topic, WHEEL_TYPE_NAME)?;
        client.advertise(&self.params.arm_topic, ARM_TYPE_NAME)?;

        Ok(())
    }

    /// Build the front and rear wheel frames for a wheel command.
    ///
    /// Each topic gets the slice selected by its own configured range, so the
    /// front topic always carries the front range and the rear topic the
    /// rear range.
    pub fn wheel_messages(&self, cmd: &WheelCommand) -> [(String, Float32MultiArray); 2] {
        let data = cmd.as_array();

        [
            (
                self.params.front_wheel_topic.clone(),
                Float32MultiArray::labelled(
                    &self.params.front_label,
                    slice_range(&data, self.params.front_range),
                ),
            ),
            (
                self.params.rear_wheel_topic.clone(),
                Float32MultiArray::labelled(
                    &self.params.rear_label,
                    slice_range(&data, self.params.rear_range),
                ),
            ),
        ]
    }

    /// Publish a wheel command as two numeric array frames.
    pub fn publish_wheels(
        &self,
        client: &mut BridgeClient,
        cmd: &WheelCommand,
    ) -> Result<(), BridgeClientError> {
        for (topic, msg) in self.wheel_messages(cmd).iter() {
            client.publish(topic, msg)?;
        }

        Ok(())
    }

    /// Publish a commanded joint-angle vector as a joint positions frame.
    pub fn publish_arm(
        &self,
        client: &mut BridgeClient,
        angles_rad: &[f64],
    ) -> Result<(), BridgeClientError> {
        client.publish(
            &self.params.arm_topic,
            &JointTrajectoryPoint::new(angles_rad.to_vec()),
        )
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Take the `[start, end)` slice of the data, bounded to the data length.
fn slice_range(data: &[f64], range: (usize, usize)) -> Vec<f64> {
    let end = range.1.min(data.len());
    let start = range.0.min(end);

    data[start..end].to_vec()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wheel_slicing_matches_topics() {
        let router = CommandRouter::new(RouterParams::default());

        let cmd = WheelCommand {
            front_left: 1.0,
            front_right: 2.0,
            rear_left: 3.0,
            rear_right: 4.0,
        };

        let [(front_topic, front_msg), (rear_topic, rear_msg)] = router.wheel_messages(&cmd);

        assert_eq!(front_topic, "/front_wheel_controller/command");
        assert_eq!(front_msg.data, vec![1.0, 2.0]);
        assert_eq!(front_msg.layout.dim[0].label, "front_wheels");
        assert_eq!(front_msg.layout.dim[0].size, 2);
        assert_eq!(front_msg.layout.dim[0].stride, 2);

        assert_eq!(rear_topic, "/rear_wheel_controller/command");
        assert_eq!(rear_msg.data, vec![3.0, 4.0]);
        assert_eq!(rear_msg.layout.dim[0].label, "rear_wheels");
    }

    #[test]
    fn test_out_of_bounds_range_is_truncated() {
        let mut params = RouterParams::default();
        params.rear_range = (2, 8);
        let router = CommandRouter::new(params);

        let cmd = WheelCommand::default();
        let [_, (_, rear_msg)] = router.wheel_messages(&cmd);

        assert_eq!(rear_msg.data.len(), 2);
    }
}
