//! # Bridge message types
//!
//! All frames exchanged with the bridge are JSON text, tagged by an `op`
//! field. Only the outbound operations used by the operator software are
//! modelled here.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An outbound frame for the bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Declare a topic and its payload type to the bridge. A topic must be
    /// advertised before any message may be published on it.
    Advertise {
        topic: String,

        #[serde(rename = "type")]
        type_name: String,
    },

    /// Publish a payload on a previously advertised topic.
    Publish {
        topic: String,

        msg: serde_json::Value,
    },
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Payload for numeric array topics (wheel speed vectors).
///
/// Matches the bridge's `std_msgs/Float32MultiArray` wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Float32MultiArray {
    pub layout: MultiArrayLayout,

    pub data: Vec<f64>,
}

/// Layout description of a [`Float32MultiArray`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiArrayLayout {
    pub dim: Vec<MultiArrayDim>,

    pub data_offset: u32,
}

/// One dimension of a [`MultiArrayLayout`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiArrayDim {
    pub label: String,

    pub size: u32,

    pub stride: u32,
}

/// Payload for arm command topics.
///
/// Matches the bridge's `trajectory_msgs/JointTrajectoryPoint` wire shape,
/// restricted to the positions field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JointTrajectoryPoint {
    /// Joint angles in radians, one per joint.
    pub positions: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Float32MultiArray {
    /// Build a single-dimension array payload with the given label.
    ///
    /// The dimension size and stride are both the data length, and the data
    /// offset is zero.
    pub fn labelled(label: &str, data: Vec<f64>) -> Self {
        let len = data.len() as u32;

        Self {
            layout: MultiArrayLayout {
                dim: vec![MultiArrayDim {
                    label: label.into(),
                    size: len,
                    stride: len,
                }],
                data_offset: 0,
            },
            data,
        }
    }
}

impl JointTrajectoryPoint {
    pub fn new(positions: Vec<f64>) -> Self {
        Self { positions }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_advertise_frame_shape() {
        let msg = OutboundMessage::Advertise {
            topic: "/front_wheel_controller/command".into(),
            type_name: "std_msgs/Float32MultiArray".into(),
        };

        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "op": "advertise",
                "topic": "/front_wheel_controller/command",
                "type": "std_msgs/Float32MultiArray"
            })
        );
    }

    #[test]
    fn test_publish_frame_shape() {
        let payload = Float32MultiArray::labelled("front_wheels", vec![10.0, -10.0]);
        let msg = OutboundMessage::Publish {
            topic: "/front_wheel_controller/command".into(),
            msg: serde_json::to_value(&payload).unwrap(),
        };

        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "op": "publish",
                "topic": "/front_wheel_controller/command",
                "msg": {
                    "layout": {
                        "dim": [{"label": "front_wheels", "size": 2, "stride": 2}],
                        "data_offset": 0
                    },
                    "data": [10.0, -10.0]
                }
            })
        );
    }

    #[test]
    fn test_joint_trajectory_point_shape() {
        let payload = JointTrajectoryPoint::new(vec![0.0, 1.5708, -0.5]);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"positions": [0.0, 1.5708, -0.5]})
        );
    }
}
