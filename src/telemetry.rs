//! §6's "Exposed to the telemetry/property layer" surface, lifted into an
//! explicit, serializable snapshot type. There is no remote API in this
//! crate (an explicit Non-goal); this is what such a layer would publish.

use crate::axis::{AxisHandle, AxisState, HomingState};
use crate::config::AxisRuntimeConfig;
use crate::error::AxisError;
use serde::Serialize;

impl Serialize for AxisState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = match self {
            AxisState::Undefined => "undefined",
            AxisState::Idle => "idle",
            AxisState::StartupSequence => "startup_sequence",
            AxisState::FullCalibrationSequence => "full_calibration_sequence",
            AxisState::MotorCalibration => "motor_calibration",
            AxisState::EncoderIndexSearch => "encoder_index_search",
            AxisState::EncoderOffsetCalibration => "encoder_offset_calibration",
            AxisState::Homing => "homing",
            AxisState::ClosedLoopControl => "closed_loop_control",
            AxisState::SensorlessControl => "sensorless_control",
        };
        serializer.serialize_str(name)
    }
}

impl Serialize for HomingState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = match self {
            HomingState::Inactive => "inactive",
            HomingState::Homing => "homing",
            HomingState::MoveToZero => "move_to_zero",
        };
        serializer.serialize_str(name)
    }
}

impl Serialize for AxisError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

/// A point-in-time read of everything §6 lists as exposed: `current_state`,
/// `requested_state`, `error`, `homing_state`, `loop_counter`, `config.*`.
#[derive(Debug, Serialize)]
pub struct AxisSnapshot {
    pub name: &'static str,
    pub current_state: AxisState,
    pub requested_state: AxisState,
    pub error: AxisError,
    pub homing_state: HomingState,
    pub loop_counter: u64,
    pub config: AxisRuntimeConfig,
}

impl AxisSnapshot {
    pub fn capture(name: &'static str, handle: &AxisHandle, config: AxisRuntimeConfig) -> Self {
        Self {
            name,
            current_state: handle.current_state(),
            requested_state: handle.requested_state(),
            error: handle.error(),
            homing_state: handle.homing_state(),
            loop_counter: handle.loop_counter(),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_to_expected_shape() {
        let (_axis, handle) = crate::axis::tests_support::new_test_axis();
        let snap = AxisSnapshot::capture("axis0", &handle, AxisRuntimeConfig::default());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["name"], "axis0");
        assert_eq!(json["current_state"], "undefined");
        assert_eq!(json["homing_state"], "inactive");
    }
}
