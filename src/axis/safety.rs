//! §4.4 SafetyMonitor: the per-tick update and check pass every
//! control-loop handler runs before its own tick body.

use super::Axis;
use crate::error::AxisError;

impl Axis {
    /// Advances every estimator in the fixed order updates ordering
    /// requires: encoder, sensorless estimator, min endstop, max endstop.
    /// Order matters for endstop debouncing since endstops may consume
    /// loop-counter state set earlier in the same tick.
    pub(super) fn do_updates(&mut self) {
        self.encoder.update();
        self.sensorless.update();
        self.min_endstop.update(self.loop_counter);
        self.max_endstop.update(self.loop_counter);
    }

    /// Bus voltage band, brake-resistor armed, motor-disarmed-while-running,
    /// plus the motor's and encoder's own fault checks. Returns `true` iff
    /// the accumulated error set is still empty afterward — a sticky error
    /// from an earlier tick keeps this returning `false` until the
    /// telemetry layer acknowledges it, which is what blocks re-entry to a
    /// control loop while a fault is outstanding.
    pub(super) fn do_checks(&mut self) -> bool {
        if !self.board.brake_resistor_armed() {
            self.handle.accumulate_error(AxisError::BRAKE_RESISTOR_DISARMED);
        }
        if self.task_chain.current() != super::AxisState::Idle && !self.motor.armed_state() {
            self.handle.accumulate_error(AxisError::MOTOR_DISARMED);
        }
        if !self.board.vbus_in_trip_band() {
            let v = self.board.vbus_voltage();
            let band = self.board.trip_band();
            if v < band.under_voltage {
                self.handle.accumulate_error(AxisError::DC_BUS_UNDER_VOLTAGE);
            } else {
                self.handle.accumulate_error(AxisError::DC_BUS_OVER_VOLTAGE);
            }
        }
        if !self.motor.do_checks() {
            self.handle.accumulate_error(AxisError::MOTOR_FAILED);
        }
        if !self.encoder.do_checks() {
            self.handle.accumulate_error(AxisError::ENCODER_FAILED);
        }

        self.handle.error().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::new_test_axis;
    use crate::error::AxisError;

    #[test]
    fn under_voltage_bus_sets_error_and_fails_checks() {
        let (mut axis, _handle) = new_test_axis();
        axis.board.set_vbus_voltage(2.0);
        assert!(!axis.do_checks());
        assert!(axis.handle.error().contains(AxisError::DC_BUS_UNDER_VOLTAGE));
    }

    #[test]
    fn healthy_board_passes_checks() {
        let (mut axis, _handle) = new_test_axis();
        axis.motor.arm();
        assert!(axis.do_checks());
    }

    #[test]
    fn encoder_failure_sets_error_and_fails_checks() {
        let (mut axis, _handle) = new_test_axis();
        axis.motor.arm();
        let mut encoder = crate::collaborators::mock::MockEncoder::new();
        encoder.checks_ok = false;
        axis.encoder = Box::new(encoder);
        assert!(!axis.do_checks());
        assert!(axis.handle.error().contains(AxisError::ENCODER_FAILED));
    }
}
