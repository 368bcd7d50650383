//! §4.6 "Control-loop handlers": the three dispatch targets that each run
//! their own inner tick loop via [`Axis::run_control_loop`].

use super::control_loop::TickOutcome;
use super::{Axis, HomingState};
use crate::error::AxisError;

impl Axis {
    pub(super) fn run_sensorless_control_loop(&mut self) -> bool {
        self.set_step_dir_enabled(self.config.enable_step_dir);
        self.ensure_cogging_map();

        let result = if self.run_sensorless_spin_up() {
            self.run_control_loop(|axis| {
                if axis.controller.control_mode().at_least_position() {
                    axis.handle.accumulate_error(AxisError::POS_CTRL_DURING_SENSORLESS);
                    return TickOutcome::Failed;
                }
                let pos = axis.sensorless.pll_pos();
                let vel = axis.sensorless.vel_estimate();
                let Some(current) = axis.controller.update(pos, vel) else {
                    axis.handle.accumulate_error(AxisError::CONTROLLER_FAILED);
                    return TickOutcome::Failed;
                };
                let current = current + axis.cogging_feedforward(pos);
                let phase = axis.sensorless.phase();
                if !axis.motor.update(current, phase) {
                    axis.handle.accumulate_error(AxisError::MOTOR_FAILED);
                    return TickOutcome::Failed;
                }
                TickOutcome::Continue
            })
        } else {
            false
        };

        self.set_step_dir_enabled(false);
        result
    }

    pub(super) fn run_closed_loop_control_loop(&mut self) -> bool {
        self.set_step_dir_enabled(self.config.enable_step_dir);
        self.start_homing();
        self.ensure_cogging_map();

        let result = self.run_control_loop(|axis| {
            let pos = axis.encoder.pos_estimate();
            let vel = axis.encoder.vel_estimate();
            let Some(current) = axis.controller.update(pos, vel) else {
                axis.handle.accumulate_error(AxisError::CONTROLLER_FAILED);
                return TickOutcome::Failed;
            };
            let current = current + axis.cogging_feedforward(pos);
            let phase = axis.encoder.phase();
            if !axis.motor.update(current, phase) {
                axis.handle.accumulate_error(AxisError::MOTOR_FAILED);
                return TickOutcome::Failed;
            }

            let ok = if axis.homing_state != HomingState::Inactive {
                axis.run_homing_tick();
                true
            } else {
                axis.run_closed_loop_endstop_guard()
            };
            if ok {
                TickOutcome::Continue
            } else {
                TickOutcome::Failed
            }
        });

        self.set_step_dir_enabled(false);
        result
    }

    pub(super) fn run_idle_loop(&mut self) -> bool {
        self.motor.disarm();
        // Idle is the one state every control path falls back to on both a
        // clean exit and a fault, so it's the natural place to fully reset
        // the controller (not just its velocity integrator, which homing
        // resets on its own) before the next handler starts from a known
        // state.
        self.controller.reset();
        let result = self.run_control_loop(|_axis| TickOutcome::Continue);
        // Speculative re-arm before the next handler runs (§4.6: "Idle ->
        // idle tick loop followed by a motor re-arm attempt"); a failure
        // here just means the next handler's own `do_checks` catches it.
        self.motor.arm();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::new_test_axis;
    use super::super::HomingState;
    use crate::collaborators::mock::MockEndstop;
    use crate::collaborators::EndstopConfig;
    use crate::error::AxisError;

    #[test]
    fn closed_loop_control_fails_when_min_endstop_pressed_outside_homing() {
        let (mut axis, _handle) = new_test_axis();
        axis.homing_state = HomingState::Inactive;
        let mut endstop = MockEndstop::new(EndstopConfig {
            enabled: true,
            physical_endstop: true,
            min_ms_homing: 0,
            offset: 0,
            home_percentage: 0.0,
        });
        endstop.pressed = true;
        axis.min_endstop = Box::new(endstop);

        assert!(!axis.run_closed_loop_endstop_guard());
        assert!(axis.handle.error().contains(AxisError::MIN_ENDSTOP_PRESSED));
    }
}
