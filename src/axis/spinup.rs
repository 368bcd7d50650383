//! §4.5 SensorlessSpinUp.

use super::control_loop::{TickOutcome, TICK_RATE_HZ};
use super::Axis;
use crate::error::AxisError;
use std::f64::consts::PI;

/// Wraps a radian value into `[-pi, +pi)`.
pub(super) fn wrap_pm_pi(x: f64) -> f64 {
    let mut v = x % (2.0 * PI);
    if v >= PI {
        v -= 2.0 * PI;
    } else if v < -PI {
        v += 2.0 * PI;
    }
    v
}

impl Axis {
    /// Runs both spin-up stages back to back, then primes the sensorless
    /// controller's velocity setpoint for a smooth handoff (§4.5: "On exit
    /// set controller.vel_setpoint = spin_up_target_vel").
    pub(super) fn run_sensorless_spin_up(&mut self) -> bool {
        if !self.run_spin_up_stage1() {
            return false;
        }
        if !self.run_spin_up_stage2() {
            return false;
        }
        self.controller.set_vel_setpoint(self.config.spin_up_target_vel, 0.0);
        true
    }

    fn run_spin_up_stage1(&mut self) -> bool {
        let tick_period = 1.0 / TICK_RATE_HZ;
        let ramp_up_time = self.config.ramp_up_time;
        let ramp_up_distance = self.config.ramp_up_distance;
        let spin_up_current = self.config.spin_up_current;
        let mut x = 0.0_f64;

        self.run_control_loop(move |axis| {
            let phase = wrap_pm_pi(ramp_up_distance * x);
            let i_mag = spin_up_current * x;
            if !axis.motor.update(i_mag, phase) {
                axis.handle.accumulate_error(AxisError::MOTOR_FAILED);
                return TickOutcome::Failed;
            }
            x += tick_period / ramp_up_time;
            if x >= 1.0 {
                TickOutcome::Done
            } else {
                TickOutcome::Continue
            }
        })
    }

    fn run_spin_up_stage2(&mut self) -> bool {
        let tick_period = 1.0 / TICK_RATE_HZ;
        let ramp_up_time = self.config.ramp_up_time;
        let ramp_up_distance = self.config.ramp_up_distance;
        let spin_up_current = self.config.spin_up_current;
        let spin_up_acceleration = self.config.spin_up_acceleration;
        let spin_up_target_vel = self.config.spin_up_target_vel;
        let mut vel = ramp_up_distance / ramp_up_time;
        let mut phase = wrap_pm_pi(ramp_up_distance);

        self.run_control_loop(move |axis| {
            vel += spin_up_acceleration * tick_period;
            phase = wrap_pm_pi(phase + vel * tick_period);
            if !axis.motor.update(spin_up_current, phase) {
                axis.handle.accumulate_error(AxisError::MOTOR_FAILED);
                return TickOutcome::Failed;
            }
            if vel >= spin_up_target_vel {
                TickOutcome::Done
            } else {
                TickOutcome::Continue
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_pm_pi_stays_in_range() {
        assert!((wrap_pm_pi(0.0) - 0.0).abs() < 1e-9);
        let wrapped = wrap_pm_pi(3.0 * PI);
        assert!(wrapped >= -PI && wrapped < PI);
        let wrapped_neg = wrap_pm_pi(-3.0 * PI);
        assert!(wrapped_neg >= -PI && wrapped_neg < PI);
    }

    #[test]
    fn spin_up_stage1_fails_on_motor_fault() {
        use super::super::tests_support::new_test_axis;
        use crate::collaborators::mock::MockMotor;

        let (mut axis, _handle) = new_test_axis();
        let mut motor = MockMotor::new();
        motor.armed = true;
        motor.update_ok = false;
        axis.motor = Box::new(motor);
        axis.config.ramp_up_time = 1.0;
        let signal = axis.handle.signal().clone();
        signal.notify();
        assert!(!axis.run_spin_up_stage1());
        assert!(axis.handle.error().contains(AxisError::MOTOR_FAILED));
    }
}
