//! §4.2 StepDirInput.

use super::Axis;
use crate::collaborators::{Edge, GpioPin, Pull};

impl Axis {
    /// Idempotent: re-entering the same enabled/disabled state is a no-op
    /// (§4.2: "Re-entering the same state is idempotent").
    pub(super) fn set_step_dir_enabled(&mut self, enabled: bool) {
        if enabled == self.step_dir_active {
            return;
        }

        let step_pin = GpioPin::from(self.hw_config.step_pin);
        let dir_pin = GpioPin::from(self.hw_config.dir_pin);

        if enabled {
            self.gpio.set_input(dir_pin, Pull::None);
            let gpio = self.gpio.clone();
            let pos_setpoint = self.controller.pos_setpoint_handle();
            let counts_per_step = self.config.counts_per_step;
            self.gpio.subscribe(
                step_pin,
                Pull::Down,
                Edge::Falling,
                Box::new(move || {
                    let dir = if gpio.read(dir_pin) { 1.0 } else { -1.0 };
                    pos_setpoint.fetch_add(dir * counts_per_step);
                }),
            );
        } else {
            self.gpio.unsubscribe(step_pin);
        }

        self.step_dir_active = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::new_test_axis;
    use crate::collaborators::mock::MockGpio;
    use crate::collaborators::GpioPin;

    #[test]
    fn step_edge_increments_pos_setpoint_by_signed_counts_per_step() {
        let (mut axis, _handle) = new_test_axis();
        axis.config.counts_per_step = 12.5;
        let gpio = std::sync::Arc::new(MockGpio::new());
        axis.gpio = gpio.clone();
        let dir_pin = GpioPin::from(axis.hw_config.dir_pin);
        let step_pin = GpioPin::from(axis.hw_config.step_pin);
        gpio.set_pin(dir_pin, true);

        axis.set_step_dir_enabled(true);
        assert!(gpio.is_subscribed(step_pin));
        for _ in 0..3 {
            gpio.fire(step_pin);
        }
        assert_eq!(axis.controller.pos_setpoint_handle().load(), 37.5);

        axis.set_step_dir_enabled(false);
        assert!(!gpio.is_subscribed(step_pin));
    }

    #[test]
    fn re_entering_same_state_is_idempotent() {
        let (mut axis, _handle) = new_test_axis();
        axis.set_step_dir_enabled(true);
        let active_after_first = axis.step_dir_active;
        axis.set_step_dir_enabled(true);
        assert_eq!(active_after_first, axis.step_dir_active);
        assert!(active_after_first);
    }
}
