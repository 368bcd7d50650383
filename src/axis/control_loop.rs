//! §4.1 ControlLoopDriver: the per-tick cadence every control-loop handler
//! (`Idle`, `ClosedLoopControl`, `SensorlessControl`, plus the spin-up
//! stages) is built on top of.

use super::Axis;
use crate::error::AxisError;
use std::time::Duration;

/// Ticks per second the current-measurement signal is expected to arrive
/// at. Used to convert the homing config's millisecond deadlines into tick
/// counts and to derive the spin-up routine's per-tick time step.
pub(super) const TICK_RATE_HZ: f64 = 8_000.0;

/// Bound on how long a tick body waits for the current-measurement signal
/// before treating it as missed (§5: "Signal waits have a bounded
/// timeout").
pub(super) const PH_CURRENT_MEAS_TIMEOUT: Duration = Duration::from_millis(10);

/// What a control-loop tick body reports back to
/// [`Axis::run_control_loop`]. The source's single boolean return
/// conflates "stop because the stage finished" with "stop because of a
/// fault"; kept apart here since nothing about the source's scenarios
/// requires collapsing them and the distinction matters for the spin-up
/// stages, which have a genuine non-error exit condition.
pub(super) enum TickOutcome {
    Continue,
    Done,
    Failed,
}

impl Axis {
    /// Runs `tick_body` synchronized to the current-measurement signal
    /// until it reports `Done`/`Failed`, a tick is missed outside `Idle`,
    /// `do_checks` accumulates an error, or an external state change
    /// becomes pending. Returns `true` on a clean exit (`Done`, or a
    /// pending request observed with no error), `false` on any fault.
    pub(super) fn run_control_loop(
        &mut self,
        mut tick_body: impl FnMut(&mut Axis) -> TickOutcome,
    ) -> bool {
        loop {
            if !self.handle.signal().wait(PH_CURRENT_MEAS_TIMEOUT) {
                if self.task_chain.current() == super::AxisState::Idle {
                    continue;
                }
                self.handle.accumulate_error(AxisError::CONTROL_LOOP_MISSED);
                return false;
            }

            self.loop_counter += 1;

            self.do_updates();
            let checks_ok = self.do_checks();
            self.publish();
            if !checks_ok {
                return false;
            }

            match tick_body(self) {
                TickOutcome::Continue => {}
                TickOutcome::Done => return true,
                TickOutcome::Failed => return false,
            }

            if self.handle.has_pending_request() {
                return true;
            }
        }
    }
}
