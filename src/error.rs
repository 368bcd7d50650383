//! The axis error bitset (§7). Errors accumulate, they are never thrown:
//! any tick body that detects a fault ORs the relevant bit(s) in here and
//! returns `false`; the state machine then falls to `Idle` without
//! advancing the task chain. Bits are sticky until the telemetry layer
//! clears them, except `INVALID_STATE`, which the state machine itself
//! clears whenever a fresh request is loaded.

use bitflags::bitflags;
use std::sync::atomic::{AtomicU32, Ordering};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AxisError: u32 {
        const INVALID_STATE              = 1 << 0;
        const DC_BUS_UNDER_VOLTAGE       = 1 << 1;
        const DC_BUS_OVER_VOLTAGE        = 1 << 2;
        const BRAKE_RESISTOR_DISARMED    = 1 << 3;
        const MOTOR_DISARMED             = 1 << 4;
        const MOTOR_FAILED               = 1 << 5;
        const CONTROLLER_FAILED          = 1 << 6;
        const CONTROL_LOOP_MISSED        = 1 << 7;
        const POS_CTRL_DURING_SENSORLESS = 1 << 8;
        const MIN_ENDSTOP_PRESSED        = 1 << 9;
        const MAX_ENDSTOP_PRESSED        = 1 << 10;
        /// Not named in the spec's error kind list verbatim, but covered by
        /// its "plus any bit subcomponents set" clause: `Encoder::do_checks`
        /// needs a bit of its own distinct from `MOTOR_FAILED`.
        const ENCODER_FAILED             = 1 << 11;
    }
}

/// Atomic accumulator for [`AxisError`]. Written by the worker, by
/// subcomponent callbacks, and potentially by ISRs; read by the telemetry
/// layer. Accumulation is an atomic bitwise-OR, inspection an atomic load,
/// per the concurrency contract in §5.
#[derive(Debug, Default)]
pub struct AtomicAxisError(AtomicU32);

impl AtomicAxisError {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn load(&self) -> AxisError {
        AxisError::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    /// Accumulates `bits` into the set. A no-op for `AxisError::empty()`.
    pub fn accumulate(&self, bits: AxisError) {
        if !bits.is_empty() {
            self.0.fetch_or(bits.bits(), Ordering::AcqRel);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.load().is_empty()
    }

    /// Clears exactly the given bits, leaving the rest sticky. Used for
    /// auto-clearing `INVALID_STATE` on a new request, and by the telemetry
    /// layer to acknowledge faults.
    pub fn clear(&self, bits: AxisError) {
        self.0.fetch_and(!bits.bits(), Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulation_is_sticky_except_invalid_state() {
        let e = AtomicAxisError::new();
        e.accumulate(AxisError::INVALID_STATE);
        e.accumulate(AxisError::MOTOR_FAILED);
        assert_eq!(
            e.load(),
            AxisError::INVALID_STATE | AxisError::MOTOR_FAILED
        );
        e.clear(AxisError::INVALID_STATE);
        assert_eq!(e.load(), AxisError::MOTOR_FAILED);
    }
}
