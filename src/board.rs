//! Board-wide state the spec's design notes call out as process-wide
//! globals in the source (`brake_resistor_armed`, `vbus_voltage`,
//! `board_config`, `adc_measurements`). Lifted here into an explicit,
//! `Arc`-shared handle passed into [`crate::axis::Axis`] construction
//! instead of being read from true globals, so `SafetyMonitor` is testable
//! without a process-wide fixture.

use atomic_float::AtomicF64;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy)]
pub struct VoltageTripBand {
    pub under_voltage: f64,
    pub over_voltage: f64,
}

#[derive(Debug)]
pub struct BoardContext {
    brake_resistor_armed: AtomicBool,
    vbus_voltage: AtomicF64,
    trip_band: VoltageTripBand,
}

impl BoardContext {
    pub fn new(trip_band: VoltageTripBand) -> Self {
        Self {
            brake_resistor_armed: AtomicBool::new(false),
            vbus_voltage: AtomicF64::new(0.0),
            trip_band,
        }
    }

    pub fn brake_resistor_armed(&self) -> bool {
        self.brake_resistor_armed.load(Ordering::Acquire)
    }

    pub fn set_brake_resistor_armed(&self, armed: bool) {
        self.brake_resistor_armed.store(armed, Ordering::Release);
    }

    pub fn vbus_voltage(&self) -> f64 {
        self.vbus_voltage.load(Ordering::Acquire)
    }

    /// Called by the ADC sampling path (outside this crate's scope) to
    /// publish the latest bus-voltage measurement.
    pub fn set_vbus_voltage(&self, v: f64) {
        self.vbus_voltage.store(v, Ordering::Release);
    }

    pub fn vbus_in_trip_band(&self) -> bool {
        let v = self.vbus_voltage();
        v >= self.trip_band.under_voltage && v <= self.trip_band.over_voltage
    }

    pub fn trip_band(&self) -> VoltageTripBand {
        self.trip_band
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> VoltageTripBand {
        VoltageTripBand {
            under_voltage: 10.0,
            over_voltage: 56.0,
        }
    }

    #[test]
    fn trip_band_membership() {
        let board = BoardContext::new(band());
        board.set_vbus_voltage(24.0);
        assert!(board.vbus_in_trip_band());
        board.set_vbus_voltage(5.0);
        assert!(!board.vbus_in_trip_band());
        board.set_vbus_voltage(60.0);
        assert!(!board.vbus_in_trip_band());
    }
}
