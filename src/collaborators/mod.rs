//! Trait contracts for the hardware/math collaborators the Axis core
//! depends on but does not implement (§6). Per the design note on
//! back-references (§9), collaborators do not hold a pointer back to their
//! owning `Axis`; the `Axis` owns them outright and passes whatever
//! per-tick context they need (loop counter, current estimates) as plain
//! arguments. This makes every collaborator trivially mockable, which is
//! what `mock` below is for.

mod controller;
mod encoder;
mod endstop;
mod gpio;
mod motor;
mod sensorless;
mod trajectory;

pub use controller::{ControlMode, Controller};
pub use encoder::Encoder;
pub use endstop::{Endstop, EndstopConfig};
pub use gpio::{Edge, GpioPin, GpioService, Pull};
pub use motor::Motor;
pub use sensorless::SensorlessEstimator;
pub use trajectory::TrapezoidalTrajectory;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
