//! The Axis Controller: one instance per motor, composing calibration,
//! homing and control phases into an interruptible task chain.
//!
//! Submodules split the top-level sequencer ([`AxisStateMachine`] behavior,
//! kept here) from the per-tick machinery it dispatches into: the control
//! loop driver, the step/dir input, the homing sub-machine, the safety
//! monitor and the sensorless spin-up routine. Each lives in its own file
//! as an `impl Axis` block, mirroring how the hardware layer this was
//! adapted from splits a single logical unit across `hw/execute/`,
//! `hw/decode/` and `hw/callbacks.rs`.

mod cogging;
mod control_loop;
mod handle;
mod handlers;
mod homing;
mod safety;
mod spinup;
mod step_dir;

pub use handle::AxisHandle;

use crate::board::BoardContext;
use crate::collaborators::{
    Controller, Encoder, Endstop, GpioService, Motor, SensorlessEstimator, TrapezoidalTrajectory,
};
use crate::config::{AxisRuntimeConfig, HwConfig};
use std::sync::Arc;

const TASK_CHAIN_CAPACITY: usize = 10;

/// §4.6's state list, plus the two meta-requests (`StartupSequence`,
/// `FullCalibrationSequence`) that only ever appear as a `requested_state`
/// value — they are expanded away before ever reaching `task_chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AxisState {
    Undefined = 0,
    Idle = 1,
    StartupSequence = 2,
    FullCalibrationSequence = 3,
    MotorCalibration = 4,
    EncoderIndexSearch = 5,
    EncoderOffsetCalibration = 6,
    Homing = 7,
    ClosedLoopControl = 8,
    SensorlessControl = 9,
}

impl AxisState {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Idle,
            2 => Self::StartupSequence,
            3 => Self::FullCalibrationSequence,
            4 => Self::MotorCalibration,
            5 => Self::EncoderIndexSearch,
            6 => Self::EncoderOffsetCalibration,
            7 => Self::Homing,
            8 => Self::ClosedLoopControl,
            9 => Self::SensorlessControl,
            _ => Self::Undefined,
        }
    }

    /// "Stricter than MotorCalibration" from §4.6's prerequisite check.
    fn requires_motor_calibration(self) -> bool {
        matches!(
            self,
            Self::EncoderIndexSearch
                | Self::EncoderOffsetCalibration
                | Self::Homing
                | Self::ClosedLoopControl
                | Self::SensorlessControl
        )
    }

    /// "Stricter than EncoderOffsetCalibration" from §4.6's prerequisite
    /// check. `SensorlessControl` is deliberately excluded: it operates
    /// without a position sensor by definition.
    fn requires_encoder_ready(self) -> bool {
        matches!(self, Self::Homing | Self::ClosedLoopControl)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HomingState {
    Inactive = 0,
    Homing = 1,
    MoveToZero = 2,
}

impl HomingState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Homing,
            2 => Self::MoveToZero,
            _ => Self::Inactive,
        }
    }
}

/// Fixed-capacity, `Undefined`-terminated sequence of pending states (§3,
/// §9). Advancing bumps a head index instead of shifting the backing array,
/// so popping the front is O(1) with no overlapping-region move.
struct TaskChain {
    buf: [AxisState; TASK_CHAIN_CAPACITY],
    head: usize,
    len: usize,
}

impl TaskChain {
    fn new() -> Self {
        Self {
            buf: [AxisState::Undefined; TASK_CHAIN_CAPACITY],
            head: 0,
            len: 1,
        }
    }

    fn current(&self) -> AxisState {
        self.buf[self.head]
    }

    /// Loads `states` starting at position 0, followed by the terminating
    /// `Undefined` sentinel (invariant 3).
    fn rebuild(&mut self, states: &[AxisState]) {
        assert!(
            states.len() < TASK_CHAIN_CAPACITY,
            "task chain capacity exceeded"
        );
        self.head = 0;
        self.len = states.len() + 1;
        self.buf[..states.len()].copy_from_slice(states);
        self.buf[states.len()] = AxisState::Undefined;
    }

    /// Overwrites the head entry without shifting — used when prerequisite
    /// validation or a failed handler forces a different `current_state`.
    fn force_current(&mut self, state: AxisState) {
        self.buf[self.head] = state;
    }

    /// Advancement: shift left by one (invariant 2). A no-op once only the
    /// terminating `Undefined` remains.
    fn advance(&mut self) {
        if self.len > 1 {
            self.head += 1;
            self.len -= 1;
        }
    }
}

#[derive(Default)]
struct HomingPhase {
    finding_min_endstop: bool,
    loop_counter_check: u64,
}

/// One motor's real-time state machine. Owns its collaborators outright as
/// trait objects — §9's back-reference design note is resolved by never
/// giving a collaborator a pointer back into `Axis` at all: every trait
/// method in `collaborators::*` takes only the scalar values it needs, so
/// invariant 7 ("back-reference never null") holds vacuously.
pub struct Axis {
    pub name: &'static str,
    handle: AxisHandle,
    task_chain: TaskChain,
    homing_state: HomingState,
    homing: HomingPhase,
    loop_counter: u64,
    step_dir_active: bool,
    config: AxisRuntimeConfig,
    hw_config: HwConfig,
    board: Arc<BoardContext>,
    gpio: Arc<dyn GpioService>,
    motor: Box<dyn Motor>,
    encoder: Box<dyn Encoder>,
    sensorless: Box<dyn SensorlessEstimator>,
    controller: Box<dyn Controller>,
    trajectory: Box<dyn TrapezoidalTrajectory>,
    min_endstop: Box<dyn Endstop>,
    max_endstop: Box<dyn Endstop>,
    /// Anti-cogging feed-forward table (§3, §9). `None` until the first
    /// control-loop entry allocates it, or forever if that allocation fails.
    cogging_map: Option<Box<[f64]>>,
}

/// Everything an [`Axis`] needs to bind its collaborators at construction.
/// Bundled into one struct rather than a long constructor argument list,
/// matching the hardware layer's `HwControl::new` grouping.
pub struct AxisCollaborators {
    pub motor: Box<dyn Motor>,
    pub encoder: Box<dyn Encoder>,
    pub sensorless: Box<dyn SensorlessEstimator>,
    pub controller: Box<dyn Controller>,
    pub trajectory: Box<dyn TrapezoidalTrajectory>,
    pub min_endstop: Box<dyn Endstop>,
    pub max_endstop: Box<dyn Endstop>,
}

impl Axis {
    pub fn new(
        name: &'static str,
        config: AxisRuntimeConfig,
        hw_config: HwConfig,
        board: Arc<BoardContext>,
        gpio: Arc<dyn GpioService>,
        collaborators: AxisCollaborators,
    ) -> (Self, AxisHandle) {
        let handle = AxisHandle::new();
        let axis = Self {
            name,
            handle: handle.clone(),
            task_chain: TaskChain::new(),
            homing_state: HomingState::Inactive,
            homing: HomingPhase::default(),
            loop_counter: 0,
            step_dir_active: false,
            config,
            hw_config,
            board,
            gpio,
            motor: collaborators.motor,
            encoder: collaborators.encoder,
            sensorless: collaborators.sensorless,
            controller: collaborators.controller,
            trajectory: collaborators.trajectory,
            min_endstop: collaborators.min_endstop,
            max_endstop: collaborators.max_endstop,
            cogging_map: None,
        };
        (axis, handle)
    }

    pub fn handle(&self) -> AxisHandle {
        self.handle.clone()
    }

    /// The non-terminating worker loop (§4.6, §9: "the loop is defined as
    /// infinite ... reachable only via external thread teardown"). Intended
    /// to be the body of the axis's worker thread.
    pub fn run_state_machine_loop(mut self) -> ! {
        self.handle.set_thread_valid(true);
        loop {
            self.step();
        }
    }

    /// One iteration of the sequencer, split out from
    /// [`run_state_machine_loop`] so tests can drive it directly without an
    /// infinite loop: observe request, validate prerequisites, dispatch,
    /// advance or fall to idle.
    pub fn step(&mut self) {
        self.poll_requested_state();

        let validated = self.validate_prerequisites(self.task_chain.current());
        if validated != self.task_chain.current() {
            self.task_chain.force_current(validated);
        }
        // Publish before dispatch: a control-loop handler (Idle,
        // ClosedLoopControl, SensorlessControl) blocks for many ticks, so
        // `current_state` must become externally observable the moment the
        // axis enters it rather than only once the handler returns.
        self.publish();

        let status = self.dispatch(validated);
        if status {
            self.task_chain.advance();
        } else {
            self.task_chain.force_current(AxisState::Idle);
        }
        self.publish();
        crate::log::axis_fault_event(self.name, self.handle.error());
    }

    fn publish(&self) {
        self.handle
            .publish(self.task_chain.current(), self.homing_state, self.loop_counter);
    }

    fn poll_requested_state(&mut self) {
        let requested = self.handle.take_requested_state();
        if requested == AxisState::Undefined {
            return;
        }
        let chain = self.expand_request(requested);
        self.task_chain.rebuild(&chain);
        self.handle.clear_invalid_state();
    }

    /// §4.6 "Request expansion": builds the ordered, `Idle`-then-`Undefined`
    /// terminated sequence of concrete states a meta-request stands for.
    fn expand_request(&self, requested: AxisState) -> Vec<AxisState> {
        match requested {
            AxisState::StartupSequence => {
                let mut chain = Vec::with_capacity(TASK_CHAIN_CAPACITY - 1);
                if self.config.startup_motor_calibration {
                    chain.push(AxisState::MotorCalibration);
                }
                if self.encoder.use_index() {
                    chain.push(AxisState::EncoderIndexSearch);
                }
                if self.config.startup_encoder_offset_calibration {
                    chain.push(AxisState::EncoderOffsetCalibration);
                }
                if self.config.startup_closed_loop_control {
                    if self.config.startup_homing {
                        chain.push(AxisState::Homing);
                    }
                    chain.push(AxisState::ClosedLoopControl);
                } else if self.config.startup_sensorless_control {
                    chain.push(AxisState::SensorlessControl);
                }
                chain.push(AxisState::Idle);
                chain
            }
            AxisState::Homing => {
                vec![AxisState::Homing, AxisState::ClosedLoopControl, AxisState::Idle]
            }
            AxisState::FullCalibrationSequence => {
                let mut chain = Vec::with_capacity(4);
                chain.push(AxisState::MotorCalibration);
                if self.encoder.use_index() {
                    chain.push(AxisState::EncoderIndexSearch);
                }
                chain.push(AxisState::EncoderOffsetCalibration);
                chain.push(AxisState::Idle);
                chain
            }
            AxisState::Undefined => vec![AxisState::Undefined],
            other => vec![other, AxisState::Idle],
        }
    }

    fn validate_prerequisites(&self, state: AxisState) -> AxisState {
        if state.requires_motor_calibration() && !self.motor.is_calibrated() {
            return AxisState::Undefined;
        }
        if state.requires_encoder_ready() && !self.encoder.is_ready() {
            return AxisState::Undefined;
        }
        state
    }

    /// §4.6 "Dispatch" / "Handler mapping". Returns the handler's status:
    /// `true` advances the task chain, `false` falls to `Idle`.
    fn dispatch(&mut self, state: AxisState) -> bool {
        match state {
            AxisState::MotorCalibration => {
                let ok = self.motor.arm() && self.motor.run_calibration();
                self.motor.disarm();
                ok
            }
            AxisState::EncoderIndexSearch => self.encoder.run_index_search(),
            AxisState::EncoderOffsetCalibration => {
                let ok = self.motor.arm() && self.encoder.run_offset_calibration();
                self.motor.disarm();
                ok
            }
            AxisState::Homing => self.controller.home_axis(),
            AxisState::SensorlessControl => self.run_sensorless_control_loop(),
            AxisState::ClosedLoopControl => self.run_closed_loop_control_loop(),
            AxisState::Idle => self.run_idle_loop(),
            AxisState::Undefined
            | AxisState::StartupSequence
            | AxisState::FullCalibrationSequence => {
                self.handle.accumulate_error(crate::error::AxisError::INVALID_STATE);
                false
            }
        }
    }
}

/// Shared test fixture, used both by this module's own tests and by the
/// sibling submodules' (`safety`, `homing`, `step_dir`, `spinup`,
/// `handlers`) — all exercise the same `Axis` over mock collaborators.
#[cfg(test)]
pub(super) mod tests_support {
    use super::*;
    use crate::board::VoltageTripBand;
    use crate::collaborators::mock::{
        MockController, MockEncoder, MockEndstop, MockGpio, MockMotor, MockSensorlessEstimator,
        MockTrajectory,
    };
    use crate::config::RawPin;

    pub fn hw_config() -> HwConfig {
        HwConfig {
            step_pin: RawPin { port: 0, pin: 0 },
            dir_pin: RawPin { port: 0, pin: 1 },
            thermistor_channel: 0,
            thermistor_poly_coeffs: [0.0; 4],
            thread_priority: 0,
        }
    }

    pub fn new_test_axis() -> (Axis, AxisHandle) {
        let board = Arc::new(BoardContext::new(VoltageTripBand {
            under_voltage: 10.0,
            over_voltage: 56.0,
        }));
        board.set_vbus_voltage(24.0);
        board.set_brake_resistor_armed(true);
        let gpio: Arc<dyn GpioService> = Arc::new(MockGpio::new());
        let mut config = AxisRuntimeConfig::default();
        config.startup_motor_calibration = false;
        config.startup_encoder_offset_calibration = false;
        Axis::new(
            "axis0",
            config,
            hw_config(),
            board,
            gpio,
            AxisCollaborators {
                motor: Box::new(MockMotor::new()),
                encoder: Box::new(MockEncoder::new()),
                sensorless: Box::new(MockSensorlessEstimator::default()),
                controller: Box::new(MockController::new()),
                trajectory: Box::new(MockTrajectory::default()),
                min_endstop: Box::new(MockEndstop::disabled()),
                max_endstop: Box::new(MockEndstop::disabled()),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::new_test_axis;
    use super::*;
    use crate::collaborators::mock::MockEncoder;
    use crate::collaborators::Motor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Tracks arm/disarm calls via a shared flag so a test thread can
    /// observe them while the `Axis` itself is owned by the worker thread.
    struct ArmTrackingMotor(Arc<AtomicBool>);

    impl Motor for ArmTrackingMotor {
        fn setup(&mut self) -> bool {
            true
        }
        fn arm(&mut self) -> bool {
            self.0.store(true, Ordering::SeqCst);
            true
        }
        fn disarm(&mut self) {
            self.0.store(false, Ordering::SeqCst);
        }
        fn run_calibration(&mut self) -> bool {
            true
        }
        fn update(&mut self, _i_mag: f64, _phase: f64) -> bool {
            true
        }
        fn do_checks(&mut self) -> bool {
            true
        }
        fn armed_state(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
        fn is_calibrated(&self) -> bool {
            true
        }
    }

    #[test]
    fn request_idle_from_fresh_boot_disarms_and_sets_no_errors() {
        let (mut axis, handle) = new_test_axis();
        let armed = Arc::new(AtomicBool::new(true));
        axis.motor = Box::new(ArmTrackingMotor(armed.clone()));

        handle.request_state(AxisState::Idle);
        let signal = axis.handle.signal().clone();
        let worker = std::thread::spawn(move || {
            axis.step();
        });

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(handle.current_state(), AxisState::Idle);
        assert!(handle.error().is_empty());
        assert!(!armed.load(Ordering::SeqCst), "motor must disarm on entry to Idle");

        // Idle's tick loop blocks forever absent a new request; supply one
        // so the spawned `step()` call returns and the thread can join.
        handle.request_state(AxisState::Idle);
        signal.notify();
        worker.join().unwrap();
    }

    #[test]
    fn closed_loop_forced_to_undefined_before_motor_calibration() {
        let (mut axis, handle) = new_test_axis();
        handle.request_state(AxisState::ClosedLoopControl);
        axis.step();
        assert_eq!(handle.current_state(), AxisState::Idle);
        assert!(handle.error().contains(crate::error::AxisError::INVALID_STATE));
    }

    #[test]
    fn full_calibration_sequence_with_use_index_expands_in_order() {
        let (mut axis, _handle) = new_test_axis();
        axis.encoder = Box::new({
            let mut e = MockEncoder::new();
            e.use_index = true;
            e
        });
        let chain = axis.expand_request(AxisState::FullCalibrationSequence);
        assert_eq!(
            chain,
            vec![
                AxisState::MotorCalibration,
                AxisState::EncoderIndexSearch,
                AxisState::EncoderOffsetCalibration,
                AxisState::Idle,
            ]
        );
    }

    #[test]
    fn task_chain_advances_left_without_overlapping_move() {
        let mut chain = TaskChain::new();
        chain.rebuild(&[AxisState::MotorCalibration, AxisState::EncoderOffsetCalibration]);
        assert_eq!(chain.current(), AxisState::MotorCalibration);
        chain.advance();
        assert_eq!(chain.current(), AxisState::EncoderOffsetCalibration);
        chain.advance();
        assert_eq!(chain.current(), AxisState::Undefined);
        chain.advance();
        assert_eq!(chain.current(), AxisState::Undefined);
    }
}
