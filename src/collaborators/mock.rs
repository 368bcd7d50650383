//! Scriptable fakes for every collaborator trait, used by unit tests and by
//! the demonstration binary's `--mock` mode. Fields are `pub` so a test can
//! poke them directly (e.g. `encoder.vel_estimate = 0.0`) rather than going
//! through a builder, the same shape a hardware-in-the-loop test double
//! takes.

use super::{ControlMode, Controller, Encoder, Endstop, EndstopConfig, Motor, SensorlessEstimator};
use crate::sync::SharedF64;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use super::{Edge, GpioPin, GpioService, Pull};

#[derive(Debug, Default)]
pub struct MockMotor {
    pub armed: bool,
    pub calibrated: bool,
    pub checks_ok: bool,
    pub update_ok: bool,
    pub calibration_ok: bool,
    pub last_update: Option<(f64, f64)>,
    pub update_calls: u32,
}

impl MockMotor {
    pub fn new() -> Self {
        Self {
            checks_ok: true,
            update_ok: true,
            calibration_ok: true,
            ..Default::default()
        }
    }
}

impl Motor for MockMotor {
    fn setup(&mut self) -> bool {
        true
    }

    fn arm(&mut self) -> bool {
        self.armed = true;
        true
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn run_calibration(&mut self) -> bool {
        self.calibrated = self.calibration_ok;
        self.calibration_ok
    }

    fn update(&mut self, i_mag: f64, phase: f64) -> bool {
        self.update_calls += 1;
        self.last_update = Some((i_mag, phase));
        self.update_ok
    }

    fn do_checks(&mut self) -> bool {
        self.checks_ok
    }

    fn armed_state(&self) -> bool {
        self.armed
    }

    fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}

#[derive(Debug)]
pub struct MockEncoder {
    pub pos_estimate: f64,
    pub vel_estimate: f64,
    pub phase: f64,
    pub shadow_count: i64,
    pub linear_count: i64,
    pub ready: bool,
    pub checks_ok: bool,
    pub index_search_ok: bool,
    pub offset_calibration_ok: bool,
    pub cpr: u32,
    pub use_index: bool,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self {
            pos_estimate: 0.0,
            vel_estimate: 0.0,
            phase: 0.0,
            shadow_count: 0,
            linear_count: 0,
            ready: true,
            checks_ok: true,
            index_search_ok: true,
            offset_calibration_ok: true,
            cpr: 8192,
            use_index: false,
        }
    }
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder for MockEncoder {
    fn setup(&mut self) -> bool {
        true
    }

    fn update(&mut self) {}

    fn do_checks(&mut self) -> bool {
        self.checks_ok
    }

    fn run_index_search(&mut self) -> bool {
        self.index_search_ok
    }

    fn run_offset_calibration(&mut self) -> bool {
        self.offset_calibration_ok
    }

    fn set_linear_count(&mut self, count: i64) {
        self.linear_count = count;
    }

    fn pos_estimate(&self) -> f64 {
        self.pos_estimate
    }

    fn vel_estimate(&self) -> f64 {
        self.vel_estimate
    }

    fn phase(&self) -> f64 {
        self.phase
    }

    fn shadow_count(&self) -> i64 {
        self.shadow_count
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn cpr(&self) -> u32 {
        self.cpr
    }

    fn use_index(&self) -> bool {
        self.use_index
    }
}

#[derive(Debug, Default)]
pub struct MockSensorlessEstimator {
    pub pll_pos: f64,
    pub vel_estimate: f64,
    pub phase: f64,
}

impl SensorlessEstimator for MockSensorlessEstimator {
    fn update(&mut self) {}

    fn pll_pos(&self) -> f64 {
        self.pll_pos
    }

    fn vel_estimate(&self) -> f64 {
        self.vel_estimate
    }

    fn phase(&self) -> f64 {
        self.phase
    }
}

#[derive(Debug)]
pub struct MockController {
    pub pos_setpoint: SharedF64,
    pub vel_setpoint: f64,
    pub vel_integrator_current: f64,
    pub traj_start_loop_count: u64,
    pub control_mode: ControlMode,
    pub homing_speed: f64,
    pub update_current: Option<f64>,
    pub home_axis_ok: bool,
    pub home_axis_calls: u32,
}

impl Default for MockController {
    fn default() -> Self {
        Self {
            pos_setpoint: SharedF64::new(0.0),
            vel_setpoint: 0.0,
            vel_integrator_current: 0.0,
            traj_start_loop_count: 0,
            control_mode: ControlMode::Current,
            homing_speed: 1.0,
            update_current: Some(0.0),
            home_axis_ok: true,
            home_axis_calls: 0,
        }
    }
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Controller for MockController {
    fn update(&mut self, _pos: f64, _vel: f64) -> Option<f64> {
        self.update_current
    }

    fn home_axis(&mut self) -> bool {
        self.home_axis_calls += 1;
        self.home_axis_ok
    }

    fn reset(&mut self) {
        self.vel_integrator_current = 0.0;
        self.control_mode = ControlMode::Current;
    }

    fn set_pos_setpoint(&mut self, pos: f64, _vel_ff: f64, _cur_ff: f64) {
        self.pos_setpoint.store(pos);
    }

    fn set_vel_setpoint(&mut self, vel: f64, _cur_ff: f64) {
        self.vel_setpoint = vel;
    }

    fn pos_setpoint_handle(&self) -> SharedF64 {
        self.pos_setpoint.clone()
    }

    fn vel_setpoint(&self) -> f64 {
        self.vel_setpoint
    }

    fn reset_vel_integrator(&mut self) {
        self.vel_integrator_current = 0.0;
    }

    fn set_traj_start_loop_count(&mut self, loop_count: u64) {
        self.traj_start_loop_count = loop_count;
    }

    fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    fn set_control_mode(&mut self, mode: ControlMode) {
        self.control_mode = mode;
    }

    fn homing_speed(&self) -> f64 {
        self.homing_speed
    }
}

#[derive(Debug, Default)]
pub struct MockTrajectory {
    pub plan_calls: u32,
    pub last_plan: Option<(f64, f64, f64, f64, f64, f64)>,
}

impl super::TrapezoidalTrajectory for MockTrajectory {
    fn plan_trapezoidal(
        &mut self,
        goal_pos: f64,
        current_pos: f64,
        current_vel: f64,
        v_max: f64,
        a_max: f64,
        d_max: f64,
    ) {
        self.plan_calls += 1;
        self.last_plan = Some((goal_pos, current_pos, current_vel, v_max, a_max, d_max));
    }
}

#[derive(Debug)]
pub struct MockEndstop {
    pub config: EndstopConfig,
    pub pressed: bool,
    pub offset_from_home: i64,
}

impl MockEndstop {
    pub fn new(config: EndstopConfig) -> Self {
        Self {
            config,
            pressed: false,
            offset_from_home: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(EndstopConfig {
            enabled: false,
            physical_endstop: true,
            min_ms_homing: 0,
            offset: 0,
            home_percentage: 0.0,
        })
    }
}

impl Endstop for MockEndstop {
    fn update(&mut self, _loop_counter: u64) {}

    fn get_endstop_state(&self) -> bool {
        self.pressed
    }

    fn config(&self) -> &EndstopConfig {
        &self.config
    }

    fn offset_from_home(&self) -> i64 {
        self.offset_from_home
    }

    fn set_offset_from_home(&mut self, offset: i64) {
        self.offset_from_home = offset;
    }
}

/// An in-process GPIO service: `subscribe` just stashes the callback in a
/// map so a test can fire it with [`MockGpio::fire`], modeling the ISR the
/// real pin-change interrupt would invoke.
#[derive(Clone, Default)]
pub struct MockGpio {
    callbacks: Arc<Mutex<HashMap<GpioPin, Box<dyn Fn() + Send + Sync>>>>,
    pin_states: Arc<Mutex<HashMap<GpioPin, bool>>>,
    subscribed: Arc<Mutex<HashMap<GpioPin, AtomicBool>>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pin(&self, pin: GpioPin, state: bool) {
        self.pin_states.lock().unwrap().insert(pin, state);
    }

    pub fn fire(&self, pin: GpioPin) {
        let callbacks = self.callbacks.lock().unwrap();
        if let Some(cb) = callbacks.get(&pin) {
            cb();
        }
    }

    pub fn is_subscribed(&self, pin: GpioPin) -> bool {
        self.subscribed
            .lock()
            .unwrap()
            .get(&pin)
            .map(|f| f.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}

impl GpioService for MockGpio {
    fn subscribe(&self, pin: GpioPin, _pull: Pull, _edge: Edge, callback: Box<dyn Fn() + Send + Sync>) {
        self.callbacks.lock().unwrap().insert(pin, callback);
        self.subscribed
            .lock()
            .unwrap()
            .insert(pin, AtomicBool::new(true));
    }

    fn unsubscribe(&self, pin: GpioPin) {
        self.callbacks.lock().unwrap().remove(&pin);
        if let Some(flag) = self.subscribed.lock().unwrap().get(&pin) {
            flag.store(false, Ordering::Release);
        }
    }

    fn set_input(&self, pin: GpioPin, _pull: Pull) {
        self.pin_states.lock().unwrap().entry(pin).or_insert(false);
    }

    fn read(&self, pin: GpioPin) -> bool {
        *self.pin_states.lock().unwrap().get(&pin).unwrap_or(&false)
    }
}
