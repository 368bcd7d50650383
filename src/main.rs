mod axis;
mod board;
mod collaborators;
mod config;
mod error;
mod log;
mod sync;
mod telemetry;
mod util;

use crate::axis::{Axis, AxisCollaborators, AxisHandle, AxisState};
use crate::board::{BoardContext, VoltageTripBand};
use crate::collaborators::mock::{
    MockController, MockEncoder, MockEndstop, MockGpio, MockMotor, MockSensorlessEstimator,
    MockTrajectory,
};
use crate::collaborators::{EndstopConfig, GpioService};
use crate::config::AxisBinding;
use crate::telemetry::AxisSnapshot;
use anyhow::Result;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, Level};

pub const APP_NAME: &str = env!("CARGO_BIN_NAME");

/// There is no hardware backend in this crate (`Motor`, `Encoder`, etc. are
/// out of scope); this binary only ever wires the in-tree mocks, so it
/// doubles as both the demonstration entry point and a smoke test of an
/// `Axis` against a scripted board.
fn build_mock_axis(
    name: &'static str,
    cfg: &AxisBinding,
    board: Arc<BoardContext>,
    gpio: Arc<dyn GpioService>,
) -> (Axis, AxisHandle) {
    let endstop_cfg = EndstopConfig {
        enabled: false,
        physical_endstop: false,
        min_ms_homing: 250,
        offset: 0,
        home_percentage: 0.0,
    };
    Axis::new(
        name,
        cfg.runtime,
        cfg.hw,
        board,
        gpio,
        AxisCollaborators {
            motor: Box::new(MockMotor::new()),
            encoder: Box::new(MockEncoder::new()),
            sensorless: Box::new(MockSensorlessEstimator::default()),
            controller: Box::new(MockController::new()),
            trajectory: Box::new(MockTrajectory::default()),
            min_endstop: Box::new(MockEndstop::new(endstop_cfg)),
            max_endstop: Box::new(MockEndstop::new(endstop_cfg)),
        },
    )
}

fn main() -> Result<()> {
    let args = config::args();
    let cfg = config::load(&args)?;
    let level: Level = cfg.general.log_level.parse().unwrap_or(Level::INFO);
    log::setup(level);
    debug!("Args are: {:?}", args);
    debug!("Config is: {:?}", cfg);

    util::ensure_own!(
        args.mock,
        anyhow::anyhow!("no hardware backend is wired into this build; pass --mock")
    );

    let board = Arc::new(BoardContext::new(VoltageTripBand::from(
        cfg.voltage_trip_band,
    )));
    board.set_vbus_voltage(24.0);
    board.set_brake_resistor_armed(true);
    let gpio: Arc<dyn GpioService> = Arc::new(MockGpio::new());

    let (axis0, handle0) = build_mock_axis("axis0", &cfg.axis0, board.clone(), gpio.clone());
    let (axis1, handle1) = build_mock_axis("axis1", &cfg.axis1, board.clone(), gpio.clone());

    thread::Builder::new()
        .name("axis0".into())
        .spawn(move || axis0.run_state_machine_loop())?;
    thread::Builder::new()
        .name("axis1".into())
        .spawn(move || axis1.run_state_machine_loop())?;

    // Stands in for the hardware timer that fires the current-measurement
    // interrupt: notifies both axes' signal mailboxes at a fixed rate.
    let (isr_h0, isr_h1) = (handle0.clone(), handle1.clone());
    thread::Builder::new()
        .name("current-meas-isr".into())
        .spawn(move || loop {
            isr_h0.notify_current_meas();
            isr_h1.notify_current_meas();
            thread::sleep(Duration::from_micros(125));
        })?;

    handle0.request_state(AxisState::Idle);
    handle1.request_state(AxisState::Idle);

    for _ in 0..20 {
        thread::sleep(Duration::from_millis(100));
        let snap0 = AxisSnapshot::capture("axis0", &handle0, cfg.axis0.runtime);
        let snap1 = AxisSnapshot::capture("axis1", &handle1, cfg.axis1.runtime);
        info!(
            target: log::target::PUBLIC,
            axis0 = %serde_json::to_string(&snap0)?,
            axis1 = %serde_json::to_string(&snap1)?,
            "tick"
        );
    }

    Ok(())
}
