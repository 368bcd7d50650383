//! Config loading follows the same two-layer split the hardware layer
//! uses: `clap` for CLI flags, `figment` (TOML provider) for the config
//! file, merged so a flag overrides the file. The per-axis `config.*`
//! fields §3 lists as telemetry-writable live in [`AxisRuntimeConfig`];
//! the immutable per-axis pin/ADC binding lives in [`HwConfig`].

mod args;

pub use args::{args, Args};

use crate::board::VoltageTripBand;
use crate::collaborators::GpioPin;
use anyhow::Result;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct AxisRuntimeConfig {
    pub startup_motor_calibration: bool,
    pub startup_encoder_index_search: bool,
    pub startup_encoder_offset_calibration: bool,
    pub startup_closed_loop_control: bool,
    pub startup_sensorless_control: bool,
    pub startup_homing: bool,
    pub enable_step_dir: bool,
    pub counts_per_step: f64,
    pub ramp_up_time: f64,
    pub ramp_up_distance: f64,
    pub spin_up_current: f64,
    pub spin_up_acceleration: f64,
    pub spin_up_target_vel: f64,
}

impl Default for AxisRuntimeConfig {
    fn default() -> Self {
        Self {
            startup_motor_calibration: true,
            startup_encoder_index_search: false,
            startup_encoder_offset_calibration: true,
            startup_closed_loop_control: true,
            startup_sensorless_control: false,
            startup_homing: false,
            enable_step_dir: false,
            counts_per_step: 2.0,
            ramp_up_time: 0.4,
            ramp_up_distance: 1.0,
            spin_up_current: 10.0,
            spin_up_acceleration: 20.0,
            spin_up_target_vel: 400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawPin {
    pub port: u8,
    pub pin: u8,
}

impl From<RawPin> for GpioPin {
    fn from(p: RawPin) -> Self {
        GpioPin {
            port: p.port,
            pin: p.pin,
        }
    }
}

/// Immutable per-axis hardware binding (§3). Loaded once from the config
/// file; unlike `AxisRuntimeConfig` it is never rewritten by the telemetry
/// layer.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HwConfig {
    pub step_pin: RawPin,
    pub dir_pin: RawPin,
    pub thermistor_channel: u8,
    pub thermistor_poly_coeffs: [f64; 4],
    pub thread_priority: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AxisBinding {
    #[serde(default)]
    pub runtime: AxisRuntimeConfig,
    pub hw: HwConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoltageTripBandConfig {
    pub under_voltage: f64,
    pub over_voltage: f64,
}

impl From<VoltageTripBandConfig> for VoltageTripBand {
    fn from(c: VoltageTripBandConfig) -> Self {
        VoltageTripBand {
            under_voltage: c.under_voltage,
            over_voltage: c.over_voltage,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    pub voltage_trip_band: VoltageTripBandConfig,
    pub axis0: AxisBinding,
    pub axis1: AxisBinding,
}

pub fn load(args: &Args) -> Result<Config> {
    let cfg: Config = Figment::new()
        .merge(Toml::file(&args.cfg))
        .merge(args)
        .extract()?;
    Ok(cfg)
}
