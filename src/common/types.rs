// src/common/types.rs

use heapless::String;

/// One cycle's worth of sensor data.
///
/// Every field is optional: absence (a failed or skipped read) is a
/// first-class value, never a sentinel collapsed into the valid range.
/// Created once per cycle by the orchestrator and immutable afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReading {
    /// Ammonia concentration in ppm.
    pub nh3_ppm: Option<f32>,
    /// CO2 concentration in ppm.
    pub co2_ppm: Option<f32>,
    /// Temperature in °C.
    pub temp_c: Option<f32>,
    /// Relative humidity in %.
    pub rh_pct: Option<f32>,
}

impl SensorReading {
    /// True when no sensor produced a value this cycle.
    pub fn is_empty(&self) -> bool {
        self.nh3_ppm.is_none()
            && self.co2_ppm.is_none()
            && self.temp_c.is_none()
            && self.rh_pct.is_none()
    }
}

/// One completed single-shot measurement from the climate sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub co2_ppm: f32,
    pub temp_c: f32,
    pub rh_pct: f32,
}

/// Static identity reported in every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: &'static str,
    pub fw_version: &'static str,
}

/// Power-loss-volatile state.
///
/// Lives in retained (RTC) memory on the platform side: it survives the
/// sleep/wake cycle within one power-on epoch and resets to [`Self::new`]
/// only when supply power is fully removed. Distinct from the durable
/// queue's storage, which survives everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedState {
    /// Strictly increases across wake cycles within one power-on epoch.
    pub boot_count: u32,
    /// Whether the long first warmup of the gas cell has completed since
    /// the last full power loss.
    pub first_warmup_done: bool,
}

impl RetainedState {
    /// Cold power-on value.
    pub const fn new() -> Self {
        RetainedState {
            boot_count: 0,
            first_warmup_done: false,
        }
    }
}

impl Default for RetainedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Link-quality details reported by a successful association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    /// Dotted-quad address assigned to the station.
    pub ip: String<16>,
    /// Received signal strength in dBm.
    pub rssi: i32,
}
