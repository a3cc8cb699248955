//! Serialized record formats: the queued telemetry line and the ephemeral
//! status message.
//!
//! Records are compact JSON objects, one per line; absent sensor fields are
//! omitted entirely, never zero-filled, so a consumer can distinguish "not
//! measured" from "measured zero". Non-finite values are filtered out at
//! construction.

use heapless::String;
use serde::Serialize;

use crate::common::error::NodeError;
use crate::common::types::{DeviceIdentity, SensorReading};
use crate::queue::MAX_RECORD_BYTES;

fn finite(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite())
}

/// The `sensors` object of a telemetry record.
#[derive(Debug, Default, Serialize)]
pub struct SensorFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nh3_ppm: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2_ppm: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_c: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rh_pct: Option<f32>,
}

/// One queued telemetry record.
///
/// A record with every sensor field absent is still a valid record: it
/// carries identity, boot count and timestamp, documenting that the cycle
/// ran.
#[derive(Debug, Serialize)]
pub struct TelemetryRecord {
    pub device_id: &'static str,
    pub fw: &'static str,
    pub boot: u32,
    /// Milliseconds on the monotonic timer since the last reset.
    pub ts_ms: u32,
    pub sensors: SensorFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vbat: Option<f32>,
}

impl TelemetryRecord {
    pub fn from_parts(
        identity: DeviceIdentity,
        boot: u32,
        ts_ms: u32,
        reading: &SensorReading,
        vbat: Option<f32>,
    ) -> Self {
        TelemetryRecord {
            device_id: identity.device_id,
            fw: identity.fw_version,
            boot,
            ts_ms,
            sensors: SensorFields {
                nh3_ppm: finite(reading.nh3_ppm),
                co2_ppm: finite(reading.co2_ppm),
                t_c: finite(reading.temp_c),
                rh_pct: finite(reading.rh_pct),
            },
            vbat: finite(vbat),
        }
    }

    /// Encodes the record as one compact JSON line (terminator excluded).
    pub fn encode(&self) -> Result<String<MAX_RECORD_BYTES>, NodeError> {
        serde_json_core::to_string(self).map_err(|_| NodeError::Encode)
    }
}

/// The ephemeral status message, published once per successful uplink and
/// never queued.
#[derive(Debug, Serialize)]
pub struct StatusRecord<'a> {
    pub device_id: &'static str,
    pub fw: &'static str,
    pub boot: u32,
    pub queue_bytes: u32,
    pub ip: &'a str,
    pub rssi: i32,
}

impl StatusRecord<'_> {
    pub fn encode(&self) -> Result<String<MAX_RECORD_BYTES>, NodeError> {
        serde_json_core::to_string(self).map_err(|_| NodeError::Encode)
    }
}
