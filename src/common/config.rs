// src/common/config.rs
//
// Compile-time configuration surface. Values are fixed at build time and
// bundled into a `NodeConfig` so tests can substitute shorter durations.

use core::time::Duration;

use super::types::DeviceIdentity;

/// Stable device identifier.
pub const DEVICE_ID: &str = "gph-gasnode-001";
/// Firmware version string reported in every record.
pub const FW_VERSION: &str = "2.0.0";

/// Fixed wake interval between measurement cycles.
pub const MEASURE_INTERVAL: Duration = Duration::from_secs(3 * 60 * 60);

/// Hard ceiling on the durable queue size.
pub const QUEUE_MAX_BYTES: u64 = 256 * 1024;

/// ZE03 warmup on the very first wake since full power loss. The
/// electrochemical cell needs minutes to stabilize from cold.
pub const ZE03_FIRST_WARMUP: Duration = Duration::from_secs(5 * 60);
/// ZE03 warmup on every subsequent wake.
pub const ZE03_WARMUP: Duration = Duration::from_secs(10);

/// Settle delay after powering the climate sensor rail.
pub const CLIMATE_SETTLE: Duration = Duration::from_millis(50);

/// Bound on station-mode link association.
pub const LINK_TIMEOUT: Duration = Duration::from_secs(15);

/// How many times each telemetry record is published in immediate
/// succession before it counts as delivered.
pub const TELEMETRY_REDUNDANCY: u32 = 3;

/// Per-node configuration handed to the cycle orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    pub identity: DeviceIdentity,
    pub measure_interval: Duration,
    pub queue_max_bytes: u64,
    pub first_warmup: Duration,
    pub warmup: Duration,
    pub climate_settle: Duration,
    pub link_timeout: Duration,
}

impl NodeConfig {
    /// The build-time configuration of this firmware.
    pub const fn default_config() -> Self {
        NodeConfig {
            identity: DeviceIdentity {
                device_id: DEVICE_ID,
                fw_version: FW_VERSION,
            },
            measure_interval: MEASURE_INTERVAL,
            queue_max_bytes: QUEUE_MAX_BYTES,
            first_warmup: ZE03_FIRST_WARMUP,
            warmup: ZE03_WARMUP,
            climate_settle: CLIMATE_SETTLE,
            link_timeout: LINK_TIMEOUT,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
