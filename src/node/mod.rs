//! Cycle orchestration: the wake → acquire → persist → deliver → sleep
//! state machine.
//!
//! One call to [`GasNode::run_cycle`] is one duty cycle. Control flow is a
//! strictly sequential single pass with bounded blocking waits; there is no
//! branching back, and every path terminates in deep sleep so the node
//! always resumes duty-cycling.

pub mod rail;

use log::{info, warn};

use crate::climate::ClimateSensor;
use crate::common::config::{NodeConfig, TELEMETRY_REDUNDANCY};
use crate::common::hal::{
    BatterySense, Channel, ClimateBus, Clock, QueueBackend, RailPin, SerialPort, SleepControl,
    Uplink,
};
use crate::common::timing::{DRAIN_RECORD_GAP_MS, TRIPLICATE_GAP_MS};
use crate::common::types::{RetainedState, SensorReading};
use crate::queue::DurableQueue;
use crate::record::{StatusRecord, TelemetryRecord};
use crate::ze03::Ze03;

pub use rail::PowerRail;

/// The composed sensor node.
///
/// Owns both power rails, both sensor drivers, the durable queue and the
/// platform collaborators. Single-threaded by construction: the transports
/// are exclusively owned by their drivers and nothing runs concurrently
/// with anything else.
pub struct GasNode<RN, RC, S, B, Q, U, V, C, W>
where
    RN: RailPin,
    RC: RailPin,
    S: SerialPort,
    B: ClimateBus,
    Q: QueueBackend,
    U: Uplink,
    V: BatterySense,
    C: Clock,
    W: SleepControl,
{
    cfg: NodeConfig,
    nh3_rail: PowerRail<RN>,
    climate_rail: PowerRail<RC>,
    nh3: Ze03<S>,
    climate: ClimateSensor<B>,
    queue: DurableQueue<Q>,
    uplink: U,
    battery: V,
    clock: C,
    sleeper: W,
    /// Monotonic epoch captured at construction; record timestamps are
    /// measured from here.
    epoch: <C as Clock>::Instant,
}

impl<RN, RC, S, B, Q, U, V, C, W> GasNode<RN, RC, S, B, Q, U, V, C, W>
where
    RN: RailPin,
    RC: RailPin,
    S: SerialPort,
    B: ClimateBus,
    Q: QueueBackend,
    U: Uplink,
    V: BatterySense,
    C: Clock,
    W: SleepControl,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: NodeConfig,
        nh3_rail: PowerRail<RN>,
        climate_rail: PowerRail<RC>,
        nh3: Ze03<S>,
        climate: ClimateSensor<B>,
        queue: DurableQueue<Q>,
        uplink: U,
        battery: V,
        clock: C,
        sleeper: W,
    ) -> Self {
        let epoch = clock.now();
        GasNode {
            cfg,
            nh3_rail,
            climate_rail,
            nh3,
            climate,
            queue,
            uplink,
            battery,
            clock,
            sleeper,
            epoch,
        }
    }

    /// Runs one full duty cycle and enters deep sleep.
    ///
    /// `retained` is the power-loss-volatile state the platform keeps in
    /// retained memory across sleep cycles.
    pub fn run_cycle(&mut self, retained: &mut RetainedState) {
        retained.boot_count = retained.boot_count.wrapping_add(1);
        info!("wake: boot {}", retained.boot_count);

        self.nh3_rail.begin();
        self.climate_rail.begin();

        // No point acquiring data that cannot be buffered.
        if let Err(e) = self.queue.open() {
            warn!("queue mount failed ({e:?}), skipping cycle");
            return self.go_sleep();
        }

        let reading = self.acquire(retained);
        let vbat = self.battery.read_volts();

        self.persist(retained, &reading, vbat);
        self.try_deliver(retained);
        self.go_sleep()
    }

    /// Power-sequences and reads both sensors. Failures land as absent
    /// fields; acquisition never aborts the cycle.
    fn acquire(&mut self, retained: &mut RetainedState) -> SensorReading {
        let mut reading = SensorReading::default();

        let nh3 = if self.nh3_rail.is_switched() {
            self.nh3_rail.on();
            // The electrochemical cell needs minutes from cold, seconds
            // from a routine wake.
            let warmup = if retained.first_warmup_done {
                self.cfg.warmup
            } else {
                self.cfg.first_warmup
            };
            self.clock.delay_ms(warmup.as_millis() as u32);
            retained.first_warmup_done = true;

            let result = self.nh3.read_concentration(&mut self.clock);
            self.nh3_rail.off();
            result
        } else {
            // An always-powered sensor is assumed past warmup already.
            self.nh3.read_concentration(&mut self.clock)
        };
        match nh3 {
            Ok(ppm) => reading.nh3_ppm = Some(ppm),
            Err(e) => info!("nh3 read failed: {e:?}"),
        }

        let climate = if self.climate_rail.is_switched() {
            self.climate_rail.on();
            self.clock
                .delay_ms(self.cfg.climate_settle.as_millis() as u32);
            let result = self.climate.acquire(&mut self.clock);
            self.climate_rail.off();
            result
        } else {
            self.climate.acquire(&mut self.clock)
        };
        match climate {
            Ok(sample) => {
                reading.co2_ppm = Some(sample.co2_ppm);
                reading.temp_c = Some(sample.temp_c);
                reading.rh_pct = Some(sample.rh_pct);
            }
            Err(e) => info!("climate read failed: {e:?}"),
        }

        reading
    }

    /// Builds and appends the cycle's record, unconditionally: a record
    /// with all sensor fields absent still documents the wake.
    fn persist(&mut self, retained: &RetainedState, reading: &SensorReading, vbat: Option<f32>) {
        let ts_ms = (self.clock.now() - self.epoch).as_millis() as u32;
        let record = TelemetryRecord::from_parts(
            self.cfg.identity,
            retained.boot_count,
            ts_ms,
            reading,
            vbat,
        );
        match record.encode() {
            // A failed append is reported and the cycle proceeds: the
            // backlog already queued may still be deliverable.
            Ok(line) => {
                if let Err(e) = self.queue.append(line.as_bytes()) {
                    warn!("queue append failed ({e:?}), record lost");
                }
            }
            Err(e) => warn!("record encode failed: {e:?}"),
        }
    }

    /// Opportunistic delivery: associate, publish status once, flush the
    /// queue with per-record triplicate redundancy. Any failure defers to
    /// the next cycle; the queue keeps the data.
    fn try_deliver(&mut self, retained: &RetainedState) {
        let link = match self.uplink.associate(self.cfg.link_timeout) {
            Ok(link) => link,
            Err(e) => {
                info!("link unavailable ({e:?}), deferring upload");
                return;
            }
        };
        if let Err(e) = self.uplink.open_session(self.cfg.identity.device_id) {
            info!("session failed ({e:?}), deferring upload");
            return;
        }

        let queue_bytes = self.queue.size_bytes().unwrap_or(0);
        let status = StatusRecord {
            device_id: self.cfg.identity.device_id,
            fw: self.cfg.identity.fw_version,
            boot: retained.boot_count,
            queue_bytes: u64::min(queue_bytes, u32::MAX as u64) as u32,
            ip: link.ip.as_str(),
            rssi: link.rssi,
        };
        if let Ok(line) = status.encode() {
            // Status is best-effort and never queued.
            let _ = self.uplink.publish(Channel::Status, line.as_bytes());
        }

        let uplink = &mut self.uplink;
        let clock = &mut self.clock;
        let result = self.queue.drain(|payload| {
            for _ in 0..TELEMETRY_REDUNDANCY {
                if uplink.publish(Channel::Telemetry, payload).is_err() {
                    return false;
                }
                clock.delay_ms(TRIPLICATE_GAP_MS);
            }
            clock.delay_ms(DRAIN_RECORD_GAP_MS);
            true
        });
        match result {
            Ok(published) => info!("flushed {published} records"),
            Err(e) => info!("flush interrupted ({e:?}), backlog retained"),
        }

        self.uplink.close_session();
    }

    /// Tears the link down, arms the wake timer and enters deep sleep.
    fn go_sleep(&mut self) {
        self.uplink.shutdown();
        info!("sleeping for {:?}", self.cfg.measure_interval);
        self.sleeper.deep_sleep(self.cfg.measure_interval);
    }
}
