//! SCD41-class CO2/temperature/humidity acquisition.
//!
//! The sensor is driven in single-shot mode: trigger a measurement, poll
//! the data-ready flag, read. The first reading after a power or idle
//! transition is frequently unreliable, so [`ClimateSensor::acquire`] runs a
//! double single-shot and discards the first result, trading one extra
//! measurement cycle for accuracy.

use crate::common::error::NodeError;
use crate::common::hal::{block_with_deadline, ClimateBus, Clock};
use crate::common::timing;
use crate::common::types::ClimateSample;

/// Single-shot driver over an abstract measurement bus.
#[derive(Debug)]
pub struct ClimateSensor<B: ClimateBus> {
    bus: B,
    initialized: bool,
}

impl<B: ClimateBus> ClimateSensor<B> {
    pub fn new(bus: B) -> Self {
        ClimateSensor {
            bus,
            initialized: false,
        }
    }

    /// Initializes the bus driver on first use this power-on epoch.
    fn init_if_needed(&mut self) -> Result<(), NodeError<B::Error>> {
        if !self.initialized {
            self.bus.init().map_err(NodeError::Io)?;
            self.initialized = true;
        }
        Ok(())
    }

    /// Triggers one measurement and polls for the result under the
    /// single-shot deadline.
    fn single_shot<C: Clock>(
        &mut self,
        clock: &mut C,
    ) -> Result<ClimateSample, NodeError<B::Error>> {
        self.bus.start_single_shot().map_err(NodeError::Io)?;
        let bus = &mut self.bus;
        block_with_deadline(
            clock,
            timing::SINGLE_SHOT_TIMEOUT,
            timing::SINGLE_SHOT_POLL_INTERVAL_MS * 1_000,
            || bus.read_measurement(),
        )
    }

    /// Acquires one stabilized CO2/T/RH triple.
    ///
    /// Runs two single-shot measurements; the first stabilizes the sensor's
    /// internal filtering and is discarded. Any init failure or poll timeout
    /// yields an error the caller maps to absent reading fields.
    pub fn acquire<C: Clock>(&mut self, clock: &mut C) -> Result<ClimateSample, NodeError<B::Error>> {
        self.init_if_needed()?;
        let _ = self.single_shot(clock)?;
        self.single_shot(clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testutil::MockClock;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct MockBusError;

    struct MockBus {
        init_calls: u32,
        fail_init: bool,
        shot_calls: u32,
        /// Polls remaining before the current shot becomes ready; `None`
        /// means never ready.
        ready_after: Option<u32>,
        polls_left: u32,
        samples: [ClimateSample; 2],
    }

    impl MockBus {
        fn new(ready_after: Option<u32>) -> Self {
            MockBus {
                init_calls: 0,
                fail_init: false,
                shot_calls: 0,
                ready_after,
                polls_left: 0,
                samples: [
                    // First-shot value, deliberately off; must be discarded.
                    ClimateSample {
                        co2_ppm: 9999.0,
                        temp_c: -40.0,
                        rh_pct: 0.0,
                    },
                    ClimateSample {
                        co2_ppm: 810.0,
                        temp_c: 24.5,
                        rh_pct: 48.0,
                    },
                ],
            }
        }
    }

    impl ClimateBus for MockBus {
        type Error = MockBusError;

        fn init(&mut self) -> Result<(), MockBusError> {
            self.init_calls += 1;
            if self.fail_init {
                Err(MockBusError)
            } else {
                Ok(())
            }
        }

        fn start_single_shot(&mut self) -> Result<(), MockBusError> {
            self.shot_calls += 1;
            self.polls_left = self.ready_after.unwrap_or(u32::MAX);
            Ok(())
        }

        fn read_measurement(&mut self) -> nb::Result<ClimateSample, MockBusError> {
            if self.ready_after.is_none() || self.polls_left > 0 {
                self.polls_left = self.polls_left.saturating_sub(1);
                return Err(nb::Error::WouldBlock);
            }
            let idx = usize::min(self.shot_calls as usize - 1, 1);
            Ok(self.samples[idx])
        }
    }

    #[test]
    fn acquire_discards_first_shot() {
        let mut clock = MockClock::new();
        let mut sensor = ClimateSensor::new(MockBus::new(Some(3)));

        let sample = sensor.acquire(&mut clock).unwrap();
        assert_eq!(sensor.bus.shot_calls, 2);
        assert!((sample.co2_ppm - 810.0).abs() < 1e-3);
        assert!((sample.temp_c - 24.5).abs() < 1e-3);
        assert!((sample.rh_pct - 48.0).abs() < 1e-3);
    }

    #[test]
    fn acquire_times_out_when_never_ready() {
        let mut clock = MockClock::new();
        let mut sensor = ClimateSensor::new(MockBus::new(None));

        let result = sensor.acquire(&mut clock);
        assert!(matches!(result, Err(NodeError::Timeout)));
        // The 9 s single-shot bound must have elapsed on the mock clock.
        assert!(clock.now_us >= 9_000_000);
    }

    #[test]
    fn init_runs_once_per_epoch() {
        let mut clock = MockClock::new();
        let mut sensor = ClimateSensor::new(MockBus::new(Some(1)));

        sensor.acquire(&mut clock).unwrap();
        sensor.bus.shot_calls = 0;
        sensor.acquire(&mut clock).unwrap();
        assert_eq!(sensor.bus.init_calls, 1);
    }

    #[test]
    fn init_failure_propagates_and_stays_uninitialized() {
        let mut clock = MockClock::new();
        let mut bus = MockBus::new(Some(1));
        bus.fail_init = true;
        let mut sensor = ClimateSensor::new(bus);

        assert!(matches!(
            sensor.acquire(&mut clock),
            Err(NodeError::Io(MockBusError))
        ));
        assert!(!sensor.initialized);

        // A later cycle may succeed once the bus recovers.
        sensor.bus.fail_init = false;
        assert!(sensor.acquire(&mut clock).is_ok());
        assert_eq!(sensor.bus.init_calls, 2);
    }
}
