// src/node/rail.rs

use crate::common::hal::RailPin;

/// A sensor supply rail, optionally gated through a switch (MOSFET or
/// optocoupler) on a GPIO pin.
///
/// A rail without a pin is permanently logically on: every operation is a
/// no-op and the sensor is assumed to be always powered.
#[derive(Debug)]
pub struct PowerRail<P: RailPin> {
    pin: Option<P>,
    active_high: bool,
}

impl<P: RailPin> PowerRail<P> {
    pub fn new(pin: Option<P>, active_high: bool) -> Self {
        PowerRail { pin, active_high }
    }

    /// Configures the pin as an output and forces the rail off.
    pub fn begin(&mut self) {
        if let Some(pin) = &mut self.pin {
            pin.init_output();
        }
        self.off();
    }

    pub fn on(&mut self) {
        self.write(true);
    }

    pub fn off(&mut self) {
        self.write(false);
    }

    /// Whether a real switch backs this rail.
    pub fn is_switched(&self) -> bool {
        self.pin.is_some()
    }

    fn write(&mut self, enabled: bool) {
        if let Some(pin) = &mut self.pin {
            pin.write(enabled == self.active_high);
        }
    }
}
