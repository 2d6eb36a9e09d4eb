use arbiter::{Actuator, LineId};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use embassy_nrf::Peri;

/// Active-low LED, as wired on the DK.
pub struct Led {
    pin: Output<'static>,
}

impl Led {
    /// Starts off.
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        Self { pin: Output::new(pin, Level::High, OutputDrive::Standard) }
    }

    pub fn set(&mut self, on: bool) {
        if on {
            self.pin.set_low();
        } else {
            self.pin.set_high();
        }
    }

    pub fn toggle(&mut self) {
        self.pin.toggle();
    }
}

impl Actuator for Led {
    fn set_output(&mut self, line: LineId, on: bool) {
        trace!("Line {} -> {}", line.0, on);
        self.set(on);
    }
}

/// Active-high buzzer input.
pub struct Buzzer {
    pin: Output<'static>,
}

impl Buzzer {
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        Self { pin: Output::new(pin, Level::Low, OutputDrive::Standard) }
    }
}

impl Actuator for Buzzer {
    fn set_output(&mut self, _line: LineId, on: bool) {
        self.pin.set_level(if on { Level::High } else { Level::Low });
    }
}
