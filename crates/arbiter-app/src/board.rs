//! Pin assignment for the nRF52840-DK.
//!
//! The four on-board buttons and LEDs form the arbitrated channels. The
//! holders, the heap warning LED and the demo outputs sit on header pins.

use embassy_nrf::gpio::AnyPin;
use embassy_nrf::interrupt::Priority;
use embassy_nrf::peripherals::SAADC;
use embassy_nrf::saadc::{AnyInput, Input as _};
use embassy_nrf::Peri;

/// GPIO number of a pin on port 1.
const fn p1(pin: u8) -> u8 {
    32 + pin
}

/// Button and LED of one arbitrated channel.
pub struct ChannelPins {
    pub button: Peri<'static, AnyPin>,
    pub led: Peri<'static, AnyPin>,
}

/// Buttons, LEDs and potentiometer of the two record holders.
pub struct HolderResources {
    pub fixed_button: Peri<'static, AnyPin>,
    pub fixed_led: Peri<'static, AnyPin>,
    pub sampling_button: Peri<'static, AnyPin>,
    pub sampling_led: Peri<'static, AnyPin>,
    /// Potentiometer wiper on AIN1.
    pub pot: AnyInput<'static>,
    pub saadc: Peri<'static, SAADC>,
}

pub struct DevKit {
    pub channels: [ChannelPins; 4],
    pub holders: HolderResources,
    /// Lit while the heap is under pressure.
    pub heap_led: Peri<'static, AnyPin>,
    pub demo: DemoResources,
}

/// Outputs only driven with the `demo` feature.
pub struct DemoResources {
    /// Lit in rotation by the chase.
    pub chase: [Peri<'static, AnyPin>; 3],
    /// Lit while the potentiometer reads above the level threshold.
    pub level_led: Peri<'static, AnyPin>,
    /// Active buzzer driven with a square wave.
    pub buzzer: Peri<'static, AnyPin>,
    pub blinkers: [Peri<'static, AnyPin>; 2],
}

impl DevKit {
    /// GPIO numbers of the channel buttons, in channel order.
    pub const CHANNEL_BUTTONS: [u8; 4] = [11, 12, 24, 25];
    /// GPIO numbers of the channel LEDs, in channel order.
    pub const CHANNEL_LEDS: [u8; 4] = [13, 14, 15, 16];
    pub const HOLDER_BUTTONS: [u8; 2] = [p1(1), p1(2)];
    pub const HOLDER_LEDS: [u8; 2] = [p1(3), p1(4)];
    pub const LEVEL_LED: u8 = p1(11);
    pub const BUZZER: u8 = p1(12);

    pub fn new(config: embassy_nrf::config::Config) -> Self {
        let p = embassy_nrf::init(config);

        Self {
            channels: [
                ChannelPins { button: p.P0_11.into(), led: p.P0_13.into() },
                ChannelPins { button: p.P0_12.into(), led: p.P0_14.into() },
                ChannelPins { button: p.P0_24.into(), led: p.P0_15.into() },
                ChannelPins { button: p.P0_25.into(), led: p.P0_16.into() },
            ],
            holders: HolderResources {
                fixed_button: p.P1_01.into(),
                fixed_led: p.P1_03.into(),
                sampling_button: p.P1_02.into(),
                sampling_led: p.P1_04.into(),
                pot: p.P0_03.degrade_saadc(),
                saadc: p.SAADC,
            },
            heap_led: p.P1_06.into(),
            demo: DemoResources {
                chase: [p.P1_07.into(), p.P1_08.into(), p.P1_10.into()],
                level_led: p.P1_11.into(),
                buzzer: p.P1_12.into(),
                blinkers: [p.P1_13.into(), p.P1_14.into()],
            },
        }
    }
}

impl Default for DevKit {
    fn default() -> Self {
        let mut config = embassy_nrf::config::Config::default();
        config.gpiote_interrupt_priority = Priority::P2;
        config.time_interrupt_priority = Priority::P2;
        Self::new(config)
    }
}
