use core::convert::Infallible;

use arbiter::{GateOutcome, Holder, SampleSource};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_nrf::peripherals::SAADC;
use embassy_nrf::saadc::{self, AnyInput, ChannelConfig, Config, Saadc};
use embassy_nrf::{bind_interrupts, interrupt, Peri};

use crate::prelude::*;

pub type FixedHolder = Holder<'static, AppMutex, Led, Infallible, HOLDERS>;
pub type SamplingHolder =
    Holder<'static, AppMutex, Led, &'static AppSource, HOLDERS>;

bind_interrupts!(struct PotIrqs {SAADC => saadc::InterruptHandler;});

/// Single-ended SAADC reading of the potentiometer wiper.
pub struct Potentiometer {
    saadc: Saadc<'static, 1>,
}

impl Potentiometer {
    pub async fn new(adc: Peri<'static, SAADC>, wiper: AnyInput<'static>) -> Self {
        use embassy_nrf::interrupt::InterruptExt;

        let config = Config::default();
        let channel_cfg = ChannelConfig::single_ended(wiper);
        interrupt::SAADC.set_priority(interrupt::Priority::P3);
        let saadc = Saadc::new(adc, PotIrqs, config, [channel_cfg]);
        // Wait for ADC calibration.
        saadc.calibrate().await;
        Self { saadc }
    }
}

impl SampleSource for Potentiometer {
    async fn sample(&mut self) -> u16 {
        let mut buf = [0i16; 1];
        self.saadc.sample(&mut buf).await;
        // Single-ended readings dip slightly below zero near ground.
        buf[0].max(0) as u16
    }
}

/// Button edges for the holders. Busy presses are reported, not queued.
#[embassy_executor::task(pool_size = 2)]
pub async fn hold_edge_task(
    pin: Peri<'static, AnyPin>,
    line: LineId,
    sender: EventSender,
) {
    let mut button = Input::new(pin, Pull::Up);
    loop {
        button.wait_for_falling_edge().await;
        let outcome = GATE.on_edge(line, Instant::now());
        if outcome != GateOutcome::Ignored
            && sender.try_send(outcome.into()).is_err()
        {
            warn!("Event queue full, dropped gate outcome");
        }
    }
}

#[embassy_executor::task]
pub async fn fixed_holder_task(mut holder: FixedHolder) {
    holder.run().await
}

#[embassy_executor::task]
pub async fn sampling_holder_task(mut holder: SamplingHolder) {
    holder.run().await
}
