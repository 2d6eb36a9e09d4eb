use alloc::vec::Vec;

use arbiter::{
    LevelConsumer, LevelProducer, LevelQueue, LevelResponse, DEFAULT_BEEP,
    DEFAULT_LEVEL_PERIOD, DEFAULT_LEVEL_THRESHOLD,
};
use embassy_nrf::gpio::AnyPin;
use embassy_nrf::Peri;
use embassy_sync::channel::Channel;

use crate::prelude::*;

const CHASE_PERIOD: Duration = Duration::from_millis(250);
const BLINK_PERIOD: Duration = Duration::from_millis(250);
const BLOCK_SIZE: usize = 128;
const CONSUME_PERIOD: Duration = Duration::from_millis(50);

/// Lights the LEDs one after another at a fixed rate.
#[embassy_executor::task]
pub async fn chase_task(pins: [Peri<'static, AnyPin>; 3]) {
    let mut leds = pins.map(Led::new);
    let mut ticker = Ticker::every(CHASE_PERIOD);

    for lit in (0..leds.len()).cycle() {
        for (i, led) in leds.iter_mut().enumerate() {
            led.set(i == lit);
        }
        ticker.next().await;
    }
}

/// Leaks one block every 50 ms until the allocator refuses.
#[embassy_executor::task]
pub async fn heap_consumer_task() {
    let mut blocks: Vec<Vec<u8>> = Vec::new();
    let mut exhausted = false;
    let mut ticker = Ticker::every(CONSUME_PERIOD);

    loop {
        ticker.next().await;
        if exhausted {
            continue;
        }

        let mut block = Vec::new();
        if blocks.try_reserve(1).is_err()
            || block.try_reserve_exact(BLOCK_SIZE).is_err()
        {
            warn!("Heap consumer stopped after {} blocks", blocks.len());
            exhausted = true;
            continue;
        }
        block.resize(BLOCK_SIZE, 0u8);
        blocks.push(block);
    }
}

/// Toggles `led` `count` times, `period` apart.
async fn blink_times(led: &mut Led, count: usize, period: Duration) {
    for _ in 0..count {
        led.toggle();
        Timer::after(period).await;
    }
}

/// Blinks three times, then the task ends.
#[embassy_executor::task]
pub async fn blink_three_times_task(pin: Peri<'static, AnyPin>) {
    let mut led = Led::new(pin);
    blink_times(&mut led, 3, BLINK_PERIOD).await;
    info!("Blinker done");
}

#[embassy_executor::task]
pub async fn blink_task(pin: Peri<'static, AnyPin>) {
    let mut led = Led::new(pin);
    loop {
        blink_times(&mut led, 1, BLINK_PERIOD).await;
    }
}

static LEVEL_QUEUE: LevelQueue<AppMutex> = Channel::new();

#[embassy_executor::task]
pub async fn level_producer_task(source: &'static AppSource) {
    let mut producer =
        LevelProducer::new(source, LEVEL_QUEUE.sender(), DEFAULT_LEVEL_PERIOD);
    producer.run().await
}

/// Lights the LED while readings are above the threshold.
#[embassy_executor::task]
pub async fn level_led_task(pin: Peri<'static, AnyPin>) {
    let mut consumer = LevelConsumer::new(
        LineId(DevKit::LEVEL_LED),
        LEVEL_QUEUE.receiver(),
        DEFAULT_LEVEL_THRESHOLD,
        LevelResponse::Steady,
        Led::new(pin),
    );
    consumer.run().await
}

#[embassy_executor::task]
pub async fn buzzer_task(pin: Peri<'static, AnyPin>) {
    let mut consumer = LevelConsumer::new(
        LineId(DevKit::BUZZER),
        LEVEL_QUEUE.receiver(),
        DEFAULT_LEVEL_THRESHOLD,
        DEFAULT_BEEP,
        Buzzer::new(pin),
    );
    consumer.run().await
}
