#![no_std]
#![no_main]

use arbiter::{HoldMode, Holder, DEFAULT_HOLD, DEFAULT_SAMPLE_PERIOD};

#[cfg(feature = "defmt")]
use defmt_rtt as _;
#[cfg(feature = "defmt")]
use panic_probe as _;
#[cfg(not(feature = "defmt"))]
use panic_reset as _;

use arbiter_app::prelude::*;

// Application main entry point. The spawner can be used to start async tasks.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("arbiter-app {}", FW_VERSION);
    let board = DevKit::default();

    // Initialize the allocator BEFORE you use it
    init_heap();

    // A bad configuration stops here, before any task exists.
    let arbiter = match init_arbiter(app_config()) {
        Ok(arbiter) => arbiter,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            loop {
                cortex_m::asm::wfe();
            }
        }
    };

    let (sender, receiver) = init_event_channel();
    let high_prio_spawner = init_executors();

    spawner.must_spawn(status_task(receiver));

    // Arbitrated channels: consumers and relays in thread mode, edges on the
    // interrupt executor.
    for (i, pins) in board.channels.into_iter().enumerate() {
        let id = ChannelId(i as u8);
        let input = arbiter.config().channels[i].input;
        let link = unwrap!(arbiter.link(id));
        let channel = unwrap!(arbiter.channel(
            id,
            Led::new(pins.led),
            EventReporter(sender),
        ));

        spawner.must_spawn(channel_task(channel));
        spawner.must_spawn(relay_task(link));
        high_prio_spawner.must_spawn(edge_task(arbiter, pins.button, input));
    }

    // Record holders.
    let holders = board.holders;
    let pot = init_source(
        Potentiometer::new(holders.saadc, holders.pot).await,
    );
    let fixed = unwrap!(Holder::new(
        ChannelId(0),
        LineId(DevKit::HOLDER_LEDS[0]),
        &GATE,
        Led::new(holders.fixed_led),
        HoldMode::Fixed(DEFAULT_HOLD),
    ));
    let sampling = unwrap!(Holder::new(
        ChannelId(1),
        LineId(DevKit::HOLDER_LEDS[1]),
        &GATE,
        Led::new(holders.sampling_led),
        HoldMode::Sampling {
            source: pot,
            duration: DEFAULT_HOLD,
            period: DEFAULT_SAMPLE_PERIOD,
        },
    ));
    spawner.must_spawn(fixed_holder_task(fixed));
    spawner.must_spawn(sampling_holder_task(sampling));
    high_prio_spawner.must_spawn(hold_edge_task(
        holders.fixed_button,
        LineId(DevKit::HOLDER_BUTTONS[0]),
        sender,
    ));
    high_prio_spawner.must_spawn(hold_edge_task(
        holders.sampling_button,
        LineId(DevKit::HOLDER_BUTTONS[1]),
        sender,
    ));

    spawner.must_spawn(heap_monitor_task(board.heap_led, sender));

    #[cfg(feature = "demo")]
    {
        let demo = board.demo;
        spawner.must_spawn(chase_task(demo.chase));
        spawner.must_spawn(heap_consumer_task());
        spawner.must_spawn(level_producer_task(pot));
        spawner.must_spawn(level_led_task(demo.level_led));
        spawner.must_spawn(buzzer_task(demo.buzzer));
        let [once, forever] = demo.blinkers;
        spawner.must_spawn(blink_three_times_task(once));
        spawner.must_spawn(blink_task(forever));
    }
    #[cfg(not(feature = "demo"))]
    let _ = (board.demo, pot);

    info!("All tasks started");
}
