#![no_std]
extern crate alloc;

pub mod fmt;

pub mod board;
pub mod events;
pub mod led;
pub mod tasks;

use core::ptr::addr_of_mut;

use arbiter::{
    Arbiter, ArbiterConfig, ArbiterError, ChannelConfig, ExclusiveRecord,
    HoldGate, LineId, ReleasePolicy, SensorSample, SharedSource,
    DEFAULT_CHANNELS, DEFAULT_DEBOUNCE,
};
use embassy_executor::{InterruptExecutor, SendSpawner};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embedded_alloc::LlffHeap;
use static_cell::StaticCell;

use crate::board::DevKit;
use crate::tasks::Potentiometer;

pub const FW_VERSION: &str = env!("FW_VERSION");

pub const CHANNELS: usize = DEFAULT_CHANNELS;
pub const HOLDERS: usize = 2;
pub const HEAP_SIZE: usize = 32 * 1024;

// Heap helpers
#[global_allocator]
pub static ALLOCATOR: trallocator::Trallocator<LlffHeap> =
    trallocator::Trallocator::new(LlffHeap::empty());

pub fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] =
        [MaybeUninit::uninit(); HEAP_SIZE];
    unsafe {
        ALLOCATOR.borrow().init(addr_of_mut!(HEAP_MEM) as usize, HEAP_SIZE)
    }
}

pub type AppMutex = CriticalSectionRawMutex;
pub type AppArbiter = Arbiter<AppMutex, CHANNELS>;
pub type AppRecord = ExclusiveRecord<AppMutex, SensorSample>;
pub type AppGate = HoldGate<'static, AppMutex, HOLDERS>;
/// The potentiometer, shared by the sampling holder and the level alarm.
pub type AppSource = SharedSource<AppMutex, Potentiometer>;

/// Startup configuration. Checked by [`init_arbiter`] before anything runs.
pub const fn app_config() -> ArbiterConfig<CHANNELS> {
    let b = DevKit::CHANNEL_BUTTONS;
    let l = DevKit::CHANNEL_LEDS;
    let config = ArbiterConfig::new([
        ChannelConfig::new(b[0], l[0]),
        ChannelConfig::new(b[1], l[1]),
        ChannelConfig::new(b[2], l[2]),
        ChannelConfig::new(b[3], l[3]),
    ]);
    if cfg!(feature = "auto-release") {
        config.with_policy(ReleasePolicy::AutoRelease(arbiter::DEFAULT_HOLD))
    } else {
        config
    }
}

// Statics
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static ARBITER: StaticCell<AppArbiter> = StaticCell::new();
static SOURCE: StaticCell<AppSource> = StaticCell::new();

pub static RECORD: AppRecord = ExclusiveRecord::new(SensorSample::EMPTY);
pub static GATE: AppGate = HoldGate::new(
    [
        LineId(DevKit::HOLDER_BUTTONS[0]),
        LineId(DevKit::HOLDER_BUTTONS[1]),
    ],
    DEFAULT_DEBOUNCE,
    &RECORD,
);

pub fn init_arbiter(
    config: ArbiterConfig<CHANNELS>,
) -> Result<&'static AppArbiter, ArbiterError> {
    let arbiter = AppArbiter::new(config)?;
    Ok(ARBITER.init(arbiter))
}

pub fn init_source(pot: Potentiometer) -> &'static AppSource {
    SOURCE.init(SharedSource::new(pot))
}

const EVENT_CAPACITY: usize = 16;
pub type EventMutexType = CriticalSectionRawMutex;
pub type EventChannel = Channel<EventMutexType, events::Event, EVENT_CAPACITY>;
pub type EventSender =
    Sender<'static, EventMutexType, events::Event, EVENT_CAPACITY>;
pub type EventReceiver =
    Receiver<'static, EventMutexType, events::Event, EVENT_CAPACITY>;
static EVENT_CHANNEL: StaticCell<EventChannel> = StaticCell::new();
pub fn init_event_channel() -> (EventSender, EventReceiver) {
    let channel = EVENT_CHANNEL.init(Channel::new());
    (channel.sender(), channel.receiver())
}

// Interrupt executor standing in for edge interrupt context.
#[interrupt]
unsafe fn EGU1_SWI1() {
    EXECUTOR_HIGH.on_interrupt()
}

pub fn init_executors() -> SendSpawner {
    // High-priority executor: EGU1_SWI1, priority level 6
    interrupt::EGU1_SWI1.set_priority(Priority::P6);
    EXECUTOR_HIGH.start(interrupt::EGU1_SWI1)
}

pub mod prelude {
    pub use super::{
        app_config, board::*, debug, error, events::*, info, init_arbiter,
        init_event_channel, init_executors, init_heap, init_source, led::*,
        tasks::*, trace, unwrap, warn, AppArbiter, AppGate, AppMutex,
        AppRecord, AppSource,
        EventReceiver, EventSender, ALLOCATOR, CHANNELS, FW_VERSION, GATE,
        HEAP_SIZE, HOLDERS, RECORD,
    };
    pub use arbiter::{ChannelId, LineId};
    pub use embassy_executor::Spawner;
    pub use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    pub use embassy_time::{Duration, Instant, Ticker, Timer};
}
