//! Tasks behind the arbitrated channels.
//!
//! Per channel there are three tasks: an edge task on the high-priority
//! executor that debounces and notifies, a relay that moves wake-ups onto the
//! command queue, and the consumer that owns the LED and the pool permit.

use arbiter::{Channel, ChannelLink};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_nrf::Peri;

use crate::prelude::*;

pub type AppChannel = Channel<'static, AppMutex, Led, EventReporter>;

#[embassy_executor::task(pool_size = 4)]
pub async fn edge_task(
    arbiter: &'static AppArbiter,
    pin: Peri<'static, AnyPin>,
    line: LineId,
) {
    let mut button = Input::new(pin, Pull::Up);
    loop {
        button.wait_for_falling_edge().await;
        match arbiter.on_edge(line, Instant::now()) {
            Some(channel) => trace!("Line {} woke channel {}", line.0, channel.0),
            None => trace!("Line {} bounce ignored", line.0),
        }
    }
}

#[embassy_executor::task(pool_size = 4)]
pub async fn relay_task(link: &'static ChannelLink<AppMutex>) {
    link.run_forwarder().await
}

#[embassy_executor::task(pool_size = 4)]
pub async fn channel_task(mut channel: AppChannel) {
    info!("Channel {} ready ({:?})", channel.id().0, channel.policy());
    channel.run().await
}
