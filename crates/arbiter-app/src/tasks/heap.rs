use arbiter::{HeapMonitor, HeapPressure};
use embassy_nrf::gpio::AnyPin;
use embassy_nrf::Peri;

use crate::prelude::*;

/// Samples the tracked allocator once a second and lights `pin` while less
/// than half the heap is free.
#[embassy_executor::task]
pub async fn heap_monitor_task(pin: Peri<'static, AnyPin>, sender: EventSender) {
    let monitor = HeapMonitor::new(HEAP_SIZE);
    let mut led = Led::new(pin);
    let mut last = HeapPressure::Normal;
    let mut ticker = Ticker::every(Duration::from_secs(1));

    loop {
        let report = monitor.assess(ALLOCATOR.usage());
        debug!("Heap: {} bytes free of {}", report.free, monitor.total());
        led.set(report.pressure == HeapPressure::Low);

        if report.pressure != last {
            last = report.pressure;
            if sender.try_send(report.into()).is_err() {
                warn!("Event queue full, dropped heap report");
            }
        }
        ticker.next().await;
    }
}
