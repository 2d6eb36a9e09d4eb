use arbiter::{GateOutcome, HeapPressure, HeapReport, Observation, StatusReporter};
use derive_more::From;

use crate::prelude::*;

/// Everything the status task logs.
#[derive(Debug, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Observation(Observation),
    Gate(GateOutcome),
    Heap(HeapReport),
}

/// Forwards channel observations onto the event queue without blocking.
#[derive(Clone, Copy)]
pub struct EventReporter(pub EventSender);

impl StatusReporter for EventReporter {
    fn report(&mut self, observation: Observation) {
        if self.0.try_send(observation.into()).is_err() {
            warn!("Event queue full, dropped {:?}", observation);
        }
    }
}

#[embassy_executor::task]
pub async fn status_task(receiver: EventReceiver) {
    loop {
        match receiver.receive().await {
            Event::Observation(Observation::Activated { channel, available }) => {
                info!(
                    "Channel {} ON, {} slot(s) left",
                    channel.0,
                    available
                );
            }
            Event::Observation(Observation::Denied { channel, available }) => {
                warn!(
                    "Channel {} denied, no slot available ({})",
                    channel.0,
                    available
                );
            }
            Event::Observation(Observation::Deactivated { channel, available }) => {
                info!(
                    "Channel {} OFF, {} slot(s) left",
                    channel.0,
                    available
                );
            }
            Event::Gate(GateOutcome::Busy(holder)) => {
                warn!("Holder {} refused, record in use", holder.0);
            }
            Event::Gate(outcome) => debug!("Gate: {:?}", outcome),
            Event::Heap(report) => match report.pressure {
                HeapPressure::Low => warn!(
                    "Heap low: {} bytes free ({} used)",
                    report.free,
                    report.used
                ),
                HeapPressure::Normal => info!(
                    "Heap back to normal: {} bytes free",
                    report.free
                ),
            },
        }
    }
}
