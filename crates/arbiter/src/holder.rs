//! Button-gated holders of the exclusive record.
//!
//! Two holders share one [`ExclusiveRecord`]. A "fixed" holder keeps its
//! output on for a set time while holding the lock; a "sampling" holder keeps
//! the lock for a polling loop, overwriting the record with fresh readings.
//! Each holder sleeps on its own wake handle in the [`HoldGate`], which
//! button edges reach after debouncing. While the record is held, presses are
//! refused rather than queued.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker, Timer};

use crate::channel::Actuator;
use crate::config::{ChannelId, LineId};
use crate::debounce::Debouncer;
use crate::error::{ArbiterError, ConfigError};
use crate::notify::TriggerNotifier;
use crate::record::{ExclusiveRecord, SensorSample};

/// Something that produces a raw sample on demand (an ADC channel).
#[allow(async_fn_in_trait)]
pub trait SampleSource {
    async fn sample(&mut self) -> u16;
}

/// Source for holders that never sample.
impl SampleSource for Infallible {
    async fn sample(&mut self) -> u16 {
        match *self {}
    }
}

/// A sample source shared by several readers, one reading at a time.
pub struct SharedSource<M: RawMutex, S> {
    inner: Mutex<M, S>,
}

impl<M: RawMutex, S: SampleSource> SharedSource<M, S> {
    pub const fn new(source: S) -> Self {
        Self { inner: Mutex::new(source) }
    }
}

impl<M: RawMutex, S: SampleSource> SampleSource for &SharedSource<M, S> {
    async fn sample(&mut self) -> u16 {
        self.inner.lock().await.sample().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateOutcome {
    /// The edge fell inside the debounce window or on an unknown line.
    Ignored,
    /// The record is held; the holder was not woken.
    Busy(ChannelId),
    Resumed(ChannelId),
}

pub struct HoldGate<'a, M: RawMutex, const N: usize> {
    debouncer: Debouncer<N>,
    record: &'a ExclusiveRecord<M, SensorSample>,
    wakes: [TriggerNotifier<M>; N],
}

impl<'a, M: RawMutex, const N: usize> HoldGate<'a, M, N> {
    pub const fn new(
        lines: [LineId; N],
        window: Duration,
        record: &'a ExclusiveRecord<M, SensorSample>,
    ) -> Self {
        Self {
            debouncer: Debouncer::new(lines, window),
            record,
            wakes: [const { TriggerNotifier::new() }; N],
        }
    }

    pub fn record(&self) -> &'a ExclusiveRecord<M, SensorSample> {
        self.record
    }

    /// Handle a raw button edge. Safe to call from interrupt context.
    pub fn on_edge(&self, line: LineId, now: Instant) -> GateOutcome {
        let Some(trigger) = self.debouncer.on_raw_edge(line, now) else {
            return GateOutcome::Ignored;
        };
        if self.record.is_held() {
            info!(
                "Attempt to start holder {} failed - record is in use",
                trigger.channel.0
            );
            return GateOutcome::Busy(trigger.channel);
        }
        info!(
            "Button {} pressed - resuming holder {}",
            line.0,
            trigger.channel.0
        );
        self.wakes[trigger.channel.index()].notify(trigger);
        GateOutcome::Resumed(trigger.channel)
    }

    pub fn wake_handle(&self, id: ChannelId) -> Option<&TriggerNotifier<M>> {
        self.wakes.get(id.index())
    }
}

pub enum HoldMode<S> {
    /// Output on for the duration, nothing else.
    Fixed(Duration),
    /// Output on while polling `source` every `period` until `duration`.
    Sampling { source: S, duration: Duration, period: Duration },
}

pub struct Holder<'a, M: RawMutex, A: Actuator, S: SampleSource, const N: usize>
{
    id: ChannelId,
    output: LineId,
    gate: &'a HoldGate<'a, M, N>,
    actuator: A,
    mode: HoldMode<S>,
}

impl<'a, M, A, S, const N: usize> Holder<'a, M, A, S, N>
where
    M: RawMutex,
    A: Actuator,
    S: SampleSource,
{
    /// `id` selects this holder's wake handle in `gate`.
    pub fn new(
        id: ChannelId,
        output: LineId,
        gate: &'a HoldGate<'a, M, N>,
        mut actuator: A,
        mode: HoldMode<S>,
    ) -> Result<Self, ArbiterError> {
        if gate.wake_handle(id).is_none() {
            return Err(ConfigError::UnknownChannel(id).into());
        }
        actuator.set_output(output, false);
        Ok(Self { id, output, gate, actuator, mode })
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.gate.wakes[self.id.index()].wait_for_trigger().await;
            self.hold_once().await;
        }
    }

    /// Take the record lock (waiting as long as needed) and perform one hold.
    pub async fn hold_once(&mut self) {
        let mut record = self.gate.record.lock().await;
        info!("Holder {} ON - record acquired", self.id.0);
        self.actuator.set_output(self.output, true);

        match &mut self.mode {
            HoldMode::Fixed(duration) => {
                Timer::after(*duration).await;
            }
            HoldMode::Sampling { source, duration, period } => {
                let start = Instant::now();
                let mut ticker = Ticker::every(*period);
                while start.elapsed() < *duration {
                    let value = source.sample().await;
                    *record = SensorSample { value, timestamp: Instant::now() };
                    debug!(
                        "Sample {} at {} ms",
                        value,
                        record.timestamp.as_millis()
                    );
                    ticker.next().await;
                }
            }
        }

        self.actuator.set_output(self.output, false);
        drop(record);
        info!("Holder {} OFF - record released", self.id.0);
    }
}
