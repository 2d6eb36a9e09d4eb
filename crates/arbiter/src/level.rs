//! Level alarm over a bounded reading queue.
//!
//! A producer samples a source at a fixed rate and pushes readings into a
//! queue of depth [`LEVEL_QUEUE_DEPTH`], waiting while it is full. Consumers
//! take readings off the shared receiver and react when a reading is above
//! the threshold: one keeps an output lit, the other sounds a short tone.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Ticker, Timer};

use crate::channel::Actuator;
use crate::config::LineId;
use crate::holder::SampleSource;

pub const LEVEL_QUEUE_DEPTH: usize = 10;
pub const DEFAULT_LEVEL_PERIOD: Duration = Duration::from_millis(300);
/// Raw reading above which the alarm outputs react.
pub const DEFAULT_LEVEL_THRESHOLD: u16 = 2000;
/// 100 ms at 1 kHz.
pub const DEFAULT_BEEP: LevelResponse = LevelResponse::Beep {
    cycles: 100,
    half_period: Duration::from_micros(500),
};

pub type LevelQueue<M> = Channel<M, u16, LEVEL_QUEUE_DEPTH>;
pub type LevelSender<'a, M> = Sender<'a, M, u16, LEVEL_QUEUE_DEPTH>;
pub type LevelReceiver<'a, M> = Receiver<'a, M, u16, LEVEL_QUEUE_DEPTH>;

/// What a consumer does with its output for each reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelResponse {
    /// Output on while the last reading is above the threshold.
    Steady,
    /// Toggle the output `cycles` times per reading above the threshold.
    Beep { cycles: u16, half_period: Duration },
}

pub struct LevelProducer<'a, M: RawMutex, S> {
    source: S,
    sender: LevelSender<'a, M>,
    period: Duration,
}

impl<'a, M: RawMutex, S: SampleSource> LevelProducer<'a, M, S> {
    pub fn new(source: S, sender: LevelSender<'a, M>, period: Duration) -> Self {
        Self { source, sender, period }
    }

    /// Takes one reading and queues it. Waits while the queue is full.
    pub async fn produce_once(&mut self) -> u16 {
        let value = self.source.sample().await;
        self.sender.send(value).await;
        trace!("Level reading {}", value);
        value
    }

    pub async fn run(&mut self) -> ! {
        let mut ticker = Ticker::every(self.period);
        loop {
            self.produce_once().await;
            ticker.next().await;
        }
    }
}

pub struct LevelConsumer<'a, M: RawMutex, A> {
    output: LineId,
    receiver: LevelReceiver<'a, M>,
    threshold: u16,
    response: LevelResponse,
    actuator: A,
}

impl<'a, M: RawMutex, A: Actuator> LevelConsumer<'a, M, A> {
    pub fn new(
        output: LineId,
        receiver: LevelReceiver<'a, M>,
        threshold: u16,
        response: LevelResponse,
        mut actuator: A,
    ) -> Self {
        actuator.set_output(output, false);
        Self { output, receiver, threshold, response, actuator }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Handles the next queued reading. Returns whether it was above the
    /// threshold.
    pub async fn consume_once(&mut self) -> bool {
        let value = self.receiver.receive().await;
        let above = value > self.threshold;

        match self.response {
            LevelResponse::Steady => self.actuator.set_output(self.output, above),
            LevelResponse::Beep { cycles, half_period } => {
                if above {
                    let mut on = false;
                    for _ in 0..cycles {
                        on = !on;
                        self.actuator.set_output(self.output, on);
                        Timer::after(half_period).await;
                    }
                }
                self.actuator.set_output(self.output, false);
            }
        }
        if above {
            debug!("Level {} above {}", value, self.threshold);
        }
        above
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.consume_once().await;
        }
    }
}
