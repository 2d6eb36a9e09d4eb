use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embassy_time::Timer;

use crate::config::{ChannelId, LineId, ReleasePolicy};
use crate::link::{ChannelLink, Command};
use crate::pool::{Permit, ResourcePool};

/// Drives a physical output. Assumed synchronous and infallible.
pub trait Actuator {
    fn set_output(&mut self, line: LineId, on: bool);
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn set_output(&mut self, line: LineId, on: bool) {
        (**self).set_output(line, on)
    }
}

/// A state change worth displaying. Never read back by the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Observation {
    Activated { channel: ChannelId, available: usize },
    /// The pool was exhausted; the request was dropped.
    Denied { channel: ChannelId, available: usize },
    Deactivated { channel: ChannelId, available: usize },
}

impl Observation {
    pub fn channel(&self) -> ChannelId {
        match *self {
            Observation::Activated { channel, .. }
            | Observation::Denied { channel, .. }
            | Observation::Deactivated { channel, .. } => channel,
        }
    }

    pub fn available(&self) -> usize {
        match *self {
            Observation::Activated { available, .. }
            | Observation::Denied { available, .. }
            | Observation::Deactivated { available, .. } => available,
        }
    }
}

pub trait StatusReporter {
    fn report(&mut self, observation: Observation);
}

/// Discards observations.
impl StatusReporter for () {
    fn report(&mut self, _observation: Observation) {}
}

impl<R: StatusReporter + ?Sized> StatusReporter for &mut R {
    fn report(&mut self, observation: Observation) {
        (**self).report(observation)
    }
}

/// Forwards observations to a status task. Drops them if its queue is full.
impl<M: RawMutex, const N: usize> StatusReporter
    for Sender<'_, M, Observation, N>
{
    fn report(&mut self, observation: Observation) {
        if self.try_send(observation).is_err() {
            trace!("Status queue full, observation dropped");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    Idle,
    Triggered,
    Acquiring,
    Active,
    Releasing,
}

/// Consumer side of one channel.
///
/// Turns each queued command into an acquisition attempt on the shared pool
/// and drives the channel's output accordingly. Holding a permit is what
/// makes the channel active, so the number of active channels is always the
/// pool's capacity minus its available count.
pub struct Channel<'a, M: RawMutex, A: Actuator, R: StatusReporter> {
    id: ChannelId,
    output: LineId,
    policy: ReleasePolicy,
    link: &'a ChannelLink<M>,
    pool: &'a ResourcePool,
    actuator: A,
    reporter: R,
    state: ChannelState,
    permit: Option<Permit<'a>>,
}

impl<'a, M: RawMutex, A: Actuator, R: StatusReporter> Channel<'a, M, A, R> {
    pub(crate) fn new(
        id: ChannelId,
        output: LineId,
        policy: ReleasePolicy,
        link: &'a ChannelLink<M>,
        pool: &'a ResourcePool,
        mut actuator: A,
        reporter: R,
    ) -> Self {
        actuator.set_output(output, false);
        Self {
            id,
            output,
            policy,
            link,
            pool,
            actuator,
            reporter,
            state: ChannelState::Idle,
            permit: None,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.permit.is_some()
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
        }
    }

    /// Wait for the next command and handle it to completion.
    pub async fn step(&mut self) {
        let Command::Trigger(_) = self.link.next_command().await;

        if self.permit.is_some() {
            // Only reachable under `Toggle`: auto-release never returns
            // from `step` while holding a permit.
            self.deactivate();
            return;
        }

        self.transition(ChannelState::Triggered);
        match self.policy {
            ReleasePolicy::Toggle => {
                self.try_activate();
            }
            ReleasePolicy::AutoRelease(hold) => {
                if self.try_activate() {
                    Timer::after(hold).await;
                    self.deactivate();
                    let stale = self.link.discard_pending();
                    if stale > 0 {
                        debug!(
                            "Channel {} discarded {} trigger(s) while active",
                            self.id.0,
                            stale
                        );
                    }
                }
            }
        }
    }

    fn try_activate(&mut self) -> bool {
        self.transition(ChannelState::Acquiring);
        match self.pool.try_acquire() {
            Ok(permit) => {
                self.permit = Some(permit);
                self.actuator.set_output(self.output, true);
                self.transition(ChannelState::Active);
                self.reporter.report(Observation::Activated {
                    channel: self.id,
                    available: self.pool.available(),
                });
                true
            }
            Err(_) => {
                self.transition(ChannelState::Idle);
                self.reporter.report(Observation::Denied {
                    channel: self.id,
                    available: self.pool.available(),
                });
                false
            }
        }
    }

    fn deactivate(&mut self) {
        let Some(permit) = self.permit.take() else {
            return;
        };
        self.transition(ChannelState::Releasing);
        self.actuator.set_output(self.output, false);
        self.pool.release(permit);
        self.transition(ChannelState::Idle);
        self.reporter.report(Observation::Deactivated {
            channel: self.id,
            available: self.pool.available(),
        });
    }

    fn transition(&mut self, to: ChannelState) {
        trace!("Channel {}: {:?} -> {:?}", self.id.0, self.state, to);
        self.state = to;
    }
}
