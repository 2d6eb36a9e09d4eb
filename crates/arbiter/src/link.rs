use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use portable_atomic::{AtomicBool, Ordering};

use crate::config::COMMAND_QUEUE_DEPTH;
use crate::debounce::Trigger;
use crate::notify::TriggerNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Trigger(Trigger),
}

/// Per-channel plumbing between interrupt context and the channel consumer.
///
/// The notifier is written from interrupt context; [`forward`](Self::forward)
/// moves each wake-up into a one-slot command queue read by the consumer. A
/// wake-up that finds the queue still occupied is coalesced into the command
/// already waiting.
pub struct ChannelLink<M: RawMutex> {
    notifier: TriggerNotifier<M>,
    commands: Channel<M, Command, COMMAND_QUEUE_DEPTH>,
    claimed: AtomicBool,
}

impl<M: RawMutex> ChannelLink<M> {
    pub const fn new() -> Self {
        Self {
            notifier: TriggerNotifier::new(),
            commands: Channel::new(),
            claimed: AtomicBool::new(false),
        }
    }

    pub fn notifier(&self) -> &TriggerNotifier<M> {
        &self.notifier
    }

    #[inline]
    pub fn notify(&self, trigger: Trigger) {
        self.notifier.notify(trigger);
    }

    /// Wait for one wake-up and queue it for the consumer.
    ///
    /// Returns `false` if the command was coalesced.
    pub async fn forward(&self) -> bool {
        let trigger = self.notifier.wait_for_trigger().await;
        match self.commands.try_send(Command::Trigger(trigger)) {
            Ok(()) => {
                debug!("Command queued for channel {}", trigger.channel.0);
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(
                    "Channel {} busy, trigger coalesced",
                    trigger.channel.0
                );
                false
            }
        }
    }

    /// Forward wake-ups forever.
    pub async fn run_forwarder(&self) -> ! {
        loop {
            self.forward().await;
        }
    }

    pub async fn next_command(&self) -> Command {
        self.commands.receive().await
    }

    /// Drop whatever is queued or pending for this channel.
    pub fn discard_pending(&self) -> usize {
        let mut dropped = 0;
        while self.commands.try_receive().is_ok() {
            dropped += 1;
        }
        if self.notifier.try_take().is_some() {
            dropped += 1;
        }
        dropped
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Claim the consumer side. Succeeds once per link.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }
}

impl<M: RawMutex> Default for ChannelLink<M> {
    fn default() -> Self {
        Self::new()
    }
}
