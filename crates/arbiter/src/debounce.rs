//! Edge filtering for interrupt context.

use embassy_time::{Duration, Instant};
use portable_atomic::{AtomicBool, AtomicU64, Ordering};

use crate::config::{ChannelId, LineId};

/// A logical trigger promoted from a raw edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Trigger {
    pub line: LineId,
    pub channel: ChannelId,
}

struct LineState {
    /// Tick count of the last accepted edge.
    last_accepted: AtomicU64,
    accepted_once: AtomicBool,
}

impl LineState {
    const fn new() -> Self {
        Self {
            last_accepted: AtomicU64::new(0),
            accepted_once: AtomicBool::new(false),
        }
    }
}

/// Per-line debouncer.
///
/// Each line owns its state and is only ever written from the interrupt
/// context of that line, so concurrent edges on different lines need no
/// coordination. Only atomics are touched: `on_raw_edge` never blocks and
/// never allocates.
///
/// Timestamps are full 64-bit `Instant` tick counts, so the window is exact
/// at any tick rate and does not depend on uptime.
pub struct Debouncer<const N: usize> {
    lines: [LineId; N],
    window: Duration,
    state: [LineState; N],
}

impl<const N: usize> Debouncer<N> {
    pub const fn new(lines: [LineId; N], window: Duration) -> Self {
        Self {
            lines,
            window,
            state: [const { LineState::new() }; N],
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Index of `line` in this debouncer, if it is one of ours.
    pub fn channel_of(&self, line: LineId) -> Option<ChannelId> {
        self.lines
            .iter()
            .position(|l| *l == line)
            .map(|i| ChannelId(i as u8))
    }

    /// Promote a raw edge to a trigger unless it falls within the window of
    /// the last accepted edge on the same line.
    pub fn on_raw_edge(&self, line: LineId, now: Instant) -> Option<Trigger> {
        let channel = self.channel_of(line)?;
        let state = &self.state[channel.index()];

        if state.accepted_once.load(Ordering::Acquire) {
            let last =
                Instant::from_ticks(state.last_accepted.load(Ordering::Relaxed));
            // An edge stamped before the last accepted one counts as bounce.
            let elapsed = now.checked_duration_since(last).unwrap_or_default();
            if elapsed <= self.window {
                trace!("Edge on line {} debounced", line.0);
                return None;
            }
        }

        state.last_accepted.store(now.as_ticks(), Ordering::Relaxed);
        state.accepted_once.store(true, Ordering::Release);
        Some(Trigger { line, channel })
    }
}
