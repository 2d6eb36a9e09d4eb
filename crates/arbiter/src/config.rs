use embassy_time::Duration;

use crate::error::ConfigError;

/// Number of button/LED channels on the reference board.
pub const DEFAULT_CHANNELS: usize = 4;
/// How many channels may be active at once.
pub const DEFAULT_POOL_CAPACITY: usize = 3;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);
/// Hold time for auto-releasing channels and the exclusive holders.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(5000);
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(100);
/// Depth of each channel's command queue.
pub const COMMAND_QUEUE_DEPTH: usize = 1;

/// Identifier of a physical input or output line (a GPIO number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub u8);

/// Stable index of a channel, assigned at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub u8);

impl ChannelId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What releases an active channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReleasePolicy {
    /// The next trigger on the same channel releases it.
    Toggle,
    /// The channel releases itself once the duration has elapsed.
    AutoRelease(Duration),
}

/// Input/output pair served by one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub input: LineId,
    pub output: LineId,
}

impl ChannelConfig {
    pub const fn new(input: u8, output: u8) -> Self {
        Self { input: LineId(input), output: LineId(output) }
    }
}

/// Startup configuration for an [`Arbiter`](crate::Arbiter).
///
/// Fixed for the lifetime of the system; validated once before any task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArbiterConfig<const N: usize> {
    pub channels: [ChannelConfig; N],
    pub pool_capacity: usize,
    pub debounce: Duration,
    pub policy: ReleasePolicy,
}

impl<const N: usize> ArbiterConfig<N> {
    pub const fn new(channels: [ChannelConfig; N]) -> Self {
        Self {
            channels,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            debounce: DEFAULT_DEBOUNCE,
            policy: ReleasePolicy::Toggle,
        }
    }

    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    pub const fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    pub const fn with_policy(mut self, policy: ReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Input lines in channel order.
    pub fn input_lines(&self) -> [LineId; N] {
        self.channels.map(|c| c.input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if N == 0 {
            return Err(ConfigError::NoChannels);
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.pool_capacity > N {
            return Err(ConfigError::CapacityExceedsChannels {
                capacity: self.pool_capacity,
                channels: N,
            });
        }
        for (i, a) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|b| b.input == a.input) {
                return Err(ConfigError::DuplicateInputLine(a.input));
            }
        }
        Ok(())
    }
}
