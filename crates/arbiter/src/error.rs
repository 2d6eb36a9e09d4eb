use crate::{ChannelId, LineId};

/// Errors surfaced by the arbitration primitives.
///
/// `ResourceExhausted` and `LockTimeout` are ordinary operating conditions
/// that callers recover from locally. `Config` is only produced at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterError {
    /// The resource pool has no tokens left.
    ResourceExhausted,
    /// The exclusive record could not be locked within the requested bound.
    LockTimeout,
    /// A shared primitive could not be set up.
    Config(ConfigError),
}

impl core::fmt::Display for ArbiterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ArbiterError::ResourceExhausted => {
                write!(f, "Resource pool exhausted")
            }
            ArbiterError::LockTimeout => {
                write!(f, "Exclusive record unavailable")
            }
            ArbiterError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl From<ConfigError> for ArbiterError {
    fn from(e: ConfigError) -> Self {
        ArbiterError::Config(e)
    }
}

/// Startup configuration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    NoChannels,
    ZeroCapacity,
    CapacityExceedsChannels { capacity: usize, channels: usize },
    DuplicateInputLine(LineId),
    ChannelClaimed(ChannelId),
    UnknownChannel(ChannelId),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoChannels => write!(f, "No channels configured"),
            ConfigError::ZeroCapacity => {
                write!(f, "Resource pool capacity must be non-zero")
            }
            ConfigError::CapacityExceedsChannels { capacity, channels } => {
                write!(
                    f,
                    "Pool capacity {} exceeds channel count {}",
                    capacity, channels
                )
            }
            ConfigError::DuplicateInputLine(line) => {
                write!(f, "Input line {} assigned twice", line.0)
            }
            ConfigError::ChannelClaimed(id) => {
                write!(f, "Channel {} already has a consumer", id.0)
            }
            ConfigError::UnknownChannel(id) => {
                write!(f, "Channel {} is not configured", id.0)
            }
        }
    }
}
