#![no_std]
//! Interrupt-driven arbitration of a scarce resource between channels.
//!
//! Raw button edges are debounced in interrupt context and handed to a
//! per-channel consumer through a coalescing notifier and a one-slot command
//! queue. Consumers compete for tokens from a shared counting pool; holding a
//! token is what allows a channel's output to be on. A separate lock-guarded
//! record provides bounded-wait exclusive access for the sampling holders,
//! and a level alarm turns periodic readings into output reactions.
//!
//! Everything shared is passed by reference at construction time and is
//! generic over the `embassy-sync` raw mutex, so the same code runs under a
//! critical-section mutex on target and a no-op mutex in single-context tests.

pub(crate) mod fmt;

mod arbiter;
mod channel;
mod config;
mod debounce;
mod error;
mod heap;
mod holder;
mod level;
mod link;
mod notify;
mod pool;
mod record;

pub use arbiter::Arbiter;
pub use channel::{
    Actuator, Channel, ChannelState, Observation, StatusReporter,
};
pub use config::*;
pub use debounce::{Debouncer, Trigger};
pub use error::{ArbiterError, ConfigError};
pub use heap::{HeapMonitor, HeapPressure, HeapReport};
pub use holder::{
    GateOutcome, HoldGate, HoldMode, Holder, SampleSource, SharedSource,
};
pub use level::*;
pub use link::{ChannelLink, Command};
pub use notify::TriggerNotifier;
pub use pool::{Permit, ResourcePool};
pub use record::{ExclusiveRecord, RecordGuard, SensorSample};
