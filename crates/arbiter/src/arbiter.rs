use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Instant;

use crate::channel::{Actuator, Channel, StatusReporter};
use crate::config::{ArbiterConfig, ChannelId, LineId};
use crate::debounce::Debouncer;
use crate::error::{ArbiterError, ConfigError};
use crate::link::ChannelLink;
use crate::pool::ResourcePool;

/// The shared half of the subsystem: pool, debouncer and per-channel links.
///
/// Built once at startup from a validated configuration and then shared by
/// reference between the edge handlers (interrupt context) and the channel
/// consumers.
pub struct Arbiter<M: RawMutex, const N: usize> {
    config: ArbiterConfig<N>,
    pool: ResourcePool,
    debouncer: Debouncer<N>,
    links: [ChannelLink<M>; N],
}

impl<M: RawMutex, const N: usize> Arbiter<M, N> {
    pub fn new(config: ArbiterConfig<N>) -> Result<Self, ArbiterError> {
        config.validate()?;
        info!(
            "Arbiter: {} channels, {} slots, {} ms debounce",
            N,
            config.pool_capacity,
            config.debounce.as_millis()
        );
        Ok(Self {
            pool: ResourcePool::new(config.pool_capacity),
            debouncer: Debouncer::new(config.input_lines(), config.debounce),
            links: [const { ChannelLink::new() }; N],
            config,
        })
    }

    /// Entry point for a raw edge. Never blocks.
    ///
    /// Returns the channel that was notified, or `None` if the edge was
    /// debounced or came from an unknown line.
    pub fn on_edge(&self, line: LineId, now: Instant) -> Option<ChannelId> {
        let trigger = self.debouncer.on_raw_edge(line, now)?;
        self.links[trigger.channel.index()].notify(trigger);
        Some(trigger.channel)
    }

    /// Build the consumer for channel `id`. Each channel can be claimed once.
    pub fn channel<A: Actuator, R: StatusReporter>(
        &self,
        id: ChannelId,
        actuator: A,
        reporter: R,
    ) -> Result<Channel<'_, M, A, R>, ArbiterError> {
        let link = self.link(id).ok_or(ConfigError::UnknownChannel(id))?;
        if !link.claim() {
            return Err(ConfigError::ChannelClaimed(id).into());
        }
        Ok(Channel::new(
            id,
            self.config.channels[id.index()].output,
            self.config.policy,
            link,
            &self.pool,
            actuator,
            reporter,
        ))
    }

    pub fn link(&self, id: ChannelId) -> Option<&ChannelLink<M>> {
        self.links.get(id.index())
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn debouncer(&self) -> &Debouncer<N> {
        &self.debouncer
    }

    pub fn config(&self) -> &ArbiterConfig<N> {
        &self.config
    }
}
