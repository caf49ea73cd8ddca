use super::ParameterChannel;
use crate::error::{KernelError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Latest value per channel, taken at a tick boundary
///
/// Channels left as `None` keep whatever value the kernel already holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub source_flow_speed: Option<f32>,
    pub source_temp: Option<f32>,
    pub tub_temp: Option<f32>,
    pub body_temp: Option<f32>,
    pub water_density: Option<f32>,
}

impl ParameterSnapshot {
    /// Get the value carried for `channel`, if any
    #[must_use]
    pub fn get(&self, channel: ParameterChannel) -> Option<f32> {
        match channel {
            ParameterChannel::SourceFlowSpeed => self.source_flow_speed,
            ParameterChannel::SourceTemp => self.source_temp,
            ParameterChannel::TubTemp => self.tub_temp,
            ParameterChannel::BodyTemp => self.body_temp,
            ParameterChannel::WaterDensity => self.water_density,
        }
    }

    /// Set the value carried for `channel`
    pub fn set(&mut self, channel: ParameterChannel, value: f32) {
        let slot = match channel {
            ParameterChannel::SourceFlowSpeed => &mut self.source_flow_speed,
            ParameterChannel::SourceTemp => &mut self.source_temp,
            ParameterChannel::TubTemp => &mut self.tub_temp,
            ParameterChannel::BodyTemp => &mut self.body_temp,
            ParameterChannel::WaterDensity => &mut self.water_density,
        };
        *slot = Some(value);
    }

    /// Builder-style variant of [`ParameterSnapshot::set`]
    pub fn with(mut self, channel: ParameterChannel, value: f32) -> Self {
        self.set(channel, value);
        self
    }

    /// Channels carrying a value, in broadcast order
    pub fn entries(&self) -> impl Iterator<Item = (ParameterChannel, f32)> + '_ {
        ParameterChannel::ALL
            .into_iter()
            .filter_map(|channel| self.get(channel).map(|value| (channel, value)))
    }

    /// Whether no channel carries a value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// Single-slot mailbox per channel; a later post overwrites an earlier one
#[derive(Debug, Default)]
pub struct ParameterMailbox {
    slots: FxHashMap<ParameterChannel, f32>,
}

impl ParameterMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post the latest value for a channel.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidParameter`] when the channel does not accept
    /// the value (non-finite, or a non-positive density). The slot keeps its
    /// previous content in that case.
    pub fn post(&mut self, channel: ParameterChannel, value: f32) -> Result<()> {
        if !channel.accepts(value) {
            warn!("Rejected {} = {} from the parameter feed", channel, value);
            return Err(KernelError::InvalidParameter { channel, value });
        }
        self.slots.insert(channel, value);
        Ok(())
    }

    /// Whether any channel is waiting to be applied
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Drain every slot into a snapshot
    pub fn take(&mut self) -> ParameterSnapshot {
        let mut snapshot = ParameterSnapshot::default();
        for (channel, value) in self.slots.drain() {
            snapshot.set(channel, value);
        }
        snapshot
    }
}

/// Values currently applied inside the kernel
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    values: FxHashMap<ParameterChannel, f32>,
}

impl ChannelRegistry {
    /// Merge a snapshot, latest value wins.
    ///
    /// Returns the channels whose value actually changed.
    pub fn merge(&mut self, snapshot: &ParameterSnapshot) -> Vec<(ParameterChannel, f32)> {
        let mut changed = Vec::new();
        for (channel, value) in snapshot.entries() {
            if self.values.insert(channel, value) != Some(value) {
                changed.push((channel, value));
            }
        }
        changed
    }

    /// Currently applied value for `channel`
    #[must_use]
    pub fn get(&self, channel: ParameterChannel) -> Option<f32> {
        self.values.get(&channel).copied()
    }
}
