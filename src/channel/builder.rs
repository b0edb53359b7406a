use super::{Channel, DEFAULT_MAX_SEND_DEPTH};
use crate::tracer::Tracer;
use std::sync::Arc;

/// Configuration for a new [Channel]
#[derive(Debug)]
#[must_use]
pub struct ChannelBuilder {
    pub(super) label: Option<String>,
    pub(super) tracer: Option<Arc<Tracer>>,
    pub(super) max_send_depth: usize,
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self {
            label: None,
            tracer: None,
            max_send_depth: DEFAULT_MAX_SEND_DEPTH,
        }
    }
}

impl ChannelBuilder {
    /// Name shown in traces and snapshots
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Tracer recording every send
    pub fn tracer(mut self, tracer: Arc<Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// How many times a send may re-enter this channel on one thread, at least 1
    ///
    /// Bounds the recursion of relay cycles
    pub fn max_send_depth(mut self, depth: usize) -> Self {
        self.max_send_depth = depth.max(1);
        self
    }

    /// Creates the channel
    pub fn build(self) -> Channel {
        Channel::from_builder(self)
    }
}
