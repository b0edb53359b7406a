//! # Channels

use crate::{
    common::OnceCell,
    receiver::{ErasedReceiver, Receiver, ReceiverKey},
    tracer::Tracer,
    Message,
};
use parking_lot::{Mutex, RwLock};
use std::{
    fmt,
    panic::Location,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
};
use tracing::{debug, error, trace};

mod builder;
mod depth;
mod registry;
mod snapshot;


pub use builder::*;
pub use registry::Entry;
pub use snapshot::*;

use depth::SendDepth;
use registry::Registry;

/// How many times one channel may be nested in its own
/// [send](Channel::send) calls on one thread
pub const DEFAULT_MAX_SEND_DEPTH: usize = 64;

/// Process-unique identity of a [Channel]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role of a channel in the relay graph
///
/// Diagnostic only, it does not change delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ChannelMode {
    /// No relay dispatches into this channel
    #[default]
    Dispatching,
    /// At least one [Relay](crate::relay::Relay) dispatches into this channel
    Relaying,
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelMode::Dispatching => "dispatching",
            ChannelMode::Relaying => "relaying",
        })
    }
}

/// An ordered registry of receivers and relays with synchronous delivery
///
/// Clones are handles to the same channel.
/// [send](Channel::send) invokes every registered entry in registration order
/// on the caller's thread; entries of other message types ignore the message.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    id: ChannelId,
    label: Option<String>,
    max_send_depth: usize,
    relaying: AtomicBool,
    registry: Mutex<Registry>,
    tracer: RwLock<Option<Arc<Tracer>>>,
}

/// The process-wide default channel
///
/// Created on first access and never torn down
pub fn default_channel() -> Channel {
    static DEFAULT: OnceCell<Channel> = OnceCell::new();
    DEFAULT
        .get_or_init(|| Channel::builder().label("default").build())
        .clone()
}

impl Channel {
    /// Creates an empty channel with default settings
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a new channel
    pub fn builder() -> ChannelBuilder {
        ChannelBuilder::default()
    }

    fn from_builder(builder: ChannelBuilder) -> Self {
        let ChannelBuilder {
            label,
            tracer,
            max_send_depth,
        } = builder;
        Self {
            inner: Arc::new(ChannelInner {
                id: ChannelId::next(),
                label,
                max_send_depth,
                relaying: AtomicBool::new(false),
                registry: Mutex::new(Registry::default()),
                tracer: RwLock::new(tracer),
            }),
        }
    }

    /// Identity of this channel
    pub fn id(&self) -> ChannelId {
        self.inner.id
    }

    /// Label given at construction
    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Current [ChannelMode]
    pub fn mode(&self) -> ChannelMode {
        if self.inner.relaying.load(Ordering::Relaxed) {
            ChannelMode::Relaying
        } else {
            ChannelMode::Dispatching
        }
    }

    pub(crate) fn mark_relaying(&self) {
        self.inner.relaying.store(true, Ordering::Relaxed);
    }

    /// Tracer observing this channel's sends
    pub fn tracer(&self) -> Option<Arc<Tracer>> {
        self.inner.tracer.read().clone()
    }

    /// Replaces the tracer; `None` detaches it
    pub fn set_tracer(&self, tracer: Option<Arc<Tracer>>) {
        *self.inner.tracer.write() = tracer;
    }

    /// Registers an entry, replacing any entry with the same key,
    /// and marks it ready
    pub fn register(&self, entry: impl Into<Entry>) {
        let entry = match entry.into() {
            Entry::Relay(relay) => Entry::Relay(relay.detached()),
            entry => entry,
        };
        let key = entry.key();
        let replaced = self.inner.registry.lock().insert(entry.clone());
        entry.mark_ready();
        debug!(channel = %self.inner.id, key = %key, replaced = replaced.is_some(), "registered");
    }

    /// Creates a receiver for `M`, registers it and returns its erased handle
    pub fn register_receiver<M: Message>(
        &self,
        callback: impl Fn(&M) + Send + Sync + 'static,
    ) -> ErasedReceiver {
        let receiver = Receiver::new(callback).erase_in(self);
        self.register(receiver.clone());
        receiver
    }

    /// Removes the entry registered under `key`. No-op if absent
    pub fn remove_value(&self, key: &ReceiverKey) {
        let removed = self.inner.registry.lock().remove(key);
        if removed.is_some() {
            debug!(channel = %self.inner.id, key = %key, "removed");
        }
    }

    /// Removes `entry`, a receiver or a relay. No-op if absent
    pub fn remove(&self, entry: impl Into<Entry>) {
        self.remove_value(&entry.into().key());
    }

    /// Removes every entry
    pub fn remove_all(&self) {
        let removed = self.inner.registry.lock().clear();
        debug!(channel = %self.inner.id, count = removed.len(), "removed all");
    }

    /// Returns true if an entry is registered under `key`
    pub fn contains(&self, key: &ReceiverKey) -> bool {
        self.inner.registry.lock().contains(key)
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered receivers in delivery order
    ///
    /// For a relay this is its receiving-side receiver
    pub fn receivers(&self) -> Vec<ErasedReceiver> {
        self.inner
            .registry
            .lock()
            .entries()
            .map(|entry| entry.receiver().clone())
            .collect()
    }

    /// Point-in-time description of this channel
    pub fn snapshot(&self) -> ChannelSnapshot {
        let entries = self
            .inner
            .registry
            .lock()
            .entries()
            .map(EntrySnapshot::of)
            .collect();
        ChannelSnapshot {
            id: self.inner.id,
            label: self.inner.label.clone(),
            mode: self.mode(),
            entries,
        }
    }

    /// Delivers `message` to every registered entry in registration order
    ///
    /// Iterates over the entries registered when the call started:
    /// entries added or removed by callbacks during delivery take effect
    /// from the next send. A send that re-enters this channel on one thread
    /// more than `max_send_depth` times is dropped; nesting through other
    /// channels does not count.
    #[track_caller]
    pub fn send<M: Message>(&self, message: &M) {
        let location = Location::caller();
        let Some(_depth) = SendDepth::enter(self.inner.id, self.inner.max_send_depth) else {
            error!(
                channel = %self.inner.id,
                message = M::identity(),
                limit = self.inner.max_send_depth,
                "channel re-entered too deep, message dropped"
            );
            return;
        };

        if let Some(tracer) = &*self.inner.tracer.read() {
            if tracer.is_enabled() {
                tracer.record(message, self, location);
            }
        }

        let entries = self.inner.registry.lock().snapshot();
        trace!(channel = %self.inner.id, message = M::identity(), entries = entries.len(), "send");
        for entry in &entries {
            entry.receive_any(message);
        }
    }

    pub(crate) fn downgrade(&self) -> WeakChannel {
        WeakChannel {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Channel {}

impl std::hash::Hash for Channel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.inner.id, state);
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("mode", &self.mode())
            .field("len", &self.len())
            .finish()
    }
}

/// Non-owning channel reference held by erased receivers
#[derive(Clone)]
pub(crate) struct WeakChannel {
    id: ChannelId,
    inner: Weak<ChannelInner>,
}

impl WeakChannel {
    pub(crate) fn id(&self) -> ChannelId {
        self.id
    }

    pub(crate) fn upgrade(&self) -> Option<Channel> {
        self.inner.upgrade().map(|inner| Channel { inner })
    }
}
