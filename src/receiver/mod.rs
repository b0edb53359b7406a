//! # Typed receivers

use crate::{channel::Channel, Message};
use parking_lot::RwLock;
use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};
use tracing::trace;

mod erased;

#[cfg(test)]
mod test;

pub use erased::*;

type Callback<M> = Arc<dyn Fn(&M) + Send + Sync>;

/// Process-unique identity of a [Receiver]
///
/// Issued once at construction and never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReceiverId(u64);

impl ReceiverId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Registry key of a receiver: its message type plus its own identity
///
/// Rendered as `<message identity>-<receiver id>`.
/// Comparison uses the exact message [TypeId], not the rendered string.
#[derive(Clone, Copy, Debug)]
pub struct ReceiverKey {
    type_id: TypeId,
    identity: &'static str,
    id: ReceiverId,
}

impl ReceiverKey {
    pub(crate) fn of<M: Message>(id: ReceiverId) -> Self {
        Self {
            type_id: id!(M),
            identity: M::identity(),
            id,
        }
    }

    /// Identity of the message type this key is namespaced by
    pub fn message_identity(&self) -> &'static str {
        self.identity
    }

    /// Identity of the receiver
    pub fn receiver_id(&self) -> ReceiverId {
        self.id
    }

    /// Returns true if the key belongs to a receiver of `M`
    pub fn is_for<M: Message>(&self) -> bool {
        self.type_id == id!(M)
    }
}

impl PartialEq for ReceiverKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.id == other.id
    }
}

impl Eq for ReceiverKey {}

impl Hash for ReceiverKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.type_id, state);
        Hash::hash(&self.id, state);
    }
}

impl fmt::Display for ReceiverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.identity, self.id)
    }
}

/// A typed callback for messages of type `M`
///
/// Clones share the same callback, identity and ready flag.
/// A receiver only observes messages after it has been marked ready,
/// which a [Channel] does when the receiver is registered in it.
pub struct Receiver<M: Message> {
    inner: Arc<Inner<M>>,
}

pub(crate) struct Inner<M> {
    id: ReceiverId,
    ready: AtomicBool,
    callback: RwLock<Callback<M>>,
}

impl<M: Message> Receiver<M> {
    /// Creates a receiver that is not ready yet
    pub fn new(callback: impl Fn(&M) + Send + Sync + 'static) -> Self {
        let callback: Callback<M> = Arc::new(callback);
        Self {
            inner: Arc::new(Inner {
                id: ReceiverId::next(),
                ready: AtomicBool::new(false),
                callback: RwLock::new(callback),
            }),
        }
    }

    /// Identity of this receiver
    pub fn id(&self) -> ReceiverId {
        self.inner.id
    }

    /// Registry key of this receiver
    pub fn key(&self) -> ReceiverKey {
        ReceiverKey::of::<M>(self.inner.id)
    }

    /// Returns true once the receiver has been registered
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// Lets the receiver observe messages. Idempotent
    pub fn mark_ready(&self) {
        self.inner.set_ready();
    }

    /// Builds a receiver of `U` that feeds this receiver's callback
    ///
    /// Each `U` is mapped through `f`; `None` drops the message.
    /// The new receiver has its own identity and readiness, and the
    /// callback is invoked regardless of whether `self` is ready.
    pub fn project<U: Message>(
        &self,
        f: impl Fn(&U) -> Option<M> + Send + Sync + 'static,
    ) -> Receiver<U> {
        let target = self.inner.clone();
        Receiver::new(move |upstream: &U| {
            if let Some(value) = f(upstream) {
                target.call(&value);
            }
        })
    }

    /// Replaces the callback with "run `hook`, then send into `channel`"
    ///
    /// The channel is held weakly: once every handle to it is dropped
    /// the hook still runs but nothing is forwarded.
    pub fn dispatch_to(&self, channel: &Channel, hook: impl Fn(&M) + Send + Sync + 'static) {
        let channel = channel.downgrade();
        let forward: Callback<M> = Arc::new(move |message: &M| {
            hook(message);
            match channel.upgrade() {
                Some(channel) => channel.send(message),
                None => trace!(channel = %channel.id(), "dispatch channel is gone"),
            }
        });
        *self.inner.callback.write() = forward;
    }

    /// Erases this receiver, binding it to the [default channel](crate::default_channel)
    pub fn erase(&self) -> ErasedReceiver {
        ErasedReceiver::new(self)
    }

    /// Erases this receiver, binding it to `channel`
    pub fn erase_in(&self, channel: &Channel) -> ErasedReceiver {
        ErasedReceiver::in_channel(self, channel)
    }

    pub(crate) fn erased(&self) -> Arc<dyn Erased> {
        self.inner.clone()
    }
}

impl<M> Inner<M> {
    fn call(&self, message: &M) {
        // clone out so the callback may rewire itself without deadlocking
        let callback = self.callback.read().clone();
        callback(message);
    }

    fn set_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }
}

/// Type-erased view of a receiver's storage
pub(crate) trait Erased: Send + Sync {
    fn is_ready(&self) -> bool;
    fn mark_ready(&self);
    /// Invokes the callback if `message` is exactly the receiver's type
    fn invoke(&self, message: &dyn Any) -> bool;
}

impl<M: Message> Erased for Inner<M> {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn mark_ready(&self) {
        self.set_ready();
    }

    fn invoke(&self, message: &dyn Any) -> bool {
        match message.downcast_ref::<M>() {
            Some(message) => {
                self.call(message);
                true
            }
            None => false,
        }
    }
}

impl<M: Message> Default for Receiver<M> {
    fn default() -> Self {
        Self::new(|_| {})
    }
}

impl<M: Message> Clone for Receiver<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Message> PartialEq for Receiver<M> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<M: Message> Eq for Receiver<M> {}

impl<M: Message> Hash for Receiver<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.inner.id, state);
    }
}

impl<M: Message> fmt::Debug for Receiver<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("key", &format_args!("{}", self.key()))
            .field("ready", &self.is_ready())
            .finish()
    }
}
