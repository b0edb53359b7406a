use super::{Erased, Receiver, ReceiverKey};
use crate::{
    channel::{default_channel, Channel, ChannelId, WeakChannel},
    Message,
};
use std::{
    any::Any,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};
use tracing::{debug, warn};

/// A [Receiver] with its message type erased
///
/// Lets receivers of different message types share one registry.
/// The erased receiver is bound to the channel it was created for
/// and keeps only a weak reference to it.
#[derive(Clone)]
pub struct ErasedReceiver {
    key: ReceiverKey,
    receiver: Arc<dyn Erased>,
    channel: WeakChannel,
}

impl ErasedReceiver {
    /// Wraps `receiver`, binding it to the [default channel](crate::default_channel)
    pub fn new<M: Message>(receiver: &Receiver<M>) -> Self {
        Self::in_channel(receiver, &default_channel())
    }

    /// Wraps `receiver`, binding it to `channel`
    pub fn in_channel<M: Message>(receiver: &Receiver<M>, channel: &Channel) -> Self {
        Self {
            key: receiver.key(),
            receiver: receiver.erased(),
            channel: channel.downgrade(),
        }
    }

    /// Registry key: `<message identity>-<receiver id>`
    pub fn key(&self) -> ReceiverKey {
        self.key
    }

    /// Id of the channel this receiver is bound to
    pub fn channel_id(&self) -> ChannelId {
        self.channel.id()
    }

    /// The bound channel, if it is still alive
    pub fn channel(&self) -> Option<Channel> {
        self.channel.upgrade()
    }

    /// Returns true once the wrapped receiver has been registered
    pub fn is_ready(&self) -> bool {
        self.receiver.is_ready()
    }

    /// Marks the wrapped receiver ready
    pub fn mark_ready(&self) {
        self.receiver.mark_ready();
    }

    /// Delivers `message` if it is exactly the receiver's type
    /// and the receiver is ready; otherwise does nothing
    pub fn receive<M: Message>(&self, message: &M) {
        self.receive_any(message);
    }

    pub(crate) fn receive_any(&self, message: &dyn Any) {
        if !self.receiver.is_ready() {
            return;
        }
        self.receiver.invoke(message);
    }

    /// Registers in the bound channel
    pub fn register(&self) {
        match self.channel.upgrade() {
            Some(channel) => channel.register(self.clone()),
            None => debug!(key = %self.key, channel = %self.channel.id(), "bound channel is gone, not registering"),
        }
    }

    /// Registers in `channel`
    pub fn register_into(&self, channel: &Channel) {
        channel.register(self.clone());
    }

    /// Removes from the bound channel. Idempotent
    pub fn unregister(&self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.remove_value(&self.key);
        }
    }

    /// Removes from `channel`. Idempotent
    pub fn unregister_from(&self, channel: &Channel) {
        channel.remove_value(&self.key);
    }

    /// Builds an erased receiver of `U` that feeds this one's callback
    ///
    /// `W` must be the wrapped receiver's message type, otherwise
    /// projected values are dropped. The result is bound to the same
    /// channel and is not registered.
    pub fn project<U, W>(&self, f: impl Fn(&U) -> Option<W> + Send + Sync + 'static) -> Self
    where
        U: Message,
        W: Message,
    {
        if !self.key.is_for::<W>() {
            warn!(
                key = %self.key,
                projected = W::identity(),
                "projection output does not match the receiver type"
            );
        }
        let target = self.receiver.clone();
        let projected = Receiver::new(move |upstream: &U| {
            if let Some(value) = f(upstream) {
                target.invoke(&value);
            }
        });
        Self {
            key: projected.key(),
            receiver: projected.erased(),
            channel: self.channel.clone(),
        }
    }
}

impl PartialEq for ErasedReceiver {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.channel.id() == other.channel.id()
    }
}

impl Eq for ErasedReceiver {}

impl Hash for ErasedReceiver {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.key, state);
        Hash::hash(&self.channel.id(), state);
    }
}

impl fmt::Debug for ErasedReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedReceiver")
            .field("key", &format_args!("{}", self.key))
            .field("channel", &self.channel.id())
            .field("ready", &self.is_ready())
            .finish()
    }
}
