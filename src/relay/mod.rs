//! # Relays
//!
//! A [Relay] receives messages of one type in a receiving channel and
//! re-sends each of them into a dispatch channel, optionally after a hook.
//! Chained relays form a directed graph of channels.

use crate::{
    channel::{default_channel, Channel, ChannelId, Entry, WeakChannel},
    receiver::{ErasedReceiver, Receiver, ReceiverKey},
    Message,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, error};


/// This enumeration is the list of the possible error outcomes for
/// [Relay::try_new]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The receiving channel is also the dispatch channel,
    /// every relayed message would be relayed again
    #[error("relay receives and dispatches in the same channel {channel}")]
    SelfLoop {
        /// The channel used on both sides
        channel: ChannelId,
    },
}

/// Forwards messages from a receiving channel into a dispatch channel
///
/// Clones are handles to the same relay.
/// The relay stays registered in its receiving channel until removed with
/// [remove_from_receiving_channel](Relay::remove_from_receiving_channel).
///
/// A relay handle keeps its dispatch channel alive. The entry registered in
/// the receiving channel does not, so channels relaying into each other are
/// freed once the relay handles and channel handles are dropped. After the
/// dispatch channel is freed the relay forwards nothing.
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
    // `None` for the copy held by the receiving channel's registry
    dispatch: Option<Channel>,
}

struct RelayInner {
    receiver: ErasedReceiver,
    dispatch: WeakChannel,
}

impl Relay {
    /// Relays what `source` receives into `dispatch`
    ///
    /// `receiving` defaults to the [default channel](crate::default_channel).
    ///
    /// # Panics
    ///
    /// In debug builds, if `receiving` is `dispatch`.
    /// Release builds log the misconfiguration and build the relay anyway.
    pub fn new<M: Message>(
        source: &Receiver<M>,
        dispatch: &Channel,
        receiving: Option<&Channel>,
    ) -> Self {
        Self::with_hook(source, |_| {}, dispatch, receiving)
    }

    /// Like [new](Relay::new), running `hook` on every message before forwarding it
    ///
    /// # Panics
    ///
    /// In debug builds, if `receiving` is `dispatch`.
    pub fn with_hook<M: Message>(
        source: &Receiver<M>,
        hook: impl Fn(&M) + Send + Sync + 'static,
        dispatch: &Channel,
        receiving: Option<&Channel>,
    ) -> Self {
        let receiving = receiving.cloned().unwrap_or_else(default_channel);
        if let Err(e) = check(&receiving, dispatch) {
            error!(key = %source.key(), "{}", e);
            if cfg!(debug_assertions) {
                panic!("{}", e);
            }
        }
        Self::bind(source, hook, dispatch, &receiving)
    }

    /// Like [with_hook](Relay::with_hook), reporting misconfiguration as an error
    pub fn try_new<M: Message>(
        source: &Receiver<M>,
        hook: impl Fn(&M) + Send + Sync + 'static,
        dispatch: &Channel,
        receiving: Option<&Channel>,
    ) -> Result<Self, RelayError> {
        let receiving = receiving.cloned().unwrap_or_else(default_channel);
        check(&receiving, dispatch)?;
        Ok(Self::bind(source, hook, dispatch, &receiving))
    }

    fn bind<M: Message>(
        source: &Receiver<M>,
        hook: impl Fn(&M) + Send + Sync + 'static,
        dispatch: &Channel,
        receiving: &Channel,
    ) -> Self {
        source.dispatch_to(dispatch, hook);
        let relay = Self {
            inner: Arc::new(RelayInner {
                receiver: source.erase_in(receiving),
                dispatch: dispatch.downgrade(),
            }),
            dispatch: Some(dispatch.clone()),
        };
        receiving.register(&relay);
        dispatch.mark_relaying();
        debug!(
            key = %relay.key(),
            receiving = %receiving.id(),
            dispatch = %dispatch.id(),
            "relay bound"
        );
        relay
    }

    /// Key of the relay in its receiving channel
    pub fn key(&self) -> ReceiverKey {
        self.inner.receiver.key()
    }

    /// The receiving-side receiver
    pub fn receiver(&self) -> &ErasedReceiver {
        &self.inner.receiver
    }

    /// Identity of the channel messages are forwarded into
    pub fn dispatch_id(&self) -> ChannelId {
        self.inner.dispatch.id()
    }

    /// The channel messages are forwarded into, if it is still alive
    pub fn dispatch_channel(&self) -> Option<Channel> {
        match &self.dispatch {
            Some(channel) => Some(channel.clone()),
            None => self.inner.dispatch.upgrade(),
        }
    }

    /// Sends `message` straight into the dispatch channel
    ///
    /// The hook is not run
    #[track_caller]
    pub fn send<M: Message>(&self, message: &M) {
        match &self.dispatch {
            Some(channel) => channel.send(message),
            None => {
                if let Some(channel) = self.inner.dispatch.upgrade() {
                    channel.send(message);
                }
            }
        }
    }

    /// Registers the relay in its receiving channel again
    pub fn register(&self) {
        match self.inner.receiver.channel() {
            Some(channel) => channel.register(self),
            None => debug!(key = %self.key(), "receiving channel is gone, not registering"),
        }
    }

    /// Removes everything from the dispatch channel
    pub fn remove_all(&self) {
        if let Some(channel) = self.dispatch_channel() {
            channel.remove_all();
        }
    }

    /// Removes `key` from the dispatch channel
    pub fn remove_value(&self, key: &ReceiverKey) {
        if let Some(channel) = self.dispatch_channel() {
            channel.remove_value(key);
        }
    }

    /// Removes `entry` from the dispatch channel
    pub fn remove(&self, entry: impl Into<Entry>) {
        if let Some(channel) = self.dispatch_channel() {
            channel.remove(entry);
        }
    }

    /// Stops relaying by leaving the receiving channel
    pub fn remove_from_receiving_channel(&self) {
        self.inner.receiver.unregister();
    }

    /// Copy for the receiving channel's registry, without the strong
    /// dispatch handle
    pub(crate) fn detached(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            dispatch: None,
        }
    }
}

fn check(receiving: &Channel, dispatch: &Channel) -> Result<(), RelayError> {
    if receiving == dispatch {
        return Err(RelayError::SelfLoop {
            channel: dispatch.id(),
        });
    }
    Ok(())
}

impl PartialEq for Relay {
    fn eq(&self, other: &Self) -> bool {
        self.inner.receiver == other.inner.receiver
            && self.inner.dispatch.id() == other.inner.dispatch.id()
    }
}

impl Eq for Relay {}

impl Hash for Relay {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.inner.receiver, state);
        Hash::hash(&self.inner.dispatch.id(), state);
    }
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("key", &format_args!("{}", self.key()))
            .field("receiving", &self.inner.receiver.channel_id())
            .field("dispatch", &self.inner.dispatch.id())
            .finish()
    }
}
