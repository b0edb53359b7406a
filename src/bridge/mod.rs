//! # Current-value adapters
//!
//! Receivers and relays that keep the latest message they saw in a
//! [tokio::sync::watch] channel, so it can be read or awaited elsewhere.

use crate::{
    channel::Channel,
    receiver::{ErasedReceiver, Receiver},
    relay::Relay,
    Message,
};
use tokio::sync::watch;


/// A registered receiver that remembers the latest `M`
pub struct Receiving<M> {
    receiver: ErasedReceiver,
    value: watch::Receiver<Option<M>>,
}

impl<M: Message + Clone + Send + Sync> Receiving<M> {
    /// Registers in `channel` with no initial value
    pub fn new(channel: &Channel) -> Self {
        Self::with_value(None, channel)
    }

    /// Registers in `channel`, starting from `initial`
    pub fn with_value(initial: Option<M>, channel: &Channel) -> Self {
        let (tx, rx) = watch::channel(initial);
        let receiver = Receiver::new(move |message: &M| {
            tx.send_replace(Some(message.clone()));
        })
        .erase_in(channel);
        receiver.register();
        Self {
            receiver,
            value: rx,
        }
    }

    /// Latest received message
    pub fn value(&self) -> Option<M> {
        self.value.borrow().clone()
    }

    /// A stream of updates; see [watch::Receiver::changed]
    pub fn subscribe(&self) -> watch::Receiver<Option<M>> {
        self.value.clone()
    }

    /// The registered receiver
    pub fn receiver(&self) -> &ErasedReceiver {
        &self.receiver
    }

    /// Stops receiving
    pub fn remove_from_channel(&self) {
        self.receiver.unregister();
    }
}

/// A [Relay] that remembers the latest `M` it forwarded
pub struct Relaying<M> {
    relay: Relay,
    value: watch::Receiver<Option<M>>,
}

impl<M: Message + Clone + Send + Sync> Relaying<M> {
    /// Relays `M` from `receiving` (or the default channel) into `relaying`
    ///
    /// # Panics
    ///
    /// In debug builds, if `receiving` is `relaying`
    pub fn new(relaying: &Channel, receiving: Option<&Channel>) -> Self {
        let (tx, rx) = watch::channel(None);
        let relay = Relay::with_hook(
            &Receiver::<M>::default(),
            move |message: &M| {
                tx.send_replace(Some(message.clone()));
            },
            relaying,
            receiving,
        );
        Self { relay, value: rx }
    }

    /// Latest relayed message
    pub fn value(&self) -> Option<M> {
        self.value.borrow().clone()
    }

    /// A stream of updates; see [watch::Receiver::changed]
    pub fn subscribe(&self) -> watch::Receiver<Option<M>> {
        self.value.clone()
    }

    /// The underlying relay
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Sends `message` straight into the relaying channel
    #[track_caller]
    pub fn send(&self, message: &M) {
        self.relay.send(message);
    }
}
