use crate::{
    receiver::{ErasedReceiver, ReceiverKey},
    relay::Relay,
    Message,
};
use std::any::Any;

/// Something a [Channel](super::Channel) can hold
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entry {
    /// A plain erased receiver
    Receiver(ErasedReceiver),
    /// A relay, keyed by its receiving-side receiver
    ///
    /// Holds the dispatch channel weakly
    Relay(Relay),
}

impl Entry {
    /// Registry key
    pub fn key(&self) -> ReceiverKey {
        self.receiver().key()
    }

    /// The receiver that is invoked on delivery
    pub fn receiver(&self) -> &ErasedReceiver {
        match self {
            Entry::Receiver(receiver) => receiver,
            Entry::Relay(relay) => relay.receiver(),
        }
    }

    /// Returns true once the entry has been registered
    pub fn is_ready(&self) -> bool {
        self.receiver().is_ready()
    }

    /// Marks the entry ready
    pub fn mark_ready(&self) {
        self.receiver().mark_ready();
    }

    /// Delivers `message` if the entry is ready and matches its type
    pub fn receive<M: Message>(&self, message: &M) {
        self.receive_any(message);
    }

    pub(crate) fn receive_any(&self, message: &dyn Any) {
        self.receiver().receive_any(message);
    }
}

impl From<ErasedReceiver> for Entry {
    fn from(receiver: ErasedReceiver) -> Self {
        Entry::Receiver(receiver)
    }
}

impl From<&ErasedReceiver> for Entry {
    fn from(receiver: &ErasedReceiver) -> Self {
        Entry::Receiver(receiver.clone())
    }
}

impl From<Relay> for Entry {
    fn from(relay: Relay) -> Self {
        Entry::Relay(relay.detached())
    }
}

impl From<&Relay> for Entry {
    fn from(relay: &Relay) -> Self {
        Entry::Relay(relay.detached())
    }
}

impl From<&Entry> for Entry {
    fn from(entry: &Entry) -> Self {
        entry.clone()
    }
}

/// Insertion-ordered entries, unique by key
#[derive(Default)]
pub(super) struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Appends `entry`, or replaces in place the entry with the same key
    pub(super) fn insert(&mut self, entry: Entry) -> Option<Entry> {
        let key = entry.key();
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index], entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    pub(super) fn remove(&mut self, key: &ReceiverKey) -> Option<Entry> {
        let index = self.position(key)?;
        Some(self.entries.remove(index))
    }

    pub(super) fn clear(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }

    pub(super) fn contains(&self, key: &ReceiverKey) -> bool {
        self.position(key).is_some()
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub(super) fn snapshot(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    fn position(&self, key: &ReceiverKey) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key() == *key)
    }
}
