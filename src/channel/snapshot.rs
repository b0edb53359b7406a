use super::{ChannelId, ChannelMode, Entry};
use std::fmt;

/// Point-in-time description of a [Channel](super::Channel)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSnapshot {
    /// Channel identity
    pub id: ChannelId,
    /// Channel label
    pub label: Option<String>,
    /// Channel mode
    pub mode: ChannelMode,
    /// Entries in delivery order
    pub entries: Vec<EntrySnapshot>,
}

/// Point-in-time description of one registry entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySnapshot {
    /// Rendered registry key
    pub key: String,
    /// Whether the entry was ready
    pub ready: bool,
    /// Dispatch channel, for relays
    pub relays_to: Option<ChannelId>,
}

impl EntrySnapshot {
    pub(super) fn of(entry: &Entry) -> Self {
        Self {
            key: entry.key().to_string(),
            ready: entry.is_ready(),
            relays_to: match entry {
                Entry::Receiver(_) => None,
                Entry::Relay(relay) => Some(relay.dispatch_id()),
            },
        }
    }
}

impl fmt::Display for ChannelSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.id)?;
        if let Some(label) = &self.label {
            write!(f, " {:?}", label)?;
        }
        write!(f, " ({}, {} entries)", self.mode, self.entries.len())?;
        for (index, entry) in self.entries.iter().enumerate() {
            write!(f, "\n    {}: {}", index, entry.key)?;
            if let Some(target) = entry.relays_to {
                write!(f, " -> channel {}", target)?;
            }
            if !entry.ready {
                f.write_str(" (not ready)")?;
            }
        }
        Ok(())
    }
}
