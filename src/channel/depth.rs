use super::ChannelId;
use std::cell::RefCell;

thread_local! {
    static STACK: RefCell<Vec<ChannelId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a channel as sending on the current thread while alive
///
/// Only re-entry of the same channel counts against the limit,
/// so long acyclic relay chains are never cut short.
pub(super) struct SendDepth {
    channel: ChannelId,
}

impl SendDepth {
    pub(super) fn enter(channel: ChannelId, limit: usize) -> Option<Self> {
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let nested = stack.iter().filter(|id| **id == channel).count();
            if nested >= limit {
                return None;
            }
            stack.push(channel);
            Some(SendDepth { channel })
        })
    }
}

impl Drop for SendDepth {
    fn drop(&mut self) {
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(index) = stack.iter().rposition(|id| *id == self.channel) {
                stack.remove(index);
            }
        });
    }
}
