use super::{Sink, TraceRecord, Verbosity};
use std::thread::{self, JoinHandle};
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    oneshot,
};
use tracing::warn;

pub(super) enum Command {
    Record(TraceRecord),
    Flush(oneshot::Sender<()>),
}

/// Background thread rendering records in FIFO order
pub(super) struct Worker {
    queue: Option<UnboundedSender<Command>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(super) fn spawn(sink: Sink, verbosity: Verbosity) -> Self {
        let (tx, rx) = unbounded_channel();
        let spawned = thread::Builder::new()
            .name("messagechannel-tracer".into())
            .spawn(move || run(rx, sink, verbosity));
        match spawned {
            Ok(handle) => Self {
                queue: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                warn!("cannot start tracer thread, records will be dropped: {}", e);
                Self {
                    queue: None,
                    handle: None,
                }
            }
        }
    }

    pub(super) fn submit(&self, command: Command) {
        if let Some(queue) = &self.queue {
            let _ = queue.send(command);
        }
    }

    pub(super) fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.submit(Command::Flush(tx));
        let _ = rx.blocking_recv();
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // closing the queue lets the thread drain what is left and exit
        drop(self.queue.take());
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

fn run(mut rx: UnboundedReceiver<Command>, sink: Sink, verbosity: Verbosity) {
    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Record(record) => sink(&record.render(verbosity)),
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
