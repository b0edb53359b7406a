//! # Tracing of sends
//!
//! A [Tracer] attached to a [Channel] observes every send without taking
//! part in delivery. When enabled, the message and a snapshot of the
//! channel are captured on the sending thread and rendered to a sink on a
//! dedicated background thread. When disabled a send only pays for one
//! atomic load.

use crate::{channel::Channel, common::OnceCell, Message};
use std::{
    fmt,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

mod record;
mod worker;

#[cfg(test)]
mod test;

pub use record::*;

use worker::{Command, Worker};

/// Output function of a [Tracer]
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// How much a [Tracer] renders per send
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Verbosity {
    /// One line: message, channel and call site
    #[default]
    Pretty,
    /// Full message dump, every registry entry and the call site
    Verbose,
}

/// Side observer of channel sends
pub struct Tracer {
    enabled: AtomicBool,
    verbosity: Verbosity,
    sink: Sink,
    worker: OnceCell<Worker>,
}

/// Configuration for a new [Tracer]
#[must_use]
pub struct TracerBuilder {
    enabled: bool,
    verbosity: Verbosity,
    sink: Option<Sink>,
}

impl Tracer {
    /// Creates a disabled tracer writing pretty records to the log
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a new tracer
    pub fn builder() -> TracerBuilder {
        TracerBuilder {
            enabled: false,
            verbosity: Verbosity::default(),
            sink: None,
        }
    }

    /// Starts recording
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Stops recording
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Returns true if sends are being recorded
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Configured verbosity
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Queues a record of `message` being sent into `channel` from `location`
    ///
    /// Does nothing while disabled
    pub fn record<M: Message>(
        &self,
        message: &M,
        channel: &Channel,
        location: &'static Location<'static>,
    ) {
        if !self.is_enabled() {
            return;
        }
        let record = TraceRecord {
            message_identity: M::identity(),
            message: match self.verbosity {
                Verbosity::Pretty => message.plain_text(),
                Verbosity::Verbose => format!("{:#?}", message),
            },
            channel: channel.snapshot(),
            file: location.file(),
            line: location.line(),
        };
        self.worker().submit(Command::Record(record));
    }

    /// Blocks until every record queued so far has reached the sink
    ///
    /// # Panics
    ///
    /// If called from within an asynchronous execution context
    pub fn flush(&self) {
        if let Some(worker) = self.worker.get() {
            worker.flush();
        }
    }

    fn worker(&self) -> &Worker {
        self.worker
            .get_or_init(|| Worker::spawn(self.sink.clone(), self.verbosity))
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

impl TracerBuilder {
    /// Whether the tracer starts enabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Rendering detail
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Where rendered records go
    ///
    /// Defaults to `tracing::info!` with target `messagechannel::trace`
    pub fn sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        let sink: Sink = Arc::new(sink);
        self.sink = Some(sink);
        self
    }

    /// Creates the tracer
    pub fn build(self) -> Tracer {
        Tracer {
            enabled: AtomicBool::new(self.enabled),
            verbosity: self.verbosity,
            sink: self.sink.unwrap_or_else(|| Arc::new(log_sink) as Sink),
            worker: OnceCell::new(),
        }
    }
}

fn log_sink(text: &str) {
    tracing::info!(target: "messagechannel::trace", "{}", text);
}
