use super::*;
use crate::{
    channel::{ChannelMode, ChannelSnapshot},
    receiver::Receiver,
    relay::Relay,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct Greeting {
    text: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct Farewell;

impl Message for Greeting {}
impl Message for Farewell {}

fn capturing(verbosity: Verbosity) -> (Arc<Tracer>, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let tracer = Tracer::builder()
        .enabled(true)
        .verbosity(verbosity)
        .sink(move |text| sink.lock().push(text.to_owned()))
        .build();
    (Arc::new(tracer), lines)
}

/// Runs a small relay graph and returns what every receiver saw, in order
fn scenario(tracer: Option<Arc<Tracer>>) -> Vec<String> {
    let mut source = Channel::builder().label("source");
    let mut sink = Channel::builder().label("sink");
    if let Some(tracer) = tracer {
        source = source.tracer(tracer.clone());
        sink = sink.tracer(tracer);
    }
    let (source, sink) = (source.build(), sink.build());
    let seen = Arc::new(Mutex::new(Vec::new()));

    for (channel, name) in [(&source, "s1"), (&source, "s2"), (&sink, "k1")] {
        let log = seen.clone();
        channel.register_receiver(move |g: &Greeting| log.lock().push(format!("{}:{}", name, g.text)));
    }
    let log = seen.clone();
    let _relay = Relay::with_hook(
        &Receiver::<Greeting>::default(),
        move |g| log.lock().push(format!("hook:{}", g.text)),
        &sink,
        Some(&source),
    );
    let log = seen.clone();
    sink.register_receiver(move |_: &Farewell| log.lock().push("k2:bye".to_owned()));

    source.send(&Greeting { text: "hi" });
    source.send(&Farewell);
    sink.send(&Farewell);
    sink.send(&Greeting { text: "direct" });

    let seen = seen.lock().clone();
    seen
}

#[test]
fn tracing_does_not_change_delivery() {
    let untraced = scenario(None);
    let (tracer, lines) = capturing(Verbosity::Verbose);
    let traced = scenario(Some(tracer.clone()));
    tracer.flush();

    assert_eq!(
        untraced,
        vec!["s1:hi", "s2:hi", "hook:hi", "k1:hi", "k2:bye", "k1:direct"]
    );
    assert_eq!(traced, untraced);
    assert_eq!(lines.lock().len(), 5);

    tracer.disable();
    assert_eq!(scenario(Some(tracer.clone())), untraced);
    tracer.flush();
    assert_eq!(lines.lock().len(), 5);
}

#[test]
fn disabled_tracer_records_nothing() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = lines.clone();
    let tracer = Arc::new(
        Tracer::builder()
            .sink(move |text| sink.lock().push(text.to_owned()))
            .build(),
    );
    assert!(!tracer.is_enabled());
    let channel = Channel::builder().tracer(tracer.clone()).build();

    channel.send(&Farewell);
    tracer.flush();
    assert!(lines.lock().is_empty());

    tracer.enable();
    channel.send(&Farewell);
    tracer.flush();
    assert_eq!(lines.lock().len(), 1);
}

#[test]
fn pretty_record_is_one_line() {
    let (tracer, lines) = capturing(Verbosity::Pretty);
    let channel = Channel::builder().label("ui").tracer(tracer.clone()).build();
    channel.register_receiver(|_: &Greeting| {});

    channel.send(&Greeting { text: "hi" });
    let line = line!() - 1;
    tracer.flush();

    let lines = lines.lock();
    assert_eq!(lines.len(), 1);
    let record = &lines[0];
    assert!(!record.contains('\n'));
    assert!(record.starts_with("[messagechannel] "));
    assert!(record.contains(Greeting::identity()));
    assert!(record.contains("Greeting { text: \"hi\" }"));
    assert!(record.contains(&format!("channel {} \"ui\" (dispatching, 1 entries)", channel.id())));
    assert!(record.ends_with(&format!("{}:{}", file!(), line)));
}

#[test]
fn verbose_record_lists_registry_and_relays() {
    let (tracer, lines) = capturing(Verbosity::Verbose);
    let channel = Channel::builder().tracer(tracer.clone()).build();
    let target = Channel::new();
    let relay = Relay::new(&Receiver::<Farewell>::default(), &target, Some(&channel));

    channel.send(&Farewell);
    tracer.flush();

    let lines = lines.lock();
    let record = &lines[0];
    assert!(record.starts_with("[messagechannel]\n"));
    assert!(record.contains(&format!("0: {} -> channel {}", relay.key(), target.id())));
    assert!(record.contains(&format!("[message] {}", Farewell::identity())));
    assert!(record.contains("    Farewell"));
    assert!(record.contains(&format!("[file]\n    {}", file!())));
}

#[test]
fn record_keeps_snapshot_taken_at_send() {
    let (tracer, lines) = capturing(Verbosity::Verbose);
    let channel = Channel::builder().tracer(tracer.clone()).build();
    let first = channel.register_receiver(|_: &Farewell| {});

    channel.send(&Farewell);
    channel.remove_all();
    tracer.flush();

    assert!(lines.lock()[0].contains(&first.key().to_string()));
}

#[test]
fn render_formats() {
    let record = TraceRecord {
        message_identity: "app::Tick",
        message: "Tick(1)".to_owned(),
        channel: ChannelSnapshot {
            id: Channel::new().id(),
            label: None,
            mode: ChannelMode::Relaying,
            entries: Vec::new(),
        },
        file: "src/app.rs",
        line: 7,
    };

    let pretty = record.render(Verbosity::Pretty);
    assert_eq!(
        pretty,
        format!(
            "[messagechannel] app::Tick Tick(1) -> channel {} (relaying, 0 entries) at src/app.rs:7",
            record.channel.id
        )
    );

    let verbose = record.render(Verbosity::Verbose);
    assert!(verbose.ends_with("[file]\n    src/app.rs\n[line] 7\n"));
}

#[test]
fn renders_off_the_sending_thread() {
    let threads = Arc::new(Mutex::new(Vec::new()));
    let sink = threads.clone();
    let tracer = Arc::new(
        Tracer::builder()
            .enabled(true)
            .sink(move |_| {
                let current = std::thread::current();
                sink.lock().push((current.id(), current.name().map(str::to_owned)));
            })
            .build(),
    );
    let channel = Channel::builder().tracer(tracer.clone()).build();

    channel.send(&Farewell);
    channel.send(&Farewell);
    tracer.flush();

    let threads = threads.lock();
    assert_eq!(threads.len(), 2);
    for (id, name) in threads.iter() {
        assert_ne!(*id, std::thread::current().id());
        assert_eq!(name.as_deref(), Some("messagechannel-tracer"));
    }
}

#[test]
fn flush_without_records_returns() {
    let tracer = Tracer::new();
    tracer.flush();
    assert_eq!(tracer.verbosity(), Verbosity::Pretty);
}
