use messagechannel::{
    bridge::Receiving,
    tracer::{Tracer, Verbosity},
    Channel, Receiver, Relay,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

messagechannel::declare! {
    /// Raw sensor sample in tenths of °C
    message Sample(i32);
    /// Temperature in °C
    message Celsius(f64);
    /// Overheating alert
    message Alert(f64);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let tracer = Arc::new(
        Tracer::builder()
            .enabled(true)
            .verbosity(Verbosity::Pretty)
            .build(),
    );
    let sensors = Channel::builder().label("sensors").tracer(tracer.clone()).build();
    let display = Channel::builder().label("display").tracer(tracer.clone()).build();
    let alerts = Channel::builder().label("alerts").tracer(tracer.clone()).build();

    // sensors -> display: samples converted to °C on the way
    let to_display = Receiver::<Celsius>::default();
    let _display_relay = Relay::new(&to_display, &display, Some(&sensors));
    to_display
        .project(|sample: &Sample| Some(Celsius(f64::from(sample.0) / 10.0)))
        .erase_in(&sensors)
        .register();

    // display -> alerts: only temperatures above 80 °C
    let to_alerts = Receiver::<Alert>::default();
    let _alert_relay = Relay::with_hook(
        &to_alerts,
        |alert| tracing::warn!(celsius = alert.0, "overheating"),
        &alerts,
        Some(&display),
    );
    to_alerts
        .project(|c: &Celsius| (c.0 > 80.0).then(|| Alert(c.0)))
        .erase_in(&display)
        .register();

    let current = Receiving::<Celsius>::new(&display);
    alerts.register_receiver(|alert: &Alert| println!("ALERT: {:.1} °C", alert.0));

    for raw in [215, 640, 853, 220] {
        Sample(raw).send_to(&sensors);
        if let Some(c) = current.value() {
            println!("display: {:.1} °C", c.0);
        }
    }

    tracer.flush();
}
