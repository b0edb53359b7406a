use super::*;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
enum A {
    Ping,
    Pong,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum B {
    Hello,
    Goodbye,
    Fear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum C {
    Carry,
    Drop,
}

impl Message for A {}
impl Message for B {}
impl Message for C {}

fn b_to_a(b: &B) -> Option<A> {
    match b {
        B::Goodbye => Some(A::Ping),
        B::Hello => Some(A::Pong),
        B::Fear => None,
    }
}

fn c_to_b(c: &C) -> Option<B> {
    match c {
        C::Carry => Some(B::Goodbye),
        C::Drop => None,
    }
}

fn recording() -> (Receiver<A>, Arc<Mutex<Vec<A>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    (Receiver::new(move |a: &A| log.lock().push(*a)), seen)
}

#[test]
fn identity_is_stable_and_unique() {
    let (first, _) = recording();
    let (second, _) = recording();

    assert_eq!(first.id(), first.clone().id());
    assert_ne!(first.id(), second.id());
    assert_eq!(first, first.clone());
    assert_ne!(first, second);

    let set: HashSet<_> = [first.clone(), first.clone(), second].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn key_combines_message_and_receiver_identity() {
    let (receiver, _) = recording();
    let key = receiver.key();

    assert_eq!(key.to_string(), format!("{}-{}", A::identity(), receiver.id()));
    assert_eq!(key.message_identity(), A::identity());
    assert_eq!(key.receiver_id(), receiver.id());
    assert!(key.is_for::<A>());
    assert!(!key.is_for::<B>());
}

#[test]
fn ready_gate() {
    let (receiver, seen) = recording();
    let erased = receiver.erase_in(&Channel::new());

    erased.receive(&A::Ping);
    assert!(seen.lock().is_empty());

    receiver.mark_ready();
    receiver.mark_ready();
    assert!(erased.is_ready());
    erased.receive(&A::Ping);
    erased.receive(&B::Hello);
    assert_eq!(*seen.lock(), vec![A::Ping]);
}

#[test]
fn typed_projection_chain() {
    let (receiver, seen) = recording();
    let from_c = receiver.project(b_to_a).project(c_to_b);
    let channel = Channel::new();
    from_c.erase_in(&channel).register();

    channel.send(&C::Carry);
    assert_eq!(*seen.lock(), vec![A::Ping]);

    channel.send(&C::Drop);
    channel.send(&B::Hello);
    channel.send(&A::Pong);
    assert_eq!(*seen.lock(), vec![A::Ping]);
}

#[test]
fn projection_skips_filtered_values() {
    let (receiver, seen) = recording();
    let from_b = receiver.project(b_to_a);
    from_b.mark_ready();
    let erased = from_b.erase_in(&Channel::new());

    erased.receive(&B::Fear);
    erased.receive(&B::Hello);
    assert_eq!(*seen.lock(), vec![A::Pong]);
}

#[test]
fn erased_projection_chain_feeds_one_callback() {
    let channel = Channel::new();
    let (receiver, seen) = recording();
    let erased = receiver.erase_in(&channel);
    erased.register();

    channel.send(&A::Pong);
    erased.unregister();
    assert!(channel.is_empty());

    let projected = erased.project(b_to_a).project(c_to_b);
    assert_eq!(projected.channel_id(), channel.id());
    assert!(projected.key().is_for::<C>());
    projected.register();

    channel.send(&C::Carry);
    channel.send(&C::Drop);
    assert_eq!(*seen.lock(), vec![A::Pong, A::Ping]);
    assert_eq!(channel.receivers(), vec![projected]);
}

#[test]
fn projection_into_wrong_type_is_dropped() {
    let channel = Channel::new();
    let (receiver, seen) = recording();
    let erased = receiver.erase_in(&channel);

    erased.project(|c: &C| c_to_b(c)).register();
    channel.send(&C::Carry);

    assert!(seen.lock().is_empty());
}

#[test]
fn dispatch_to_forwards_after_hook() {
    let target = Channel::new();
    let (receiver, seen) = recording();
    receiver.erase_in(&target).register();

    let hooked = Arc::new(Mutex::new(Vec::new()));
    let log = hooked.clone();
    let forwarder = Receiver::<A>::default();
    forwarder.dispatch_to(&target, move |a| log.lock().push(*a));
    forwarder.mark_ready();
    forwarder.erase_in(&Channel::new()).receive(&A::Pong);

    assert_eq!(*hooked.lock(), vec![A::Pong]);
    assert_eq!(*seen.lock(), vec![A::Pong]);
}

#[test]
fn erased_equality_includes_channel() {
    let (receiver, _) = recording();
    let first = Channel::new();
    let second = Channel::new();

    assert_eq!(receiver.erase_in(&first), receiver.erase_in(&first));
    assert_ne!(receiver.erase_in(&first), receiver.erase_in(&second));
    assert_eq!(receiver.erase_in(&first).key(), receiver.erase_in(&second).key());
}
