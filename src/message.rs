//! # Messages

use std::{any::Any, fmt};

/// A payload type that can be sent through a [Channel](crate::channel::Channel)
///
/// Every message type has a stable identity string that namespaces the
/// registry keys of its receivers. Delivery itself never compares these
/// strings: receivers are selected by exact [TypeId](std::any::TypeId) match.
///
/// Types declared with [declare!](crate::declare) implement this trait
/// automatically. Manual implementations usually need no items at all:
///
/// ```rust
/// use messagechannel::Message;
///
/// #[derive(Debug)]
/// struct Tick(u64);
///
/// impl Message for Tick {}
///
/// assert!(Tick::identity().ends_with("Tick"));
/// assert_eq!(Tick(3).plain_text(), "Tick(3)");
/// ```
pub trait Message: Any + fmt::Debug {
    /// Identity of this message type
    ///
    /// Must be identical for all values of the type
    /// and distinct from every other participating type
    fn identity() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Human-readable rendering of this message
    fn plain_text(&self) -> String {
        format!("{:?}", self)
    }
}

impl Message for () {}
impl Message for bool {}
impl Message for i32 {}
impl Message for i64 {}
impl Message for u32 {}
impl Message for u64 {}
impl Message for f64 {}
impl Message for String {}
impl Message for &'static str {}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug)]
    struct Ping;

    #[derive(Debug)]
    struct PingPong;

    #[derive(Debug)]
    enum Weather {
        Sunny { celsius: i32 },
    }

    impl Message for Ping {}
    impl Message for PingPong {}
    impl Message for Weather {
        fn identity() -> &'static str {
            "weather"
        }

        fn plain_text(&self) -> String {
            match self {
                Weather::Sunny { celsius } => format!("sunny, {}°C", celsius),
            }
        }
    }

    #[test]
    fn identities_are_distinct() {
        assert_ne!(Ping::identity(), PingPong::identity());
        assert_eq!(Ping::identity(), Ping::identity());
        assert_ne!(<i32 as Message>::identity(), <i64 as Message>::identity());
    }

    #[test]
    fn overridden_identity_and_text() {
        assert_eq!(Weather::identity(), "weather");
        assert_eq!(Weather::Sunny { celsius: 21 }.plain_text(), "sunny, 21°C");
        assert_eq!(Ping.plain_text(), "Ping");
    }
}
