#![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::missing_panics_doc)]

//! Synchronous typed in-process message channels
//!
//! Producers [send](Channel::send) typed messages into a [Channel];
//! every [Receiver] registered there for that message type is invoked,
//! in registration order, before `send` returns.
//! Receivers can be [projected](Receiver::project) from other message types
//! and [relayed](Relay) from one channel into another.
//!
//! ```rust
//! use messagechannel::{Channel, Receiver, Relay};
//! use std::sync::{Arc, Mutex};
//!
//! messagechannel::declare! {
//!     /// Temperature reading in °C
//!     message Reading(i32);
//!     /// Alarm raised on overheating
//!     message Alarm(i32);
//! }
//!
//! let sensors = Channel::new();
//! let dashboard = Channel::new();
//! let raised = Arc::new(Mutex::new(Vec::new()));
//!
//! let log = raised.clone();
//! Receiver::new(move |alarm: &Alarm| log.lock().unwrap().push(alarm.0))
//!     .project(|reading: &Reading| (reading.0 > 90).then(|| Alarm(reading.0)))
//!     .erase_in(&dashboard)
//!     .register();
//!
//! // everything read by the sensors also reaches the dashboard
//! let _relay = Relay::new(&Receiver::<Reading>::default(), &dashboard, Some(&sensors));
//!
//! Reading(20).send_to(&sensors);
//! Reading(95).send_to(&sensors);
//! assert_eq!(*raised.lock().unwrap(), vec![95]);
//! ```

#[macro_use]
mod common;

pub mod bridge;
pub mod channel;
pub mod message;
pub mod receiver;
pub mod relay;
pub mod tracer;

pub use channel::{default_channel, Channel, Entry};
pub use message::Message;
pub use receiver::{ErasedReceiver, Receiver, ReceiverKey};
pub use relay::Relay;
pub use tracer::Tracer;

#[doc(hidden)]
pub use doc_comment::doc_comment as __doc_comment;

/// Declare [Message](crate::Message) types
///
/// ## Syntax
///
/// `<visibility>? message <name>;` \
/// `<visibility>? message <name>(<fields>);` \
/// `<visibility>? message enum <name> { <variants> }`
///
/// Declared types derive `Debug`, `Clone` and `PartialEq`,
/// get the identity `<module path>::<name>`
/// and a `send_to(&self, &Channel)` method.
///
/// ## Example
///
/// ```rust
/// use messagechannel::Message;
///
/// messagechannel::declare! {
///    /// Ping
///    message Ping;
///    /// Temperature
///    pub(crate) message Temperature(pub f64);
///    /// Greeting
///    pub message enum Greeting { Hello, Goodbye }
/// }
///
/// assert!(Ping::identity().ends_with("::Ping"));
/// assert_ne!(Greeting::identity(), Temperature::identity());
/// assert_eq!(Greeting::Hello.plain_text(), "Hello");
/// ```
#[macro_export]
macro_rules! declare {
    () => {};

    (
        $(#[$attr:meta])*
        $v:vis message enum $name:ident { $($variant:ident),* $(,)? }
        $($next:tt)*
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        $v enum $name { $($variant),* }

        $crate::declare!(@impl $v $name);
        $crate::declare!($($next)*);
    };

    (
        $(#[$attr:meta])*
        $v:vis message $name:ident;
        $($next:tt)*
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        $v struct $name;

        $crate::declare!(@impl $v $name);
        $crate::declare!($($next)*);
    };

    (
        $(#[$attr:meta])*
        $v:vis message $name:ident ($($fields:tt)*);
        $($next:tt)*
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        $v struct $name($($fields)*);

        $crate::declare!(@impl $v $name);
        $crate::declare!($($next)*);
    };

    (@impl $v:vis $name:ident) => {
        impl $crate::Message for $name {
            fn identity() -> &'static str {
                concat!(module_path!(), "::", stringify!($name))
            }
        }

        impl $name {
            $crate::__doc_comment! {
                concat!("Sends this ", stringify!($name), " into `channel`"),
                #[allow(dead_code)]
                #[track_caller]
                $v fn send_to(&self, channel: &$crate::Channel) {
                    channel.send(self)
                }
            }
        }
    };
}
