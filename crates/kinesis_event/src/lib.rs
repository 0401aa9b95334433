//! # kinesis_event - Event Delivery
//!
//! Two complementary ways for interested parties to receive events:
//!
//! - [`EventChannel`]: a FIFO queue that consumers poll or drain
//! - [`ObserverSet`]: registered callbacks notified synchronously
//!
//! Both preserve per-tick ordering and deliver every event at least once.
//!
//! # Example
//!
//! ```ignore
//! use kinesis_event::prelude::*;
//!
//! let channel: EventChannel<u32> = EventChannel::new();
//! channel.send(7);
//! assert_eq!(channel.drain(), vec![7]);
//!
//! let observers: ObserverSet<u32> = ObserverSet::new();
//! let id = observers.subscribe(|n| println!("got {}", n));
//! observers.notify(&7);
//! observers.unsubscribe(id);
//! ```

pub mod channel;
pub mod observer;

pub use channel::*;
pub use observer::*;

pub mod prelude {
    pub use crate::channel::EventChannel;
    pub use crate::observer::{EventHandler, ObserverSet, SubscriberId};
}
