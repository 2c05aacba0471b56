//! # Event Bus
//!
//! Typed broadcast channels connecting decoupled slices. Domain operations
//! publish facts (for example audit events) and any number of listeners consume
//! them without the publisher knowing who they are.
//!
//! * Events are identified by their Rust type.
//! * `FxHashMap` + `parking_lot::RwLock` registry, `tokio::sync::broadcast` channels.
//! * Publishing with nobody listening is not an error.
//!
//! ```rust
//! use catalog_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct ProductCreated { id: u64 }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<ProductCreated>()?;
//!     bus.publish(ProductCreated { id: 42 })?;
//!
//!     let event = rx.recv_lossy().await.expect("channel open");
//!     assert_eq!(event.id, 42);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
