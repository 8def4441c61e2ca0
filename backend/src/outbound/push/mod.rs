//! Push delivery adapters.

mod expo;

pub use expo::ExpoPushTransport;
