//! Driving adapters translating external requests into domain operations.

pub mod http;
