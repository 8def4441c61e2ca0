//! Driven adapters implementing the domain ports against real
//! infrastructure: PostgreSQL persistence and the Expo push API.

pub mod persistence;
pub mod push;
