//! Scheduler layer for the bot
//!
//! This layer drives the poll loop: one cycle at a time, a fixed pause
//! between cycles, and the dedup state that keeps notifications from
//! repeating.

pub mod error;
pub mod poller;

pub use poller::StatusPoller;
