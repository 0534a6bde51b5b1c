//! Core domain types
//!
//! Homework records as returned by the review API and the rules that turn
//! them into human readable notifications.

pub mod homework;

pub use homework::{HomeworkRecord, HomeworkStatus, StatusError, parse_status};
