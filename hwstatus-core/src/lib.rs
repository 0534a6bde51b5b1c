//! Hwstatus Core
//!
//! Core types and rules for the homework status bot.
//!
//! This crate contains:
//! - Domain types: homework records, review statuses and their verdicts
//! - DTOs: the status API response and its shape validation

pub mod domain;
pub mod dto;
