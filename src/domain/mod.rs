//! Core domain types and logic.

pub mod analytics;
pub mod calculator;
pub mod error;
pub mod form;
pub mod journal;
pub mod trade;
