#![forbid(unsafe_code)]

//! Core domain model and business logic for suptrack.
//!
//! This crate provides:
//! - The supplement record and its derived metrics
//! - The usage engine (elapsed-time decrement)
//! - The store and its `.sup` file persistence
//! - The cost calculator
//! - CSV inventory export
//! - Configuration and logging setup

pub mod error;
pub mod supplement;
pub mod usage;
pub mod store;
pub mod calculator;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, LoadError, Result, SaveError, ValidationError};
pub use supplement::{format_days, parse_tags, Supplement, SupplementUpdate};
pub use usage::{advance_baseline, apply_decrement, decrement_pass, elapsed_days};
pub use store::Store;
pub use calculator::{compare, CostOption, CostResult};
pub use config::Config;
