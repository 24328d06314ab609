//! `raffle` - trivia kiosk where teams earn raffle tickets
//!
//! Wires the `raffle-core` engine to the filesystem, a YAML configuration
//! file, and an interactive terminal front end.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod storage;
