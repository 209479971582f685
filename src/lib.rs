//! PROPEDGE: cross-book player-prop edge finder
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod feed;
pub mod strategy;
pub mod report;
pub mod storage;
