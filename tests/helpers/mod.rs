#![allow(dead_code)]
//! Shared helpers for integration tests.

pub mod mock_collector;
pub mod recording_sink;
pub mod scripts;
