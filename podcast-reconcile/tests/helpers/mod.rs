//! Test Helper Utilities
//!
//! Shared fixtures for podcast-reconcile integration tests

#![allow(dead_code, unused_imports)]

pub mod mock_adapters;
pub mod store_fixture;

pub use mock_adapters::{CannedSummarizer, ScriptedTranscriber};
pub use store_fixture::{TestStore, EPISODE_MEDIA, LEGACY_PREFIX};
