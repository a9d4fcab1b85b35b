//! podcast-reconcile library interface
//!
//! Keeps episode posts, transcripts and media consistent across a
//! hand-edited content store. Exposed as a library for the binary and for
//! integration testing.

pub mod adapters;
pub mod config;
pub mod episode;
pub mod error;
pub mod media;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod upload;

pub use crate::config::Settings;
pub use crate::error::{ReconcileError, ReconcileResult};
pub use crate::reconcile::{run_batch, Operation, Outcome, RunContext, RunSummary};
pub use crate::store::StoreIndex;
