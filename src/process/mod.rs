//! File discovery, batch formatting and the incremental cache.
//!
//! A run works in two phases per input root:
//!
//! **Compute** (parallel):
//! - Discover eligible files and their mirrored output paths
//! - Read, format and write each file on the worker pool
//!
//! **Commit** (sequential):
//! - Update counters, the error list and the cache from each file's outcome
//!
//! The entry point is [`Batch::run`]; [`enumerate_files`] is the reusable
//! traversal underneath it.

pub mod batch;
pub mod cache;
pub mod enumerate;

pub use batch::{Batch, BatchReport};
pub use cache::Cache;
pub use enumerate::{enumerate_files, Commit};
