//! # extrace-core
//!
//! Extended stack traces for chained events.
//!
//! This crate provides the core trace machinery, including:
//! - Frame records with lazily resolved type and unit handles
//! - Overload disambiguation from line-number metadata
//! - Chain printing with cycle detection and common-suffix elision
//! - A pluggable capture backend with a degraded fallback path
//!
//! ## Capture strategies
//!
//! - **Preferred**: the installed [`capture::CaptureBackend`] supplies full
//!   frame data (file, line, bytecode offset) directly.
//! - **Degraded**: only a basic walk or a type-context list is available;
//!   frames are reconstructed by merging the two.
//!
//! The strategy is probed once per process, on first use, and never changes
//! afterwards.

pub mod capture;
pub mod error;
pub mod introspect;
pub mod prelude;
pub mod printer;
pub mod resolve;
pub mod snapshot;
pub mod traced;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TraceError};
pub use snapshot::TraceSnapshot;
pub use traced::Traced;
