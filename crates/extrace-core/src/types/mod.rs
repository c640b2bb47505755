//! # Types
//!
//! Host-agnostic trace types.
//!
//! These types describe captured stack frames and the reflection handles a
//! host runtime exposes for them, without committing to any particular host:
//! the rest of the crate works with "type handle" and "executable unit"
//! regardless of which runtime produced them.

pub mod frame;
pub mod handles;

// Re-export all public types
pub use frame::{FrameRecord, RawFrame, LINE_NATIVE, LINE_UNAVAILABLE, OFFSET_UNAVAILABLE, UNKNOWN_UNIT};
pub use handles::{TypeHandle, UnitHandle, UnitKind, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME};
