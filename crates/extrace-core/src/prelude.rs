//! Convenience re-exports for the common surface of the crate.
//!
//! ```ignore
//! use extrace_core::prelude::*;
//! ```

pub use crate::capture::{install_backend, CaptureBackend};
pub use crate::error::{Result, TraceError};
pub use crate::introspect::{Introspect, LoadFlags, UnitSink};
pub use crate::printer::{FmtSink, LineOut, StreamSink, TraceSink};
pub use crate::resolve::UnitResolver;
pub use crate::snapshot::TraceSnapshot;
pub use crate::traced::{ErrorChain, EventKey, Traced};
pub use crate::types::{
    FrameRecord, RawFrame, TypeHandle, UnitHandle, UnitKind, CONSTRUCTOR_NAME, LINE_NATIVE,
    LINE_UNAVAILABLE, OFFSET_UNAVAILABLE, STATIC_INITIALIZER_NAME, UNKNOWN_UNIT,
};
