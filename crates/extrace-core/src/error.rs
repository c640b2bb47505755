//! # Error Types
//!
//! Error handling for metadata access.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Note the narrow scope: capture and resolution are best-effort operations
//! that report missing information through `None` fields rather than errors
//! (see the crate docs). The variants here exist for the [`Introspect`]
//! boundary, where a host's metadata reader can genuinely fail, and they
//! never escape the resolver: a failed metadata visit simply leaves the
//! frame's unit handle unresolved.
//!
//! [`Introspect`]: crate::introspect::Introspect

use thiserror::Error;

/// Error type for host metadata access.
///
/// ## Error Categories
///
/// 1. **Availability errors**: MetadataUnavailable (the type's binary
///    metadata cannot be located or opened at all)
/// 2. **Decoding errors**: MalformedMetadata (the metadata was found but
///    could not be decoded)
/// 3. **I/O errors**: Io (for hosts whose readers touch the filesystem)
#[derive(Error, Debug)]
pub enum TraceError
{
    /// The named type's binary metadata cannot be loaded
    ///
    /// This happens when:
    /// - The type was unloaded or never materialized by the host
    /// - The host has no metadata source for the type's origin
    ///
    /// Resolution treats this as "no answer", not as a failure: the frame's
    /// unit handle stays unresolved.
    #[error("Metadata unavailable for {type_name}: {details}")]
    MetadataUnavailable
    {
        /// Fully qualified name of the type whose metadata was requested
        type_name: String,
        /// Host-specific description of what went wrong
        details: String,
    },

    /// The type's metadata was located but could not be decoded
    ///
    /// Indicates truncated or corrupt member definitions or line tables.
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    /// I/O error (for hosts whose metadata readers touch files)
    ///
    /// A standard Rust `std::io::Error` converted to our error type.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, TraceError>`
///
/// ```rust
/// use extrace_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TraceError>;
