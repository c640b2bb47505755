//! Binary-metadata introspection boundary.
//!
//! The resolver never decodes a host's binary metadata itself. Instead the
//! host implements [`Introspect`], and the resolver drives a [`UnitSink`]
//! visitor over the declared members of one type, much like a class-file or
//! object-file walker, but format-agnostic. The only body information the
//! resolver ever asks for is the (binary offset, source line) pairs of a
//! member's line table.

use crate::error::Result;
use crate::types::TypeHandle;

/// Flags controlling how much of a type's metadata a reader decodes.
///
/// Readers are free to decode more than requested; the flags exist so a
/// host can skip expensive sections it knows the visitor will not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFlags(u32);

impl LoadFlags
{
    /// Decode everything.
    pub const NONE: LoadFlags = LoadFlags(0);
    /// Skip verification/check metadata embedded in unit bodies.
    pub const SKIP_VERIFY_DATA: LoadFlags = LoadFlags(1);
    /// Skip debug tables; no line entries are reported when set.
    pub const SKIP_DEBUG: LoadFlags = LoadFlags(1 << 1);
    /// Skip unit bodies entirely (declarations only).
    pub const SKIP_BODIES: LoadFlags = LoadFlags(1 << 2);

    /// Whether every flag in `flags` is set in `self`.
    pub const fn contains(self, flags: LoadFlags) -> bool
    {
        self.0 & flags.0 == flags.0
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u32
    {
        self.0
    }
}

impl std::ops::BitOr for LoadFlags
{
    type Output = LoadFlags;

    fn bitor(self, rhs: LoadFlags) -> LoadFlags
    {
        LoadFlags(self.0 | rhs.0)
    }
}

/// Visitor over a type's declared members and their line tables.
pub trait UnitSink
{
    /// Called once per declared member, in declaration order. Return `true`
    /// to receive the member body's line entries before [`end_unit`].
    ///
    /// [`end_unit`]: UnitSink::end_unit
    fn begin_unit(&mut self, name: &str, descriptor: &str, access: u32) -> bool;

    /// One (binary offset, source line) pair from the accepted body.
    fn line_entry(&mut self, offset: u32, line: u32);

    /// Marks the end of an accepted member body.
    fn end_unit(&mut self);
}

/// Host-side metadata access consumed by the resolver.
pub trait Introspect
{
    /// Look up a type handle by fully qualified name.
    ///
    /// `None` means the host cannot (or will not) materialize the type;
    /// resolution of frames in that type then stops at the raw fields.
    fn find_type(&self, name: &str) -> Option<TypeHandle>;

    /// Drive `sink` over the declared members of the named type's binary
    /// metadata.
    ///
    /// ## Errors
    ///
    /// Returns an error when the metadata cannot be located or decoded.
    /// Callers inside this crate treat any error as "no answer".
    fn visit_units(&self, name: &str, flags: LoadFlags, sink: &mut dyn UnitSink) -> Result<()>;
}
