//! Stack frame records.

use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::OnceCell;

use super::handles::{TypeHandle, UnitHandle};
use crate::introspect::Introspect;
use crate::resolve::UnitResolver;

/// Line sentinel: no source line information available.
pub const LINE_UNAVAILABLE: i32 = -1;
/// Line sentinel: the frame executes native/host code with no source mapping.
pub const LINE_NATIVE: i32 = -2;
/// Offset sentinel: no binary offset recorded for the frame.
pub const OFFSET_UNAVAILABLE: i32 = -1;
/// Unit name used when the degraded capture path knows only the owning type.
pub const UNKNOWN_UNIT: &str = "<unknown>";

/// Raw frame tuple produced by a capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame
{
    /// Fully qualified name of the declaring type.
    pub type_name: String,
    /// Executable-unit name within the declaring type.
    pub unit_name: String,
    /// Source file, if recorded.
    pub file: Option<String>,
    /// Source line, or a negative sentinel.
    pub line: i32,
}

impl RawFrame
{
    /// Convenience constructor for capture sources and tests.
    pub fn new(type_name: impl Into<String>, unit_name: impl Into<String>, file: Option<String>, line: i32) -> Self
    {
        Self {
            type_name: type_name.into(),
            unit_name: unit_name.into(),
            file,
            line,
        }
    }
}

/// One captured stack frame plus lazily resolved reflection handles.
///
/// Identity (equality and hashing) covers the four captured fields only.
/// The binary offset and the resolution caches never participate, so two
/// records naming the same logical frame compare equal regardless of how
/// far each one has been resolved.
#[derive(Debug, Clone)]
pub struct FrameRecord
{
    type_name: String,
    unit_name: String,
    file: Option<String>,
    line: i32,
    offset: i32,
    owner: OnceCell<Option<TypeHandle>>,
    unit: OnceCell<Option<UnitHandle>>,
}

impl FrameRecord
{
    /// Basic record: four captured fields, no offset, empty caches.
    pub fn new(type_name: impl Into<String>, unit_name: impl Into<String>, file: Option<String>, line: i32) -> Self
    {
        Self::with_details(type_name.into(), unit_name.into(), file, line, OFFSET_UNAVAILABLE, None, None)
    }

    /// Fully specified record as produced by a preferred-path capture.
    ///
    /// ## Panics
    ///
    /// Panics if a supplied handle's name disagrees with the stored name.
    /// That mismatch means the capture source itself is broken, so it is
    /// reported immediately rather than silently corrected.
    pub fn with_details(
        type_name: String,
        unit_name: String,
        file: Option<String>,
        line: i32,
        offset: i32,
        owner: Option<TypeHandle>,
        unit: Option<UnitHandle>,
    ) -> Self
    {
        if let Some(handle) = &owner {
            if handle.name() != type_name {
                panic!("Type name mismatch: {}, {}", type_name, handle.name());
            }
        }
        if let Some(handle) = &unit {
            if handle.name() != unit_name {
                panic!("Unit name mismatch: {}, {}", unit_name, handle.name());
            }
        }

        Self {
            type_name,
            unit_name,
            file,
            line,
            offset,
            owner: owner.map_or_else(OnceCell::new, |handle| OnceCell::with_value(Some(handle))),
            unit: unit.map_or_else(OnceCell::new, |handle| OnceCell::with_value(Some(handle))),
        }
    }

    pub(crate) fn from_raw(raw: RawFrame) -> Self
    {
        Self::new(raw.type_name, raw.unit_name, raw.file, raw.line)
    }

    pub(crate) fn from_raw_with_owner(raw: RawFrame, owner: Option<TypeHandle>) -> Self
    {
        Self::with_details(raw.type_name, raw.unit_name, raw.file, raw.line, OFFSET_UNAVAILABLE, owner, None)
    }

    /// Degraded record synthesized from a type-context entry alone.
    pub(crate) fn context_only(owner: TypeHandle) -> Self
    {
        Self::with_details(
            owner.name().to_string(),
            UNKNOWN_UNIT.to_string(),
            None,
            LINE_UNAVAILABLE,
            OFFSET_UNAVAILABLE,
            Some(owner),
            None,
        )
    }

    /// Fully qualified name of the declaring type.
    pub fn type_name(&self) -> &str
    {
        &self.type_name
    }

    /// Executable-unit name; [`CONSTRUCTOR_NAME`] for constructor frames.
    ///
    /// [`CONSTRUCTOR_NAME`]: super::handles::CONSTRUCTOR_NAME
    pub fn unit_name(&self) -> &str
    {
        &self.unit_name
    }

    /// Source file, if recorded.
    pub fn file(&self) -> Option<&str>
    {
        self.file.as_deref()
    }

    /// Source line, or a negative sentinel ([`LINE_UNAVAILABLE`], [`LINE_NATIVE`]).
    pub fn line(&self) -> i32
    {
        self.line
    }

    /// Binary offset within the unit's body, or [`OFFSET_UNAVAILABLE`].
    pub fn offset(&self) -> i32
    {
        self.offset
    }

    /// Whether the frame executes native/host code with no source mapping.
    pub fn is_native(&self) -> bool
    {
        self.line == LINE_NATIVE
    }

    /// Owning type handle, resolved against `host` on first access and
    /// memoized. Absence is memoized too.
    ///
    /// ## Panics
    ///
    /// Panics if the host returns a type whose name disagrees with the
    /// stored declaring-type name (a host bug, not a runtime condition).
    pub fn owning_type(&self, host: &dyn Introspect) -> Option<&TypeHandle>
    {
        let owner = self.owner.get_or_init(|| host.find_type(&self.type_name));
        if let Some(handle) = owner {
            if handle.name() != self.type_name {
                panic!("Type name mismatch: {}, {}", self.type_name, handle.name());
            }
        }
        owner.as_ref()
    }

    /// Executable-unit handle, resolved against `host` on first access and
    /// memoized. Resolution is best effort: unreadable metadata leaves the
    /// handle absent, reported through nothing but the `None` result.
    ///
    /// ## Panics
    ///
    /// Panics if a resolved unit's name disagrees with the stored unit name.
    pub fn unit(&self, host: &dyn Introspect) -> Option<&UnitHandle>
    {
        let unit = self.unit.get_or_init(|| UnitResolver::new(host).resolve(self));
        if let Some(handle) = unit {
            if handle.name() != self.unit_name {
                panic!("Unit name mismatch: {}, {}", self.unit_name, handle.name());
            }
        }
        unit.as_ref()
    }

    /// Already-resolved type handle, if any. Never triggers resolution.
    pub fn resolved_type(&self) -> Option<&TypeHandle>
    {
        self.owner.get().and_then(|owner| owner.as_ref())
    }

    /// Already-resolved unit handle, if any. Never triggers resolution.
    pub fn resolved_unit(&self) -> Option<&UnitHandle>
    {
        self.unit.get().and_then(|unit| unit.as_ref())
    }
}

impl PartialEq for FrameRecord
{
    fn eq(&self, other: &Self) -> bool
    {
        self.type_name == other.type_name
            && self.line == other.line
            && self.unit_name == other.unit_name
            && self.file == other.file
    }
}

impl Eq for FrameRecord {}

impl Hash for FrameRecord
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        self.type_name.hash(state);
        self.unit_name.hash(state);
        self.file.hash(state);
        self.line.hash(state);
    }
}

impl fmt::Display for FrameRecord
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.resolved_unit() {
            Some(unit) => write!(f, "{unit}")?,
            None => write!(f, "{}.{}", self.type_name, self.unit_name)?,
        }
        f.write_str(" ")?;
        if self.is_native() {
            return f.write_str("(Native Method)");
        }
        f.write_str("(")?;
        match &self.file {
            Some(file) => {
                f.write_str(file)?;
                if self.line >= 0 {
                    write!(f, ":{}", self.line)?;
                }
            }
            None => f.write_str("Unknown Source")?,
        }
        if self.offset >= 0 {
            write!(f, " bci: {}", self.offset)?;
        }
        f.write_str(")")
    }
}
