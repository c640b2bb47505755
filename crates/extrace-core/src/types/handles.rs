//! Reflection handles exposed by a host runtime.

use std::fmt;
use std::sync::Arc;

/// Unit name a host reports for constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";
/// Unit name a host reports for static initializers.
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// Flavor of an executable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind
{
    /// Named method declared on a type.
    Method,
    /// Constructor; always carries the [`CONSTRUCTOR_NAME`] unit name.
    Constructor,
}

#[derive(Debug, PartialEq, Eq)]
struct UnitData
{
    declaring_type: String,
    name: String,
    descriptor: String,
    kind: UnitKind,
    parameter_types: Vec<String>,
}

/// Handle to one executable unit (method or constructor) declared by a type.
///
/// Cheap to clone; the underlying definition is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHandle(Arc<UnitData>);

impl UnitHandle
{
    /// Handle for a declared method.
    pub fn method(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self
    {
        Self(Arc::new(UnitData {
            declaring_type: declaring_type.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            kind: UnitKind::Method,
            parameter_types,
        }))
    }

    /// Handle for a declared constructor (named [`CONSTRUCTOR_NAME`]).
    pub fn constructor(
        declaring_type: impl Into<String>,
        descriptor: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self
    {
        Self(Arc::new(UnitData {
            declaring_type: declaring_type.into(),
            name: CONSTRUCTOR_NAME.to_string(),
            descriptor: descriptor.into(),
            kind: UnitKind::Constructor,
            parameter_types,
        }))
    }

    /// Fully qualified name of the declaring type.
    pub fn declaring_type(&self) -> &str
    {
        &self.0.declaring_type
    }

    /// Unit name; [`CONSTRUCTOR_NAME`] for constructors.
    pub fn name(&self) -> &str
    {
        &self.0.name
    }

    /// Host descriptor string encoding the unit's signature.
    pub fn descriptor(&self) -> &str
    {
        &self.0.descriptor
    }

    /// Whether this unit is a method or a constructor.
    pub fn kind(&self) -> UnitKind
    {
        self.0.kind
    }

    /// Parameter type names, in declaration order.
    pub fn parameter_types(&self) -> &[String]
    {
        &self.0.parameter_types
    }

    /// Convenience test for constructor units.
    pub fn is_constructor(&self) -> bool
    {
        self.0.kind == UnitKind::Constructor
    }
}

impl fmt::Display for UnitHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "{}.{}({})",
            self.0.declaring_type,
            self.0.name,
            self.0.parameter_types.join(",")
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
struct TypeData
{
    name: String,
    units: Vec<UnitHandle>,
}

/// Handle to a host-runtime type and the units it declares directly.
///
/// Cheap to clone; the underlying definition is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandle(Arc<TypeData>);

impl TypeHandle
{
    /// Build a handle from a fully qualified name and its declared units.
    pub fn new(name: impl Into<String>, units: Vec<UnitHandle>) -> Self
    {
        Self(Arc::new(TypeData { name: name.into(), units }))
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &str
    {
        &self.0.name
    }

    /// Units declared directly on this type, in declaration order.
    /// Inherited members are never included.
    pub fn declared_units(&self) -> &[UnitHandle]
    {
        &self.0.units
    }
}

impl fmt::Display for TypeHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.0.name)
    }
}
