//! Tests for frame-to-unit resolution against fixture metadata

use std::collections::HashMap;
use std::fmt;

use extrace_core::error::TraceError;
use extrace_core::introspect::{Introspect, LoadFlags, UnitSink};
use extrace_core::types::{FrameRecord, RawFrame, TypeHandle, UnitHandle, LINE_UNAVAILABLE};
use extrace_core::{Result, Traced, TraceSnapshot};

/// One member's binary metadata: name, descriptor, and line-table entries.
struct MemberMeta
{
    name: &'static str,
    descriptor: &'static str,
    lines: Vec<u32>,
}

/// Introspection host backed by in-memory fixtures.
struct FixtureHost
{
    types: HashMap<String, TypeHandle>,
    metadata: HashMap<String, Vec<MemberMeta>>,
}

impl FixtureHost
{
    fn new() -> Self
    {
        Self {
            types: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    fn with_type(mut self, handle: TypeHandle, metadata: Vec<MemberMeta>) -> Self
    {
        self.metadata.insert(handle.name().to_string(), metadata);
        self.types.insert(handle.name().to_string(), handle);
        self
    }
}

impl Introspect for FixtureHost
{
    fn find_type(&self, name: &str) -> Option<TypeHandle>
    {
        self.types.get(name).cloned()
    }

    fn visit_units(&self, name: &str, _flags: LoadFlags, sink: &mut dyn UnitSink) -> Result<()>
    {
        let members = self.metadata.get(name).ok_or_else(|| TraceError::MetadataUnavailable {
            type_name: name.to_string(),
            details: "no fixture".to_string(),
        })?;
        for member in members {
            if sink.begin_unit(member.name, member.descriptor, 0) {
                for (offset, line) in member.lines.iter().enumerate() {
                    sink.line_entry(offset as u32, *line);
                }
                sink.end_unit();
            }
        }
        Ok(())
    }
}

/// A type with `run` overloaded twice plus one unambiguous method.
fn overloaded_host() -> FixtureHost
{
    let handle = TypeHandle::new(
        "demo.Task",
        vec![
            UnitHandle::method("demo.Task", "run", "(I)V", vec!["int".to_string()]),
            UnitHandle::method("demo.Task", "run", "(II)V", vec!["int".to_string(), "int".to_string()]),
            UnitHandle::method("demo.Task", "stop", "()V", Vec::new()),
        ],
    );
    FixtureHost::new().with_type(
        handle,
        vec![
            MemberMeta {
                name: "run",
                descriptor: "(I)V",
                lines: vec![10, 14, 20],
            },
            MemberMeta {
                name: "run",
                descriptor: "(II)V",
                lines: vec![30, 35, 40],
            },
            MemberMeta {
                name: "stop",
                descriptor: "()V",
                lines: vec![50],
            },
        ],
    )
}

#[test]
fn test_resolve_unique_name_fast_path()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "stop", Some("Task.java".to_string()), 50);

    let unit = record.unit(&host).expect("unambiguous name must resolve");
    assert_eq!(unit.descriptor(), "()V");
}

#[test]
fn test_resolve_fast_path_ignores_line()
{
    let host = overloaded_host();
    // A line outside stop's interval is irrelevant when the name is unique.
    let record = FrameRecord::new("demo.Task", "stop", Some("Task.java".to_string()), 999);

    assert!(record.unit(&host).is_some());
}

#[test]
fn test_resolve_overload_by_line_first_interval()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "run", Some("Task.java".to_string()), 15);

    let unit = record.unit(&host).expect("line 15 falls in the first overload");
    assert_eq!(unit.descriptor(), "(I)V");
}

#[test]
fn test_resolve_overload_by_line_second_interval()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "run", Some("Task.java".to_string()), 35);

    let unit = record.unit(&host).expect("line 35 falls in the second overload");
    assert_eq!(unit.descriptor(), "(II)V");
}

#[test]
fn test_resolve_overload_line_outside_all_intervals()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "run", Some("Task.java".to_string()), 99);

    assert!(record.unit(&host).is_none());
}

#[test]
fn test_resolve_overload_without_line()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "run", None, LINE_UNAVAILABLE);

    assert!(record.unit(&host).is_none());
}

#[test]
fn test_resolve_unknown_type()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Missing", "run", None, 15);

    assert!(record.owning_type(&host).is_none());
    assert!(record.unit(&host).is_none());
}

#[test]
fn test_resolve_metadata_error_degrades_to_none()
{
    // The handle exists but the metadata visit fails, so overload
    // disambiguation quietly gives up.
    let handle = TypeHandle::new(
        "demo.Opaque",
        vec![
            UnitHandle::method("demo.Opaque", "run", "(I)V", vec!["int".to_string()]),
            UnitHandle::method("demo.Opaque", "run", "(II)V", vec!["int".to_string(), "int".to_string()]),
        ],
    );
    let mut host = FixtureHost::new();
    host.types.insert("demo.Opaque".to_string(), handle);

    let record = FrameRecord::new("demo.Opaque", "run", Some("Opaque.java".to_string()), 15);
    assert!(record.unit(&host).is_none());
}

#[test]
fn test_resolve_constructor_fast_path()
{
    let handle = TypeHandle::new(
        "demo.Box",
        vec![UnitHandle::constructor("demo.Box", "()V", Vec::new())],
    );
    let host = FixtureHost::new().with_type(
        handle,
        vec![MemberMeta {
            name: "<init>",
            descriptor: "()V",
            lines: vec![5],
        }],
    );

    let record = FrameRecord::new("demo.Box", "<init>", Some("Box.java".to_string()), 5);
    let unit = record.unit(&host).expect("lone constructor must resolve");
    assert!(unit.is_constructor());
}

#[test]
fn test_resolve_is_memoized()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "run", Some("Task.java".to_string()), 15);

    let first = record.unit(&host).expect("resolves") as *const UnitHandle;
    let second = record.unit(&host).expect("resolves") as *const UnitHandle;
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_resolve_absence_is_memoized()
{
    let sparse = overloaded_host();
    let record = FrameRecord::new("demo.Task", "run", Some("Task.java".to_string()), 99);
    assert!(record.unit(&sparse).is_none());

    // A later lookup against a host whose intervals do cover line 99
    // still sees the memoized miss; the first resolution is final.
    let handle = TypeHandle::new(
        "demo.Task",
        vec![
            UnitHandle::method("demo.Task", "run", "(I)V", vec!["int".to_string()]),
            UnitHandle::method("demo.Task", "run", "(II)V", vec!["int".to_string(), "int".to_string()]),
        ],
    );
    let richer = FixtureHost::new().with_type(
        handle,
        vec![
            MemberMeta {
                name: "run",
                descriptor: "(I)V",
                lines: vec![90, 110],
            },
            MemberMeta {
                name: "run",
                descriptor: "(II)V",
                lines: vec![120, 130],
            },
        ],
    );
    let unseen = FrameRecord::new("demo.Task", "run", Some("Task.java".to_string()), 99);
    assert!(unseen.unit(&richer).is_some());
    assert!(record.unit(&richer).is_none());
}

#[test]
fn test_owning_type_is_memoized()
{
    let host = overloaded_host();
    let record = FrameRecord::new("demo.Task", "stop", Some("Task.java".to_string()), 50);

    let first = record.owning_type(&host).expect("fixture type exists") as *const TypeHandle;
    let second = record.owning_type(&host).expect("fixture type exists") as *const TypeHandle;
    assert!(std::ptr::eq(first, second));
}

struct RaisedEvent
{
    frames: Vec<RawFrame>,
}

impl fmt::Display for RaisedEvent
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str("raised event")
    }
}

impl Traced for RaisedEvent
{
    fn raw_frames(&self) -> Vec<RawFrame>
    {
        self.frames.clone()
    }
}

#[test]
fn test_snapshot_resolve_populates_every_frame()
{
    let host = overloaded_host();
    let event = RaisedEvent {
        frames: vec![
            RawFrame::new("demo.Task", "run", Some("Task.java".to_string()), 15),
            RawFrame::new("demo.Task", "stop", Some("Task.java".to_string()), 50),
            RawFrame::new("demo.Missing", "go", None, 3),
        ],
    };

    let snapshot = TraceSnapshot::of(&event);
    snapshot.resolve(&host);

    // Everything the fixture can answer is now resolved in place; later
    // reads need no host.
    let frames = snapshot.frames();
    assert_eq!(frames[0].resolved_type().map(TypeHandle::name), Some("demo.Task"));
    assert_eq!(frames[0].resolved_unit().map(UnitHandle::descriptor), Some("(I)V"));
    assert_eq!(frames[1].resolved_unit().map(UnitHandle::descriptor), Some("()V"));
    // Frames the fixture cannot answer stay unresolved, not errors.
    assert!(frames[2].resolved_type().is_none());
    assert!(frames[2].resolved_unit().is_none());
}

#[test]
#[should_panic(expected = "Type name mismatch")]
fn test_owning_type_rejects_lying_host()
{
    struct LyingHost;

    impl Introspect for LyingHost
    {
        fn find_type(&self, _name: &str) -> Option<TypeHandle>
        {
            Some(TypeHandle::new("demo.Imposter", Vec::new()))
        }

        fn visit_units(&self, _name: &str, _flags: LoadFlags, _sink: &mut dyn UnitSink) -> Result<()>
        {
            Ok(())
        }
    }

    let record = FrameRecord::new("demo.Widget", "draw", None, LINE_UNAVAILABLE);
    record.owning_type(&LyingHost);
}
