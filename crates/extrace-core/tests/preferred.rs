//! Tests for snapshot capture on the preferred path
//!
//! Lives in its own binary: the capture strategy is probed once per process,
//! and this backend answers the probe with full-fidelity support.

use std::fmt;

use extrace_core::capture::{install_backend, CaptureBackend};
use extrace_core::types::{FrameRecord, RawFrame};
use extrace_core::{Traced, TraceSnapshot};

struct PreferredBackend;

impl CaptureBackend for PreferredBackend
{
    fn supports_preferred(&self) -> bool
    {
        true
    }

    fn frames_for(&self, event: &dyn Traced) -> Option<Vec<FrameRecord>>
    {
        // The backend declines events it did not see being raised; this one
        // recognizes them by their recorded frames.
        let raw = event.raw_frames();
        if raw.is_empty() {
            return None;
        }
        Some(
            raw.into_iter()
                .map(|frame| {
                    FrameRecord::with_details(frame.type_name, frame.unit_name, frame.file, frame.line, 7, None, None)
                })
                .collect(),
        )
    }

    fn frames_here(&self) -> Option<Vec<FrameRecord>>
    {
        Some(vec![FrameRecord::new(
            "demo.Caller",
            "current",
            Some("Caller.java".to_string()),
            88,
        )])
    }
}

fn install()
{
    let _ = install_backend(Box::new(PreferredBackend));
}

struct TestEvent
{
    frames: Vec<RawFrame>,
}

impl fmt::Display for TestEvent
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str("test event")
    }
}

impl Traced for TestEvent
{
    fn raw_frames(&self) -> Vec<RawFrame>
    {
        self.frames.clone()
    }
}

#[test]
fn test_preferred_event_snapshot_has_offsets()
{
    install();
    let event = TestEvent {
        frames: vec![RawFrame::new("demo.A", "one", Some("A.java".to_string()), 11)],
    };

    let snapshot = TraceSnapshot::of(&event);
    let frames = snapshot.frames();

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].offset(), 7);
}

#[test]
fn test_preferred_declined_event_falls_back_to_basic()
{
    install();
    let event = TestEvent { frames: Vec::new() };

    let snapshot = TraceSnapshot::of(&event);
    assert!(snapshot.frames().is_empty());
}

#[test]
fn test_preferred_here_captures_eagerly()
{
    install();
    let snapshot = TraceSnapshot::here();
    let frames = snapshot.frames();

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].type_name(), "demo.Caller");
    assert_eq!(frames[0].line(), 88);
}

#[test]
fn test_install_backend_first_wins()
{
    install();
    assert!(!install_backend(Box::new(PreferredBackend)));
}
