//! Trace snapshots.

use once_cell::sync::OnceCell;

use crate::capture::{self, CapturePoint, Strategy};
use crate::introspect::Introspect;
use crate::traced::Traced;
use crate::types::FrameRecord;

// Leading entries contributed by the capture entry points themselves:
// `here()` adds one raw frame, and the context generator plus `here()` add
// two type-context entries. The merge drops them so the first record seen
// by the caller is genuinely the caller's frame.
const CAPTURE_FRAMES_SKIPPED: usize = 1;
const CAPTURE_CONTEXT_SKIPPED: usize = 2;

enum EventRef<'e>
{
    Event(&'e dyn Traced),
    Here(CapturePoint),
}

/// How a snapshot's frame sequence gets populated on first read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureKind
{
    /// Full-fidelity frames from the installed backend.
    Preferred,
    /// Basic four-field frames recorded on the event itself.
    Basic,
    /// Lockstep merge of basic frames with the degraded type context.
    Context,
}

/// An ordered, lazily populated sequence of [`FrameRecord`]s captured from
/// a raised event or from the current execution point.
///
/// The frame sequence is filled exactly once, on first read, and frozen
/// from then on. Cause and suppressed sub-traces are looked up on the
/// wrapped event on demand; the snapshot holds no references into the
/// event tree beyond the event itself.
pub struct TraceSnapshot<'e>
{
    event: EventRef<'e>,
    kind: CaptureKind,
    frames: OnceCell<Vec<FrameRecord>>,
}

impl<'e> TraceSnapshot<'e>
{
    /// Snapshot of the trace recorded for `event`.
    ///
    /// Never fails: when the preferred capture path is unavailable (or
    /// declines this particular event), the snapshot degrades to the
    /// event's own basic frames, and missing information shows up as
    /// sentinel or `None` fields.
    pub fn of(event: &'e dyn Traced) -> Self
    {
        let kind = match capture::strategy() {
            Strategy::Preferred => CaptureKind::Preferred,
            Strategy::Degraded => CaptureKind::Basic,
        };
        Self {
            event: EventRef::Event(event),
            kind,
            frames: OnceCell::new(),
        }
    }

    /// Snapshot of the caller's current position.
    ///
    /// The preferred path captures eagerly (the stack changes as soon as
    /// this function returns); the degraded path records basic frames and
    /// the per-thread type context now and merges them lazily.
    pub fn here() -> TraceSnapshot<'static>
    {
        if capture::strategy() == Strategy::Preferred {
            if let Some(frames) = capture::backend().frames_here() {
                return TraceSnapshot {
                    event: EventRef::Here(CapturePoint::marker()),
                    kind: CaptureKind::Preferred,
                    frames: OnceCell::with_value(frames),
                };
            }
        }
        TraceSnapshot {
            event: EventRef::Here(CapturePoint::capture(capture::backend())),
            kind: CaptureKind::Context,
            frames: OnceCell::new(),
        }
    }

    /// The causing event this snapshot wraps.
    pub fn event(&self) -> &dyn Traced
    {
        match &self.event {
            EventRef::Event(event) => *event,
            EventRef::Here(point) => point,
        }
    }

    /// The memoized frame sequence, populated on first call.
    ///
    /// Concurrent first calls are safe: exactly one fill is retained and
    /// every caller observes it.
    pub fn frames(&self) -> &[FrameRecord]
    {
        self.frames.get_or_init(|| self.capture_frames())
    }

    /// Eagerly resolve every frame's owning type and unit against `host`.
    ///
    /// Purely a convenience for callers who want a fully resolved render;
    /// individual frames resolve lazily without it.
    pub fn resolve(&self, host: &dyn Introspect)
    {
        for frame in self.frames() {
            frame.owning_type(host);
            frame.unit(host);
        }
    }

    fn capture_frames(&self) -> Vec<FrameRecord>
    {
        match self.kind {
            CaptureKind::Preferred => capture::backend()
                .frames_for(self.event())
                .unwrap_or_else(|| basic_frames(self.event())),
            CaptureKind::Basic => basic_frames(self.event()),
            CaptureKind::Context => match &self.event {
                EventRef::Here(point) => merge_context(point),
                // Context snapshots are only ever built by `here()`.
                EventRef::Event(event) => basic_frames(*event),
            },
        }
    }
}

impl<'a> IntoIterator for &'a TraceSnapshot<'_>
{
    type Item = &'a FrameRecord;
    type IntoIter = std::slice::Iter<'a, FrameRecord>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.frames().iter()
    }
}

fn basic_frames(event: &dyn Traced) -> Vec<FrameRecord>
{
    event.raw_frames().into_iter().map(FrameRecord::from_raw).collect()
}

/// Walk the raw-frame list and the type-context list in lockstep.
///
/// The context cursor advances past meta/dispatch entries without
/// consuming a frame; the frame cursor advances past reflective-call
/// artifacts without consuming a context entry. With no raw frames at all,
/// records are synthesized from the retained context alone (type name,
/// unknown unit, no line).
fn merge_context(point: &CapturePoint) -> Vec<FrameRecord>
{
    let backend = capture::backend();
    let raw = point.raw();
    let context = point.context();

    if raw.is_empty() {
        return context
            .iter()
            .skip(CAPTURE_CONTEXT_SKIPPED)
            .filter(|type_handle| !backend.is_meta_context(type_handle))
            .map(|type_handle| FrameRecord::context_only(type_handle.clone()))
            .collect();
    }

    let mut records = Vec::with_capacity(raw.len().saturating_sub(CAPTURE_FRAMES_SKIPPED));
    let mut cursor = CAPTURE_CONTEXT_SKIPPED;
    for frame in raw.iter().skip(CAPTURE_FRAMES_SKIPPED) {
        while context.get(cursor).is_some_and(|entry| backend.is_meta_context(entry)) {
            cursor += 1;
        }
        let owner = if backend.is_call_artifact(frame) {
            None
        } else {
            let owner = context.get(cursor).cloned();
            cursor += 1;
            owner
        };
        records.push(FrameRecord::from_raw_with_owner(frame.clone(), owner));
    }
    records
}
