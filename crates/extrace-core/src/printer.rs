//! Chain printing.
//!
//! Renders a snapshot together with its suppressed and cause sub-traces,
//! in that order, the way nested runtime exceptions are conventionally
//! shown: frames shared (as a suffix) with the enclosing trace collapse
//! into a `... N more` line, and events already begun in the current
//! render are cut off with a circular-reference marker instead of
//! recursing forever.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::sync::Mutex;

use crate::snapshot::TraceSnapshot;
use crate::traced::EventKey;
use crate::types::FrameRecord;

const CAUSE_CAPTION: &str = "Caused by: ";
const SUPPRESSED_CAPTION: &str = "Suppressed: ";

/// Line-oriented output available while a sink's lock is held.
pub trait LineOut
{
    /// Append one line (terminator handled by the sink).
    fn println(&mut self, line: &str);
}

/// Output sink whose lock spans one whole recursive render, so concurrent
/// renders cannot interleave their lines.
pub trait TraceSink
{
    fn with_lock(&self, render: &mut dyn FnMut(&mut dyn LineOut));
}

/// Sink adapter over a byte stream.
///
/// Write errors are swallowed, matching print-stream semantics: a failing
/// stderr must never turn trace printing into a second failure.
pub struct StreamSink<W: io::Write>
{
    inner: Mutex<W>,
}

impl<W: io::Write> StreamSink<W>
{
    pub fn new(inner: W) -> Self
    {
        Self { inner: Mutex::new(inner) }
    }

    /// Recover the wrapped stream.
    pub fn into_inner(self) -> W
    {
        self.inner.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: io::Write> TraceSink for StreamSink<W>
{
    fn with_lock(&self, render: &mut dyn FnMut(&mut dyn LineOut))
    {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        render(&mut StreamLine(&mut *guard));
    }
}

struct StreamLine<'a, W: io::Write>(&'a mut W);

impl<W: io::Write> LineOut for StreamLine<'_, W>
{
    fn println(&mut self, line: &str)
    {
        let _ = writeln!(self.0, "{line}");
    }
}

/// Sink adapter over a [`fmt::Write`] target such as a `String`.
pub struct FmtSink<W: fmt::Write>
{
    inner: Mutex<W>,
}

impl<W: fmt::Write> FmtSink<W>
{
    pub fn new(inner: W) -> Self
    {
        Self { inner: Mutex::new(inner) }
    }

    /// Recover the wrapped target.
    pub fn into_inner(self) -> W
    {
        self.inner.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: fmt::Write> TraceSink for FmtSink<W>
{
    fn with_lock(&self, render: &mut dyn FnMut(&mut dyn LineOut))
    {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        render(&mut FmtLine(&mut *guard));
    }
}

struct FmtLine<'a, W: fmt::Write>(&'a mut W);

impl<W: fmt::Write> LineOut for FmtLine<'_, W>
{
    fn println(&mut self, line: &str)
    {
        let _ = writeln!(self.0, "{line}");
    }
}

impl TraceSnapshot<'_>
{
    /// Print this snapshot and its suppressed/cause chain to stderr.
    pub fn print(&self)
    {
        self.print_to(&StreamSink::new(io::stderr()));
    }

    /// Print the chain to `sink`, holding its lock for the whole render.
    pub fn print_to(&self, sink: &dyn TraceSink)
    {
        sink.with_lock(&mut |out| {
            // Fresh identity-keyed visited set per render: an event's own
            // notion of equality must not influence cycle detection.
            let mut visited = HashSet::new();
            self.print_chain(out, None, "", "", &mut visited);
        });
    }

    /// Render the chain into a `String`.
    pub fn render(&self) -> String
    {
        let sink = FmtSink::new(String::new());
        self.print_to(&sink);
        sink.into_inner()
    }

    fn print_chain(
        &self,
        out: &mut dyn LineOut,
        enclosing: Option<&[FrameRecord]>,
        caption: &str,
        prefix: &str,
        visited: &mut HashSet<EventKey>,
    )
    {
        let event = self.event();
        if !visited.insert(EventKey::of(event)) {
            out.println(&format!("\t[CIRCULAR REFERENCE: {event}]"));
            return;
        }

        let trace = self.frames();
        let unique = count_unique_frames(trace, enclosing);

        out.println(&format!("{prefix}{caption}{event}"));
        for record in &trace[..unique] {
            out.println(&format!("{prefix}\tat {record}"));
        }
        let in_common = trace.len() - unique;
        if in_common != 0 {
            out.println(&format!("{prefix}\t... {in_common} more"));
        }

        let suppressed_prefix = format!("{prefix}\t");
        for suppressed in event.suppressed() {
            TraceSnapshot::of(suppressed).print_chain(out, Some(trace), SUPPRESSED_CAPTION, &suppressed_prefix, visited);
        }
        if let Some(cause) = event.cause() {
            TraceSnapshot::of(cause).print_chain(out, Some(trace), CAUSE_CAPTION, prefix, visited);
        }
    }
}

/// Number of leading frames not shared, as a suffix, with the enclosing
/// trace; everything past it gets elided into the `... N more` line.
fn count_unique_frames(trace: &[FrameRecord], enclosing: Option<&[FrameRecord]>) -> usize
{
    let Some(enclosing) = enclosing else {
        return trace.len();
    };
    let in_common = trace
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(ours, theirs)| ours == theirs)
        .count();
    trace.len() - in_common
}
