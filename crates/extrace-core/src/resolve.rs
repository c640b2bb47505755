//! Frame-to-unit resolution.
//!
//! The declared-units fast path handles every frame whose unit name is not
//! overloaded. Overloaded (or absent) names fall back to the type's binary
//! metadata: each same-named member's line table is folded into a
//! [min, max] source-line interval, and the first member whose interval
//! contains the frame's line contributes the descriptor used to pick the
//! declared unit.

use tracing::debug;

use crate::introspect::{Introspect, LoadFlags, UnitSink};
use crate::types::{FrameRecord, UnitHandle};

/// Resolves a frame record's executable unit against one host's metadata.
pub struct UnitResolver<'a>
{
    host: &'a dyn Introspect,
}

impl<'a> UnitResolver<'a>
{
    pub fn new(host: &'a dyn Introspect) -> Self
    {
        Self { host }
    }

    /// Best-effort resolution: a handle whose name equals the record's unit
    /// name exactly, or `None`. Never an incorrect handle.
    pub fn resolve(&self, record: &FrameRecord) -> Option<UnitHandle>
    {
        let owner = record.owning_type(self.host)?;

        let candidates: Vec<&UnitHandle> = owner
            .declared_units()
            .iter()
            .filter(|unit| unit.name() == record.unit_name())
            .collect();
        if candidates.len() == 1 {
            // Fast path: the name is not overloaded.
            return Some(candidates[0].clone());
        }
        if record.line() < 0 {
            return None;
        }

        let descriptor = self.descriptor_for_line(record)?;
        candidates
            .into_iter()
            .find(|unit| unit.descriptor() == descriptor)
            .cloned()
    }

    /// Descriptor of the first same-named member whose line interval
    /// contains the record's line, per the type's binary metadata.
    fn descriptor_for_line(&self, record: &FrameRecord) -> Option<String>
    {
        let mut probe = LineIntervalProbe::new(record.unit_name(), record.line());
        match self
            .host
            .visit_units(record.type_name(), LoadFlags::SKIP_VERIFY_DATA, &mut probe)
        {
            Ok(()) => probe.matched,
            Err(err) => {
                // Best-effort contract: an unreadable type degrades to an
                // unresolved unit, surfaced only through the None result.
                debug!(
                    type_name = record.type_name(),
                    unit_name = record.unit_name(),
                    error = %err,
                    "abandoning unit resolution, metadata unreadable"
                );
                None
            }
        }
    }
}

/// Folds each candidate body's line entries into a [min, max] interval and
/// keeps the descriptor of the first member whose interval contains the
/// target line. Later candidates are not examined once one has matched,
/// even if their intervals would also contain the line.
struct LineIntervalProbe<'n>
{
    unit_name: &'n str,
    line: i32,
    current: Option<IntervalState>,
    matched: Option<String>,
}

struct IntervalState
{
    descriptor: String,
    min_line: i32,
    max_line: i32,
}

impl<'n> LineIntervalProbe<'n>
{
    fn new(unit_name: &'n str, line: i32) -> Self
    {
        Self {
            unit_name,
            line,
            current: None,
            matched: None,
        }
    }
}

impl UnitSink for LineIntervalProbe<'_>
{
    fn begin_unit(&mut self, name: &str, descriptor: &str, _access: u32) -> bool
    {
        if self.matched.is_some() || name != self.unit_name {
            return false;
        }
        self.current = Some(IntervalState {
            descriptor: descriptor.to_string(),
            min_line: i32::MAX,
            max_line: i32::MIN,
        });
        true
    }

    fn line_entry(&mut self, _offset: u32, line: u32)
    {
        if let Some(state) = &mut self.current {
            let line = line as i32;
            if line < state.min_line {
                state.min_line = line;
            }
            if line > state.max_line {
                state.max_line = line;
            }
        }
    }

    fn end_unit(&mut self)
    {
        if let Some(state) = self.current.take() {
            if self.matched.is_none() && state.min_line <= self.line && self.line <= state.max_line {
                self.matched = Some(state.descriptor);
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn feed(probe: &mut LineIntervalProbe<'_>, name: &str, descriptor: &str, lines: &[u32])
    {
        if probe.begin_unit(name, descriptor, 0) {
            for (offset, line) in lines.iter().enumerate() {
                probe.line_entry(offset as u32, *line);
            }
            probe.end_unit();
        }
    }

    #[test]
    fn probe_matches_containing_interval()
    {
        let mut probe = LineIntervalProbe::new("run", 35);
        feed(&mut probe, "run", "(I)V", &[10, 14, 20]);
        feed(&mut probe, "run", "(II)V", &[30, 35, 40]);
        assert_eq!(probe.matched.as_deref(), Some("(II)V"));
    }

    #[test]
    fn probe_first_match_wins()
    {
        let mut probe = LineIntervalProbe::new("run", 15);
        feed(&mut probe, "run", "(I)V", &[10, 20]);
        // Overlapping interval declared later never overrides.
        feed(&mut probe, "run", "(II)V", &[5, 25]);
        assert_eq!(probe.matched.as_deref(), Some("(I)V"));
    }

    #[test]
    fn probe_ignores_other_names_and_empty_bodies()
    {
        let mut probe = LineIntervalProbe::new("run", 15);
        feed(&mut probe, "walk", "(I)V", &[10, 20]);
        feed(&mut probe, "run", "(I)V", &[]);
        assert_eq!(probe.matched, None);
    }
}
