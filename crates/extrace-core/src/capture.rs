//! Stack-capture backends and strategy selection.
//!
//! Capture quality depends on what the host runtime can do. A host that can
//! walk its own stacks with full fidelity installs a [`CaptureBackend`] and
//! answers the preferred-path methods; everything else degrades to the
//! basic frames recorded on the event itself, or (for capture-here) to a
//! type-context merge. The choice between preferred and degraded is probed
//! once per process and cached; per-call failures of the preferred path
//! still fall back quietly.

use std::fmt;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::traced::Traced;
use crate::types::{FrameRecord, RawFrame, TypeHandle};

/// Host-runtime capture hooks.
///
/// Every method has a degraded default, so a backend only implements what
/// its host actually supports. Preferred-path methods return `None` when
/// the host cannot produce full-fidelity frames; absence is never an error.
pub trait CaptureBackend: Send + Sync
{
    /// Whether the preferred (full-fidelity) capture path works at all.
    /// Probed once per process; the answer is cached for the lifetime of
    /// the process.
    fn supports_preferred(&self) -> bool
    {
        false
    }

    /// Full-fidelity frames for an already-raised event, innermost first.
    fn frames_for(&self, _event: &dyn Traced) -> Option<Vec<FrameRecord>>
    {
        None
    }

    /// Full-fidelity frames for the current execution point, starting at
    /// the caller of the capture entry point.
    fn frames_here(&self) -> Option<Vec<FrameRecord>>
    {
        None
    }

    /// Basic four-field frames for the current execution point (degraded
    /// path), including the capture machinery's own leading frames.
    fn basic_frames_here(&self) -> Vec<RawFrame>
    {
        Vec::new()
    }

    /// Per-thread type context for the current execution point: owning
    /// types only, innermost first, with no line or unit precision.
    fn type_context(&self) -> Vec<TypeHandle>
    {
        Vec::new()
    }

    /// Whether `frame` was synthesized by reflective-call plumbing. Such
    /// frames have no counterpart entry in the type context.
    fn is_call_artifact(&self, _frame: &RawFrame) -> bool
    {
        false
    }

    /// Whether a type-context entry belongs to call-dispatch plumbing.
    /// Such entries have no counterpart in the raw frame list.
    fn is_meta_context(&self, _type_handle: &TypeHandle) -> bool
    {
        false
    }
}

/// Backend used when no host installed one: everything degrades.
struct HostlessBackend;

impl CaptureBackend for HostlessBackend {}

static HOSTLESS: HostlessBackend = HostlessBackend;
static BACKEND: OnceCell<Box<dyn CaptureBackend>> = OnceCell::new();
static STRATEGY: OnceCell<Strategy> = OnceCell::new();

/// Capture strategy picked by the one-shot capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy
{
    /// The backend answers full-fidelity captures.
    Preferred,
    /// Basic frames and type-context merges only.
    Degraded,
}

/// Install the process-wide capture backend. The first installation wins;
/// returns `false` if a backend was already in place.
///
/// Install before the first capture: the capability probe runs once, at the
/// first capture, and its answer is never revisited.
pub fn install_backend(backend: Box<dyn CaptureBackend>) -> bool
{
    BACKEND.set(backend).is_ok()
}

pub(crate) fn backend() -> &'static dyn CaptureBackend
{
    match BACKEND.get() {
        Some(backend) => backend.as_ref(),
        None => &HOSTLESS,
    }
}

pub(crate) fn strategy() -> Strategy
{
    *STRATEGY.get_or_init(|| {
        if backend().supports_preferred() {
            Strategy::Preferred
        } else {
            debug!("preferred capture unavailable, using degraded strategy");
            Strategy::Degraded
        }
    })
}

/// Synthetic event standing in for "the current execution point".
///
/// Holds the degraded capture material (basic frames plus type context)
/// recorded at construction; the merge into frame records happens lazily.
pub(crate) struct CapturePoint
{
    frames: Vec<RawFrame>,
    context: Vec<TypeHandle>,
}

impl CapturePoint
{
    /// Marker with no degraded material; used when the preferred path has
    /// already produced the frames.
    pub(crate) fn marker() -> Self
    {
        Self {
            frames: Vec::new(),
            context: Vec::new(),
        }
    }

    /// Record the degraded material available right now.
    pub(crate) fn capture(backend: &dyn CaptureBackend) -> Self
    {
        Self {
            frames: backend.basic_frames_here(),
            context: backend.type_context(),
        }
    }

    pub(crate) fn raw(&self) -> &[RawFrame]
    {
        &self.frames
    }

    pub(crate) fn context(&self) -> &[TypeHandle]
    {
        &self.context
    }
}

impl fmt::Display for CapturePoint
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str("Stack trace")
    }
}

impl Traced for CapturePoint
{
    fn raw_frames(&self) -> Vec<RawFrame>
    {
        self.frames.clone()
    }
}
