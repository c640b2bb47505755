//! The causing-event boundary.
//!
//! A [`Traced`] value is anything whose raising produced a stack trace: a
//! host error object, a guest-language exception value, or the synthetic
//! marker used for capture-at-the-current-point. Cause and suppression
//! relationships live on the event itself and are consulted on demand; a
//! snapshot never stores owning references into the event tree.

use std::fmt;

use crate::types::RawFrame;

/// A value whose raising produced a stack trace, possibly chained to other
/// traced values through cause and suppression relationships.
///
/// Events are expected to be shareable across threads (captures and renders
/// may happen anywhere), hence the `Send + Sync` bound.
pub trait Traced: fmt::Display + Send + Sync
{
    /// Basic four-field frames recorded when the event was raised,
    /// innermost first. An empty list means no trace was recorded.
    fn raw_frames(&self) -> Vec<RawFrame>;

    /// The event this one was caused by, if any.
    fn cause(&self) -> Option<&dyn Traced>
    {
        None
    }

    /// Events suppressed while this one propagated, in attachment order.
    fn suppressed(&self) -> Vec<&dyn Traced>
    {
        Vec::new()
    }
}

/// Identity key for a traced event.
///
/// Keyed on the trait object's data pointer, never on any equality the
/// event type defines, so the printer's cycle guard cannot be confused by
/// value-equal (or maliciously equal) events. Keys are only meaningful
/// while the events they were taken from are alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey(*const ());

impl EventKey
{
    /// Identity key for `event`.
    pub fn of(event: &dyn Traced) -> Self
    {
        Self(event as *const dyn Traced as *const ())
    }
}

/// Adapter presenting a plain `std::error::Error` chain as a cause chain of
/// frame-less traced events, so ordinary Rust errors can be rendered with
/// the chain printer.
///
/// Messages are snapshotted eagerly (one `Display` render per link), which
/// keeps the adapter free of lifetime ties to the source error.
pub struct ErrorChain
{
    message: String,
    cause: Option<Box<ErrorChain>>,
}

impl ErrorChain
{
    /// Snapshot `error` and its `source()` chain.
    pub fn new(error: &(dyn std::error::Error + 'static)) -> Self
    {
        Self {
            message: error.to_string(),
            cause: error.source().map(|source| Box::new(ErrorChain::new(source))),
        }
    }
}

impl fmt::Display for ErrorChain
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.message)
    }
}

impl Traced for ErrorChain
{
    fn raw_frames(&self) -> Vec<RawFrame>
    {
        Vec::new()
    }

    fn cause(&self) -> Option<&dyn Traced>
    {
        self.cause.as_deref().map(|cause| cause as &dyn Traced)
    }
}
