//! # svgass markup
//!
//! A minimal, forgiving tag scanner. This is *not* an XML parser: it does
//! not decode entities, resolve namespaces or validate anything. It walks
//! the document once, front to back, and reports what it sees as a flat
//! sequence of [`Event`]s.
//!
//! ```text
//! Begin
//!   Open <svg>          (Parent)
//!     Open <rect/>      (SelfClosing)
//!     Close <rect/>
//!     Text "hello"
//!   Close </svg>        (End)
//! End
//! ```
//!
//! Node views borrow from the input buffer. The only owned data is
//! whitespace-collapsed text content, which is copied only when collapsing
//! actually changed something.
//!
//! Malformed markup never stops the scan. Each recovered problem is
//! attached to the node it was found on as a [`ScanAnomaly`], logged with
//! `tracing::warn!`, and counted in [`ScanStats`].

pub mod scanner;

pub use scanner::{
    collapse_whitespace, Attribute, Event, EventKind, Node, NodeKind, ScanAnomaly, ScanStats,
    Scanner,
};

/// Receiver of scanner events.
///
/// Returning an error stops the scan and hands the error back to the
/// caller of [`scan`].
pub trait EventSink {
    type Error;

    /// Called once per event, in document order.
    fn event(&mut self, event: Event<'_>) -> Result<(), Self::Error>;
}

/// Scan `input` and feed every event to `sink`.
pub fn scan<S: EventSink>(input: &str, sink: &mut S) -> Result<ScanStats, S::Error> {
    let mut scanner = Scanner::new(input);
    for event in scanner.by_ref() {
        sink.event(event)?;
    }
    Ok(scanner.stats())
}
