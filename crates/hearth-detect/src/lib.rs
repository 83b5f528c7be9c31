//! Hearth Detect - race-tolerant completion detection.
//!
//! Determines when an asynchronous side effect of a driven flow — a
//! generated download, a rendered result panel — has finished, in the
//! absence of any direct completion event from the portal. Signal sources
//! (filesystem prefix match, filesystem novelty, DOM appearance, explicit
//! event) are polled in priority order under a bounded window.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod detector;
pub mod error;
pub mod sources;

pub use detector::CompletionDetector;
pub use error::{DetectError, Result};
pub use sources::{
    CompletionSignal, DomSource, EventSource, NewFileSource, PrefixFileSource, SignalKind,
    SignalSource,
};
