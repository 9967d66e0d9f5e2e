//! Diagnostic tracing for plugin invocations.
//!
//! This module provides:
//! - The [`TraceTransport`] seam to the host's trace channel
//! - A [`DiagnosticLogger`] that never propagates a transport fault
//! - A [`TraceTimer`] scope guard for elapsed-time lines

mod format;
mod logger;
mod timer;
mod transport;

pub use format::format_template;
pub use logger::DiagnosticLogger;
pub use timer::TraceTimer;
pub use transport::{NoOpTransport, TraceTransport, TracingTransport};
