//! Fail-safe trace logging.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::format::format_template;
use super::{TraceTimer, TraceTransport};
use crate::errors::TransportError;

/// Writes trace lines to the host's diagnostic transport without ever
/// failing the caller.
///
/// Every write goes through at most two tiers. The first tier writes the
/// message. If it fails or panics, the second tier writes one line describing
/// the fault and the original message. A second-tier fault is dropped.
#[derive(Clone)]
pub struct DiagnosticLogger {
    transport: Option<Arc<dyn TraceTransport>>,
    trace_timer_start: bool,
}

impl DiagnosticLogger {
    /// Creates a logger over `transport`. `None` makes every call a no-op.
    #[must_use]
    pub fn new(transport: Option<Arc<dyn TraceTransport>>) -> Self {
        Self {
            transport,
            trace_timer_start: true,
        }
    }

    /// Creates a logger that writes nowhere.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Sets whether timers trace a line when they start.
    #[must_use]
    pub fn with_timer_start(mut self, enabled: bool) -> Self {
        self.trace_timer_start = enabled;
        self
    }

    /// Returns true if a transport is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns the attached transport.
    #[must_use]
    pub fn transport(&self) -> Option<&Arc<dyn TraceTransport>> {
        self.transport.as_ref()
    }

    /// Traces `message`. Blank messages are ignored.
    pub fn trace(&self, message: &str) {
        let Some(transport) = self.transport.as_deref() else {
            return;
        };
        if message.trim().is_empty() {
            return;
        }

        if let Err(fault) = contain(|| transport.write(message)) {
            report_fault(transport, message, &fault);
        }
    }

    /// Expands a positional template (`"{0} of {1}"`) and traces the result.
    ///
    /// A malformed template is handled like a failed write.
    pub fn trace_format(&self, format: &str, args: &[&dyn fmt::Display]) {
        let Some(transport) = self.transport.as_deref() else {
            return;
        };
        if format.trim().is_empty() {
            return;
        }

        let written = contain(|| {
            let text = format_template(format, args)?;
            transport.write(&text)
        });
        if let Err(fault) = written {
            report_fault(transport, format, &fault);
        }
    }

    /// Starts a timer that traces its elapsed time when dropped.
    pub fn start_timer(&self, label: impl Into<String>) -> TraceTimer<'_> {
        TraceTimer::start(self, label.into(), self.trace_timer_start)
    }

    /// Starts a timer whose label is a positional template.
    ///
    /// If the template cannot be expanded it is used verbatim as the label.
    pub fn trace_time(&self, format: &str, args: &[&dyn fmt::Display]) -> TraceTimer<'_> {
        let label = contain(|| format_template(format, args)).unwrap_or_else(|_| format.to_string());
        self.start_timer(label)
    }
}

impl Default for DiagnosticLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for DiagnosticLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticLogger")
            .field("enabled", &self.is_enabled())
            .field("trace_timer_start", &self.trace_timer_start)
            .finish()
    }
}

/// Second tier: one attempt to record the fault itself.
fn report_fault(transport: &dyn TraceTransport, message: &str, fault: &TransportError) {
    let line = format!("Exception occurred attempting to trace {message}: {fault}");
    // A fault while reporting a fault is abandoned.
    let _ = contain(|| transport.write(&line));
}

/// Runs `write`, turning a panic into a [`TransportError::Panicked`].
fn contain<T, F>(write: F) -> Result<T, TransportError>
where
    F: FnOnce() -> Result<T, TransportError>,
{
    match panic::catch_unwind(AssertUnwindSafe(write)) {
        Ok(result) => result,
        Err(payload) => Err(TransportError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
