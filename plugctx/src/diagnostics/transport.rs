//! The diagnostic transport trait and the built-in transports.

use crate::errors::TransportError;

/// The host's trace channel.
///
/// Implementations may fail or even panic; [`super::DiagnosticLogger`] is the
/// only caller and contains both.
pub trait TraceTransport: Send + Sync {
    /// Writes one trace line.
    fn write(&self, text: &str) -> Result<(), TransportError>;
}

/// A transport that forwards trace lines to the `tracing` framework.
///
/// Useful when the host has no trace channel of its own, e.g. in local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTransport;

impl TraceTransport for TracingTransport {
    fn write(&self, text: &str) -> Result<(), TransportError> {
        tracing::info!(target: "plugctx::trace", "{}", text);
        Ok(())
    }
}

/// A transport that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTransport;

impl TraceTransport for NoOpTransport {
    fn write(&self, _text: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_transports_accept_writes() {
        assert!(TracingTransport.write("hello").is_ok());
        assert!(NoOpTransport.write("hello").is_ok());
    }
}
