//! Mock collaborators for testing plugin contexts.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::diagnostics::TraceTransport;
use crate::errors::{ServiceFault, TransportError};
use crate::services::{
    OrganizationRequest, OrganizationResponse, OrganizationService, OrganizationServiceFactory,
};

/// A transport that records every line written to it.
#[derive(Debug, Default)]
pub struct CollectingTransport {
    lines: Mutex<Vec<String>>,
}

impl CollectingTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Returns the number of recorded lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Returns recorded lines starting with `prefix`.
    #[must_use]
    pub fn lines_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Clears recorded lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl TraceTransport for CollectingTransport {
    fn write(&self, text: &str) -> Result<(), TransportError> {
        self.lines.lock().push(text.to_string());
        Ok(())
    }
}

/// A transport whose every write fails.
#[derive(Debug, Default)]
pub struct FailingTransport {
    attempts: AtomicUsize,
}

impl FailingTransport {
    /// Creates a new failing transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many writes were attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl TraceTransport for FailingTransport {
    fn write(&self, _text: &str) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Write("transport unavailable".to_string()))
    }
}

/// A transport whose every write panics.
#[derive(Debug, Default)]
pub struct PanickingTransport {
    attempts: AtomicUsize,
}

impl PanickingTransport {
    /// Creates a new panicking transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many writes were attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl TraceTransport for PanickingTransport {
    fn write(&self, _text: &str) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        panic!("trace channel closed");
    }
}

/// A transport that fails its first `n` writes and records the rest.
#[derive(Debug)]
pub struct FlakyTransport {
    remaining_failures: AtomicUsize,
    inner: CollectingTransport,
}

impl FlakyTransport {
    /// Creates a transport that fails the first `n` writes.
    #[must_use]
    pub fn failing_first(n: usize) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(n),
            inner: CollectingTransport::new(),
        }
    }

    /// Returns the lines written after the failures ran out.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.inner.lines()
    }
}

impl TraceTransport for FlakyTransport {
    fn write(&self, text: &str) -> Result<(), TransportError> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::Write("transient failure".to_string()));
        }
        self.inner.write(text)
    }
}

/// A service that answers every request with its own parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoService;

impl OrganizationService for EchoService {
    fn execute(&self, request: &OrganizationRequest) -> Result<OrganizationResponse, ServiceFault> {
        Ok(OrganizationResponse {
            response_name: request.request_name.clone(),
            results: request.parameters.clone(),
        })
    }
}

/// A factory that records the users it was asked to impersonate.
#[derive(Debug, Default)]
pub struct RecordingServiceFactory {
    requested: Mutex<Vec<Option<Uuid>>>,
    fault: Option<ServiceFault>,
}

impl RecordingServiceFactory {
    /// Creates a factory that hands out [`EchoService`]s.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory that fails every call with `fault`.
    #[must_use]
    pub fn failing(fault: ServiceFault) -> Self {
        Self {
            requested: Mutex::new(Vec::new()),
            fault: Some(fault),
        }
    }

    /// Returns the number of services requested.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requested.lock().len()
    }

    /// Returns the user ids requested, in call order.
    #[must_use]
    pub fn requested_users(&self) -> Vec<Option<Uuid>> {
        self.requested.lock().clone()
    }
}

impl OrganizationServiceFactory for RecordingServiceFactory {
    fn create_organization_service(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Arc<dyn OrganizationService>, ServiceFault> {
        self.requested.lock().push(user_id);
        match &self.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(Arc::new(EchoService)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_transport() {
        let transport = CollectingTransport::new();
        transport.write("a").unwrap();
        transport.write("b").unwrap();

        assert_eq!(transport.len(), 2);
        assert_eq!(transport.lines_starting_with("a"), vec!["a".to_string()]);

        transport.clear();
        assert!(transport.is_empty());
    }

    #[test]
    fn test_flaky_transport_recovers() {
        let transport = FlakyTransport::failing_first(2);
        assert!(transport.write("1").is_err());
        assert!(transport.write("2").is_err());
        assert!(transport.write("3").is_ok());
        assert_eq!(transport.lines(), vec!["3".to_string()]);
    }

    #[test]
    fn test_recording_factory() {
        let factory = RecordingServiceFactory::new();
        let user = Uuid::new_v4();
        factory.create_organization_service(Some(user)).unwrap();
        factory.create_organization_service(None).unwrap();

        assert_eq!(factory.requested_users(), vec![Some(user), None]);
    }

    #[test]
    fn test_failing_factory() {
        let factory = RecordingServiceFactory::failing(ServiceFault::new("down"));
        assert!(factory.create_organization_service(None).is_err());
        assert_eq!(factory.call_count(), 1);
    }

    #[test]
    fn test_echo_service() {
        let request = OrganizationRequest::new("Echo").with_parameter("x", serde_json::json!(1));
        let response = EchoService.execute(&request).unwrap();
        assert_eq!(response.response_name, "Echo");
        assert_eq!(response.results.get("x"), Some(&serde_json::json!(1)));
    }
}
