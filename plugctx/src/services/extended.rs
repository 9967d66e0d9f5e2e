//! Organization service wrapper bound to a context's diagnostics and settings.

use std::fmt;
use std::sync::Arc;

use super::{OrganizationRequest, OrganizationResponse, OrganizationService, ServiceIdentity};
use crate::config::OrganizationServiceSettings;
use crate::diagnostics::DiagnosticLogger;
use crate::errors::ServiceFault;

/// Wraps a factory-created service with request tracing.
///
/// Results and faults of the wrapped service are returned unchanged.
pub struct ExtendedOrganizationService {
    inner: Arc<dyn OrganizationService>,
    logger: DiagnosticLogger,
    settings: OrganizationServiceSettings,
    identity: ServiceIdentity,
}

impl ExtendedOrganizationService {
    /// Binds `inner` to a logger and settings.
    #[must_use]
    pub fn new(
        inner: Arc<dyn OrganizationService>,
        logger: DiagnosticLogger,
        settings: OrganizationServiceSettings,
        identity: ServiceIdentity,
    ) -> Self {
        Self {
            inner,
            logger,
            settings,
            identity,
        }
    }

    /// Returns the wrapped service.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn OrganizationService> {
        &self.inner
    }

    /// Returns the identity the service acts as.
    #[must_use]
    pub const fn identity(&self) -> ServiceIdentity {
        self.identity
    }

    /// Returns the settings the service was bound with.
    #[must_use]
    pub const fn settings(&self) -> &OrganizationServiceSettings {
        &self.settings
    }
}

impl OrganizationService for ExtendedOrganizationService {
    fn execute(&self, request: &OrganizationRequest) -> Result<OrganizationResponse, ServiceFault> {
        if self.settings.trace_requests {
            self.logger.trace_format(
                "Executing {0} request as {1}",
                &[&request.request_name, &self.identity],
            );
        }

        if self.settings.time_requests {
            let _timer = self
                .logger
                .start_timer(format!("{} request", request.request_name));
            self.inner.execute(request)
        } else {
            self.inner.execute(request)
        }
    }
}

impl fmt::Debug for ExtendedOrganizationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedOrganizationService")
            .field("identity", &self.identity)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
