//! Lazy, per-invocation resolution of identity-bound organization services.

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::{ExtendedOrganizationService, OrganizationService, OrganizationServiceFactory, ServiceIdentity};
use crate::config::OrganizationServiceSettings;
use crate::context::ServiceProvider;
use crate::diagnostics::DiagnosticLogger;
use crate::errors::{Collaborator, ConfigurationError};

/// Resolves one organization service per [`ServiceIdentity`], at most once.
///
/// The factory is fetched from the provider on the first resolution and kept.
/// Each identity slot is filled on first use and never replaced, so repeated
/// calls return the same `Arc`.
pub struct ServiceResolver {
    provider: Arc<dyn ServiceProvider>,
    user_id: Uuid,
    initiating_user_id: Uuid,
    settings: OrganizationServiceSettings,
    factory: OnceCell<Arc<dyn OrganizationServiceFactory>>,
    cache: [OnceCell<Arc<dyn OrganizationService>>; 3],
}

impl ServiceResolver {
    /// Creates a resolver. Nothing is fetched until [`resolve`](Self::resolve).
    #[must_use]
    pub fn new(
        provider: Arc<dyn ServiceProvider>,
        user_id: Uuid,
        initiating_user_id: Uuid,
        settings: OrganizationServiceSettings,
    ) -> Self {
        Self {
            provider,
            user_id,
            initiating_user_id,
            settings,
            factory: OnceCell::new(),
            cache: [OnceCell::new(), OnceCell::new(), OnceCell::new()],
        }
    }

    /// Returns the user id a service for `identity` impersonates.
    #[must_use]
    pub const fn user_id_for(&self, identity: ServiceIdentity) -> Option<Uuid> {
        match identity {
            ServiceIdentity::RegisteredUser => Some(self.user_id),
            ServiceIdentity::InitiatingUser => Some(self.initiating_user_id),
            ServiceIdentity::System => None,
        }
    }

    /// Returns true if a service for `identity` has already been created.
    #[must_use]
    pub fn is_resolved(&self, identity: ServiceIdentity) -> bool {
        self.cache[identity.slot()].get().is_some()
    }

    /// Returns the service for `identity`, creating it on first use.
    ///
    /// The created service is bound to `logger`, which must have a transport.
    pub fn resolve(
        &self,
        identity: ServiceIdentity,
        logger: &DiagnosticLogger,
    ) -> Result<Arc<dyn OrganizationService>, ConfigurationError> {
        let slot = &self.cache[identity.slot()];
        if let Some(service) = slot.get() {
            return Ok(Arc::clone(service));
        }

        let factory = self.factory()?;
        if !logger.is_enabled() {
            return Err(ConfigurationError::missing(Collaborator::TracingService));
        }

        let user_id = self.user_id_for(identity);
        debug!(%identity, ?user_id, "Creating organization service");
        let inner = factory
            .create_organization_service(user_id)
            .map_err(|fault| ConfigurationError::failed(Collaborator::OrganizationService, fault))?;

        let service: Arc<dyn OrganizationService> = Arc::new(ExtendedOrganizationService::new(
            inner,
            logger.clone(),
            self.settings.clone(),
            identity,
        ));
        Ok(Arc::clone(slot.get_or_init(|| service)))
    }

    fn factory(&self) -> Result<&Arc<dyn OrganizationServiceFactory>, ConfigurationError> {
        if let Some(factory) = self.factory.get() {
            return Ok(factory);
        }
        let factory = self
            .provider
            .organization_service_factory()
            .ok_or_else(|| ConfigurationError::missing(Collaborator::ServiceFactory))?;
        Ok(self.factory.get_or_init(|| factory))
    }
}

impl fmt::Debug for ServiceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved: Vec<ServiceIdentity> = ServiceIdentity::ALL
            .into_iter()
            .filter(|i| self.is_resolved(*i))
            .collect();
        f.debug_struct("ServiceResolver")
            .field("user_id", &self.user_id)
            .field("initiating_user_id", &self.initiating_user_id)
            .field("resolved", &resolved)
            .finish_non_exhaustive()
    }
}
