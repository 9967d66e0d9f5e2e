//! The host's service provider seam.

use std::sync::Arc;

use super::RawContextView;
use crate::diagnostics::TraceTransport;
use crate::services::OrganizationServiceFactory;

/// Supplies the collaborators an [`super::ExtendedContext`] needs.
///
/// Every accessor may return `None` when the host cannot provide the
/// collaborator. The execution context is read once at construction; the
/// factory and trace transport are read lazily, on first use.
pub trait ServiceProvider: Send + Sync {
    /// Returns the snapshot of the current invocation.
    fn execution_context(&self) -> Option<Arc<RawContextView>>;

    /// Returns the factory for organization services.
    fn organization_service_factory(&self) -> Option<Arc<dyn OrganizationServiceFactory>>;

    /// Returns the host's trace channel.
    fn tracing_service(&self) -> Option<Arc<dyn TraceTransport>>;
}
