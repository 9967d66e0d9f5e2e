//! Test fixtures for building contexts.

use std::sync::Arc;
use uuid::Uuid;

use super::{CollectingTransport, RecordingServiceFactory};
use crate::context::{RawContextView, ServiceProvider};
use crate::core::{EntityImageCollection, ParameterCollection, PipelineStage};
use crate::diagnostics::TraceTransport;
use crate::events::RegisteredEvent;
use crate::plugin::RegisteredEventsPlugin;
use crate::services::OrganizationServiceFactory;

/// Builds a [`RawContextView`] with generated ids.
#[derive(Debug, Clone)]
pub struct RawContextBuilder {
    raw: RawContextView,
}

impl RawContextBuilder {
    /// Creates a builder for `message` on `entity` at `stage`.
    #[must_use]
    pub fn new(stage: PipelineStage, message: &str, entity: &str) -> Self {
        let raw = RawContextView::new(stage, message, entity, Uuid::new_v4())
            .with_users(Uuid::new_v4(), Uuid::new_v4())
            .with_organization(Uuid::new_v4(), "test-org");
        Self { raw }
    }

    /// Sets the registered and initiating users.
    #[must_use]
    pub fn users(mut self, user_id: Uuid, initiating_user_id: Uuid) -> Self {
        self.raw = self.raw.with_users(user_id, initiating_user_id);
        self
    }

    /// Sets the secondary entity.
    #[must_use]
    pub fn secondary_entity(mut self, name: &str) -> Self {
        self.raw = self.raw.with_secondary_entity(name);
        self
    }

    /// Sets the raw isolation mode.
    #[must_use]
    pub fn isolation_mode(mut self, raw: i32) -> Self {
        self.raw = self.raw.with_isolation_mode(raw);
        self
    }

    /// Sets the pre-operation images.
    #[must_use]
    pub fn pre_images(mut self, images: EntityImageCollection) -> Self {
        self.raw = self.raw.with_pre_images(images);
        self
    }

    /// Sets the post-operation images.
    #[must_use]
    pub fn post_images(mut self, images: EntityImageCollection) -> Self {
        self.raw = self.raw.with_post_images(images);
        self
    }

    /// Sets the input parameters.
    #[must_use]
    pub fn input_parameters(mut self, parameters: ParameterCollection) -> Self {
        self.raw = self.raw.with_input_parameters(parameters);
        self
    }

    /// Sets the parent invocation.
    #[must_use]
    pub fn parent(mut self, parent: &Arc<RawContextView>) -> Self {
        self.raw = self.raw.with_parent(parent);
        self
    }

    /// Builds the snapshot.
    #[must_use]
    pub fn build(self) -> RawContextView {
        self.raw
    }
}

/// A provider that hands out fixed collaborators.
#[derive(Clone, Default)]
pub struct StaticServiceProvider {
    context: Option<Arc<RawContextView>>,
    factory: Option<Arc<dyn OrganizationServiceFactory>>,
    transport: Option<Arc<dyn TraceTransport>>,
}

impl StaticServiceProvider {
    /// Creates a provider for `raw` with no factory and no transport.
    #[must_use]
    pub fn new(raw: RawContextView) -> Self {
        Self {
            context: Some(Arc::new(raw)),
            ..Self::default()
        }
    }

    /// Creates a provider that supplies nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a provider for `raw` with a recording factory and a collecting
    /// transport, and returns both for inspection.
    #[must_use]
    pub fn full(raw: RawContextView) -> (Self, Arc<RecordingServiceFactory>, Arc<CollectingTransport>) {
        let factory = Arc::new(RecordingServiceFactory::new());
        let transport = Arc::new(CollectingTransport::new());
        let provider = Self::new(raw)
            .with_factory(factory.clone())
            .with_transport(transport.clone());
        (provider, factory, transport)
    }

    /// Sets the service factory.
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn OrganizationServiceFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Sets the trace transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn TraceTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl ServiceProvider for StaticServiceProvider {
    fn execution_context(&self) -> Option<Arc<RawContextView>> {
        self.context.clone()
    }

    fn organization_service_factory(&self) -> Option<Arc<dyn OrganizationServiceFactory>> {
        self.factory.clone()
    }

    fn tracing_service(&self) -> Option<Arc<dyn TraceTransport>> {
        self.transport.clone()
    }
}

impl std::fmt::Debug for StaticServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticServiceProvider")
            .field("has_context", &self.context.is_some())
            .field("has_factory", &self.factory.is_some())
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}

/// A plugin backed by a fixed event table.
#[derive(Debug, Clone, Default)]
pub struct TestPlugin {
    events: Vec<RegisteredEvent>,
}

impl TestPlugin {
    /// Creates a plugin declaring `events`.
    #[must_use]
    pub fn new(events: Vec<RegisteredEvent>) -> Self {
        Self { events }
    }
}

impl RegisteredEventsPlugin for TestPlugin {
    fn registered_events(&self) -> &[RegisteredEvent] {
        &self.events
    }
}
