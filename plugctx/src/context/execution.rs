//! The extended execution context handed to plugin logic.

use chrono::{DateTime, Utc};
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::{RawContextView, ServiceProvider};
use crate::config::ContextSettings;
use crate::core::{
    Entity, EntityImageCollection, EntityReference, ExecutionMode, IsolationMode,
    ParameterCollection, PipelineStage, POST_IMAGE, PRE_IMAGE, TARGET,
};
use crate::diagnostics::{DiagnosticLogger, TraceTimer};
use crate::errors::{ArgumentError, Collaborator, ConfigurationError, ContextError};
use crate::events::{EventKey, EventMatcher, ResolvedEvent};
use crate::plugin::RegisteredEventsPlugin;
use crate::services::{OrganizationService, ServiceIdentity, ServiceResolver};

/// Everything a plugin needs for one invocation.
///
/// The event is resolved once, when the context is built. Services and the
/// trace channel are fetched from the [`ServiceProvider`] on first use and
/// cached for the life of the context. A context belongs to a single
/// invocation and is not meant to be shared across threads; its lazy caches
/// make it `!Sync`.
pub struct ExtendedContext {
    raw: Arc<RawContextView>,
    provider: Arc<dyn ServiceProvider>,
    event: ResolvedEvent,
    isolation_mode: IsolationMode,
    plugin_type_name: String,
    settings: ContextSettings,
    resolver: ServiceResolver,
    logger: OnceCell<DiagnosticLogger>,
}

impl ExtendedContext {
    /// Returns a builder.
    #[must_use]
    pub fn builder<'p>() -> ExtendedContextBuilder<'p> {
        ExtendedContextBuilder::default()
    }

    /// Builds a context for the invocation `provider` describes.
    ///
    /// Fails if the provider has no execution context or if the invocation
    /// matches none of the plugin's declared events.
    pub fn new(
        provider: Arc<dyn ServiceProvider>,
        plugin: &dyn RegisteredEventsPlugin,
        settings: ContextSettings,
    ) -> Result<Self, ContextError> {
        let raw = provider
            .execution_context()
            .ok_or_else(|| ConfigurationError::missing(Collaborator::ExecutionContext))?;

        let plugin_type_name = plugin.type_name().to_string();
        let event = EventMatcher::new(plugin.registered_events())
            .resolve(&EventKey::from_context(&raw), &plugin_type_name)?;

        let resolver = ServiceResolver::new(
            Arc::clone(&provider),
            raw.user_id,
            raw.initiating_user_id,
            settings.organization_service.clone(),
        );

        Ok(Self {
            isolation_mode: IsolationMode::from(raw.isolation_mode),
            raw,
            provider,
            event,
            plugin_type_name,
            settings,
            resolver,
            logger: OnceCell::new(),
        })
    }

    // Host attributes

    /// Returns the raw host snapshot.
    #[must_use]
    pub fn raw(&self) -> &RawContextView {
        &self.raw
    }

    /// Returns the pipeline stage.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.raw.stage
    }

    /// Returns the message name.
    #[must_use]
    pub fn message_name(&self) -> &str {
        &self.raw.message_name
    }

    /// Returns the primary entity name.
    #[must_use]
    pub fn primary_entity_name(&self) -> &str {
        &self.raw.primary_entity_name
    }

    /// Returns the secondary entity name.
    #[must_use]
    pub fn secondary_entity_name(&self) -> Option<&str> {
        self.raw.secondary_entity_name.as_deref()
    }

    /// Returns the primary entity id.
    #[must_use]
    pub fn primary_entity_id(&self) -> Uuid {
        self.raw.primary_entity_id
    }

    /// Returns the recursion depth.
    #[must_use]
    pub fn depth(&self) -> i32 {
        self.raw.depth
    }

    /// Returns the execution mode.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.raw.mode
    }

    /// Returns the isolation mode, derived once at construction.
    #[must_use]
    pub const fn isolation_mode(&self) -> IsolationMode {
        self.isolation_mode
    }

    /// Returns the registered user id.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.raw.user_id
    }

    /// Returns the initiating user id.
    #[must_use]
    pub fn initiating_user_id(&self) -> Uuid {
        self.raw.initiating_user_id
    }

    /// Returns the correlation id.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.raw.correlation_id
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> Option<Uuid> {
        self.raw.request_id
    }

    /// Returns the business unit id.
    #[must_use]
    pub fn business_unit_id(&self) -> Uuid {
        self.raw.business_unit_id
    }

    /// Returns the organization id.
    #[must_use]
    pub fn organization_id(&self) -> Uuid {
        self.raw.organization_id
    }

    /// Returns the organization name.
    #[must_use]
    pub fn organization_name(&self) -> &str {
        &self.raw.organization_name
    }

    /// Returns the asynchronous operation id.
    #[must_use]
    pub fn operation_id(&self) -> Uuid {
        self.raw.operation_id
    }

    /// Returns when the asynchronous operation was created.
    #[must_use]
    pub fn operation_created_on(&self) -> DateTime<Utc> {
        self.raw.operation_created_on
    }

    /// Returns true when running on a disconnected client.
    #[must_use]
    pub fn is_executing_offline(&self) -> bool {
        self.raw.is_executing_offline
    }

    /// Returns true when replaying an offline request.
    #[must_use]
    pub fn is_offline_playback(&self) -> bool {
        self.raw.is_offline_playback
    }

    /// Returns true when running inside the database transaction.
    #[must_use]
    pub fn is_in_transaction(&self) -> bool {
        self.raw.is_in_transaction
    }

    /// Returns the request parameters.
    #[must_use]
    pub fn input_parameters(&self) -> &ParameterCollection {
        &self.raw.input_parameters
    }

    /// Returns the response parameters.
    #[must_use]
    pub fn output_parameters(&self) -> &ParameterCollection {
        &self.raw.output_parameters
    }

    /// Returns the shared variables.
    #[must_use]
    pub fn shared_variables(&self) -> &ParameterCollection {
        &self.raw.shared_variables
    }

    /// Returns the pre-operation images.
    #[must_use]
    pub fn pre_entity_images(&self) -> &EntityImageCollection {
        &self.raw.pre_entity_images
    }

    /// Returns the post-operation images.
    #[must_use]
    pub fn post_entity_images(&self) -> &EntityImageCollection {
        &self.raw.post_entity_images
    }

    /// Returns the step registration that triggered the plugin.
    #[must_use]
    pub fn owning_extension(&self) -> Option<&EntityReference> {
        self.raw.owning_extension.as_ref()
    }

    /// Returns the parent invocation, if it is still alive.
    #[must_use]
    pub fn parent_context(&self) -> Option<Arc<RawContextView>> {
        self.raw.parent_context()
    }

    // Derived values

    /// Returns a reference to the primary record. Built fresh on each call.
    #[must_use]
    pub fn primary_entity(&self) -> EntityReference {
        EntityReference::new(self.raw.primary_entity_name.clone(), self.raw.primary_entity_id)
    }

    /// Returns the image registered under the default pre-image name.
    #[must_use]
    pub fn pre_image(&self) -> Option<&Entity> {
        self.raw.pre_entity_images.get(PRE_IMAGE)
    }

    /// Returns the image registered under the default post-image name.
    #[must_use]
    pub fn post_image(&self) -> Option<&Entity> {
        self.raw.post_entity_images.get(POST_IMAGE)
    }

    /// Returns the `Target` input parameter as an entity.
    #[must_use]
    pub fn target(&self) -> Option<Entity> {
        self.raw.input_parameters.get_as(TARGET)
    }

    /// Returns the event resolved for this invocation.
    #[must_use]
    pub const fn event(&self) -> &ResolvedEvent {
        &self.event
    }

    /// Returns the plugin's type name.
    #[must_use]
    pub fn plugin_type_name(&self) -> &str {
        &self.plugin_type_name
    }

    /// Returns the settings the context was built with.
    #[must_use]
    pub const fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// Returns the host's service provider.
    #[must_use]
    pub fn service_provider(&self) -> &Arc<dyn ServiceProvider> {
        &self.provider
    }

    // Services

    /// Returns the service for `identity`, creating it on first use.
    pub fn resolve_service(
        &self,
        identity: ServiceIdentity,
    ) -> Result<Arc<dyn OrganizationService>, ContextError> {
        Ok(self.resolver.resolve(identity, self.logger())?)
    }

    /// Service impersonating the user the step is registered to run as.
    pub fn organization_service(&self) -> Result<Arc<dyn OrganizationService>, ContextError> {
        self.resolve_service(ServiceIdentity::RegisteredUser)
    }

    /// Service impersonating the user who triggered the pipeline.
    pub fn initiating_user_organization_service(
        &self,
    ) -> Result<Arc<dyn OrganizationService>, ContextError> {
        self.resolve_service(ServiceIdentity::InitiatingUser)
    }

    /// Service acting as the system user.
    pub fn system_organization_service(&self) -> Result<Arc<dyn OrganizationService>, ContextError> {
        self.resolve_service(ServiceIdentity::System)
    }

    // Tracing

    /// Returns the diagnostic logger, fetching the trace channel on first use.
    pub fn logger(&self) -> &DiagnosticLogger {
        self.logger.get_or_init(|| {
            DiagnosticLogger::new(self.provider.tracing_service())
                .with_timer_start(self.settings.trace_timer_start)
        })
    }

    /// Traces a message. Never fails.
    pub fn trace(&self, message: &str) {
        self.logger().trace(message);
    }

    /// Traces a positional template (`"{0} of {1}"`). Never fails.
    pub fn trace_format(&self, format: &str, args: &[&dyn fmt::Display]) {
        self.logger().trace_format(format, args);
    }

    /// Starts a timer that traces its elapsed time when dropped.
    pub fn start_timer(&self, label: impl Into<String>) -> TraceTimer<'_> {
        self.logger().start_timer(label)
    }

    /// Starts a timer labelled with a positional template.
    pub fn trace_time(&self, format: &str, args: &[&dyn fmt::Display]) -> TraceTimer<'_> {
        self.logger().trace_time(format, args)
    }

    /// Traces an error with its source chain, followed by [`Self::context_info`].
    pub fn log_error(&self, error: &(dyn std::error::Error + 'static)) {
        let mut chain = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push_str("\n  Caused by: ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }
        self.trace_format("Exception: {0}", &[&chain]);
        self.trace(&self.context_info());
    }
}

impl fmt::Debug for ExtendedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedContext")
            .field("plugin", &self.plugin_type_name)
            .field("event", &self.event)
            .field("isolation_mode", &self.isolation_mode)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExtendedContext`].
///
/// The service provider and plugin are required; a missing one is an
/// [`ArgumentError`] raised before anything else is looked at.
#[derive(Default)]
pub struct ExtendedContextBuilder<'p> {
    provider: Option<Arc<dyn ServiceProvider>>,
    plugin: Option<&'p dyn RegisteredEventsPlugin>,
    settings: Option<ContextSettings>,
}

impl<'p> ExtendedContextBuilder<'p> {
    /// Sets the service provider.
    #[must_use]
    pub fn service_provider(mut self, provider: Arc<dyn ServiceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the plugin whose declared events are matched.
    #[must_use]
    pub fn plugin(mut self, plugin: &'p dyn RegisteredEventsPlugin) -> Self {
        self.plugin = Some(plugin);
        self
    }

    /// Sets the settings. Defaults apply otherwise.
    #[must_use]
    pub fn settings(mut self, settings: ContextSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Builds the context.
    pub fn build(self) -> Result<ExtendedContext, ContextError> {
        let plugin = self.plugin.ok_or_else(|| ArgumentError::new("plugin"))?;
        let provider = self
            .provider
            .ok_or_else(|| ArgumentError::new("service_provider"))?;
        ExtendedContext::new(provider, plugin, self.settings.unwrap_or_default())
    }
}

impl fmt::Debug for ExtendedContextBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedContextBuilder")
            .field("has_provider", &self.provider.is_some())
            .field("has_plugin", &self.plugin.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
