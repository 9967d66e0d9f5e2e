//! Drives one plugin invocation end to end.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use super::RegisteredEventsPlugin;
use crate::config::ContextSettings;
use crate::context::{ExtendedContext, ServiceProvider};
use crate::errors::ContextError;

/// Errors returned by [`PluginRunner::execute`].
#[derive(Debug, Error)]
pub enum PluginError {
    /// The context could not be built.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The resolved event's handler failed.
    #[error("Plugin {plugin} failed handling {event}")]
    Handler {
        /// Plugin type name.
        plugin: String,
        /// The resolved event.
        event: String,
        /// The handler's error, unchanged.
        #[source]
        source: anyhow::Error,
    },
}

/// Builds an [`ExtendedContext`] per invocation and dispatches to the
/// resolved event's handler.
#[derive(Debug, Clone, Default)]
pub struct PluginRunner {
    settings: ContextSettings,
}

impl PluginRunner {
    /// Creates a runner with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the given settings.
    #[must_use]
    pub fn with_settings(settings: ContextSettings) -> Self {
        Self { settings }
    }

    /// Returns the settings every context is built with.
    #[must_use]
    pub const fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// Runs `plugin` for the invocation `provider` describes.
    ///
    /// A handler error is traced with the context dump before it is returned.
    pub fn execute(
        &self,
        plugin: &dyn RegisteredEventsPlugin,
        provider: Arc<dyn ServiceProvider>,
    ) -> Result<(), PluginError> {
        let ctx = ExtendedContext::builder()
            .service_provider(provider)
            .plugin(plugin)
            .settings(self.settings.clone())
            .build()?;

        let Some(handler) = ctx.event().handler() else {
            ctx.trace_format("No handler registered for {0}", &[ctx.event()]);
            return Ok(());
        };

        ctx.trace_format("Entered {0}.Execute()", &[&ctx.plugin_type_name()]);
        let result = {
            let _timer = ctx.trace_time("{0} handler", &[&handler.name()]);
            handler.call(&ctx)
        };

        match result {
            Ok(()) => {
                ctx.trace_format("Exiting {0}.Execute()", &[&ctx.plugin_type_name()]);
                Ok(())
            }
            Err(err) => {
                warn!(
                    plugin = ctx.plugin_type_name(),
                    event = %ctx.event(),
                    error = %err,
                    "Plugin handler failed"
                );
                ctx.log_error(&*err);
                Err(PluginError::Handler {
                    plugin: ctx.plugin_type_name().to_string(),
                    event: ctx.event().to_string(),
                    source: err,
                })
            }
        }
    }
}
