//! # Plugctx
//!
//! An extended execution context for plugins running inside a transactional
//! business pipeline.
//!
//! Each invocation gets an [`ExtendedContext`](context::ExtendedContext) that:
//!
//! - **Resolves its event once**: the runtime stage, message and entity are
//!   matched against the plugin's declared events, with wildcard fallback
//! - **Resolves services lazily**: one organization service per identity,
//!   created on first use and cached for the invocation
//! - **Traces without failing**: diagnostic writes never propagate a fault
//!   back into the host pipeline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plugctx::prelude::*;
//!
//! struct AccountPlugin {
//!     events: Vec<RegisteredEvent>,
//! }
//!
//! impl RegisteredEventsPlugin for AccountPlugin {
//!     fn registered_events(&self) -> &[RegisteredEvent] {
//!         &self.events
//!     }
//! }
//!
//! let plugin = AccountPlugin {
//!     events: vec![RegisteredEvent::new(PipelineStage::PreOperation, "Create")
//!         .for_entity("account")
//!         .handled_by("on_create", |ctx| {
//!             let _timer = ctx.start_timer("on_create");
//!             let service = ctx.organization_service()?;
//!             service.execute(&OrganizationRequest::new("WhoAmI"))?;
//!             Ok(())
//!         })],
//! };
//!
//! PluginRunner::new().execute(&plugin, host_provider)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod diagnostics;
pub mod errors;
pub mod events;
pub mod observability;
pub mod plugin;
pub mod services;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ContextSettings, OrganizationServiceSettings};
    pub use crate::context::{ExtendedContext, RawContextView, ServiceProvider};
    pub use crate::core::{
        Entity, EntityImageCollection, EntityReference, ExecutionMode, IsolationMode,
        ParameterCollection, PipelineStage, POST_IMAGE, PRE_IMAGE, TARGET,
    };
    pub use crate::diagnostics::{DiagnosticLogger, TraceTimer, TraceTransport, TracingTransport};
    pub use crate::errors::{
        ArgumentError, ConfigurationError, ContextError, ServiceFault, TransportError,
        UnregisteredEventError,
    };
    pub use crate::events::{EventHandler, MessageType, RegisteredEvent, ResolvedEvent};
    pub use crate::plugin::{PluginError, PluginRunner, RegisteredEventsPlugin};
    pub use crate::services::{
        OrganizationRequest, OrganizationResponse, OrganizationService,
        OrganizationServiceFactory, ServiceIdentity,
    };
}
