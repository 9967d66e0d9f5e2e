//! Error types for the plugin execution context.
//!
//! Construction and resolution failures are fatal and surface through
//! [`ContextError`]. Faults raised by the diagnostic transport are modelled by
//! [`TransportError`] and never leave the diagnostics module.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::PipelineStage;

/// The main error type for context construction and service resolution.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A required argument was not supplied.
    #[error("{0}")]
    Argument(#[from] ArgumentError),

    /// A required collaborator is missing or could not be obtained.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The invocation matches no declared event.
    #[error("{0}")]
    UnregisteredEvent(#[from] UnregisteredEventError),
}

impl ContextError {
    /// Returns diagnostic metadata for the error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        match self {
            Self::Argument(err) => err.error_info(),
            Self::Configuration(err) => err.error_info(),
            Self::UnregisteredEvent(err) => err.error_info(),
        }
    }
}

/// Metadata about an error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "CTX-002-EVENT").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::Value::String(self.code.clone()));
        map.insert("summary".to_string(), serde_json::Value::String(self.summary.clone()));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::Value::String(hint.clone()));
        }
        if !self.context.is_empty() {
            let context_map: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            map.insert("context".to_string(), serde_json::Value::Object(context_map));
        }

        map
    }
}

/// Error raised when a required constructor argument is absent.
#[derive(Debug, Clone, Error)]
#[error("Value cannot be null. Parameter name: {parameter}")]
pub struct ArgumentError {
    /// The missing parameter.
    pub parameter: String,
}

impl ArgumentError {
    /// Creates a new argument error.
    #[must_use]
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
        }
    }

    /// Returns diagnostic metadata for the error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("CTX-000-ARGUMENT", self.to_string())
            .with_context_entry("parameter", self.parameter.clone())
    }
}

/// The collaborator a [`ConfigurationError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    /// The host's execution context accessor.
    ExecutionContext,
    /// The remote service factory.
    ServiceFactory,
    /// The remote service the factory was asked to create.
    OrganizationService,
    /// The diagnostic transport.
    TracingService,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExecutionContext => write!(f, "execution context"),
            Self::ServiceFactory => write!(f, "organization service factory"),
            Self::OrganizationService => write!(f, "organization service"),
            Self::TracingService => write!(f, "tracing service"),
        }
    }
}

/// Error raised when a required collaborator cannot be obtained.
#[derive(Debug, Clone, Error)]
#[error("Unable to obtain the {collaborator}: {message}")]
pub struct ConfigurationError {
    /// The collaborator that was unavailable.
    pub collaborator: Collaborator,
    /// Additional message.
    pub message: String,
    /// The fault raised while creating the collaborator, if any.
    #[source]
    pub source: Option<ServiceFault>,
}

impl ConfigurationError {
    /// Creates an error for a collaborator the host did not provide.
    #[must_use]
    pub fn missing(collaborator: Collaborator) -> Self {
        Self {
            collaborator,
            message: "the service provider did not supply it".to_string(),
            source: None,
        }
    }

    /// Creates an error for a collaborator whose creation faulted.
    #[must_use]
    pub fn failed(collaborator: Collaborator, source: ServiceFault) -> Self {
        Self {
            collaborator,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns diagnostic metadata for the error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("CTX-001-CONFIGURATION", self.to_string())
            .with_fix_hint("Check that the host registers every collaborator the context needs.")
            .with_context_entry("collaborator", self.collaborator.to_string())
    }
}

/// Error raised when the invocation matches none of the plugin's declared events.
#[derive(Debug, Clone, Error)]
#[error(
    "No registered event found for Stage: {stage}, Message: {message}, Entity: {primary_entity}, Secondary Entity: {}, Plugin: {plugin}",
    .secondary_entity.as_deref().unwrap_or("none")
)]
pub struct UnregisteredEventError {
    /// The runtime stage.
    pub stage: PipelineStage,
    /// The runtime message name.
    pub message: String,
    /// The runtime primary entity name.
    pub primary_entity: String,
    /// The runtime secondary entity name.
    pub secondary_entity: Option<String>,
    /// Type name of the plugin that was invoked.
    pub plugin: String,
}

impl UnregisteredEventError {
    /// Returns diagnostic metadata for the error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("CTX-002-EVENT", self.to_string())
            .with_fix_hint(
                "The step registration and the plugin's declared events disagree; declare the event or remove the step.",
            )
            .with_context_entry("stage", self.stage.value().to_string())
            .with_context_entry("message", self.message.clone())
            .with_context_entry("plugin", self.plugin.clone())
    }
}

/// A fault raised by the remote service factory or a remote service.
///
/// The context never translates these; they pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceFault {
    /// Host-specific fault code, if one was reported.
    pub code: Option<i32>,
    /// The fault message.
    pub message: String,
}

impl ServiceFault {
    /// Creates a fault without a code.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Sets the fault code.
    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

/// A fault raised while writing to the diagnostic transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The transport rejected or failed the write.
    #[error("Trace write failed: {0}")]
    Write(String),

    /// The transport panicked while writing.
    #[error("Trace write panicked: {0}")]
    Panicked(String),

    /// A trace template could not be expanded.
    #[error("Invalid trace format: {0}")]
    Format(String),
}
