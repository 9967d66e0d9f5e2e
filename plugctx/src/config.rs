//! Settings that control the services an extended context hands out.

use serde::{Deserialize, Serialize};

/// Settings applied to every organization service a context resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationServiceSettings {
    /// Trace one line per request before it is sent.
    #[serde(default = "default_trace_requests")]
    pub trace_requests: bool,
    /// Wrap each request in a trace timer.
    #[serde(default = "default_time_requests")]
    pub time_requests: bool,
}

fn default_trace_requests() -> bool {
    true
}

fn default_time_requests() -> bool {
    false
}

impl Default for OrganizationServiceSettings {
    fn default() -> Self {
        Self {
            trace_requests: default_trace_requests(),
            time_requests: default_time_requests(),
        }
    }
}

impl OrganizationServiceSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether requests are traced.
    #[must_use]
    pub fn with_trace_requests(mut self, enabled: bool) -> Self {
        self.trace_requests = enabled;
        self
    }

    /// Sets whether requests are timed.
    #[must_use]
    pub fn with_time_requests(mut self, enabled: bool) -> Self {
        self.time_requests = enabled;
        self
    }
}

/// Settings for an extended plugin context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSettings {
    /// Settings for resolved organization services.
    #[serde(default)]
    pub organization_service: OrganizationServiceSettings,
    /// Trace a line when a timer starts, not only when it ends.
    #[serde(default = "default_trace_timer_start")]
    pub trace_timer_start: bool,
}

fn default_trace_timer_start() -> bool {
    true
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            organization_service: OrganizationServiceSettings::default(),
            trace_timer_start: default_trace_timer_start(),
        }
    }
}

impl ContextSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the organization service settings.
    #[must_use]
    pub fn with_organization_service(mut self, settings: OrganizationServiceSettings) -> Self {
        self.organization_service = settings;
        self
    }

    /// Sets whether timers trace their start.
    #[must_use]
    pub fn with_trace_timer_start(mut self, enabled: bool) -> Self {
        self.trace_timer_start = enabled;
        self
    }
}
