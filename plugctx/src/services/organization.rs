//! The remote service seam: requests, responses, services and their factory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::ParameterCollection;
use crate::errors::ServiceFault;

/// A named request sent to the remote service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationRequest {
    /// Message name, e.g. `"Retrieve"`.
    pub request_name: String,
    /// Request parameters.
    #[serde(default)]
    pub parameters: ParameterCollection,
}

impl OrganizationRequest {
    /// Creates a request without parameters.
    #[must_use]
    pub fn new(request_name: impl Into<String>) -> Self {
        Self {
            request_name: request_name.into(),
            parameters: ParameterCollection::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters = self.parameters.with(name, value);
        self
    }
}

/// The remote service's answer to an [`OrganizationRequest`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationResponse {
    /// Response name, usually the request name.
    pub response_name: String,
    /// Result values.
    #[serde(default)]
    pub results: ParameterCollection,
}

impl OrganizationResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new(response_name: impl Into<String>) -> Self {
        Self {
            response_name: response_name.into(),
            results: ParameterCollection::new(),
        }
    }

    /// Adds a result value.
    #[must_use]
    pub fn with_result(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.results = self.results.with(name, value);
        self
    }
}

/// A remote service handle bound to one identity.
#[cfg_attr(test, mockall::automock)]
pub trait OrganizationService: Send + Sync {
    /// Sends a request. Blocks until the remote side answers.
    fn execute(&self, request: &OrganizationRequest) -> Result<OrganizationResponse, ServiceFault>;
}

impl fmt::Debug for dyn OrganizationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrganizationService")
    }
}

/// Creates remote service handles, optionally impersonating a user.
#[cfg_attr(test, mockall::automock)]
pub trait OrganizationServiceFactory: Send + Sync {
    /// Creates a service acting as `user_id`, or as the system user for `None`.
    fn create_organization_service(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Arc<dyn OrganizationService>, ServiceFault>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_handle_is_debug() {
        let service: Arc<dyn OrganizationService> = Arc::new(MockOrganizationService::new());
        let result: Result<Arc<dyn OrganizationService>, ServiceFault> = Ok(service);

        assert_eq!(format!("{result:?}"), "Ok(OrganizationService)");
    }

    #[test]
    fn test_request_builder() {
        let request = OrganizationRequest::new("Retrieve").with_parameter("Id", serde_json::json!(7));
        assert_eq!(request.request_name, "Retrieve");
        assert_eq!(request.parameters.get("Id"), Some(&serde_json::json!(7)));
    }
}
