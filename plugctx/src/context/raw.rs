//! The host-supplied snapshot of one plugin invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::core::{
    EntityImageCollection, EntityReference, ExecutionMode, ParameterCollection, PipelineStage,
};

/// Read-only attributes of the current invocation, as supplied by the host.
///
/// The host fills the snapshot once before the plugin runs; nothing in this
/// crate mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContextView {
    /// Pipeline stage.
    pub stage: PipelineStage,
    /// Message name, e.g. `"Create"`.
    pub message_name: String,
    /// Logical name of the primary entity.
    pub primary_entity_name: String,
    /// Logical name of the secondary entity, for relationship messages.
    #[serde(default)]
    pub secondary_entity_name: Option<String>,
    /// Id of the primary record.
    #[serde(default)]
    pub primary_entity_id: Uuid,
    /// Recursion depth of the pipeline.
    #[serde(default = "default_depth")]
    pub depth: i32,
    /// Synchronous or asynchronous execution.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Raw isolation mode value.
    #[serde(default = "default_isolation_mode")]
    pub isolation_mode: i32,
    /// Images captured before the core operation.
    #[serde(default)]
    pub pre_entity_images: EntityImageCollection,
    /// Images captured after the core operation.
    #[serde(default)]
    pub post_entity_images: EntityImageCollection,
    /// The user the step is registered to run as.
    #[serde(default)]
    pub user_id: Uuid,
    /// The user whose request started the pipeline.
    #[serde(default)]
    pub initiating_user_id: Uuid,
    /// Correlates every step of one pipeline run.
    #[serde(default)]
    pub correlation_id: Uuid,
    /// Id of the originating request, if any.
    #[serde(default)]
    pub request_id: Option<Uuid>,
    /// Business unit of the registered user.
    #[serde(default)]
    pub business_unit_id: Uuid,
    /// Organization id.
    #[serde(default)]
    pub organization_id: Uuid,
    /// Organization name.
    #[serde(default)]
    pub organization_name: String,
    /// Id of the asynchronous operation, if queued.
    #[serde(default)]
    pub operation_id: Uuid,
    /// When the asynchronous operation was created.
    #[serde(default)]
    pub operation_created_on: DateTime<Utc>,
    /// Running on a disconnected client.
    #[serde(default)]
    pub is_executing_offline: bool,
    /// Replaying a request recorded offline.
    #[serde(default)]
    pub is_offline_playback: bool,
    /// Running inside the database transaction.
    #[serde(default)]
    pub is_in_transaction: bool,
    /// Request parameters.
    #[serde(default)]
    pub input_parameters: ParameterCollection,
    /// Response parameters.
    #[serde(default)]
    pub output_parameters: ParameterCollection,
    /// Values shared between steps of the same pipeline run.
    #[serde(default)]
    pub shared_variables: ParameterCollection,
    /// The step registration that triggered the plugin.
    #[serde(default)]
    pub owning_extension: Option<EntityReference>,
    /// The invocation that triggered this one, kept for diagnostics only.
    #[serde(skip)]
    pub parent: Option<Weak<RawContextView>>,
}

const fn default_depth() -> i32 {
    1
}

const fn default_isolation_mode() -> i32 {
    2
}

impl RawContextView {
    /// Creates a snapshot for `message_name` on `primary_entity_name` at `stage`.
    #[must_use]
    pub fn new(
        stage: PipelineStage,
        message_name: impl Into<String>,
        primary_entity_name: impl Into<String>,
        primary_entity_id: Uuid,
    ) -> Self {
        Self {
            stage,
            message_name: message_name.into(),
            primary_entity_name: primary_entity_name.into(),
            secondary_entity_name: None,
            primary_entity_id,
            depth: default_depth(),
            mode: ExecutionMode::Synchronous,
            isolation_mode: default_isolation_mode(),
            pre_entity_images: EntityImageCollection::new(),
            post_entity_images: EntityImageCollection::new(),
            user_id: Uuid::nil(),
            initiating_user_id: Uuid::nil(),
            correlation_id: Uuid::new_v4(),
            request_id: None,
            business_unit_id: Uuid::nil(),
            organization_id: Uuid::nil(),
            organization_name: String::new(),
            operation_id: Uuid::nil(),
            operation_created_on: Utc::now(),
            is_executing_offline: false,
            is_offline_playback: false,
            is_in_transaction: false,
            input_parameters: ParameterCollection::new(),
            output_parameters: ParameterCollection::new(),
            shared_variables: ParameterCollection::new(),
            owning_extension: None,
            parent: None,
        }
    }

    /// Sets the secondary entity name.
    #[must_use]
    pub fn with_secondary_entity(mut self, name: impl Into<String>) -> Self {
        self.secondary_entity_name = Some(name.into());
        self
    }

    /// Sets the registered and initiating users.
    #[must_use]
    pub fn with_users(mut self, user_id: Uuid, initiating_user_id: Uuid) -> Self {
        self.user_id = user_id;
        self.initiating_user_id = initiating_user_id;
        self
    }

    /// Sets the recursion depth.
    #[must_use]
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the raw isolation mode.
    #[must_use]
    pub fn with_isolation_mode(mut self, raw: i32) -> Self {
        self.isolation_mode = raw;
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = id;
        self
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Sets the organization.
    #[must_use]
    pub fn with_organization(mut self, id: Uuid, name: impl Into<String>) -> Self {
        self.organization_id = id;
        self.organization_name = name.into();
        self
    }

    /// Sets the pre-operation images.
    #[must_use]
    pub fn with_pre_images(mut self, images: EntityImageCollection) -> Self {
        self.pre_entity_images = images;
        self
    }

    /// Sets the post-operation images.
    #[must_use]
    pub fn with_post_images(mut self, images: EntityImageCollection) -> Self {
        self.post_entity_images = images;
        self
    }

    /// Sets the input parameters.
    #[must_use]
    pub fn with_input_parameters(mut self, parameters: ParameterCollection) -> Self {
        self.input_parameters = parameters;
        self
    }

    /// Sets the shared variables.
    #[must_use]
    pub fn with_shared_variables(mut self, variables: ParameterCollection) -> Self {
        self.shared_variables = variables;
        self
    }

    /// Marks whether the step runs inside the transaction.
    #[must_use]
    pub fn in_transaction(mut self, in_transaction: bool) -> Self {
        self.is_in_transaction = in_transaction;
        self
    }

    /// Sets the parent invocation. Only a weak reference is kept.
    #[must_use]
    pub fn with_parent(mut self, parent: &Arc<RawContextView>) -> Self {
        self.parent = Some(Arc::downgrade(parent));
        self
    }

    /// Returns the parent invocation if it is still alive.
    #[must_use]
    pub fn parent_context(&self) -> Option<Arc<RawContextView>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let id = Uuid::new_v4();
        let raw = RawContextView::new(PipelineStage::PreOperation, "Create", "account", id);

        assert_eq!(raw.primary_entity_id, id);
        assert_eq!(raw.depth, 1);
        assert_eq!(raw.mode, ExecutionMode::Synchronous);
        assert!(raw.secondary_entity_name.is_none());
        assert!(raw.parent_context().is_none());
    }

    #[test]
    fn test_parent_is_weak() {
        let parent = Arc::new(RawContextView::new(PipelineStage::PostOperation, "Update", "account", Uuid::nil()));
        let child = RawContextView::new(PipelineStage::PreOperation, "Create", "task", Uuid::nil()).with_parent(&parent);

        assert_eq!(child.parent_context().unwrap().message_name, "Update");

        drop(parent);
        assert!(child.parent_context().is_none());
    }

    #[test]
    fn test_deserialize_from_host_json() {
        let json = r#"{
            "stage": 40,
            "message_name": "Update",
            "primary_entity_name": "contact",
            "mode": 1,
            "isolation_mode": 2
        }"#;
        let raw: RawContextView = serde_json::from_str(json).unwrap();

        assert_eq!(raw.stage, PipelineStage::PostOperation);
        assert_eq!(raw.mode, ExecutionMode::Asynchronous);
        assert_eq!(raw.depth, 1);
        assert!(raw.parent.is_none());
    }

    #[test]
    fn test_missing_isolation_mode_matches_constructor_default() {
        let json = r#"{"stage": 20, "message_name": "Create", "primary_entity_name": "account"}"#;
        let parsed: RawContextView = serde_json::from_str(json).unwrap();
        let built = RawContextView::new(PipelineStage::PreOperation, "Create", "account", Uuid::nil());

        assert_eq!(parsed.isolation_mode, built.isolation_mode);
        assert_eq!(parsed.isolation_mode, 2);
    }
}
