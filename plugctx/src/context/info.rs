//! Human-readable dump of an invocation, for error reports.

use super::ExtendedContext;
use crate::core::{EntityImageCollection, ParameterCollection};

impl ExtendedContext {
    /// Describes the invocation: plugin, event, ids, parameters and images.
    #[must_use]
    pub fn context_info(&self) -> String {
        let raw = self.raw();
        let event = self.event();
        let none = || "(none)".to_string();

        let mut lines = vec![
            "**** Context Info ****".to_string(),
            format!("Plugin: {}", self.plugin_type_name()),
            "* Registered Event *".to_string(),
            format!("   Stage: {}", event.stage()),
            format!("   Message: {}", event.message()),
            format!("   Entity: {}", event.entity_logical_name().unwrap_or("(all entities)")),
            format!("   Handler: {}", event.handler().map_or("(none)", |h| h.name())),
            format!("UserId: {}", raw.user_id),
            format!("InitiatingUserId: {}", raw.initiating_user_id),
            format!("CorrelationId: {}", raw.correlation_id),
            format!("RequestId: {}", raw.request_id.map_or_else(none, |id| id.to_string())),
            format!("Depth: {}", raw.depth),
            format!("Mode: {}", raw.mode),
            format!("IsolationMode: {}", self.isolation_mode()),
            format!("PrimaryEntityName: {}", raw.primary_entity_name),
            format!("PrimaryEntityId: {}", raw.primary_entity_id),
            format!(
                "SecondaryEntityName: {}",
                raw.secondary_entity_name.as_deref().unwrap_or("(none)")
            ),
            format!("BusinessUnitId: {}", raw.business_unit_id),
            format!("OrganizationId: {}", raw.organization_id),
            format!("OrganizationName: {}", raw.organization_name),
            format!("OperationId: {}", raw.operation_id),
            format!("OperationCreatedOn: {}", raw.operation_created_on.to_rfc3339()),
            format!("IsExecutingOffline: {}", raw.is_executing_offline),
            format!("IsOfflinePlayback: {}", raw.is_offline_playback),
            format!("IsInTransaction: {}", raw.is_in_transaction),
        ];

        lines.extend(parameter_lines("Input Parameters", &raw.input_parameters));
        lines.extend(parameter_lines("Output Parameters", &raw.output_parameters));
        lines.extend(parameter_lines("Shared Variables", &raw.shared_variables));
        lines.extend(image_lines("Pre Entity Images", &raw.pre_entity_images));
        lines.extend(image_lines("Post Entity Images", &raw.post_entity_images));

        lines.push(raw.parent_context().map_or_else(
            || "Parent Context: (none)".to_string(),
            |parent| {
                format!(
                    "Parent Context: {} {} {} (depth {})",
                    parent.stage, parent.message_name, parent.primary_entity_name, parent.depth
                )
            },
        ));
        lines.push("**** End Context Info ****".to_string());

        lines.join("\n")
    }
}

fn parameter_lines(title: &str, parameters: &ParameterCollection) -> Vec<String> {
    if parameters.is_empty() {
        return vec![format!("{title}: (none)")];
    }
    std::iter::once(format!("{title}:"))
        .chain(parameters.iter().map(|(name, value)| format!("   {name}: {value}")))
        .collect()
}

fn image_lines(title: &str, images: &EntityImageCollection) -> Vec<String> {
    if images.is_empty() {
        return vec![format!("{title}: (none)")];
    }
    std::iter::once(format!("{title}:"))
        .chain(images.iter().map(|(name, image)| {
            let attributes = serde_json::to_string(&image.attributes).unwrap_or_default();
            format!("   {name}: {} {} {attributes}", image.logical_name, image.id)
        }))
        .collect()
}
