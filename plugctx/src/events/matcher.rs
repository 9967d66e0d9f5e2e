//! Resolution of the invocation against a plugin's declared event table.

use tracing::debug;

use super::{RegisteredEvent, ResolvedEvent};
use crate::context::RawContextView;
use crate::core::PipelineStage;
use crate::errors::UnregisteredEventError;

/// The runtime attributes event resolution looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventKey {
    /// Runtime stage.
    pub stage: PipelineStage,
    /// Runtime message name.
    pub message: String,
    /// Runtime primary entity name.
    pub primary_entity: String,
    /// Runtime secondary entity name.
    pub secondary_entity: Option<String>,
}

impl EventKey {
    /// Creates a key.
    #[must_use]
    pub fn new(
        stage: PipelineStage,
        message: impl Into<String>,
        primary_entity: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            message: message.into(),
            primary_entity: primary_entity.into(),
            secondary_entity: None,
        }
    }

    /// Sets the secondary entity.
    #[must_use]
    pub fn with_secondary_entity(mut self, entity: impl Into<String>) -> Self {
        self.secondary_entity = Some(entity.into());
        self
    }

    /// Reads the key from a host snapshot.
    #[must_use]
    pub fn from_context(raw: &RawContextView) -> Self {
        Self {
            stage: raw.stage,
            message: raw.message_name.clone(),
            primary_entity: raw.primary_entity_name.clone(),
            secondary_entity: raw.secondary_entity_name.clone(),
        }
    }
}

/// Matches a runtime [`EventKey`] against an ordered event table.
///
/// Exact message matches are searched first across the whole table; wildcard
/// declarations are only considered when no exact match exists. Within each
/// pass the earliest declaration wins.
#[derive(Debug, Clone, Copy)]
pub struct EventMatcher<'a> {
    events: &'a [RegisteredEvent],
}

impl<'a> EventMatcher<'a> {
    /// Creates a matcher over a declared event table.
    #[must_use]
    pub const fn new(events: &'a [RegisteredEvent]) -> Self {
        Self { events }
    }

    /// Returns the first exact declaration for `key`, with its index.
    #[must_use]
    pub fn find_exact(&self, key: &EventKey) -> Option<(usize, &'a RegisteredEvent)> {
        self.events.iter().enumerate().find(|(_, e)| {
            e.stage == key.stage
                && e.message.is_named(&key.message)
                && e.applies_to_entity(&key.primary_entity)
        })
    }

    /// Returns the first wildcard declaration for `key`, with its index.
    #[must_use]
    pub fn find_wildcard(&self, key: &EventKey) -> Option<(usize, &'a RegisteredEvent)> {
        self.events.iter().enumerate().find(|(_, e)| {
            e.stage == key.stage && e.message.is_any() && e.applies_to_entity(&key.primary_entity)
        })
    }

    /// Resolves the event for `key`.
    ///
    /// `plugin` is only used to describe the failure.
    pub fn resolve(&self, key: &EventKey, plugin: &str) -> Result<ResolvedEvent, UnregisteredEventError> {
        let found = self.find_exact(key).or_else(|| self.find_wildcard(key));

        match found {
            Some((index, declared)) => {
                debug!(
                    plugin,
                    stage = %key.stage,
                    message = %key.message,
                    entity = %key.primary_entity,
                    index,
                    wildcard = declared.message.is_any(),
                    "Resolved plugin event"
                );
                Ok(ResolvedEvent::from_declaration(declared, &key.message, index))
            }
            None => Err(UnregisteredEventError {
                stage: key.stage,
                message: key.message.clone(),
                primary_entity: key.primary_entity.clone(),
                secondary_entity: key.secondary_entity.clone(),
                plugin: plugin.to_string(),
            }),
        }
    }
}
