//! Declared plugin events and their handlers.

use std::fmt;
use std::sync::Arc;

use crate::context::ExtendedContext;
use crate::core::PipelineStage;

/// Signature of the function a declared event dispatches to.
pub type HandlerFn = dyn Fn(&ExtendedContext) -> anyhow::Result<()> + Send + Sync;

/// A named, shareable event handler.
///
/// Handlers compare by identity: two handlers are the same only when they
/// share the same underlying function allocation.
#[derive(Clone)]
pub struct EventHandler {
    name: String,
    func: Arc<HandlerFn>,
}

impl EventHandler {
    /// Creates a new handler.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ExtendedContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the handler.
    pub fn call(&self, ctx: &ExtendedContext) -> anyhow::Result<()> {
        (self.func)(ctx)
    }

    /// Returns true if both handlers share the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The message a declared event listens for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Any message at the declared stage.
    Any,
    /// One concrete message, e.g. `"Create"`.
    Named(String),
}

impl MessageType {
    /// Creates a concrete message type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns true for the wildcard.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if this is the concrete message `name`.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, Self::Named(n) if n == name)
    }
}

impl From<&str> for MessageType {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for MessageType {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// An event a plugin declares it handles.
#[derive(Debug, Clone)]
pub struct RegisteredEvent {
    /// Stage the event runs in.
    pub stage: PipelineStage,
    /// Message the event runs for.
    pub message: MessageType,
    /// Primary entity the event is limited to, if any.
    pub entity_logical_name: Option<String>,
    /// Function to run when the event is resolved.
    pub handler: Option<EventHandler>,
}

impl RegisteredEvent {
    /// Declares an event for every entity.
    #[must_use]
    pub fn new(stage: PipelineStage, message: impl Into<MessageType>) -> Self {
        Self {
            stage,
            message: message.into(),
            entity_logical_name: None,
            handler: None,
        }
    }

    /// Declares an event for any message at `stage`.
    #[must_use]
    pub fn any(stage: PipelineStage) -> Self {
        Self::new(stage, MessageType::Any)
    }

    /// Limits the event to one primary entity.
    #[must_use]
    pub fn for_entity(mut self, logical_name: impl Into<String>) -> Self {
        self.entity_logical_name = Some(logical_name.into());
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn with_handler(mut self, handler: EventHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Creates and sets a handler from a closure.
    #[must_use]
    pub fn handled_by<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ExtendedContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_handler(EventHandler::new(name, func))
    }

    /// Returns true if the entity filter is absent or equals `entity`.
    #[must_use]
    pub fn applies_to_entity(&self, entity: &str) -> bool {
        self.entity_logical_name
            .as_deref()
            .map_or(true, |filter| filter == entity)
    }
}

impl fmt::Display for RegisteredEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.stage,
            self.message,
            self.entity_logical_name.as_deref().unwrap_or("(all entities)")
        )
    }
}

/// The declared event selected for one invocation.
///
/// The message is always the concrete runtime message, also when the
/// selected declaration was a wildcard.
#[derive(Debug, Clone)]
pub struct ResolvedEvent {
    stage: PipelineStage,
    message: String,
    entity_logical_name: Option<String>,
    handler: Option<EventHandler>,
    declaration_index: usize,
    from_wildcard: bool,
}

impl ResolvedEvent {
    pub(crate) fn from_declaration(
        declared: &RegisteredEvent,
        runtime_message: &str,
        declaration_index: usize,
    ) -> Self {
        Self {
            stage: declared.stage,
            message: runtime_message.to_string(),
            entity_logical_name: declared.entity_logical_name.clone(),
            handler: declared.handler.clone(),
            declaration_index,
            from_wildcard: declared.message.is_any(),
        }
    }

    /// Returns the stage.
    #[must_use]
    pub const fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Returns the concrete message name.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the entity filter of the selected declaration.
    #[must_use]
    pub fn entity_logical_name(&self) -> Option<&str> {
        self.entity_logical_name.as_deref()
    }

    /// Returns the handler, if the declaration had one.
    #[must_use]
    pub const fn handler(&self) -> Option<&EventHandler> {
        self.handler.as_ref()
    }

    /// Position of the selected declaration in the plugin's event table.
    #[must_use]
    pub const fn declaration_index(&self) -> usize {
        self.declaration_index
    }

    /// Returns true if the selected declaration was a wildcard.
    #[must_use]
    pub const fn from_wildcard(&self) -> bool {
        self.from_wildcard
    }

    /// Returns the event as a concrete declaration.
    #[must_use]
    pub fn to_registered(&self) -> RegisteredEvent {
        RegisteredEvent {
            stage: self.stage,
            message: MessageType::Named(self.message.clone()),
            entity_logical_name: self.entity_logical_name.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl fmt::Display for ResolvedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.stage,
            self.message,
            self.entity_logical_name.as_deref().unwrap_or("(all entities)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_from_str() {
        assert_eq!(MessageType::from("Create"), MessageType::Named("Create".to_string()));
        assert!(MessageType::Any.is_any());
        assert!(MessageType::named("Update").is_named("Update"));
        assert!(!MessageType::Any.is_named("Any"));
    }

    #[test]
    fn test_entity_filter() {
        let unfiltered = RegisteredEvent::new(PipelineStage::PreOperation, "Create");
        let filtered = RegisteredEvent::new(PipelineStage::PreOperation, "Create").for_entity("account");

        assert!(unfiltered.applies_to_entity("contact"));
        assert!(filtered.applies_to_entity("account"));
        assert!(!filtered.applies_to_entity("contact"));
    }

    #[test]
    fn test_handler_identity() {
        let h1 = EventHandler::new("h1", |_| Ok(()));
        let h1_clone = h1.clone();
        let h2 = EventHandler::new("h1", |_| Ok(()));

        assert!(h1.ptr_eq(&h1_clone));
        assert!(!h1.ptr_eq(&h2));
    }

    #[test]
    fn test_resolved_event_from_wildcard_uses_runtime_message() {
        let declared = RegisteredEvent::any(PipelineStage::PostOperation).handled_by("h", |_| Ok(()));
        let resolved = ResolvedEvent::from_declaration(&declared, "Assign", 3);

        assert_eq!(resolved.message(), "Assign");
        assert!(resolved.from_wildcard());
        assert_eq!(resolved.declaration_index(), 3);
        assert!(resolved.to_registered().message.is_named("Assign"));
    }

    #[test]
    fn test_display() {
        let event = RegisteredEvent::new(PipelineStage::PreOperation, "Update").for_entity("account");
        assert_eq!(event.to_string(), "PreOperation Update account");
        assert_eq!(RegisteredEvent::any(PipelineStage::PostOperation).to_string(), "PostOperation Any (all entities)");
    }
}
