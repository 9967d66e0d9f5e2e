//! The plugin's declaration of the events it handles.

use crate::events::RegisteredEvent;

/// A plugin that declares, up front, which pipeline events it handles.
///
/// The declared table is fixed for the plugin's lifetime and may be shared by
/// many concurrent invocations.
pub trait RegisteredEventsPlugin: Send + Sync {
    /// The declared events, in priority order.
    fn registered_events(&self) -> &[RegisteredEvent];

    /// The plugin's type name, used in diagnostics.
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
