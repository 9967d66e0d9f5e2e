//! Declared plugin events and runtime event resolution.
//!
//! A plugin declares, once for its lifetime, the ordered list of
//! [`RegisteredEvent`]s it handles. Each invocation resolves that list
//! against the runtime stage, message and entity exactly once, producing a
//! [`ResolvedEvent`].

mod matcher;
mod registered;

pub use matcher::{EventKey, EventMatcher};
pub use registered::{EventHandler, HandlerFn, MessageType, RegisteredEvent, ResolvedEvent};
