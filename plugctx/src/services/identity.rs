//! The identities a remote service can act as.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a resolved organization service acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceIdentity {
    /// The user the plugin step is registered to run as.
    RegisteredUser,
    /// The user whose request triggered the pipeline.
    InitiatingUser,
    /// The system user; no impersonation.
    System,
}

impl ServiceIdentity {
    /// Every identity, in cache slot order.
    pub const ALL: [Self; 3] = [Self::RegisteredUser, Self::InitiatingUser, Self::System];

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::RegisteredUser => 0,
            Self::InitiatingUser => 1,
            Self::System => 2,
        }
    }

    /// Returns true if services for this identity impersonate a user.
    #[must_use]
    pub const fn impersonates(self) -> bool {
        !matches!(self, Self::System)
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisteredUser => write!(f, "registered_user"),
            Self::InitiatingUser => write!(f, "initiating_user"),
            Self::System => write!(f, "system"),
        }
    }
}
