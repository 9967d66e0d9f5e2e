//! Pipeline stage and execution mode enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The phase of the host pipeline a plugin step runs in.
///
/// Raw values follow the host's numbering. Values the host sends that do not
/// correspond to a known phase are kept as [`PipelineStage::Other`] so they
/// still compare and display correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum PipelineStage {
    /// Runs before validation, outside the database transaction.
    PreValidation,
    /// Runs before the core operation, inside the transaction.
    PreOperation,
    /// The core platform operation itself.
    MainOperation,
    /// Runs after the core operation.
    PostOperation,
    /// Any stage value not listed above.
    Other(i32),
}

impl PipelineStage {
    /// Returns the raw integer value used by the host.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::PreValidation => 10,
            Self::PreOperation => 20,
            Self::MainOperation => 30,
            Self::PostOperation => 40,
            Self::Other(raw) => raw,
        }
    }

    /// Returns true if the stage runs before the core operation.
    #[must_use]
    pub const fn is_pre_operation(self) -> bool {
        matches!(self, Self::PreValidation | Self::PreOperation)
    }
}

impl From<i32> for PipelineStage {
    fn from(raw: i32) -> Self {
        match raw {
            10 => Self::PreValidation,
            20 => Self::PreOperation,
            30 => Self::MainOperation,
            40 => Self::PostOperation,
            other => Self::Other(other),
        }
    }
}

impl From<PipelineStage> for i32 {
    fn from(stage: PipelineStage) -> Self {
        stage.value()
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreValidation => write!(f, "PreValidation"),
            Self::PreOperation => write!(f, "PreOperation"),
            Self::MainOperation => write!(f, "MainOperation"),
            Self::PostOperation => write!(f, "PostOperation"),
            Self::Other(raw) => write!(f, "Stage({raw})"),
        }
    }
}

/// Whether the host runs the step synchronously or queues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i32", into = "i32")]
pub enum ExecutionMode {
    /// Runs inline with the triggering request.
    #[default]
    Synchronous,
    /// Runs later from the asynchronous queue.
    Asynchronous,
    /// A raw value the host sent that has no known meaning.
    Other(i32),
}

impl From<i32> for ExecutionMode {
    fn from(raw: i32) -> Self {
        match raw {
            0 => Self::Synchronous,
            1 => Self::Asynchronous,
            other => Self::Other(other),
        }
    }
}

impl From<ExecutionMode> for i32 {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Synchronous => 0,
            ExecutionMode::Asynchronous => 1,
            ExecutionMode::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synchronous => write!(f, "Synchronous"),
            Self::Asynchronous => write!(f, "Asynchronous"),
            Self::Other(raw) => write!(f, "Mode({raw})"),
        }
    }
}

/// Isolation the plugin assembly was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum IsolationMode {
    /// Full trust, no sandbox.
    None,
    /// Partial trust sandbox.
    Sandbox,
    /// A raw value the host sent that has no known meaning.
    Unknown(i32),
}

impl From<i32> for IsolationMode {
    fn from(raw: i32) -> Self {
        match raw {
            1 => Self::None,
            2 => Self::Sandbox,
            other => Self::Unknown(other),
        }
    }
}

impl From<IsolationMode> for i32 {
    fn from(mode: IsolationMode) -> Self {
        match mode {
            IsolationMode::None => 1,
            IsolationMode::Sandbox => 2,
            IsolationMode::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Sandbox => write!(f, "Sandbox"),
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_raw() {
        assert_eq!(PipelineStage::from(10), PipelineStage::PreValidation);
        assert_eq!(PipelineStage::from(20), PipelineStage::PreOperation);
        assert_eq!(PipelineStage::from(40), PipelineStage::PostOperation);
        assert_eq!(PipelineStage::from(55), PipelineStage::Other(55));
        assert_eq!(PipelineStage::Other(55).value(), 55);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::PreOperation.to_string(), "PreOperation");
        assert_eq!(PipelineStage::Other(7).to_string(), "Stage(7)");
    }

    #[test]
    fn test_stage_serialize_as_raw_value() {
        let json = serde_json::to_string(&PipelineStage::PostOperation).unwrap();
        assert_eq!(json, "40");

        let stage: PipelineStage = serde_json::from_str("20").unwrap();
        assert_eq!(stage, PipelineStage::PreOperation);
    }

    #[test]
    fn test_isolation_mode_from_raw() {
        assert_eq!(IsolationMode::from(1), IsolationMode::None);
        assert_eq!(IsolationMode::from(2), IsolationMode::Sandbox);
        assert_eq!(IsolationMode::from(0), IsolationMode::Unknown(0));
        assert_eq!(i32::from(IsolationMode::Sandbox), 2);
    }

    #[test]
    fn test_execution_mode_from_raw() {
        assert_eq!(ExecutionMode::from(0), ExecutionMode::Synchronous);
        assert_eq!(ExecutionMode::from(1), ExecutionMode::Asynchronous);
        assert_eq!(ExecutionMode::from(5), ExecutionMode::Other(5));
        assert!(PipelineStage::PreValidation.is_pre_operation());
        assert!(!PipelineStage::PostOperation.is_pre_operation());
    }

    #[test]
    fn test_unknown_execution_mode_keeps_raw_value() {
        let mode: ExecutionMode = serde_json::from_str("3").unwrap();
        assert_eq!(mode, ExecutionMode::Other(3));
        assert_eq!(serde_json::to_string(&mode).unwrap(), "3");
        assert_eq!(mode.to_string(), "Mode(3)");
    }
}
