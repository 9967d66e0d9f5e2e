//! Core domain model types for the plugin context.
//!
//! This module contains the host-facing value types used throughout the crate:
//! - Pipeline stage, execution and isolation mode enums
//! - Entity snapshots, references and image/parameter collections

mod entity;
mod stage;

pub use entity::{
    Entity, EntityImageCollection, EntityReference, ParameterCollection, POST_IMAGE, PRE_IMAGE,
    TARGET,
};
pub use stage::{ExecutionMode, IsolationMode, PipelineStage};
