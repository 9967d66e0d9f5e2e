//! The extended execution context and its host-facing inputs.
//!
//! This module provides:
//! - The immutable [`RawContextView`] the host supplies per invocation
//! - The [`ServiceProvider`] seam to the host's collaborators
//! - The [`ExtendedContext`] plugin logic works against

#[cfg(test)]
mod context_tests;
mod execution;
mod info;
mod provider;
mod raw;

pub use execution::{ExtendedContext, ExtendedContextBuilder};
pub use provider::ServiceProvider;
pub use raw::RawContextView;
