//! Testing utilities for plugin contexts.
//!
//! This module provides:
//! - Mock trace transports and organization services
//! - Fixtures for host snapshots, providers and plugins

mod fixtures;
mod mocks;

pub use fixtures::{RawContextBuilder, StaticServiceProvider, TestPlugin};
pub use mocks::{
    CollectingTransport, EchoService, FailingTransport, FlakyTransport, PanickingTransport,
    RecordingServiceFactory,
};
