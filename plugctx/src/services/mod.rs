//! Identity-bound organization services.
//!
//! This module provides:
//! - The [`OrganizationService`] and [`OrganizationServiceFactory`] seams
//! - The [`ServiceResolver`] that creates one service per identity, lazily
//! - The [`ExtendedOrganizationService`] wrapper that traces requests

mod extended;
mod identity;
mod organization;
mod resolver;

pub use extended::ExtendedOrganizationService;
pub use identity::ServiceIdentity;
pub use organization::{
    OrganizationRequest, OrganizationResponse, OrganizationService, OrganizationServiceFactory,
};
pub use resolver::ServiceResolver;

#[cfg(test)]
pub(crate) use organization::{MockOrganizationService, MockOrganizationServiceFactory};
