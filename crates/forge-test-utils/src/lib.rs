//! Shared test utilities for the forge workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not each
//! re-create bundle registries and project directories. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject), a temporary project root
//! - [`registry`]: [`TestRegistry`](registry::TestRegistry), a temporary bundle source root

pub mod project;
pub mod registry;

pub use project::TestProject;
pub use registry::TestRegistry;
