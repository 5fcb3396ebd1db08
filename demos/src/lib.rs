//! Shared wiring for the pairdash demos.

/// Collaborator selection: mock fixtures in CI, native adapters otherwise.
pub mod common;
