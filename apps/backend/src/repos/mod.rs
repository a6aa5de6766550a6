//! Repository functions for the domain layer.
//!
//! Thin wrappers over the `adapters` modules that translate persistence
//! models and errors into domain terms.

pub mod boards;
pub mod phrases;
pub mod selections;
pub mod sessions;
