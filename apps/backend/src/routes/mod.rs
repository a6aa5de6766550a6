//! HTTP surface: thin translation between transport and services.

pub mod boards;
pub mod realtime;
pub mod sessions;
