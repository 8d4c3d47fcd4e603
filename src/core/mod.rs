//! Core plumbing: configuration and the crate error type.

pub mod config;
pub mod errors;
