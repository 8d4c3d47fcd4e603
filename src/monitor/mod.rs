//! Monitoring cycle support: per-check `every` scheduling.

pub mod schedule;
