//! Property-based tests for the diff engine

#[path = "../support/mirror.rs"]
mod mirror;

mod diff_properties;
