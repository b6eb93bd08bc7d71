//! Core identifier types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author-assigned position key of a frame among its siblings.
pub type SequenceNumber = u32;

/// Identity of one live component in a renderer.
///
/// Ids are allocated monotonically and never reused, so a stale id held after
/// disposal resolves to nothing instead of to a different component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
