//! Render Tree Diffs
//!
//! Edit scripts between two frame sequences of one component. Edits address
//! nodes by sibling index within the current parent; `StepIn`/`StepOut` move
//! that parent. Payloads are never inlined: edits reference frames copied into
//! the batch's value table.

pub mod engine;

pub use engine::{compute_diff, DiffOutput};

use crate::types::ComponentId;
use serde::{Deserialize, Serialize};

/// Kind of a single edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Insert the referenced frame (and its subtree) before `sibling_index`
    PrependFrame,
    RemoveFrame,
    SetAttribute,
    RemoveAttribute,
    /// Replace the text of the node at `sibling_index` in place
    UpdateText,
    StepIn,
    StepOut,
}

/// One instruction for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTreeEdit {
    pub kind: EditKind,
    pub sibling_index: usize,
    /// Index into the batch value table
    pub reference_frame_index: Option<usize>,
    pub removed_attribute_name: Option<String>,
}

impl RenderTreeEdit {
    pub fn prepend_frame(sibling_index: usize, reference_frame_index: usize) -> Self {
        Self::with_reference(EditKind::PrependFrame, sibling_index, reference_frame_index)
    }

    pub fn remove_frame(sibling_index: usize) -> Self {
        Self::bare(EditKind::RemoveFrame, sibling_index)
    }

    pub fn set_attribute(sibling_index: usize, reference_frame_index: usize) -> Self {
        Self::with_reference(EditKind::SetAttribute, sibling_index, reference_frame_index)
    }

    pub fn remove_attribute(sibling_index: usize, name: impl Into<String>) -> Self {
        Self {
            kind: EditKind::RemoveAttribute,
            sibling_index,
            reference_frame_index: None,
            removed_attribute_name: Some(name.into()),
        }
    }

    pub fn update_text(sibling_index: usize, reference_frame_index: usize) -> Self {
        Self::with_reference(EditKind::UpdateText, sibling_index, reference_frame_index)
    }

    pub fn step_in(sibling_index: usize) -> Self {
        Self::bare(EditKind::StepIn, sibling_index)
    }

    pub fn step_out() -> Self {
        Self::bare(EditKind::StepOut, 0)
    }

    fn bare(kind: EditKind, sibling_index: usize) -> Self {
        Self {
            kind,
            sibling_index,
            reference_frame_index: None,
            removed_attribute_name: None,
        }
    }

    fn with_reference(kind: EditKind, sibling_index: usize, reference_frame_index: usize) -> Self {
        Self {
            kind,
            sibling_index,
            reference_frame_index: Some(reference_frame_index),
            removed_attribute_name: None,
        }
    }
}

/// Edit script of one component render. An empty edit list means "no edits".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTreeDiff {
    pub component_id: ComponentId,
    pub edits: Vec<RenderTreeEdit>,
}

impl RenderTreeDiff {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Child component bookkeeping produced alongside the edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildChange {
    /// A component frame with no counterpart in the previous output
    Added {
        frame_index: usize,
        reference_frame_index: usize,
    },
    /// Same sequence number and type in both outputs; the child keeps its identity
    Retained { old_index: usize, new_index: usize },
    /// The child's frame is gone; its subtree must be disposed
    Removed { component_id: ComponentId },
}
