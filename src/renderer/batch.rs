//! Render Batches
//!
//! Everything produced by one reconciliation pass, delivered to the host as a
//! single unit: per-component edit scripts, the value table their edits index
//! into, and the ids disposed during the pass.

use crate::diff::{EditKind, RenderTreeDiff, RenderTreeEdit};
use crate::error::RenderError;
use crate::frame::{FrameKind, RenderFrame};
use crate::types::ComponentId;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct RenderBatch {
    /// Monotonic batch number assigned by the renderer
    pub number: u64,
    /// Edit scripts in the order the components rendered
    pub updated_components: Vec<RenderTreeDiff>,
    pub reference_frames: Vec<RenderFrame>,
    pub disposed_component_ids: Vec<ComponentId>,
}

impl RenderBatch {
    pub(crate) fn new(number: u64) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updated_components.is_empty() && self.disposed_component_ids.is_empty()
    }

    /// Diffs recorded for one component, in render order
    pub fn diffs_for(&self, component: ComponentId) -> Vec<&RenderTreeDiff> {
        self.updated_components
            .iter()
            .filter(|diff| diff.component_id == component)
            .collect()
    }

    pub fn contains_diff_for(&self, component: ComponentId) -> bool {
        self.updated_components
            .iter()
            .any(|diff| diff.component_id == component)
    }

    pub fn was_disposed(&self, component: ComponentId) -> bool {
        self.disposed_component_ids.contains(&component)
    }

    /// Frame referenced by an edit, if any
    pub fn reference_frame(&self, edit: &RenderTreeEdit) -> Option<&RenderFrame> {
        edit.reference_frame_index
            .and_then(|index| self.reference_frames.get(index))
    }

    pub fn describe_edit(&self, edit: &RenderTreeEdit) -> String {
        let payload = self.reference_frame(edit).map(describe_frame);
        match (edit.kind, payload) {
            (EditKind::StepOut, _) => "StepOut".to_string(),
            (EditKind::RemoveAttribute, _) => format!(
                "RemoveAttribute@{} {}",
                edit.sibling_index,
                edit.removed_attribute_name.as_deref().unwrap_or("?")
            ),
            (kind, Some(payload)) => format!("{:?}@{} {}", kind, edit.sibling_index, payload),
            (kind, None) => format!("{:?}@{}", kind, edit.sibling_index),
        }
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            batch: self.number,
            diffs: self
                .updated_components
                .iter()
                .map(|diff| DiffSummary {
                    component_id: diff.component_id,
                    edits: diff.edits.iter().map(|edit| self.describe_edit(edit)).collect(),
                })
                .collect(),
            reference_frame_count: self.reference_frames.len(),
            disposed: self.disposed_component_ids.clone(),
        }
    }
}

fn describe_frame(frame: &RenderFrame) -> String {
    match &frame.kind {
        FrameKind::Element { name } => format!("<{}>", name),
        FrameKind::Text { content } => format!("{:?}", content),
        FrameKind::Attribute { name, value } => format!("{}={}", name, value.describe()),
        FrameKind::Component { component_type, .. } => format!("[{}]", component_type.name()),
        FrameKind::Region => "region".to_string(),
    }
}

/// Serializable digest of a batch, used by the CLI and in tests.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub batch: u64,
    pub diffs: Vec<DiffSummary>,
    pub reference_frame_count: usize,
    pub disposed: Vec<ComponentId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffSummary {
    pub component_id: ComponentId,
    pub edits: Vec<String>,
}

/// Receiver of completed batches.
pub trait RenderHost {
    /// Apply one batch. An error aborts delivery of the batch to this host and
    /// is reported to the caller that triggered the pass.
    fn update_display(&mut self, batch: &RenderBatch) -> Result<(), RenderError>;
}

/// Host that keeps every delivered batch. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    batches: Rc<RefCell<Vec<RenderBatch>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<RenderBatch> {
        self.batches.borrow().clone()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.borrow().len()
    }

    pub fn last_batch(&self) -> Option<RenderBatch> {
        self.batches.borrow().last().cloned()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<RenderBatch> {
        std::mem::take(&mut *self.batches.borrow_mut())
    }
}

impl RenderHost for RecordingHost {
    fn update_display(&mut self, batch: &RenderBatch) -> Result<(), RenderError> {
        self.batches.borrow_mut().push(batch.clone());
        Ok(())
    }
}
