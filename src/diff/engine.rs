//! Diff Engine
//!
//! Walks the previous and new sibling lists of one component in lockstep,
//! matching frames by sequence number. Work is bounded by the two sequences of
//! the component being diffed; child components are opaque and diffed
//! separately under their own identity.

use crate::diff::{ChildChange, RenderTreeEdit};
use crate::frame::{FrameKind, FrameSequence, FrameTag, RenderFrame};
use crate::types::SequenceNumber;
use std::ops::Range;
use tracing::trace;

/// Result of diffing one component's output
#[derive(Debug, Default)]
pub struct DiffOutput {
    pub edits: Vec<RenderTreeEdit>,
    pub child_changes: Vec<ChildChange>,
}

/// Compute the edit script turning `old` into `new`.
///
/// Frames referenced by edits are appended to `reference_frames`, the value
/// table shared by the whole batch.
pub fn compute_diff(
    old: &FrameSequence,
    new: &FrameSequence,
    reference_frames: &mut Vec<RenderFrame>,
) -> DiffOutput {
    let mut context = DiffContext {
        old: old.frames(),
        new: new.frames(),
        old_sequence: old,
        new_sequence: new,
        reference_frames,
        output: DiffOutput::default(),
        sibling_index: 0,
    };
    context.diff_siblings(0..old.len(), 0..new.len());
    trace!(
        edit_count = context.output.edits.len(),
        child_changes = context.output.child_changes.len(),
        "Diff computed"
    );
    context.output
}

struct DiffContext<'a> {
    old: &'a [RenderFrame],
    new: &'a [RenderFrame],
    old_sequence: &'a FrameSequence,
    new_sequence: &'a FrameSequence,
    reference_frames: &'a mut Vec<RenderFrame>,
    output: DiffOutput,
    sibling_index: usize,
}

fn next_sibling(frames: &[RenderFrame], index: usize) -> usize {
    index + frames[index].subtree_length
}

/// Whether a sibling at or after `start` carries `target`.
///
/// Authored sequence numbers are non-decreasing, so the scan stops at the
/// first larger one.
fn has_later_sibling(frames: &[RenderFrame], range: Range<usize>, target: SequenceNumber) -> bool {
    let mut index = range.start;
    while index < range.end {
        let sequence = frames[index].sequence;
        if sequence == target {
            return true;
        }
        if sequence > target {
            return false;
        }
        index = next_sibling(frames, index);
    }
    false
}

impl<'a> DiffContext<'a> {
    fn diff_siblings(&mut self, old_range: Range<usize>, new_range: Range<usize>) {
        let (old, new) = (self.old, self.new);
        let mut old_index = old_range.start;
        let mut new_index = new_range.start;

        loop {
            let has_old = old_index < old_range.end;
            let has_new = new_index < new_range.end;

            match (has_old, has_new) {
                (false, false) => break,
                (true, false) => {
                    self.remove_frame(old_index);
                    old_index = next_sibling(old, old_index);
                }
                (false, true) => {
                    self.insert_frame(new_index);
                    new_index = next_sibling(new, new_index);
                }
                (true, true) => {
                    let old_seq = old[old_index].sequence;
                    let new_seq = new[new_index].sequence;

                    if old_seq == new_seq {
                        self.diff_same_sequence(old_index, new_index);
                        old_index = next_sibling(old, old_index);
                        new_index = next_sibling(new, new_index);
                        continue;
                    }

                    let new_appears_later_in_old =
                        has_later_sibling(old, old_index..old_range.end, new_seq);
                    let old_appears_later_in_new =
                        has_later_sibling(new, new_index..new_range.end, old_seq);

                    if old_appears_later_in_new {
                        self.insert_frame(new_index);
                        new_index = next_sibling(new, new_index);
                    } else if new_appears_later_in_old {
                        self.remove_frame(old_index);
                        old_index = next_sibling(old, old_index);
                    } else {
                        // neither survives: replace in place
                        self.insert_frame(new_index);
                        new_index = next_sibling(new, new_index);
                        self.remove_frame(old_index);
                        old_index = next_sibling(old, old_index);
                    }
                }
            }
        }
    }

    fn diff_same_sequence(&mut self, old_index: usize, new_index: usize) {
        let (old, new) = (self.old, self.new);
        let old_frame = &old[old_index];
        let new_frame = &new[new_index];

        match (&old_frame.kind, &new_frame.kind) {
            (FrameKind::Text { content: old_text }, FrameKind::Text { content: new_text }) => {
                if old_text != new_text {
                    let reference = self.copy_frames(new_index, 1);
                    self.output
                        .edits
                        .push(RenderTreeEdit::update_text(self.sibling_index, reference));
                }
                self.sibling_index += 1;
            }
            (FrameKind::Element { name: old_name }, FrameKind::Element { name: new_name })
                if old_name == new_name =>
            {
                self.diff_attributes(old_index, new_index);

                let old_children = self.old_sequence.child_range(old_index);
                let new_children = self.new_sequence.child_range(new_index);
                if !old_children.is_empty() || !new_children.is_empty() {
                    let outer_index = self.sibling_index;
                    let step_in_position = self.output.edits.len();
                    self.output.edits.push(RenderTreeEdit::step_in(outer_index));
                    self.sibling_index = 0;

                    self.diff_siblings(old_children, new_children);

                    if self.output.edits.len() == step_in_position + 1 {
                        self.output.edits.pop();
                    } else {
                        self.output.edits.push(RenderTreeEdit::step_out());
                    }
                    self.sibling_index = outer_index;
                }
                self.sibling_index += 1;
            }
            (
                FrameKind::Component {
                    component_type: old_type,
                    ..
                },
                FrameKind::Component {
                    component_type: new_type,
                    ..
                },
            ) if old_type == new_type => {
                self.output.child_changes.push(ChildChange::Retained {
                    old_index,
                    new_index,
                });
                self.sibling_index += 1;
            }
            (FrameKind::Region, FrameKind::Region) => {
                let old_children = self.old_sequence.child_range(old_index);
                let new_children = self.new_sequence.child_range(new_index);
                self.diff_siblings(old_children, new_children);
            }
            _ => {
                self.insert_frame(new_index);
                self.remove_frame(old_index);
            }
        }
    }

    fn diff_attributes(&mut self, old_index: usize, new_index: usize) {
        let (old, new) = (self.old, self.new);
        let old_attributes = self.old_sequence.attribute_range(old_index);
        let new_attributes = self.new_sequence.attribute_range(new_index);
        let mut old_cursor = old_attributes.start;
        let mut new_cursor = new_attributes.start;

        loop {
            let has_old = old_cursor < old_attributes.end;
            let has_new = new_cursor < new_attributes.end;

            match (has_old, has_new) {
                (false, false) => break,
                (true, false) => {
                    self.remove_attribute(old_cursor, new_attributes.clone());
                    old_cursor += 1;
                }
                (false, true) => {
                    self.set_attribute(new_cursor);
                    new_cursor += 1;
                }
                (true, true) => {
                    let old_frame = &old[old_cursor];
                    let new_frame = &new[new_cursor];
                    if old_frame.sequence == new_frame.sequence {
                        match (&old_frame.kind, &new_frame.kind) {
                            (
                                FrameKind::Attribute {
                                    name: old_name,
                                    value: old_value,
                                },
                                FrameKind::Attribute {
                                    name: new_name,
                                    value: new_value,
                                },
                            ) if old_name == new_name => {
                                if old_value != new_value {
                                    self.set_attribute(new_cursor);
                                }
                            }
                            _ => {
                                self.remove_attribute(old_cursor, new_attributes.clone());
                                self.set_attribute(new_cursor);
                            }
                        }
                        old_cursor += 1;
                        new_cursor += 1;
                    } else if old_frame.sequence < new_frame.sequence {
                        self.remove_attribute(old_cursor, new_attributes.clone());
                        old_cursor += 1;
                    } else {
                        self.set_attribute(new_cursor);
                        new_cursor += 1;
                    }
                }
            }
        }
    }

    fn set_attribute(&mut self, new_index: usize) {
        let reference = self.copy_frames(new_index, 1);
        self.output
            .edits
            .push(RenderTreeEdit::set_attribute(self.sibling_index, reference));
    }

    /// Remove an attribute unless the new element still carries one with the same name.
    fn remove_attribute(&mut self, old_index: usize, new_attributes: Range<usize>) {
        let (old, new) = (self.old, self.new);
        let name = match &old[old_index].kind {
            FrameKind::Attribute { name, .. } => name,
            _ => return,
        };
        let still_present = new[new_attributes].iter().any(|frame| {
            matches!(&frame.kind, FrameKind::Attribute { name: new_name, .. } if new_name == name)
        });
        if !still_present {
            self.output
                .edits
                .push(RenderTreeEdit::remove_attribute(self.sibling_index, name.clone()));
        }
    }

    fn insert_frame(&mut self, new_index: usize) {
        let new = self.new;
        let frame = &new[new_index];
        match frame.tag() {
            FrameTag::Region => {
                let mut child = self.new_sequence.child_range(new_index).start;
                let end = next_sibling(new, new_index);
                while child < end {
                    self.insert_frame(child);
                    child = next_sibling(new, child);
                }
            }
            FrameTag::Attribute => {}
            FrameTag::Element | FrameTag::Text | FrameTag::Component => {
                let length = frame.subtree_length;
                let reference = self.copy_frames(new_index, length);
                for offset in 0..length {
                    if new[new_index + offset].tag() == FrameTag::Component {
                        self.output.child_changes.push(ChildChange::Added {
                            frame_index: new_index + offset,
                            reference_frame_index: reference + offset,
                        });
                    }
                }
                self.output
                    .edits
                    .push(RenderTreeEdit::prepend_frame(self.sibling_index, reference));
                self.sibling_index += 1;
            }
        }
    }

    fn remove_frame(&mut self, old_index: usize) {
        let old = self.old;
        let frame = &old[old_index];
        match frame.tag() {
            FrameTag::Region => {
                let mut child = self.old_sequence.child_range(old_index).start;
                let end = next_sibling(old, old_index);
                while child < end {
                    self.remove_frame(child);
                    child = next_sibling(old, child);
                }
            }
            FrameTag::Attribute => {}
            FrameTag::Element | FrameTag::Text | FrameTag::Component => {
                let end = next_sibling(old, old_index);
                for removed in &old[old_index..end] {
                    if let Some(component_id) = removed.component_id() {
                        self.output
                            .child_changes
                            .push(ChildChange::Removed { component_id });
                    }
                }
                self.output
                    .edits
                    .push(RenderTreeEdit::remove_frame(self.sibling_index));
            }
        }
    }

    fn copy_frames(&mut self, start: usize, length: usize) -> usize {
        let new = self.new;
        let reference = self.reference_frames.len();
        self.reference_frames
            .extend_from_slice(&new[start..start + length]);
        reference
    }
}
