//! Frame builder used by component render logic.

use crate::component::{ComponentDefinition, ComponentType};
use crate::error::RenderError;
use crate::frame::{FrameKind, FrameSequence, FrameTag, RenderFrame};
use crate::parameter::{ParameterValue, RenderFragment};
use crate::types::SequenceNumber;
use tracing::warn;

/// Collects the frames of one render call.
///
/// Calls must be balanced (every `open_*` closed by the matching `close_*`).
/// Misuse is recorded and reported by [`FrameBuilder::finish`], so render logic
/// can stay infallible.
pub struct FrameBuilder {
    frames: Vec<RenderFrame>,
    /// Indices of currently open elements, components and regions
    open: Vec<usize>,
    /// Last sequence number seen at each open sibling level
    last_sequence: Vec<Option<SequenceNumber>>,
    attributes_allowed: bool,
    error: Option<String>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            open: Vec::new(),
            last_sequence: vec![None],
            attributes_allowed: false,
            error: None,
        }
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    fn check_sequence(&mut self, sequence: SequenceNumber) {
        if let Some(slot) = self.last_sequence.last_mut() {
            if let Some(previous) = *slot {
                if sequence < previous {
                    warn!(
                        sequence,
                        previous, "Sequence numbers decreased among siblings; diff keying is undefined"
                    );
                }
            }
            *slot = Some(sequence);
        }
    }

    fn inside_component(&self) -> bool {
        self.open
            .last()
            .map(|&index| self.frames[index].tag() == FrameTag::Component)
            .unwrap_or(false)
    }

    fn push_child(&mut self, sequence: SequenceNumber, kind: FrameKind) -> usize {
        if self.inside_component() {
            self.fail(format!(
                "Frame with sequence {} cannot be a child of a component frame",
                sequence
            ));
        }
        self.check_sequence(sequence);
        self.frames.push(RenderFrame {
            sequence,
            subtree_length: 1,
            kind,
        });
        self.frames.len() - 1
    }

    fn open(&mut self, sequence: SequenceNumber, kind: FrameKind) {
        let index = self.push_child(sequence, kind);
        self.open.push(index);
        self.last_sequence.push(None);
    }

    fn close(&mut self, expected: FrameTag) {
        self.attributes_allowed = false;
        match self.open.pop() {
            Some(index) if self.frames[index].tag() == expected => {
                self.frames[index].subtree_length = self.frames.len() - index;
                self.last_sequence.pop();
            }
            Some(index) => {
                let found = self.frames[index].tag();
                self.open.push(index);
                self.fail(format!("Cannot close {:?}: innermost open frame is {:?}", expected, found));
            }
            None => self.fail(format!("Cannot close {:?}: no frame is open", expected)),
        }
    }

    pub fn open_element(&mut self, sequence: SequenceNumber, name: impl Into<String>) {
        self.open(sequence, FrameKind::Element { name: name.into() });
        self.attributes_allowed = true;
    }

    pub fn close_element(&mut self) {
        self.close(FrameTag::Element);
    }

    pub fn add_text(&mut self, sequence: SequenceNumber, content: impl Into<String>) {
        self.attributes_allowed = false;
        self.push_child(sequence, FrameKind::Text { content: content.into() });
    }

    /// Add an attribute to the element or component opened immediately before.
    pub fn add_attribute(
        &mut self,
        sequence: SequenceNumber,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) {
        let name = name.into();
        if !self.attributes_allowed {
            self.fail(format!(
                "Attribute '{}' must directly follow an element or component frame",
                name
            ));
            return;
        }
        self.check_sequence(sequence);
        self.frames.push(RenderFrame {
            sequence,
            subtree_length: 1,
            kind: FrameKind::Attribute {
                name,
                value: value.into(),
            },
        });
    }

    pub fn open_component<C: ComponentDefinition>(&mut self, sequence: SequenceNumber) {
        self.open_component_of(sequence, ComponentType::of::<C>());
    }

    pub fn open_component_of(&mut self, sequence: SequenceNumber, component_type: ComponentType) {
        self.open(
            sequence,
            FrameKind::Component {
                component_type,
                component_id: None,
            },
        );
        self.attributes_allowed = true;
    }

    pub fn add_component_parameter(
        &mut self,
        sequence: SequenceNumber,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) {
        self.add_attribute(sequence, name, value);
    }

    pub fn close_component(&mut self) {
        self.close(FrameTag::Component);
    }

    pub fn open_region(&mut self, sequence: SequenceNumber) {
        self.attributes_allowed = false;
        self.open(sequence, FrameKind::Region);
    }

    pub fn close_region(&mut self) {
        self.close(FrameTag::Region);
    }

    /// Render a fragment inside its own region so its sequence numbers cannot
    /// collide with the caller's.
    pub fn add_fragment(&mut self, sequence: SequenceNumber, fragment: &RenderFragment) {
        self.open_region(sequence);
        fragment.render(self);
        self.close_region();
    }

    /// Complete the render call.
    pub fn finish(self) -> Result<FrameSequence, RenderError> {
        if let Some(message) = self.error {
            return Err(RenderError::InvalidFrames(message));
        }
        if let Some(&index) = self.open.last() {
            return Err(RenderError::InvalidFrames(format!(
                "{} frame(s) left open; innermost is {:?} with sequence {}",
                self.open.len(),
                self.frames[index].tag(),
                self.frames[index].sequence
            )));
        }
        Ok(FrameSequence::from_frames(self.frames))
    }
}
