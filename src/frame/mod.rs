//! Render Frames
//!
//! The output of one render call: a flat, immutable sequence of typed frames.
//! Elements, components and regions own the frames that follow them for
//! `subtree_length` positions (the frame itself included). Attributes sit
//! directly after their owning element or component.

pub mod builder;

pub use builder::FrameBuilder;

use crate::component::ComponentType;
use crate::parameter::{Parameter, ParameterValue};
use crate::types::{ComponentId, SequenceNumber};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Discriminant of a frame kind, used for matching and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameTag {
    Element,
    Text,
    Attribute,
    Component,
    Region,
}

/// Payload of a frame
#[derive(Debug, Clone)]
pub enum FrameKind {
    Element { name: String },
    Text { content: String },
    Attribute { name: String, value: ParameterValue },
    Component {
        component_type: ComponentType,
        /// Filled in by the renderer once the child has an identity
        component_id: Option<ComponentId>,
    },
    /// Transparent container scoping the sequence numbers of a fragment
    Region,
}

impl FrameKind {
    pub fn tag(&self) -> FrameTag {
        match self {
            FrameKind::Element { .. } => FrameTag::Element,
            FrameKind::Text { .. } => FrameTag::Text,
            FrameKind::Attribute { .. } => FrameTag::Attribute,
            FrameKind::Component { .. } => FrameTag::Component,
            FrameKind::Region => FrameTag::Region,
        }
    }
}

/// One node of a component's rendered output.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub sequence: SequenceNumber,
    pub subtree_length: usize,
    pub kind: FrameKind,
}

impl RenderFrame {
    pub fn tag(&self) -> FrameTag {
        self.kind.tag()
    }

    pub fn component_id(&self) -> Option<ComponentId> {
        match &self.kind {
            FrameKind::Component { component_id, .. } => *component_id,
            _ => None,
        }
    }

    pub(crate) fn set_component_id(&mut self, id: ComponentId) {
        if let FrameKind::Component { component_id, .. } = &mut self.kind {
            *component_id = Some(id);
        }
    }
}

/// Ordered, immutable frames produced by one completed render call.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<RenderFrame>,
}

impl FrameSequence {
    pub(crate) fn from_frames(frames: Vec<RenderFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&RenderFrame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Range of the attribute frames owned by the frame at `index`
    pub fn attribute_range(&self, index: usize) -> Range<usize> {
        let end = index + self.frames[index].subtree_length;
        let mut cursor = index + 1;
        while cursor < end && self.frames[cursor].tag() == FrameTag::Attribute {
            cursor += 1;
        }
        index + 1..cursor
    }

    /// Range of the non-attribute descendants of the frame at `index`
    pub fn child_range(&self, index: usize) -> Range<usize> {
        let end = index + self.frames[index].subtree_length;
        self.attribute_range(index).end..end
    }

    /// Direct parameters carried by the component frame at `index`
    pub fn component_parameters(&self, index: usize) -> Vec<Parameter> {
        self.frames[self.attribute_range(index)]
            .iter()
            .filter_map(|frame| match &frame.kind {
                FrameKind::Attribute { name, value } => Some(Parameter::new(name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Ids of the child components referenced anywhere in this sequence
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.frames.iter().filter_map(RenderFrame::component_id).collect()
    }

    pub(crate) fn set_component_id(&mut self, index: usize, id: ComponentId) {
        self.frames[index].set_component_id(id);
    }
}
