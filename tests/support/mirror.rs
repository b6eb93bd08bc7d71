//! Host-side mirror of rendered output, rebuilt only from batch edits.

#![allow(dead_code)]

use cascade::diff::{EditKind, RenderTreeEdit};
use cascade::frame::{FrameKind, FrameSequence, RenderFrame};
use cascade::renderer::{RenderBatch, RenderHost};
use cascade::{ComponentId, RenderError};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        name: String,
        attributes: BTreeMap<String, String>,
        children: Vec<Node>,
    },
    Text(String),
    Component(Option<ComponentId>),
}

/// Nodes for the frames in `range`, flattening regions.
pub fn build_nodes(frames: &[RenderFrame], start: usize, end: usize) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut index = start;
    while index < end {
        let frame = &frames[index];
        let next = index + frame.subtree_length;
        match &frame.kind {
            FrameKind::Text { content } => nodes.push(Node::Text(content.clone())),
            FrameKind::Component { component_id, .. } => nodes.push(Node::Component(*component_id)),
            FrameKind::Region => nodes.extend(build_nodes(frames, index + 1, next)),
            FrameKind::Attribute { .. } => {}
            FrameKind::Element { name } => {
                let mut attributes = BTreeMap::new();
                let mut child = index + 1;
                while child < next {
                    if let FrameKind::Attribute { name, value } = &frames[child].kind {
                        attributes.insert(name.clone(), value.describe());
                        child += 1;
                    } else {
                        break;
                    }
                }
                nodes.push(Node::Element {
                    name: name.clone(),
                    attributes,
                    children: build_nodes(frames, child, next),
                });
            }
        }
        index = next;
    }
    nodes
}

pub fn nodes_of(frames: &FrameSequence) -> Vec<Node> {
    build_nodes(frames.frames(), 0, frames.len())
}

fn children_at<'a>(root: &'a mut Vec<Node>, path: &[usize]) -> &'a mut Vec<Node> {
    let mut current = root;
    for &index in path {
        current = match &mut current[index] {
            Node::Element { children, .. } => children,
            other => panic!("cannot step into {:?}", other),
        };
    }
    current
}

/// Apply one component's edit script to its mirrored node list.
pub fn apply_edits(nodes: &mut Vec<Node>, edits: &[RenderTreeEdit], reference_frames: &[RenderFrame]) {
    let mut path: Vec<usize> = Vec::new();
    for edit in edits {
        match edit.kind {
            EditKind::StepIn => path.push(edit.sibling_index),
            EditKind::StepOut => {
                path.pop();
            }
            EditKind::PrependFrame => {
                let reference = edit.reference_frame_index.expect("prepend needs a frame");
                let end = reference + reference_frames[reference].subtree_length;
                let mut inserted = build_nodes(reference_frames, reference, end);
                let siblings = children_at(nodes, &path);
                assert_eq!(inserted.len(), 1, "prepended frame must be a single node");
                siblings.insert(edit.sibling_index, inserted.remove(0));
            }
            EditKind::RemoveFrame => {
                children_at(nodes, &path).remove(edit.sibling_index);
            }
            EditKind::UpdateText => {
                let reference = edit.reference_frame_index.expect("update needs a frame");
                let FrameKind::Text { content } = &reference_frames[reference].kind else {
                    panic!("text update must reference a text frame");
                };
                children_at(nodes, &path)[edit.sibling_index] = Node::Text(content.clone());
            }
            EditKind::SetAttribute => {
                let reference = edit.reference_frame_index.expect("attribute needs a frame");
                let FrameKind::Attribute { name, value } = &reference_frames[reference].kind else {
                    panic!("attribute edit must reference an attribute frame");
                };
                match &mut children_at(nodes, &path)[edit.sibling_index] {
                    Node::Element { attributes, .. } => {
                        attributes.insert(name.clone(), value.describe());
                    }
                    other => panic!("cannot set attribute on {:?}", other),
                }
            }
            EditKind::RemoveAttribute => {
                let name = edit.removed_attribute_name.clone().unwrap_or_default();
                match &mut children_at(nodes, &path)[edit.sibling_index] {
                    Node::Element { attributes, .. } => {
                        attributes.remove(&name);
                    }
                    other => panic!("cannot remove attribute from {:?}", other),
                }
            }
        }
    }
    assert!(path.is_empty(), "unbalanced StepIn/StepOut");
}

/// Render host that maintains a node list per component.
#[derive(Debug, Clone, Default)]
pub struct MirrorHost {
    components: Rc<RefCell<HashMap<ComponentId, Vec<Node>>>>,
    batches: Rc<RefCell<usize>>,
}

impl MirrorHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self, id: ComponentId) -> Option<Vec<Node>> {
        self.components.borrow().get(&id).cloned()
    }

    pub fn knows(&self, id: ComponentId) -> bool {
        self.components.borrow().contains_key(&id)
    }

    pub fn batch_count(&self) -> usize {
        *self.batches.borrow()
    }
}

impl RenderHost for MirrorHost {
    fn update_display(&mut self, batch: &RenderBatch) -> Result<(), RenderError> {
        let mut components = self.components.borrow_mut();
        for diff in &batch.updated_components {
            let nodes = components.entry(diff.component_id).or_default();
            apply_edits(nodes, &diff.edits, &batch.reference_frames);
        }
        for id in &batch.disposed_component_ids {
            components.remove(id);
        }
        *self.batches.borrow_mut() += 1;
        Ok(())
    }
}
