//! Per-component bookkeeping owned by the renderer.

use crate::cascading::{CascadingParameterSite, SubscriptionRegistry};
use crate::component::{Component, ComponentType};
use crate::frame::FrameSequence;
use crate::parameter::Parameter;
use crate::types::ComponentId;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Active,
    /// Dropped from its parent's output; disposed at the end of the pass
    Removing,
}

/// State kept for a component whose instance supplies cascading values.
#[derive(Debug)]
pub(crate) struct ProviderState {
    pub fixed: bool,
    /// Snapshot frozen at the first assignment of a fixed provider
    pub fixed_value: Option<Value>,
    pub last_value: Value,
    pub registry: SubscriptionRegistry,
}

impl ProviderState {
    pub fn new(fixed: bool, value: Value) -> Self {
        Self {
            fixed,
            fixed_value: fixed.then(|| value.clone()),
            last_value: value,
            registry: SubscriptionRegistry::new(),
        }
    }
}

pub(crate) struct ComponentState {
    pub id: ComponentId,
    pub component_type: ComponentType,
    pub instance: Box<dyn Component>,
    pub parent: Option<ComponentId>,
    pub sites: Rc<[CascadingParameterSite]>,
    /// Output of the last completed render
    pub frames: FrameSequence,
    /// Parameters last supplied by the parent, replayed on notification
    pub direct_parameters: Vec<Parameter>,
    /// Dynamic providers this component is subscribed to
    pub subscriptions: Vec<(ComponentId, CascadingParameterSite)>,
    pub provider: Option<ProviderState>,
    pub phase: Phase,
    pub queued: bool,
    /// Last assignment belonged to an abandoned batch; the parent's frames no
    /// longer describe what the instance holds
    pub stale_parameters: bool,
    pub render_count: usize,
}

impl ComponentState {
    pub fn new(
        id: ComponentId,
        component_type: ComponentType,
        parent: Option<ComponentId>,
        sites: Rc<[CascadingParameterSite]>,
    ) -> Self {
        Self {
            id,
            component_type,
            instance: component_type.instantiate(),
            parent,
            sites,
            frames: FrameSequence::default(),
            direct_parameters: Vec::new(),
            subscriptions: Vec::new(),
            provider: None,
            phase: Phase::Active,
            queued: false,
            stale_parameters: false,
            render_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn has_rendered(&self) -> bool {
        self.render_count > 0
    }
}

/// What a batch changed, so an abandoned batch can be undone.
///
/// The host only ever sees delivered batches; after a failure every
/// component's frames must again match what the host last received.
#[derive(Default)]
pub(crate) struct BatchJournal {
    /// Frames and render count from before the first render in this batch
    pub rendered: HashMap<ComponentId, (FrameSequence, usize)>,
    /// Components created during this batch, in creation order
    pub created: Vec<ComponentId>,
    /// Components that received parameters during this batch
    pub assigned: Vec<ComponentId>,
}

impl BatchJournal {
    pub fn record_render(&mut self, id: ComponentId, frames: FrameSequence, render_count: usize) {
        self.rendered.entry(id).or_insert((frames, render_count));
    }
}
