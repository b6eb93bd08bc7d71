//! Renderer
//!
//! Owns every live component in an arena keyed by [`ComponentId`] and runs
//! reconciliation passes. One pass drains the render queue (render, diff,
//! child parameter updates, provider notifications) into a single
//! [`RenderBatch`], sweeps removed components, and hands the batch to the
//! [`RenderHost`].
//!
//! A pass that fails is rolled back: components created by it are dropped,
//! rendered components get their previous frames back, and removals are
//! cancelled, so the renderer's frames keep matching what the host holds.

pub mod batch;
mod state;

pub use batch::{BatchSummary, DiffSummary, RecordingHost, RenderBatch, RenderHost};

use crate::cascading::{resolve_supplier, CascadingParameterSite};
use crate::component::{ComponentDefinition, ComponentType, ComponentTypeRegistry, Lifecycle};
use crate::config::RendererConfig;
use crate::diff::{compute_diff, ChildChange, RenderTreeDiff};
use crate::error::RenderError;
use crate::frame::{FrameBuilder, FrameKind, FrameSequence};
use crate::parameter::{parameters_unchanged, Parameter, ParameterView};
use crate::types::ComponentId;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use state::{BatchJournal, ComponentState, Phase, ProviderState};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, error, info, instrument, trace, warn};

/// Name reported when a supplier flips its fixed flag.
const FIXED_FLAG: &str = "IsFixed";

type Completion = LocalBoxFuture<'static, (ComponentId, Result<(), RenderError>)>;

/// Parameter update for a child found while post-processing a diff
enum ChildUpdate {
    Assign(ComponentId, Vec<Parameter>),
    Remove(ComponentId),
}

pub struct Renderer {
    components: HashMap<ComponentId, ComponentState>,
    types: ComponentTypeRegistry,
    next_component_id: u64,
    next_batch_number: u64,
    render_queue: VecDeque<ComponentId>,
    batch: RenderBatch,
    batch_open: bool,
    renders_in_batch: usize,
    pending_removals: Vec<ComponentId>,
    after_render: Vec<(ComponentId, bool)>,
    journal: BatchJournal,
    pending_work: FuturesUnordered<Completion>,
    host: Box<dyn RenderHost>,
    config: RendererConfig,
}

impl Renderer {
    pub fn new(host: impl RenderHost + 'static) -> Self {
        Self::with_config(host, RendererConfig::default())
    }

    pub fn with_config(host: impl RenderHost + 'static, config: RendererConfig) -> Self {
        Self {
            components: HashMap::new(),
            types: ComponentTypeRegistry::new(),
            next_component_id: 1,
            next_batch_number: 1,
            render_queue: VecDeque::new(),
            batch: RenderBatch::default(),
            batch_open: false,
            renders_in_batch: 0,
            pending_removals: Vec::new(),
            after_render: Vec::new(),
            journal: BatchJournal::default(),
            pending_work: FuturesUnordered::new(),
            host: Box::new(host),
            config,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Instantiate a component of `component_type` and give it a fresh id.
    pub fn assign_identity(
        &mut self,
        component_type: ComponentType,
        parent: Option<ComponentId>,
    ) -> ComponentId {
        let id = ComponentId(self.next_component_id);
        self.next_component_id += 1;
        let sites = self.types.register(&component_type);
        if self.batch_open {
            self.journal.created.push(id);
        }
        trace!(component = %id, component_type = component_type.name(), "Assigned identity");
        self.components
            .insert(id, ComponentState::new(id, component_type, parent, sites));
        id
    }

    pub fn assign_root_component<C: ComponentDefinition>(&mut self) -> ComponentId {
        self.assign_identity(ComponentType::of::<C>(), None)
    }

    /// Deliver direct parameters to a root component and run the resulting pass.
    pub fn render_root(
        &mut self,
        id: ComponentId,
        parameters: Vec<Parameter>,
    ) -> Result<(), RenderError> {
        self.run_batch(|renderer| renderer.assign_parameters(id, parameters))
    }

    /// Mark a component dirty and run a pass if none is in progress.
    pub fn trigger_render(&mut self, id: ComponentId) -> Result<(), RenderError> {
        if !self.components.contains_key(&id) {
            return Err(RenderError::ComponentNotFound(id));
        }
        self.run_batch(|renderer| {
            renderer.enqueue(id);
            Ok(())
        })
    }

    pub fn has_pending_work(&self) -> bool {
        !self.pending_work.is_empty()
    }

    /// Drive suspended work to completion.
    ///
    /// Each completion opens its own batch with the resumed component's render
    /// and everything it causes.
    pub async fn settle(&mut self) -> Result<(), RenderError> {
        while let Some((id, outcome)) = self.pending_work.next().await {
            self.resume(id, outcome)?;
        }
        Ok(())
    }

    /// Resume only the suspended work that has already completed; returns how
    /// many completions were processed.
    pub fn settle_ready(&mut self) -> Result<usize, RenderError> {
        let mut resumed = 0;
        while let Some(Some((id, outcome))) = self.pending_work.next().now_or_never() {
            self.resume(id, outcome)?;
            resumed += 1;
        }
        Ok(resumed)
    }

    fn resume(
        &mut self,
        id: ComponentId,
        outcome: Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        outcome.map_err(|err| err.in_component(id))?;
        if !self.is_alive(id) {
            debug!(component = %id, "Discarding completion of disposed component");
            return Ok(());
        }
        debug!(component = %id, "Suspended work completed");
        self.run_batch(|renderer| {
            renderer.enqueue(id);
            Ok(())
        })
    }

    /// Dispose every component and deliver the final batch.
    pub fn shutdown(&mut self) -> Result<(), RenderError> {
        let mut roots: Vec<ComponentId> = self
            .components
            .values()
            .filter(|state| state.parent.is_none())
            .map(|state| state.id)
            .collect();
        roots.sort();
        self.run_batch(|renderer| {
            for root in roots {
                renderer.begin_removal(root);
            }
            Ok(())
        })
    }

    // ---- diagnostics ----

    pub fn is_alive(&self, id: ComponentId) -> bool {
        self.components
            .get(&id)
            .map(ComponentState::is_active)
            .unwrap_or(false)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn render_count(&self, id: ComponentId) -> Option<usize> {
        self.components.get(&id).map(|state| state.render_count)
    }

    pub fn parent_of(&self, id: ComponentId) -> Option<ComponentId> {
        self.components.get(&id).and_then(|state| state.parent)
    }

    /// Child components in the order they appear in the last output
    pub fn children_of(&self, id: ComponentId) -> Vec<ComponentId> {
        self.components
            .get(&id)
            .map(|state| state.frames.component_ids())
            .unwrap_or_default()
    }

    /// Output of the component's last completed render
    pub fn frames_of(&self, id: ComponentId) -> Option<&FrameSequence> {
        self.components.get(&id).map(|state| &state.frames)
    }

    pub fn component_type_of(&self, id: ComponentId) -> Option<ComponentType> {
        self.components.get(&id).map(|state| state.component_type)
    }

    /// Live components of the named type, in id order
    pub fn find_components(&self, type_name: &str) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = self
            .components
            .values()
            .filter(|state| state.is_active() && state.component_type.name() == type_name)
            .map(|state| state.id)
            .collect();
        ids.sort();
        ids
    }

    /// Subscribers currently registered with a dynamic provider
    pub fn subscribers_of(&self, provider: ComponentId) -> Vec<ComponentId> {
        self.components
            .get(&provider)
            .and_then(|state| state.provider.as_ref())
            .map(|provider| provider.registry.subscribers())
            .unwrap_or_default()
    }

    /// Concatenated text of a component's output, descending into children.
    pub fn text_content(&self, id: ComponentId) -> Option<String> {
        let mut text = String::new();
        self.collect_text(id, &mut text)?;
        Some(text)
    }

    fn collect_text(&self, id: ComponentId, text: &mut String) -> Option<()> {
        let state = self.components.get(&id)?;
        for frame in state.frames.frames() {
            match &frame.kind {
                FrameKind::Text { content } => text.push_str(content),
                FrameKind::Component {
                    component_id: Some(child),
                    ..
                } => {
                    self.collect_text(*child, text);
                }
                _ => {}
            }
        }
        Some(())
    }

    // ---- batches ----

    fn run_batch(
        &mut self,
        work: impl FnOnce(&mut Self) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        if self.batch_open {
            return work(self);
        }
        self.batch_open = true;
        self.batch = RenderBatch::new(self.next_batch_number);
        self.next_batch_number += 1;
        self.renders_in_batch = 0;

        let result = work(self).and_then(|()| self.process_render_queue());
        if let Err(err) = result {
            error!(batch = self.batch.number, error = %err, "Render batch abandoned");
            self.roll_back();
            self.batch_open = false;
            self.batch = RenderBatch::default();
            return Err(err);
        }

        self.dispose_removed();
        self.journal = BatchJournal::default();
        self.batch_open = false;
        let batch = std::mem::take(&mut self.batch);
        self.deliver(batch)
    }

    /// Undo an abandoned batch so every component again holds the output the
    /// host last received.
    fn roll_back(&mut self) {
        for id in self.render_queue.drain(..) {
            if let Some(state) = self.components.get_mut(&id) {
                state.queued = false;
            }
        }
        self.after_render.clear();
        self.pending_removals.clear();

        let journal = std::mem::take(&mut self.journal);
        for id in journal.created.iter().rev() {
            let Some(mut state) = self.components.remove(id) else {
                continue;
            };
            for (provider, site) in &state.subscriptions {
                if let Some(registry) = self.registry_mut(*provider) {
                    registry.unsubscribe(*id, site);
                }
            }
            state.instance.dispose();
            trace!(component = %id, "Dropped component created by abandoned batch");
        }
        for id in &journal.assigned {
            if let Some(state) = self.components.get_mut(id) {
                state.stale_parameters = true;
            }
        }
        let restored = journal.rendered.len();
        for (id, (frames, render_count)) in journal.rendered {
            if let Some(state) = self.components.get_mut(&id) {
                state.frames = frames;
                state.render_count = render_count;
            }
        }
        for state in self.components.values_mut() {
            state.phase = Phase::Active;
        }
        debug!(
            dropped = journal.created.len(),
            restored,
            "Rolled back abandoned batch"
        );
    }

    fn deliver(&mut self, batch: RenderBatch) -> Result<(), RenderError> {
        if batch.is_empty() && !self.config.deliver_empty_batches {
            trace!(batch = batch.number, "Skipping empty batch");
            self.after_render.clear();
            return Ok(());
        }
        info!(
            batch = batch.number,
            diffs = batch.updated_components.len(),
            reference_frames = batch.reference_frames.len(),
            disposed = batch.disposed_component_ids.len(),
            "Delivering render batch"
        );
        if let Err(err) = self.host.update_display(&batch) {
            warn!(batch = batch.number, error = %err, "Host rejected render batch");
            self.after_render.clear();
            return Err(err);
        }
        for (id, first_render) in std::mem::take(&mut self.after_render) {
            if let Some(state) = self.components.get_mut(&id) {
                state.instance.on_after_render(first_render);
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, id: ComponentId) {
        if let Some(state) = self.components.get_mut(&id) {
            if state.is_active() && !state.queued {
                state.queued = true;
                self.render_queue.push_back(id);
                trace!(component = %id, "Queued render");
            }
        }
    }

    fn process_render_queue(&mut self) -> Result<(), RenderError> {
        while let Some(id) = self.render_queue.pop_front() {
            self.renders_in_batch += 1;
            if self.renders_in_batch > self.config.max_renders_per_batch {
                return Err(RenderError::RenderLoop {
                    limit: self.config.max_renders_per_batch,
                });
            }
            self.render_component(id)?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(component = %id))]
    fn render_component(&mut self, id: ComponentId) -> Result<(), RenderError> {
        let Some(state) = self.components.get_mut(&id) else {
            return Ok(());
        };
        state.queued = false;
        if !state.is_active() {
            return Ok(());
        }
        if state.has_rendered() && !state.instance.should_render() {
            trace!("Render skipped by component");
            return Ok(());
        }

        let mut builder = FrameBuilder::new();
        state
            .instance
            .render(&mut builder)
            .map_err(|err| err.in_component(id))?;
        let mut new_frames = builder.finish()?;
        let previous_render_count = state.render_count;
        let first_render = !state.has_rendered();
        state.render_count += 1;
        let old_frames = std::mem::take(&mut state.frames);

        let output = compute_diff(&old_frames, &new_frames, &mut self.batch.reference_frames);

        let mut updates = Vec::new();
        for change in &output.child_changes {
            match *change {
                ChildChange::Retained { old_index, new_index } => {
                    let Some(child) = old_frames.frames()[old_index].component_id() else {
                        continue;
                    };
                    new_frames.set_component_id(new_index, child);
                    let previous = old_frames.component_parameters(old_index);
                    let next = new_frames.component_parameters(new_index);
                    let stale = self
                        .components
                        .get(&child)
                        .map(|state| state.stale_parameters)
                        .unwrap_or(false);
                    if !stale && parameters_unchanged(&previous, &next) {
                        trace!(child = %child, "Child parameters unchanged");
                    } else {
                        updates.push(ChildUpdate::Assign(child, next));
                    }
                }
                ChildChange::Added {
                    frame_index,
                    reference_frame_index,
                } => {
                    let FrameKind::Component { component_type, .. } =
                        new_frames.frames()[frame_index].kind
                    else {
                        continue;
                    };
                    let child = self.assign_identity(component_type, Some(id));
                    new_frames.set_component_id(frame_index, child);
                    if let Some(frame) = self.batch.reference_frames.get_mut(reference_frame_index) {
                        frame.set_component_id(child);
                    }
                    updates.push(ChildUpdate::Assign(
                        child,
                        new_frames.component_parameters(frame_index),
                    ));
                }
                ChildChange::Removed { component_id } => {
                    updates.push(ChildUpdate::Remove(component_id));
                }
            }
        }

        debug!(
            render_count = self.render_count(id).unwrap_or_default(),
            edits = output.edits.len(),
            "Rendered component"
        );
        self.batch.updated_components.push(RenderTreeDiff {
            component_id: id,
            edits: output.edits,
        });
        self.after_render.push((id, first_render));
        self.journal.record_render(id, old_frames, previous_render_count);
        if let Some(state) = self.components.get_mut(&id) {
            state.frames = new_frames;
        }

        // a supplier may have changed its own state before this render
        if self.update_provider(id)? {
            self.notify_subscribers(id)?;
        }

        for update in updates {
            match update {
                ChildUpdate::Assign(child, parameters) => self.assign_parameters(child, parameters)?,
                ChildUpdate::Remove(child) => self.begin_removal(child),
            }
        }
        Ok(())
    }

    // ---- parameters & cascading ----

    /// Resolve cascading values, reconcile subscriptions and hand the merged
    /// snapshot to the component.
    #[instrument(skip(self, direct), fields(component = %id))]
    fn assign_parameters(
        &mut self,
        id: ComponentId,
        direct: Vec<Parameter>,
    ) -> Result<(), RenderError> {
        let (sites, parent) = {
            let state = self
                .components
                .get(&id)
                .ok_or(RenderError::ComponentNotFound(id))?;
            (state.sites.clone(), state.parent)
        };

        let mut cascading = Vec::new();
        let mut subscriptions = Vec::new();
        for site in sites.iter() {
            if let Some((provider, value, fixed)) = self.supply(parent, site) {
                cascading.push(Parameter::cascading(site.property, value));
                if !fixed {
                    subscriptions.push((provider, site.clone()));
                }
            }
        }
        self.reconcile_subscriptions(id, subscriptions);

        let Some(state) = self.components.get_mut(&id) else {
            return Err(RenderError::ComponentNotFound(id));
        };
        state.direct_parameters = direct.clone();
        state.stale_parameters = false;
        self.journal.assigned.push(id);
        let mut parameters = direct;
        parameters.extend(cascading);
        let (view, lifetime) = ParameterView::open(parameters);
        let lifecycle = state.instance.set_parameters(&view);
        lifetime.close();
        let lifecycle = lifecycle.map_err(|err| err.in_component(id))?;

        if self.update_provider(id)? {
            self.notify_subscribers(id)?;
        }

        match lifecycle {
            Lifecycle::Render => self.enqueue(id),
            Lifecycle::Suspend(work) => {
                debug!("Render suspended until pending work completes");
                self.pending_work
                    .push(async move { (id, work.await) }.boxed_local());
            }
        }
        Ok(())
    }

    /// Value for `site` from the nearest capable ancestor of `start`.
    fn supply(
        &self,
        start: Option<ComponentId>,
        site: &CascadingParameterSite,
    ) -> Option<(ComponentId, serde_json::Value, bool)> {
        let mut ancestors = Vec::new();
        let mut cursor = start;
        while let Some(ancestor) = cursor {
            let state = self.components.get(&ancestor)?;
            ancestors.push((ancestor, state.instance.as_supplier()));
            cursor = state.parent;
        }
        let provider = resolve_supplier(ancestors, site)?;
        let state = self.components.get(&provider)?;
        let supplier = state.instance.as_supplier()?;
        let (snapshot, fixed) = match &state.provider {
            Some(ProviderState {
                fixed: true,
                fixed_value: Some(value),
                ..
            }) => (value.clone(), true),
            Some(provider_state) => (supplier.current_value(), provider_state.fixed),
            None => (supplier.current_value(), supplier.is_fixed()),
        };
        Some((provider, supplier.project(&snapshot, site), fixed))
    }

    fn reconcile_subscriptions(
        &mut self,
        id: ComponentId,
        next: Vec<(ComponentId, CascadingParameterSite)>,
    ) {
        let previous = match self.components.get_mut(&id) {
            Some(state) => std::mem::take(&mut state.subscriptions),
            None => return,
        };
        for (provider, site) in &previous {
            if !next.contains(&(*provider, site.clone())) {
                if let Some(registry) = self.registry_mut(*provider) {
                    registry.unsubscribe(id, site);
                }
            }
        }
        for (provider, site) in &next {
            if let Some(registry) = self.registry_mut(*provider) {
                registry.subscribe(id, site);
            }
        }
        if let Some(state) = self.components.get_mut(&id) {
            state.subscriptions = next;
        }
    }

    fn registry_mut(
        &mut self,
        provider: ComponentId,
    ) -> Option<&mut crate::cascading::SubscriptionRegistry> {
        self.components
            .get_mut(&provider)
            .and_then(|state| state.provider.as_mut())
            .map(|provider| &mut provider.registry)
    }

    /// Record the supplier state after an assignment. Returns true when a
    /// dynamic value changed and subscribers must be notified.
    fn update_provider(&mut self, id: ComponentId) -> Result<bool, RenderError> {
        let Some(state) = self.components.get_mut(&id) else {
            return Ok(false);
        };
        let Some(supplier) = state.instance.as_supplier() else {
            return Ok(false);
        };
        let fixed = supplier.is_fixed();
        let value = supplier.current_value();

        match &mut state.provider {
            None => {
                debug!(fixed, "Provider initialized");
                state.provider = Some(ProviderState::new(fixed, value));
                Ok(false)
            }
            Some(provider) if provider.fixed != fixed => Err(RenderError::FixedFlagChanged {
                component: id,
                flag: FIXED_FLAG,
            }),
            Some(provider) if provider.fixed => Ok(false),
            Some(provider) => {
                if provider.last_value == value {
                    return Ok(false);
                }
                provider.last_value = value;
                Ok(!provider.registry.is_empty())
            }
        }
    }

    fn notify_subscribers(&mut self, provider: ComponentId) -> Result<(), RenderError> {
        let Some(registry) = self.registry_mut(provider) else {
            return Ok(());
        };
        let mut notification = registry.notify_all();
        debug!(
            provider = %provider,
            subscribers = notification.remaining(),
            "Notifying subscribers"
        );
        loop {
            let next = match self.registry_mut(provider) {
                Some(registry) => notification.next_live(registry),
                None => None,
            };
            let Some(subscriber) = next else {
                break;
            };
            let Some(direct) = self
                .components
                .get(&subscriber)
                .map(|state| state.direct_parameters.clone())
            else {
                continue;
            };
            self.assign_parameters(subscriber, direct)?;
        }
        Ok(())
    }

    // ---- disposal ----

    /// Mark a removed subtree; nothing in it renders again this pass.
    fn begin_removal(&mut self, id: ComponentId) {
        let Some(state) = self.components.get_mut(&id) else {
            return;
        };
        if state.phase == Phase::Removing {
            return;
        }
        state.phase = Phase::Removing;
        let children = state.frames.component_ids();
        trace!(component = %id, "Marked for removal");
        for child in children {
            self.begin_removal(child);
        }
        if self.parent_is_active(id) {
            self.pending_removals.push(id);
        }
    }

    fn parent_is_active(&self, id: ComponentId) -> bool {
        match self.parent_of(id) {
            Some(parent) => self.is_alive(parent),
            None => true,
        }
    }

    fn dispose_removed(&mut self) {
        for id in std::mem::take(&mut self.pending_removals) {
            self.dispose_component(id);
        }
    }

    fn dispose_component(&mut self, id: ComponentId) {
        let Some(mut state) = self.components.remove(&id) else {
            return;
        };
        for (provider, site) in &state.subscriptions {
            if let Some(registry) = self.registry_mut(*provider) {
                registry.unsubscribe(id, site);
            }
        }
        for child in state.frames.component_ids() {
            self.dispose_component(child);
        }
        state.instance.dispose();
        self.batch.disposed_component_ids.push(id);
        debug!(component = %id, component_type = state.component_type.name(), "Disposed component");
    }
}
