//! Components
//!
//! The contract between the renderer and component instances, plus the static
//! per-type metadata (factory and declared cascading parameter sites) that
//! stands in for runtime reflection.

use crate::cascading::{CascadingParameterSite, CascadingValueSupplier};
use crate::error::RenderError;
use crate::frame::FrameBuilder;
use crate::parameter::ParameterView;
use futures::future::LocalBoxFuture;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use tracing::debug;

/// Work a component is still waiting on before it can produce output
pub type PendingWork = LocalBoxFuture<'static, Result<(), RenderError>>;

/// What the renderer should do after a parameter assignment.
pub enum Lifecycle {
    /// Render now, within the current batch.
    Render,
    /// Defer the render until the work completes; the completion renders in a new batch.
    Suspend(PendingWork),
}

impl Lifecycle {
    pub fn suspend(work: impl Future<Output = Result<(), RenderError>> + 'static) -> Self {
        Lifecycle::Suspend(Box::pin(work))
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Render => f.write_str("Render"),
            Lifecycle::Suspend(_) => f.write_str("Suspend(..)"),
        }
    }
}

/// A stateful node of the component tree.
pub trait Component: 'static {
    /// Receive the parameters for this pass.
    ///
    /// The view expires as soon as this call returns.
    fn set_parameters(&mut self, parameters: &ParameterView) -> Result<Lifecycle, RenderError>;

    /// Produce this component's frames.
    fn render(&self, builder: &mut FrameBuilder) -> Result<(), RenderError>;

    /// Consulted before every render except the first.
    fn should_render(&self) -> bool {
        true
    }

    /// Called after the batch containing this component's render was delivered.
    fn on_after_render(&mut self, _first_render: bool) {}

    /// Called once when the component leaves the tree.
    fn dispose(&mut self) {}

    /// Components that provide cascading values expose their supplier here.
    fn as_supplier(&self) -> Option<&dyn CascadingValueSupplier> {
        None
    }
}

/// Static description of a component type.
pub trait ComponentDefinition: Component + Sized {
    const TYPE_NAME: &'static str;

    fn create() -> Self;

    /// Cascading parameter sites declared by this type
    fn cascading_parameters() -> Vec<CascadingParameterSite> {
        Vec::new()
    }
}

fn create_boxed<C: ComponentDefinition>() -> Box<dyn Component> {
    Box::new(C::create())
}

/// Type handle carried by component frames.
#[derive(Clone, Copy)]
pub struct ComponentType {
    name: &'static str,
    type_id: TypeId,
    create: fn() -> Box<dyn Component>,
    sites: fn() -> Vec<CascadingParameterSite>,
}

impl ComponentType {
    pub fn of<C: ComponentDefinition>() -> Self {
        Self {
            name: C::TYPE_NAME,
            type_id: TypeId::of::<C>(),
            create: create_boxed::<C>,
            sites: C::cascading_parameters,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.create)()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

/// Per-type cascading parameter tables, resolved once at registration.
#[derive(Default)]
pub struct ComponentTypeRegistry {
    sites: HashMap<TypeId, Rc<[CascadingParameterSite]>>,
}

impl ComponentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type if needed and return its declared sites.
    pub fn register(&mut self, component_type: &ComponentType) -> Rc<[CascadingParameterSite]> {
        self.sites
            .entry(component_type.type_id)
            .or_insert_with(|| {
                let sites: Rc<[CascadingParameterSite]> = (component_type.sites)().into();
                debug!(
                    component_type = component_type.name,
                    site_count = sites.len(),
                    "Registered component type"
                );
                sites
            })
            .clone()
    }

    pub fn is_registered(&self, component_type: &ComponentType) -> bool {
        self.sites.contains_key(&component_type.type_id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
