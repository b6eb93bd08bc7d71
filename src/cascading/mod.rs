//! Cascading Values
//!
//! Providers supply values to descendant parameter sites without every level in
//! between forwarding them. Each component type declares its consumer-side
//! sites statically; at assignment time the renderer resolves every site to the
//! nearest enclosing provider that reports it can supply the site.
//!
//! Providers run in one of two modes:
//! - fixed: the value is captured at the provider's first assignment and copied
//!   into matching descendants without any subscription;
//! - dynamic: descendants subscribe, and a value change re-assigns every live
//!   subscriber within the same batch.

pub mod registry;
pub mod value;

pub use registry::{Notification, Subscription, SubscriptionRegistry};
pub use value::CascadingValue;

use crate::types::ComponentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of the kind of capability a parameter site asks for.
///
/// Different kinds are supplied by unrelated providers and never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityKind(&'static str);

impl CapabilityKind {
    /// Plain cascading parameters, supplied by [`CascadingValue`]
    pub const CASCADING_PARAMETER: CapabilityKind = CapabilityKind("cascading-parameter");

    pub const fn new(id: &'static str) -> Self {
        CapabilityKind(id)
    }

    pub fn id(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Expected shape of a cascading value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Any,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Kind of a concrete value; `null` carries no type information.
    pub fn of(value: &Value) -> ValueKind {
        match value {
            Value::Null => ValueKind::Any,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Whether a site expecting `self` accepts values declared as `supplied`.
    pub fn is_assignable_from(&self, supplied: ValueKind) -> bool {
        *self == ValueKind::Any || supplied == ValueKind::Any || *self == supplied
    }
}

/// One declared consumer-side slot of a component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadingParameterSite {
    pub component_type: &'static str,
    pub property: &'static str,
    pub capability: CapabilityKind,
    pub value_kind: ValueKind,
    /// Explicit supplier name to match; unnamed sites match by value kind only
    pub supplier_name: Option<&'static str>,
}

impl CascadingParameterSite {
    pub fn new(
        component_type: &'static str,
        property: &'static str,
        capability: CapabilityKind,
        value_kind: ValueKind,
    ) -> Self {
        Self {
            component_type,
            property,
            capability,
            value_kind,
            supplier_name: None,
        }
    }

    pub fn named(mut self, supplier_name: &'static str) -> Self {
        self.supplier_name = Some(supplier_name);
        self
    }
}

/// Provider side of the cascading protocol.
pub trait CascadingValueSupplier {
    /// Fixed providers never notify; the flag must not change after the first assignment.
    fn is_fixed(&self) -> bool;

    fn can_supply_value(&self, site: &CascadingParameterSite) -> bool;

    /// Snapshot of the supplied state, compared across assignments to detect changes.
    fn current_value(&self) -> Value;

    /// Value delivered to one site, derived from a state snapshot.
    fn project(&self, value: &Value, _site: &CascadingParameterSite) -> Value {
        value.clone()
    }
}

/// Pick the supplier for a site from ancestors ordered nearest first.
pub fn resolve_supplier<'a>(
    ancestors: impl IntoIterator<Item = (ComponentId, Option<&'a dyn CascadingValueSupplier>)>,
    site: &CascadingParameterSite,
) -> Option<ComponentId> {
    ancestors.into_iter().find_map(|(id, supplier)| {
        supplier
            .filter(|supplier| supplier.can_supply_value(site))
            .map(|_| id)
    })
}
