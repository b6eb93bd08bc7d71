//! Built-in provider component.

use crate::cascading::{CapabilityKind, CascadingParameterSite, CascadingValueSupplier, ValueKind};
use crate::component::{Component, ComponentDefinition, Lifecycle};
use crate::error::RenderError;
use crate::frame::FrameBuilder;
use crate::parameter::{ParameterView, RenderFragment};
use serde_json::Value;

/// Supplies `Value` to descendant sites of kind
/// [`CapabilityKind::CASCADING_PARAMETER`] and renders `ChildContent`.
///
/// A named provider only matches sites naming it (ASCII case-insensitive);
/// an unnamed provider only matches unnamed sites whose value kind accepts the
/// kind declared by the provider's first value.
#[derive(Default)]
pub struct CascadingValue {
    value: Value,
    name: Option<String>,
    is_fixed: bool,
    declared_kind: Option<ValueKind>,
    child_content: Option<RenderFragment>,
}

impl CascadingValue {
    pub const VALUE: &'static str = "Value";
    pub const NAME: &'static str = "Name";
    pub const IS_FIXED: &'static str = "IsFixed";
    pub const CHILD_CONTENT: &'static str = "ChildContent";

    fn declared_kind(&self) -> ValueKind {
        self.declared_kind.unwrap_or(ValueKind::Any)
    }
}

impl Component for CascadingValue {
    fn set_parameters(&mut self, parameters: &ParameterView) -> Result<Lifecycle, RenderError> {
        self.value = parameters
            .get_value(Self::VALUE)?
            .cloned()
            .unwrap_or(Value::Null);
        self.name = parameters.get_as::<String>(Self::NAME)?;
        // unset counts as false
        self.is_fixed = parameters.get_as::<bool>(Self::IS_FIXED)?.unwrap_or(false);
        self.child_content = parameters.get_fragment(Self::CHILD_CONTENT)?;
        if self.declared_kind.is_none() && !self.value.is_null() {
            self.declared_kind = Some(ValueKind::of(&self.value));
        }
        Ok(Lifecycle::Render)
    }

    fn render(&self, builder: &mut FrameBuilder) -> Result<(), RenderError> {
        if let Some(child_content) = &self.child_content {
            builder.add_fragment(0, child_content);
        }
        Ok(())
    }

    fn as_supplier(&self) -> Option<&dyn CascadingValueSupplier> {
        Some(self)
    }
}

impl ComponentDefinition for CascadingValue {
    const TYPE_NAME: &'static str = "CascadingValue";

    fn create() -> Self {
        Self::default()
    }
}

impl CascadingValueSupplier for CascadingValue {
    fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    fn can_supply_value(&self, site: &CascadingParameterSite) -> bool {
        if site.capability != CapabilityKind::CASCADING_PARAMETER {
            return false;
        }
        let name_matches = match (&self.name, site.supplier_name) {
            (Some(name), Some(wanted)) => name.eq_ignore_ascii_case(wanted),
            (None, None) => true,
            _ => false,
        };
        name_matches && site.value_kind.is_assignable_from(self.declared_kind())
    }

    fn current_value(&self) -> Value {
        self.value.clone()
    }
}
