//! Component Parameters
//!
//! Name/value pairs delivered to a component during one parameter-assignment
//! step, and the fragment type used to pass child content between components.

pub mod view;

pub use view::{ParameterLifetime, ParameterView};

use crate::frame::FrameBuilder;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// A piece of render logic passed as a parameter (for example child content).
///
/// Fragments run inside the receiving component's render call, so the frames
/// they produce belong to the receiver.
#[derive(Clone)]
pub struct RenderFragment(Rc<dyn Fn(&mut FrameBuilder)>);

impl RenderFragment {
    pub fn new(render: impl Fn(&mut FrameBuilder) + 'static) -> Self {
        RenderFragment(Rc::new(render))
    }

    pub fn render(&self, builder: &mut FrameBuilder) {
        (self.0)(builder)
    }

    /// Identity comparison; two fragments are never compared by behavior.
    pub fn ptr_eq(&self, other: &RenderFragment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RenderFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderFragment(..)")
    }
}

/// Payload of an attribute frame or a component parameter
#[derive(Debug, Clone)]
pub enum ParameterValue {
    Value(Value),
    Fragment(RenderFragment),
}

impl ParameterValue {
    /// Whether the value is provably unchanged.
    ///
    /// Plain values compare structurally. Fragments can capture arbitrary state,
    /// so they always count as changed.
    pub fn definitely_equals(&self, other: &ParameterValue) -> bool {
        match (self, other) {
            (ParameterValue::Value(a), ParameterValue::Value(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ParameterValue::Value(value) => Some(value),
            ParameterValue::Fragment(_) => None,
        }
    }

    /// Short human-readable rendering used in logs and batch summaries
    pub fn describe(&self) -> String {
        match self {
            ParameterValue::Value(Value::String(s)) => s.clone(),
            ParameterValue::Value(value) => value.to_string(),
            ParameterValue::Fragment(_) => "<fragment>".to_string(),
        }
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterValue::Value(a), ParameterValue::Value(b)) => a == b,
            (ParameterValue::Fragment(a), ParameterValue::Fragment(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Value> for ParameterValue {
    fn from(value: Value) -> Self {
        ParameterValue::Value(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Value(Value::String(value.to_string()))
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Value(Value::String(value))
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Value(Value::Bool(value))
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Value(Value::from(value))
    }
}

impl From<RenderFragment> for ParameterValue {
    fn from(fragment: RenderFragment) -> Self {
        ParameterValue::Fragment(fragment)
    }
}

/// One named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: ParameterValue,
    /// Supplied by an ancestor provider rather than by the parent's frames
    pub cascading: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            cascading: false,
        }
    }

    pub fn cascading(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            cascading: true,
        }
    }
}

/// Whether two direct parameter lists are provably identical.
///
/// Order matters: parameters come from frames with stable sequence numbers.
pub fn parameters_unchanged(previous: &[Parameter], next: &[Parameter]) -> bool {
    previous.len() == next.len()
        && previous
            .iter()
            .zip(next)
            .all(|(a, b)| a.name == b.name && a.value.definitely_equals(&b.value))
}
