//! Parameter snapshots
//!
//! A [`ParameterView`] is only readable while the call that delivered it is
//! running. The renderer holds the matching [`ParameterLifetime`] and drops it
//! when the call returns; from then on every read fails with
//! [`RenderError::SnapshotExpired`], even for keys that were read before.

use crate::error::RenderError;
use crate::parameter::{Parameter, ParameterValue, RenderFragment};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

struct Snapshot {
    parameters: Vec<Parameter>,
    closed: Cell<bool>,
}

/// Read-once view over the parameters of one assignment call.
///
/// Cloning shares the same snapshot; a retained clone expires together with
/// the original.
#[derive(Clone)]
pub struct ParameterView {
    snapshot: Rc<Snapshot>,
}

/// Guard owning the validity window of a [`ParameterView`].
pub struct ParameterLifetime {
    snapshot: Rc<Snapshot>,
}

impl Drop for ParameterLifetime {
    fn drop(&mut self) {
        self.snapshot.closed.set(true);
    }
}

impl ParameterLifetime {
    pub fn close(self) {}
}

impl ParameterView {
    /// Open a new snapshot. The view is valid until the lifetime guard drops.
    pub fn open(parameters: Vec<Parameter>) -> (ParameterView, ParameterLifetime) {
        let snapshot = Rc::new(Snapshot {
            parameters,
            closed: Cell::new(false),
        });
        (
            ParameterView {
                snapshot: Rc::clone(&snapshot),
            },
            ParameterLifetime { snapshot },
        )
    }

    pub fn is_closed(&self) -> bool {
        self.snapshot.closed.get()
    }

    fn ensure_open(&self, name: &str) -> Result<(), RenderError> {
        if self.is_closed() {
            return Err(RenderError::SnapshotExpired {
                parameter: name.to_string(),
            });
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&Parameter> {
        self.snapshot
            .parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Result<Option<&ParameterValue>, RenderError> {
        self.ensure_open(name)?;
        Ok(self.find(name).map(|p| &p.value))
    }

    pub fn contains(&self, name: &str) -> Result<bool, RenderError> {
        self.ensure_open(name)?;
        Ok(self.find(name).is_some())
    }

    /// Whether the named parameter was supplied by a cascading provider
    pub fn is_cascading(&self, name: &str) -> Result<bool, RenderError> {
        self.ensure_open(name)?;
        Ok(self.find(name).map(|p| p.cascading).unwrap_or(false))
    }

    pub fn get_value(&self, name: &str) -> Result<Option<&Value>, RenderError> {
        match self.get(name)? {
            None => Ok(None),
            Some(ParameterValue::Value(value)) => Ok(Some(value)),
            Some(ParameterValue::Fragment(_)) => Err(RenderError::ParameterType {
                name: name.to_string(),
                message: "expected a value, found a render fragment".to_string(),
            }),
        }
    }

    pub fn get_fragment(&self, name: &str) -> Result<Option<RenderFragment>, RenderError> {
        match self.get(name)? {
            None => Ok(None),
            Some(ParameterValue::Fragment(fragment)) => Ok(Some(fragment.clone())),
            Some(ParameterValue::Value(_)) => Err(RenderError::ParameterType {
                name: name.to_string(),
                message: "expected a render fragment".to_string(),
            }),
        }
    }

    /// Typed read through `serde_json`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, RenderError> {
        match self.get_value(name)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| RenderError::ParameterType {
                    name: name.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    /// Typed read of a parameter that must be present.
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T, RenderError> {
        self.get_as(name)?
            .ok_or_else(|| RenderError::MissingParameter(name.to_string()))
    }

    pub fn iter(&self) -> Result<impl Iterator<Item = &Parameter>, RenderError> {
        self.ensure_open("*")?;
        Ok(self.snapshot.parameters.iter())
    }

    pub fn len(&self) -> Result<usize, RenderError> {
        self.ensure_open("*")?;
        Ok(self.snapshot.parameters.len())
    }

    pub fn is_empty(&self) -> Result<bool, RenderError> {
        Ok(self.len()? == 0)
    }
}
