//! Error types for the rendering core.

use crate::types::ComponentId;
use thiserror::Error;

/// Errors raised while building frames, assigning parameters or running a batch.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("The value of '{flag}' cannot be changed dynamically (component {component})")]
    FixedFlagChanged {
        component: ComponentId,
        flag: &'static str,
    },

    #[error("Parameter snapshot has expired; '{parameter}' was read after its delivering call returned")]
    SnapshotExpired { parameter: String },

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter '{name}' has the wrong type: {message}")]
    ParameterType { name: String, message: String },

    #[error("Invalid frames: {0}")]
    InvalidFrames(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    #[error("{0}")]
    Failed(String),

    #[error("Component {component} failed: {message}")]
    Component {
        component: ComponentId,
        message: String,
    },

    #[error("Render loop detected: more than {limit} renders in one batch")]
    RenderLoop { limit: usize },

    #[error("Host error: {0}")]
    Host(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RenderError {
    /// Attach the failing component's identity to an error raised by its own logic.
    pub(crate) fn in_component(self, component: ComponentId) -> Self {
        match self {
            RenderError::Failed(message) => RenderError::Component { component, message },
            other => other,
        }
    }
}

impl From<config::ConfigError> for RenderError {
    fn from(err: config::ConfigError) -> Self {
        RenderError::Config(err.to_string())
    }
}
