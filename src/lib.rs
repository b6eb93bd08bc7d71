//! Cascade: reconciliation core for component UI runtimes
//!
//! Components render into flat frame sequences; the renderer diffs each new
//! output against the previous one and delivers the edits to a host in
//! batches. Ancestors can supply cascading values to descendants, either
//! fixed at first assignment or dynamic with change notification.

pub mod cascading;
pub mod cli;
pub mod component;
pub mod config;
pub mod diff;
pub mod error;
pub mod frame;
pub mod logging;
pub mod parameter;
pub mod renderer;
pub mod types;

pub use cascading::{CascadingParameterSite, CascadingValue, CascadingValueSupplier};
pub use component::{Component, ComponentDefinition, ComponentType, Lifecycle};
pub use error::RenderError;
pub use frame::{FrameBuilder, FrameSequence};
pub use parameter::{Parameter, ParameterValue, ParameterView, RenderFragment};
pub use renderer::{RecordingHost, RenderBatch, RenderHost, Renderer};
pub use types::{ComponentId, SequenceNumber};
