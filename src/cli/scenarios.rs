//! Canned reconciliation scenarios exercised by `cascade run`.
//!
//! Each scenario mounts a [`ScenarioRoot`] that renders a [`CascadingValue`]
//! around a [`Greeter`], then replays a list of root parameter sets and
//! checks the greeter's final text and render count.

use crate::cascading::{CapabilityKind, CascadingParameterSite, CascadingValue, ValueKind};
use crate::component::{Component, ComponentDefinition, Lifecycle};
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::frame::FrameBuilder;
use crate::parameter::{Parameter, ParameterView, RenderFragment};
use crate::renderer::{BatchSummary, RecordingHost, Renderer};
use serde::Serialize;
use tracing::info;

/// Consumer rendering one line built from a cascading and a direct parameter.
#[derive(Default)]
pub struct Greeter {
    cascading: String,
    regular: String,
}

impl Greeter {
    pub const CASCADING: &'static str = "CascadingParameter";
    pub const REGULAR: &'static str = "RegularParameter";
    pub const DEFER: &'static str = "Defer";
}

impl Component for Greeter {
    fn set_parameters(&mut self, parameters: &ParameterView) -> Result<Lifecycle, RenderError> {
        self.cascading = parameters
            .get_as::<String>(Self::CASCADING)?
            .unwrap_or_default();
        self.regular = parameters.require::<String>(Self::REGULAR)?;
        if parameters.get_as::<bool>(Self::DEFER)?.unwrap_or(false) {
            return Ok(Lifecycle::suspend(async {
                tokio::task::yield_now().await;
                Ok(())
            }));
        }
        Ok(Lifecycle::Render)
    }

    fn render(&self, builder: &mut FrameBuilder) -> Result<(), RenderError> {
        builder.add_text(
            0,
            format!(
                "{}={}; {}={}",
                Self::CASCADING,
                self.cascading,
                Self::REGULAR,
                self.regular
            ),
        );
        Ok(())
    }
}

impl ComponentDefinition for Greeter {
    const TYPE_NAME: &'static str = "Greeter";

    fn create() -> Self {
        Self::default()
    }

    fn cascading_parameters() -> Vec<CascadingParameterSite> {
        vec![CascadingParameterSite::new(
            Self::TYPE_NAME,
            Self::CASCADING,
            CapabilityKind::CASCADING_PARAMETER,
            ValueKind::String,
        )]
    }
}

/// Root of every scenario: a provider wrapping one greeter.
#[derive(Default)]
pub struct ScenarioRoot {
    step: Step,
}

impl ScenarioRoot {
    pub const PROVIDED: &'static str = "Provided";
    pub const REGULAR: &'static str = "Regular";
    pub const FIXED: &'static str = "Fixed";
    pub const DEFER: &'static str = "Defer";
}

impl Component for ScenarioRoot {
    fn set_parameters(&mut self, parameters: &ParameterView) -> Result<Lifecycle, RenderError> {
        self.step = Step {
            provided: parameters.require(Self::PROVIDED)?,
            regular: parameters.require(Self::REGULAR)?,
            fixed: parameters.get_as(Self::FIXED)?.unwrap_or(false),
            defer: parameters.get_as(Self::DEFER)?.unwrap_or(false),
        };
        Ok(Lifecycle::Render)
    }

    fn render(&self, builder: &mut FrameBuilder) -> Result<(), RenderError> {
        let regular = self.step.regular.clone();
        let defer = self.step.defer;
        let child_content = RenderFragment::new(move |builder| {
            builder.open_component::<Greeter>(0);
            builder.add_component_parameter(1, Greeter::REGULAR, regular.clone());
            if defer {
                builder.add_component_parameter(2, Greeter::DEFER, true);
            }
            builder.close_component();
        });

        builder.open_component::<CascadingValue>(0);
        builder.add_component_parameter(1, CascadingValue::VALUE, self.step.provided.clone());
        if self.step.fixed {
            builder.add_component_parameter(2, CascadingValue::IS_FIXED, true);
        }
        builder.add_component_parameter(3, CascadingValue::CHILD_CONTENT, child_content);
        builder.close_component();
        Ok(())
    }
}

impl ComponentDefinition for ScenarioRoot {
    const TYPE_NAME: &'static str = "ScenarioRoot";

    fn create() -> Self {
        Self::default()
    }
}

/// One set of root parameters
#[derive(Debug, Clone, Default, Serialize)]
pub struct Step {
    pub provided: String,
    pub regular: String,
    pub fixed: bool,
    pub defer: bool,
}

impl Step {
    fn new(provided: &str, regular: &str) -> Self {
        Self {
            provided: provided.to_string(),
            regular: regular.to_string(),
            ..Self::default()
        }
    }

    fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    fn deferred(mut self) -> Self {
        self.defer = true;
        self
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new(ScenarioRoot::PROVIDED, self.provided.as_str()),
            Parameter::new(ScenarioRoot::REGULAR, self.regular.as_str()),
            Parameter::new(ScenarioRoot::FIXED, self.fixed),
            Parameter::new(ScenarioRoot::DEFER, self.defer),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: Vec<Step>,
    pub expected_text: String,
    pub expected_render_count: usize,
}

fn greeting(provided: &str, regular: &str) -> String {
    format!(
        "{}={}; {}={}",
        Greeter::CASCADING,
        provided,
        Greeter::REGULAR,
        regular
    )
}

/// All scenarios, in the order `cascade scenarios` lists them.
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "initial",
            description: "First render delivers cascading and direct values",
            steps: vec![Step::new("Hello", "Goodbye")],
            expected_text: greeting("Hello", "Goodbye"),
            expected_render_count: 1,
        },
        Scenario {
            name: "direct-change",
            description: "Changing a direct parameter re-renders the consumer",
            steps: vec![Step::new("Hello", "Goodbye"), Step::new("Hello", "Farewell")],
            expected_text: greeting("Hello", "Farewell"),
            expected_render_count: 2,
        },
        Scenario {
            name: "provider-change",
            description: "Changing a dynamic provider's value notifies the consumer",
            steps: vec![Step::new("Hello", "Goodbye"), Step::new("Bonjour", "Goodbye")],
            expected_text: greeting("Bonjour", "Goodbye"),
            expected_render_count: 2,
        },
        Scenario {
            name: "provider-rerender",
            description: "Re-rendering a provider with an unchanged value skips the consumer",
            steps: vec![Step::new("Hello", "Goodbye"), Step::new("Hello", "Goodbye")],
            expected_text: greeting("Hello", "Goodbye"),
            expected_render_count: 1,
        },
        Scenario {
            name: "fixed-provider",
            description: "A fixed provider never propagates later value changes",
            steps: vec![
                Step::new("Hello", "Goodbye").fixed(),
                Step::new("Bonjour", "Goodbye").fixed(),
            ],
            expected_text: greeting("Hello", "Goodbye"),
            expected_render_count: 1,
        },
        Scenario {
            name: "deferred",
            description: "A suspended consumer renders in its own batch once its work completes",
            steps: vec![Step::new("Hello", "Goodbye").deferred()],
            expected_text: greeting("Hello", "Goodbye"),
            expected_render_count: 1,
        },
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|scenario| scenario.name == name)
}

/// Outcome of running one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub batches: Vec<BatchSummary>,
    pub text: String,
    pub render_count: usize,
    pub expected_text: String,
    pub expected_render_count: usize,
    pub passed: bool,
}

/// Replay a scenario against a fresh renderer.
pub async fn run(scenario: &Scenario, config: &RendererConfig) -> Result<ScenarioReport, RenderError> {
    let host = RecordingHost::new();
    let mut renderer = Renderer::with_config(host.clone(), config.clone());
    let root = renderer.assign_root_component::<ScenarioRoot>();

    for step in &scenario.steps {
        renderer.render_root(root, step.parameters())?;
        renderer.settle().await?;
    }

    let greeter = renderer.find_components(Greeter::TYPE_NAME).first().copied();
    let text = renderer.text_content(root).unwrap_or_default();
    let render_count = greeter
        .and_then(|id| renderer.render_count(id))
        .unwrap_or_default();
    let passed = text == scenario.expected_text && render_count == scenario.expected_render_count;
    info!(scenario = scenario.name, passed, "Scenario finished");

    Ok(ScenarioReport {
        name: scenario.name,
        batches: host.batches().iter().map(|batch| batch.summary()).collect(),
        text,
        render_count,
        expected_text: scenario.expected_text.clone(),
        expected_render_count: scenario.expected_render_count,
        passed,
    })
}
