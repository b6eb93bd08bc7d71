//! Snapshot validity and parameter errors surfaced through the renderer.

use super::support::{leaked_view, Consumer, Leaker, Shell};
use cascade::{Parameter, RecordingHost, RenderError, Renderer};

#[test]
fn test_retained_snapshot_expires_after_assignment() {
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Leaker>();
    renderer
        .render_root(root, vec![Parameter::new("Greeting", "hi")])
        .unwrap();

    let view = leaked_view().expect("leaker keeps its view");
    assert!(view.is_closed());
    let err = view.get("Greeting").unwrap_err();
    assert!(matches!(err, RenderError::SnapshotExpired { parameter } if parameter == "Greeting"));
    assert!(matches!(
        view.get_as::<String>("Greeting"),
        Err(RenderError::SnapshotExpired { .. })
    ));
}

#[test]
fn test_missing_required_parameter_is_distinct_from_expiry() {
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Shell>();
    let err = renderer
        .render_root(
            root,
            Shell::parameters(|b| {
                b.open_component::<Consumer>(0);
                b.close_component();
            }),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::MissingParameter(name) if name == "Label"));
}

#[test]
fn test_wrong_parameter_type_is_reported() {
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Shell>();
    let err = renderer
        .render_root(
            root,
            Shell::parameters(|b| {
                b.open_component::<Consumer>(0);
                b.add_component_parameter(1, Consumer::LABEL, 12i64);
                b.close_component();
            }),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::ParameterType { name, .. } if name == "Label"));
}
