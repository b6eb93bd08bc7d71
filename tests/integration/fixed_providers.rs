//! Fixed providers: frozen values, no subscriptions, immutable fixed flag.

use super::support::{consumer, provider, take_events, Consumer, ProviderOptions, Shell};
use cascade::{CascadingValue, ComponentDefinition, Parameter, RecordingHost, RenderError, Renderer};

fn body(theme: &'static str, fixed: Option<bool>, label: &'static str) -> Vec<Parameter> {
    Shell::parameters(move |b| {
        provider(b, 0, theme, ProviderOptions { fixed, name: None }, move |b| {
            consumer(b, 0, label)
        })
    })
}

fn mounted(theme: &'static str, fixed: Option<bool>) -> (Renderer, cascade::ComponentId) {
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Shell>();
    renderer.render_root(root, body(theme, fixed, "A")).unwrap();
    (renderer, root)
}

#[test]
fn test_fixed_provider_has_no_subscribers() {
    let (renderer, _) = mounted("light", Some(true));
    let provider_id = renderer.find_components(CascadingValue::TYPE_NAME)[0];
    assert!(renderer.subscribers_of(provider_id).is_empty());
}

#[test]
fn test_fixed_value_is_copied_on_unrelated_assignment() {
    let (mut renderer, root) = mounted("light", Some(true));
    take_events();

    // the label change re-assigns the consumer; the cascading value stays frozen
    renderer.render_root(root, body("dark", Some(true), "B")).unwrap();

    assert_eq!(take_events(), vec!["assign B light"]);
    let child = renderer.find_components(Consumer::TYPE_NAME)[0];
    assert_eq!(renderer.text_content(child).unwrap(), "B:light");
}

#[test]
fn test_switching_to_fixed_fails() {
    let (mut renderer, root) = mounted("light", None);

    let err = renderer
        .render_root(root, body("light", Some(true), "A"))
        .unwrap_err();

    assert!(matches!(err, RenderError::FixedFlagChanged { flag: "IsFixed", .. }));
    assert!(err
        .to_string()
        .contains("The value of 'IsFixed' cannot be changed dynamically"));
}

#[test]
fn test_switching_from_fixed_fails() {
    let (mut renderer, root) = mounted("light", Some(true));
    let err = renderer
        .render_root(root, body("light", Some(false), "A"))
        .unwrap_err();
    assert!(matches!(err, RenderError::FixedFlagChanged { .. }));
}

#[test]
fn test_unset_flag_equals_false() {
    let (mut renderer, root) = mounted("light", None);
    renderer
        .render_root(root, body("dark", Some(false), "A"))
        .unwrap();
    let child = renderer.find_components(Consumer::TYPE_NAME)[0];
    assert_eq!(renderer.text_content(child).unwrap(), "A:dark");
}
