//! Suppliers whose value changes through their own state rather than their parameters.

use super::support::{consumer, set_mood, take_events, Consumer, MoodProvider};
use cascade::{ComponentDefinition, ComponentId, RecordingHost, RenderError, Renderer};

fn mounted(host: RecordingHost) -> (Renderer, ComponentId, ComponentId) {
    set_mood("light", false);
    let mut renderer = Renderer::new(host);
    let supplier = renderer.assign_root_component::<MoodProvider>();
    renderer
        .render_root(supplier, MoodProvider::parameters(|b| consumer(b, 0, "A")))
        .unwrap();
    let child = renderer.find_components(Consumer::TYPE_NAME)[0];
    take_events();
    (renderer, supplier, child)
}

#[test]
fn test_state_change_notifies_subscribers_on_render() {
    let host = RecordingHost::new();
    let (mut renderer, supplier, child) = mounted(host.clone());
    assert_eq!(renderer.subscribers_of(supplier), vec![child]);
    assert_eq!(renderer.text_content(child).unwrap(), "A:light");

    set_mood("dark", false);
    renderer.trigger_render(supplier).unwrap();

    assert_eq!(take_events(), vec!["assign A dark"]);
    assert_eq!(renderer.text_content(child).unwrap(), "A:dark");
    let batch = host.last_batch().unwrap();
    assert!(batch.contains_diff_for(supplier));
    assert!(batch.contains_diff_for(child));
    assert_eq!(renderer.render_count(child), Some(2));
}

#[test]
fn test_render_without_state_change_leaves_subscribers_alone() {
    let host = RecordingHost::new();
    let (mut renderer, supplier, child) = mounted(host.clone());

    renderer.trigger_render(supplier).unwrap();

    assert!(take_events().is_empty());
    assert!(!host.last_batch().unwrap().contains_diff_for(child));
    assert_eq!(renderer.render_count(child), Some(1));
}

#[test]
fn test_fixed_flag_is_checked_on_every_render() {
    let (mut renderer, supplier, child) = mounted(RecordingHost::new());

    set_mood("light", true);
    let err = renderer.trigger_render(supplier).unwrap_err();

    assert!(matches!(
        err,
        RenderError::FixedFlagChanged { component, flag: "IsFixed" } if component == supplier
    ));
    assert_eq!(renderer.text_content(child).unwrap(), "A:light");
}
