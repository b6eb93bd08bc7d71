//! Supplier resolution across nested providers, names, kinds and capabilities.

use super::support::{
    consumer, provider, query_provider, take_events, Consumer, CountConsumer, Plain,
    ProviderOptions, QueryConsumer, QueryProvider, Shell, Wrapper,
};
use cascade::{CascadingValue, ComponentDefinition, Parameter, RecordingHost, Renderer};
use serde_json::json;

fn render(body: Vec<Parameter>) -> Renderer {
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Shell>();
    renderer.render_root(root, body).unwrap();
    renderer
}

fn only(renderer: &Renderer, type_name: &str) -> String {
    let ids = renderer.find_components(type_name);
    assert_eq!(ids.len(), 1, "expected exactly one {}", type_name);
    renderer.text_content(ids[0]).unwrap()
}

#[test]
fn test_nearest_matching_provider_wins() {
    let renderer = render(Shell::parameters(|b| {
        provider(b, 0, "outer", ProviderOptions::default(), |b| {
            provider(b, 0, "inner", ProviderOptions::default(), |b| consumer(b, 0, "A"))
        })
    }));
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:inner");
}

#[test]
fn test_provider_of_other_kind_is_skipped() {
    let renderer = render(Shell::parameters(|b| {
        provider(b, 0, "outer", ProviderOptions::default(), |b| {
            provider(b, 0, 42i64, ProviderOptions::default(), |b| consumer(b, 0, "A"))
        })
    }));
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:outer");
}

#[test]
fn test_no_provider_leaves_parameter_absent() {
    let renderer = render(Shell::parameters(|b| consumer(b, 0, "A")));
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:-");
}

#[test]
fn test_named_sites_only_match_named_providers() {
    let named = ProviderOptions {
        name: Some("counter"),
        ..ProviderOptions::default()
    };
    let renderer = render(Shell::parameters(move |b| {
        provider(b, 0, 7i64, named.clone(), |b| {
            b.open_component::<CountConsumer>(0);
            b.close_component();
        })
    }));
    assert_eq!(only(&renderer, CountConsumer::TYPE_NAME), "count=7");

    let renderer = render(Shell::parameters(|b| {
        provider(b, 0, 7i64, ProviderOptions::default(), |b| {
            b.open_component::<CountConsumer>(0);
            b.close_component();
        })
    }));
    assert_eq!(only(&renderer, CountConsumer::TYPE_NAME), "count=-");
}

#[test]
fn test_named_provider_does_not_fill_unnamed_sites() {
    let renderer = render(Shell::parameters(|b| {
        provider(b, 0, "outer", ProviderOptions::default(), |b| {
            let named = ProviderOptions {
                name: Some("Other"),
                ..ProviderOptions::default()
            };
            provider(b, 0, "named", named, |b| consumer(b, 0, "A"))
        })
    }));
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:outer");
}

#[test]
fn test_disjoint_capability_kinds_never_collide() {
    let renderer = render(Shell::parameters(|b| {
        provider(b, 0, "anything", ProviderOptions::default(), |b| {
            b.open_component::<QueryConsumer>(0);
            b.close_component();
        })
    }));
    assert_eq!(only(&renderer, QueryConsumer::TYPE_NAME), "query=-");
}

fn mixed_consumers(b: &mut cascade::FrameBuilder) {
    consumer(b, 0, "A");
    b.open_component::<QueryConsumer>(2);
    b.close_component();
}

#[test]
fn test_providers_of_different_capabilities_fill_only_their_own_sites() {
    // query provider outside the value provider
    let renderer = render(Shell::parameters(|b| {
        query_provider(b, 0, json!({"page": 2}), |b| {
            provider(b, 0, "dark", ProviderOptions::default(), mixed_consumers)
        })
    }));
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:dark");
    assert_eq!(only(&renderer, QueryConsumer::TYPE_NAME), r#"query={"page":2}"#);

    // and inside it
    let renderer = render(Shell::parameters(|b| {
        provider(b, 0, "dark", ProviderOptions::default(), |b| {
            query_provider(b, 0, json!({"page": 3}), mixed_consumers)
        })
    }));
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:dark");
    assert_eq!(only(&renderer, QueryConsumer::TYPE_NAME), r#"query={"page":3}"#);

    let query = renderer.find_components(QueryConsumer::TYPE_NAME)[0];
    let value = renderer.find_components(Consumer::TYPE_NAME)[0];
    let query_supplier = renderer.find_components(QueryProvider::TYPE_NAME)[0];
    let value_supplier = renderer.find_components(CascadingValue::TYPE_NAME)[0];
    assert_eq!(renderer.subscribers_of(query_supplier), vec![query]);
    assert_eq!(renderer.subscribers_of(value_supplier), vec![value]);
}

#[test]
fn test_query_change_does_not_reach_value_consumers() {
    let body = |page: i64| {
        Shell::parameters(move |b| {
            query_provider(b, 0, json!({ "page": page }), |b| {
                provider(b, 0, "dark", ProviderOptions::default(), mixed_consumers)
            })
        })
    };
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Shell>();
    renderer.render_root(root, body(1)).unwrap();
    take_events();

    renderer.render_root(root, body(2)).unwrap();

    assert!(take_events().is_empty());
    assert_eq!(only(&renderer, Consumer::TYPE_NAME), "A:dark");
    assert_eq!(only(&renderer, QueryConsumer::TYPE_NAME), r#"query={"page":2}"#);
}

#[test]
fn test_value_change_skips_descendants_without_sites() {
    let body = |theme: &'static str| {
        Shell::parameters(move |b| {
            provider(b, 0, theme, ProviderOptions::default(), |b| {
                consumer(b, 0, "A");
                b.open_component::<Plain>(2);
                b.close_component();
            })
        })
    };
    let host = RecordingHost::new();
    let mut renderer = Renderer::new(host.clone());
    let root = renderer.assign_root_component::<Shell>();
    renderer.render_root(root, body("light")).unwrap();
    let plain = renderer.find_components(Plain::TYPE_NAME)[0];
    let child = renderer.find_components(Consumer::TYPE_NAME)[0];

    renderer.render_root(root, body("dark")).unwrap();

    let batch = host.last_batch().unwrap();
    assert!(batch.contains_diff_for(child));
    assert!(!batch.contains_diff_for(plain));
    assert_eq!(renderer.render_count(plain), Some(1));
}

#[test]
fn test_value_change_reaches_consumers_below_intermediate_components() {
    let body = |theme: &'static str| {
        Shell::parameters(move |b| {
            provider(b, 0, theme, ProviderOptions::default(), |b| {
                b.open_component::<Wrapper>(0);
                b.close_component();
            })
        })
    };
    let host = RecordingHost::new();
    let mut renderer = Renderer::new(host.clone());
    let root = renderer.assign_root_component::<Shell>();
    renderer.render_root(root, body("light")).unwrap();
    let wrapper = renderer.find_components(Wrapper::TYPE_NAME)[0];
    let child = renderer.find_components(Consumer::TYPE_NAME)[0];
    let provider_id = renderer.parent_of(wrapper).unwrap();
    assert_eq!(renderer.parent_of(child), Some(wrapper));
    assert_eq!(renderer.subscribers_of(provider_id), vec![child]);
    take_events();

    renderer.render_root(root, body("dark")).unwrap();

    assert_eq!(take_events(), vec!["assign deep dark"]);
    assert_eq!(renderer.text_content(child).unwrap(), "deep:dark");
    assert_eq!(renderer.render_count(wrapper), Some(1));
    assert!(!host.last_batch().unwrap().contains_diff_for(wrapper));
}

#[test]
fn test_value_change_reaches_subscribers_in_registration_order() {
    let body = |theme: &'static str| {
        Shell::parameters(move |b| {
            provider(b, 0, theme, ProviderOptions::default(), |b| {
                consumer(b, 0, "A");
                consumer(b, 2, "B");
            })
        })
    };
    let mut renderer = Renderer::new(RecordingHost::new());
    let root = renderer.assign_root_component::<Shell>();
    renderer.render_root(root, body("light")).unwrap();
    take_events();

    let consumers = renderer.find_components(Consumer::TYPE_NAME);
    let provider_id = renderer.parent_of(consumers[0]).unwrap();
    assert_eq!(renderer.subscribers_of(provider_id), consumers);

    renderer.render_root(root, body("dark")).unwrap();

    assert_eq!(take_events(), vec!["assign A dark", "assign B dark"]);
    assert_eq!(renderer.text_content(root).unwrap(), "A:darkB:dark");
}
