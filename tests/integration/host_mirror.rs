//! A host that only sees batch edits ends up with exactly the rendered frames.

use super::mirror::{nodes_of, MirrorHost};
use super::support::{consumer, provider, Consumer, ProviderOptions, Shell};
use cascade::{ComponentDefinition, ComponentId, Parameter, Renderer};

#[derive(Clone)]
struct Page {
    title: &'static str,
    class: Option<&'static str>,
    items: Vec<&'static str>,
    theme: &'static str,
    show_consumer: bool,
}

fn body(page: Page) -> Vec<Parameter> {
    Shell::parameters(move |b| {
        b.open_element(0, "header");
        if let Some(class) = page.class {
            b.add_attribute(1, "class", class);
        }
        b.add_text(2, page.title);
        b.close_element();

        b.open_element(3, "ul");
        for item in &page.items {
            b.open_element(4, "li");
            b.add_text(5, *item);
            b.close_element();
        }
        b.close_element();

        let show = page.show_consumer;
        provider(b, 10, page.theme, ProviderOptions::default(), move |b| {
            b.open_element(0, "main");
            if show {
                consumer(b, 1, "A");
            }
            b.add_text(3, "end");
            b.close_element();
        });
    })
}

fn assert_mirrored(renderer: &Renderer, host: &MirrorHost, root: ComponentId) {
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        let frames = renderer.frames_of(id).expect("live component has frames");
        let expected = nodes_of(frames);
        assert_eq!(host.nodes(id).unwrap_or_default(), expected, "component {}", id);
        pending.extend(renderer.children_of(id));
    }
}

#[test]
fn test_mirror_tracks_every_render() {
    let host = MirrorHost::new();
    let mut renderer = Renderer::new(host.clone());
    let root = renderer.assign_root_component::<Shell>();

    let first = Page {
        title: "Inbox",
        class: Some("bold"),
        items: vec!["one", "two"],
        theme: "light",
        show_consumer: true,
    };
    let steps = vec![
        first.clone(),
        Page {
            title: "Inbox (1)",
            ..first.clone()
        },
        Page {
            class: None,
            items: vec!["one", "two", "three"],
            ..first.clone()
        },
        Page {
            items: vec![],
            theme: "dark",
            ..first.clone()
        },
        Page {
            show_consumer: false,
            class: Some("dim"),
            ..first.clone()
        },
        first.clone(),
    ];

    let mut removed = Vec::new();
    for page in steps {
        let before = renderer.find_components(Consumer::TYPE_NAME);
        renderer.render_root(root, body(page)).unwrap();
        assert_mirrored(&renderer, &host, root);
        for id in before {
            if !renderer.is_alive(id) {
                removed.push(id);
            }
        }
    }

    assert_eq!(host.batch_count(), 6);
    assert_eq!(removed.len(), 1);
    for id in removed {
        assert!(!host.knows(id));
    }
}
