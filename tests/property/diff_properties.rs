//! Replaying a diff on the old output always yields the new output.

use super::mirror::{apply_edits, nodes_of};
use cascade::diff::{compute_diff, ChildChange, EditKind};
use cascade::frame::FrameSequence;
use cascade::FrameBuilder;
use proptest::prelude::*;
use std::collections::BTreeMap;

const ATTRIBUTE_NAMES: [&str; 3] = ["class", "id", "title"];

#[derive(Debug, Clone)]
enum Shape {
    Text(String),
    Element {
        name: &'static str,
        attributes: BTreeMap<u32, String>,
        children: BTreeMap<u32, Shape>,
    },
    Region(BTreeMap<u32, Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop::sample::select(vec!["a", "b", "c"]).prop_map(|s| Shape::Text(s.to_string()));
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (
                prop::sample::select(vec!["div", "span"]),
                prop::collection::btree_map(0u32..3, prop::sample::select(vec!["x", "y"]).prop_map(String::from), 0..3),
                prop::collection::btree_map(10u32..16, inner.clone(), 0..4),
            )
                .prop_map(|(name, attributes, children)| Shape::Element {
                    name,
                    attributes,
                    children,
                }),
            prop::collection::btree_map(0u32..4, inner, 0..3).prop_map(Shape::Region),
        ]
    })
}

fn siblings_strategy() -> impl Strategy<Value = BTreeMap<u32, Shape>> {
    prop::collection::btree_map(0u32..8, shape_strategy(), 0..6)
}

fn emit(builder: &mut FrameBuilder, sequence: u32, shape: &Shape) {
    match shape {
        Shape::Text(text) => builder.add_text(sequence, text.clone()),
        Shape::Element {
            name,
            attributes,
            children,
        } => {
            builder.open_element(sequence, *name);
            for (attribute_sequence, value) in attributes {
                builder.add_attribute(
                    *attribute_sequence,
                    ATTRIBUTE_NAMES[*attribute_sequence as usize],
                    value.as_str(),
                );
            }
            for (child_sequence, child) in children {
                emit(builder, *child_sequence, child);
            }
            builder.close_element();
        }
        Shape::Region(children) => {
            builder.open_region(sequence);
            for (child_sequence, child) in children {
                emit(builder, *child_sequence, child);
            }
            builder.close_region();
        }
    }
}

fn build(siblings: &BTreeMap<u32, Shape>) -> FrameSequence {
    let mut builder = FrameBuilder::new();
    for (sequence, shape) in siblings {
        emit(&mut builder, *sequence, shape);
    }
    builder.finish().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_replaying_edits_reproduces_new_output(old in siblings_strategy(), new in siblings_strategy()) {
        let old = build(&old);
        let new = build(&new);
        let mut table = Vec::new();
        let output = compute_diff(&old, &new, &mut table);

        let mut nodes = nodes_of(&old);
        apply_edits(&mut nodes, &output.edits, &table);
        prop_assert_eq!(nodes, nodes_of(&new));
    }

    #[test]
    fn test_diff_against_self_is_empty(siblings in siblings_strategy()) {
        let frames = build(&siblings);
        let mut table = Vec::new();
        let output = compute_diff(&frames, &frames, &mut table);
        prop_assert!(output.edits.is_empty());
        prop_assert!(table.is_empty());
    }

    #[test]
    fn test_step_in_and_out_are_balanced(old in siblings_strategy(), new in siblings_strategy()) {
        let old = build(&old);
        let new = build(&new);
        let mut table = Vec::new();
        let output = compute_diff(&old, &new, &mut table);

        let mut depth = 0i32;
        for edit in &output.edits {
            match edit.kind {
                EditKind::StepIn => depth += 1,
                EditKind::StepOut => depth -= 1,
                _ => {}
            }
            prop_assert!(depth >= 0);
        }
        prop_assert_eq!(depth, 0);
        let no_removals = output.child_changes.iter().all(|c| !matches!(c, ChildChange::Removed { .. }));
        prop_assert!(no_removals);
    }
}
