//! Property-based tests for parsing, rendering and expansion.

use crate::{parse, render, Configuration};
use proptest::prelude::*;

// Names are stored trimmed
fn name_strategy() -> impl Strategy<Value = String> {
    any::<String>().prop_map(|s| s.trim().to_string())
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_./:-]{0,16}",
        Just("null".to_string()),
        any::<String>(),
    ]
}

// Flat entries: (is_section, name, value)
fn entries_strategy() -> impl Strategy<Value = Vec<(bool, String, Option<String>)>> {
    prop::collection::vec(
        (any::<bool>(), "[a-z]{1,8}", prop::option::of("[a-z0-9]{1,8}")),
        0..12,
    )
}

fn build(entries: &[(bool, String, Option<String>)]) -> Configuration {
    let mut conf = Configuration::new();
    let root = conf.create("root", None);
    let mut current = root;
    for (section, name, value) in entries {
        let mut node = conf.node_mut(current);
        if *section {
            if let Ok(child) = node.add_child_node(name, value.as_deref()) {
                current = child;
            }
        } else {
            let value = value.as_deref().unwrap_or("x");
            let _ = node.add_attribute_node(name, Some(value));
        }
    }
    conf
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    // Rendering an attribute and parsing it back yields the same name and value
    #[test]
    fn render_parse_round_trip(root_name in name_strategy(), name in name_strategy(), value in value_strategy()) {
        let mut conf = Configuration::new();
        let root = conf.create(&root_name, None);
        conf.node_mut(root).add_attribute_node(&name, Some(&value)).unwrap();

        let back = parse(&render(&conf)).unwrap();

        prop_assert_eq!(back.root().name(), root_name.as_str());
        let attr = back.root().attr_by_index(0);
        prop_assert_eq!(attr.name(), name.as_str());
        prop_assert_eq!(attr.verbatim_value(), Some(value.as_str()));
    }

    // Rendering a whole tree and parsing it back renders identically
    #[test]
    fn render_is_stable(entries in entries_strategy()) {
        let conf = build(&entries);
        let text = render(&conf);

        let back = parse(&text).unwrap();

        prop_assert_eq!(render(&back), text);
    }

    // Freshly parsed trees are clean
    #[test]
    fn parsed_tree_is_not_modified(entries in entries_strategy()) {
        let text = render(&build(&entries));
        let conf = parse(&text).unwrap();

        let mut pending = vec![conf.root()];
        while let Some(node) = pending.pop() {
            prop_assert!(!node.modified(), "{} is modified", node.path());
            prop_assert!(node.attributes().all(|a| !a.modified()));
            pending.extend(node.children());
        }
    }

    // `..` returns the parent and `/` the root from every section
    #[test]
    fn navigation_parent_and_root(entries in entries_strategy()) {
        let conf = parse(&render(&build(&entries))).unwrap();

        let mut pending = vec![conf.root()];
        while let Some(node) = pending.pop() {
            prop_assert_eq!(node.navigate("/").unwrap().handle(), conf.root().handle());
            for child in node.children() {
                prop_assert_eq!(child.navigate("..").unwrap().handle(), node.handle());
                pending.push(child);
            }
        }
    }

    // Text without variable markers evaluates to itself
    #[test]
    fn evaluate_is_identity_without_markers(text in any::<String>()) {
        prop_assume!(!text.contains("$(") && !text.starts_with("$$"));
        let conf = parse("root{ a=1 }").unwrap();

        prop_assert_eq!(conf.root().evaluate(&text).unwrap(), text.clone());
        prop_assert_eq!(conf.root().attr_by_name("a").evaluate(&text).unwrap(), text);
    }
}
