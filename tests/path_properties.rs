//! Property tests for path addressing.

use proptest::prelude::*;
use serde_json::json;
use spark_forms::{get, set, Path, Value};

#[derive(Clone, Debug)]
enum Step {
    Key(String),
    Index(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(Step::Key),
        (0usize..4).prop_map(Step::Index),
    ]
}

fn path_text(steps: &[Step]) -> String {
    let mut text = String::new();
    for step in steps {
        match step {
            Step::Key(key) if text.is_empty() => text.push_str(key),
            Step::Key(key) => {
                text.push('.');
                text.push_str(key);
            }
            Step::Index(index) => text.push_str(&format!("[{index}]")),
        }
    }
    text
}

/// Non-null leaves only: a stored null reads back as the default
/// (see `path::tests::test_null_leaf_reads_as_default`).
fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,10}".prop_map(Value::from),
    ]
}

fn base() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![Just(Value::Null), leaf()];
    scalar.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4).prop_map(Value::from),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn set_then_get_returns_leaf(
        base in base(),
        steps in prop::collection::vec(step(), 1..5),
        leaf in leaf(),
    ) {
        let path = Path::parse(&path_text(&steps)).unwrap();
        let next = set(&base, &path, leaf.clone());

        prop_assert_eq!(get(&next, &path, Value::Null), leaf);
    }

    #[test]
    fn set_leaves_input_untouched(
        base in base(),
        steps in prop::collection::vec(step(), 1..5),
        leaf in leaf(),
    ) {
        let snapshot = serde_json::Value::from(&base);
        let path = Path::parse(&path_text(&steps)).unwrap();
        let _ = set(&base, &path, leaf);

        prop_assert_eq!(serde_json::Value::from(&base), snapshot);
    }

    #[test]
    fn siblings_keep_identity(
        steps in prop::collection::vec(step(), 0..4),
        leaf in leaf(),
    ) {
        let root = Value::from(json!({ "left": { "a": 1 }, "right": { "b": [1, 2] } }));
        let mut text = String::from("left");
        let rest = path_text(&steps);
        if !rest.is_empty() {
            if !rest.starts_with('[') {
                text.push('.');
            }
            text.push_str(&rest);
        }
        let path = Path::parse(&text).unwrap();
        let next = set(&root, &path, leaf);

        prop_assert!(next.get_key("right").unwrap().ptr_eq(root.get_key("right").unwrap()));
    }

    #[test]
    fn display_round_trips(steps in prop::collection::vec(step(), 0..6)) {
        let path = Path::parse(&path_text(&steps)).unwrap();
        prop_assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
    }
}
