use json_ledger::{Diff, Document};
use serde_json::{json, Value};

fn doc(pairs: &[(&str, Value)]) -> Document {
    let mut doc = Document::new();
    for (key, value) in pairs {
        doc.insert((*key).to_owned(), value.clone());
    }
    doc
}

// ---- basics -----------------------------------------------------------------

#[test]
fn reports_changed_and_added_keys() {
    let before = doc(&[("a", json!(1)), ("b", json!(2))]);
    let after = doc(&[("a", json!(1)), ("b", json!(3)), ("c", json!(4))]);

    let diff = Diff::between(&before, &after, 5);
    assert_eq!(diff.len(), 2);
    assert!(diff.get("a").is_none());
    assert_eq!(diff.get("b").unwrap().before, json!(2));
    assert_eq!(diff.get("b").unwrap().after, json!(3));
    assert_eq!(diff.get("c").unwrap().before, json!(null));
    assert_eq!(diff.get("c").unwrap().after, json!(4));
}

#[test]
fn removed_keys_fold_to_null() {
    let before = doc(&[("x", json!(1))]);
    let after = doc(&[]);

    let diff = Diff::between(&before, &after, 5);
    assert_eq!(diff.len(), 1);
    assert_eq!(diff.get("x").unwrap().after, json!(null));

    // a key set to null explicitly reads the same way
    let nulled = doc(&[("x", json!(null))]);
    assert_eq!(Diff::between(&before, &nulled, 5), diff);
}

#[test]
fn identical_documents_diff_empty() {
    let a = doc(&[("k", json!({ "nested": [1, 2] }))]);
    let diff = Diff::between(&a, &a.clone(), 5);
    assert!(diff.is_empty());
    assert_eq!(diff.len(), 0);
    assert_eq!(diff.omitted(), 0);
    assert_eq!(diff.to_value(), json!({}));
    assert_eq!(diff.to_string(), "{}");
}

#[test]
fn nested_changes_count_as_one_key() {
    let before = doc(&[("cfg", json!({ "x": 1, "y": 2 }))]);
    let after = doc(&[("cfg", json!({ "x": 1, "y": 3 }))]);

    let diff = Diff::between(&before, &after, 5);
    assert_eq!(diff.len(), 1);
    assert_eq!(diff.get("cfg").unwrap().after, json!({ "x": 1, "y": 3 }));
}

#[test]
fn entries_iterate_in_sorted_key_order() {
    let before = Document::new();
    let after = doc(&[("c", json!(3)), ("a", json!(1)), ("b", json!(2))]);

    let diff = Diff::between(&before, &after, 5);
    let keys: Vec<&str> = diff.entries().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

// ---- truncation -------------------------------------------------------------

#[test]
fn truncation_keeps_first_keys_in_sorted_order() {
    let before = Document::new();
    let after = doc(&[
        ("a", json!(1)),
        ("b", json!(2)),
        ("c", json!(3)),
        ("d", json!(4)),
        ("e", json!(5)),
        ("f", json!(6)),
        ("g", json!(7)),
    ]);

    let diff = Diff::between(&before, &after, 5);
    assert_eq!(diff.len(), 5);
    assert_eq!(diff.omitted(), 2);
    assert!(!diff.is_empty());
    for key in ["a", "b", "c", "d", "e"] {
        assert!(diff.get(key).is_some());
    }
    assert!(diff.get("f").is_none());
    assert!(diff.get("g").is_none());

    let rendered = diff.to_value();
    assert_eq!(rendered["__truncated__"], json!("2 more changes"));
    assert_eq!(rendered.as_object().unwrap().len(), 6);
}

#[test]
fn cap_of_zero_keeps_nothing_but_still_counts() {
    let before = Document::new();
    let after = doc(&[("a", json!(1)), ("b", json!(2))]);

    let diff = Diff::between(&before, &after, 0);
    assert_eq!(diff.len(), 0);
    assert_eq!(diff.omitted(), 2);
    assert!(!diff.is_empty());
    assert_eq!(diff.to_value(), json!({ "__truncated__": "2 more changes" }));
}

#[test]
fn no_truncation_marker_under_the_cap() {
    let before = Document::new();
    let after = doc(&[("a", json!(1))]);

    let rendered = Diff::between(&before, &after, 5).to_value();
    assert!(rendered.get("__truncated__").is_none());
}

// ---- rendering --------------------------------------------------------------

#[test]
fn display_renders_compact_json() {
    let before = doc(&[("b", json!(2))]);
    let after = doc(&[("b", json!(3))]);

    let diff = Diff::between(&before, &after, 5);
    assert_eq!(diff.to_string(), r#"{"b":{"after":3,"before":2}}"#);
}
