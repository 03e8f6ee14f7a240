//! Search a sanitized tree by value instead of by schema.
//!
//! Useful when the location of a field in the game state is unknown but one
//! of its values is, e.g. a unit id seen in an action.

use crate::{Key, Value};

/// Returns every list on the path from `root` to each leaf matching
/// `target`, innermost first.
///
/// A leaf matches when it equals `target`, or when it is text containing the
/// text form of `target`. Integers and floats compare by numeric value, so
/// `7` and `7.0` are equal. Keys are searched before values. A list is
/// reported once per matching child, so it can appear several times.
pub fn find_containers<'a>(root: &'a Value, target: &Value) -> Vec<&'a Value> {
    let needle = needle_text(target);
    let mut found = Vec::new();
    collect(root, target, needle.as_deref(), &mut found);
    found
}

fn collect<'a>(
    node: &'a Value,
    target: &Value,
    needle: Option<&str>,
    found: &mut Vec<&'a Value>,
) -> bool {
    let Value::List(entries) = node else {
        return leaf_matches(node, target, needle);
    };
    let mut matched = false;
    for (key, _) in entries {
        if key_matches(key, target, needle) {
            found.push(node);
            matched = true;
        }
    }
    for (_, child) in entries {
        if collect(child, target, needle, found) {
            found.push(node);
            matched = true;
        }
    }
    matched
}

fn leaf_matches(leaf: &Value, target: &Value, needle: Option<&str>) -> bool {
    if leaf == target || numbers_equal(leaf, target) {
        return true;
    }
    match (leaf, needle) {
        (Value::Text(text), Some(needle)) => text.contains(needle),
        _ => false,
    }
}

fn key_matches(key: &Key, target: &Value, needle: Option<&str>) -> bool {
    match key {
        Key::Int(i) => numbers_equal(&Value::Int(*i), target),
        Key::Text(text) => needle.is_some_and(|needle| text.contains(needle)),
    }
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => *i as f64 == *f,
        (Value::Float(a), Value::Float(b)) => a == b,
        _ => false,
    }
}

fn needle_text(target: &Value) -> Option<String> {
    match target {
        Value::Text(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        // `1.0`, not `1`, so a float needle does not match inside "x1y".
        Value::Float(f) => Some(format!("{f:?}")),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::List(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: Vec<(Key, Value)>) -> Value {
        Value::List(entries)
    }

    #[test]
    fn reports_ancestors_innermost_first() {
        let unit = list(vec![
            (Key::from("units_id"), Value::Int(190)),
            (Key::from("units_x"), Value::Int(4)),
        ]);
        let units = list(vec![(Key::Int(0), unit.clone())]);
        let root = list(vec![(Key::from("units"), units.clone())]);

        let found = find_containers(&root, &Value::Int(190));
        assert_eq!(found, vec![&unit, &units, &root]);
    }

    #[test]
    fn text_matches_by_substring() {
        let root = list(vec![
            (Key::Int(0), Value::from("Infantry")),
            (Key::Int(1), Value::from("Mech")),
        ]);
        assert_eq!(find_containers(&root, &Value::from("fant")).len(), 1);
        // Integer needles match inside text too.
        let root = list(vec![(Key::Int(0), Value::from("unit 190 moved"))]);
        assert_eq!(find_containers(&root, &Value::Int(190)).len(), 1);
    }

    #[test]
    fn keys_are_searched() {
        let root = list(vec![
            (Key::from("players_funds"), Value::Int(1000)),
            (Key::Int(7), Value::Null),
        ]);
        assert_eq!(find_containers(&root, &Value::from("funds")), vec![&root]);
        assert_eq!(find_containers(&root, &Value::Int(7)), vec![&root]);
    }

    #[test]
    fn container_repeats_per_matching_child() {
        let root = list(vec![
            (Key::Int(0), Value::Int(5)),
            (Key::Int(1), Value::Int(5)),
        ]);
        assert_eq!(find_containers(&root, &Value::Int(5)), vec![&root, &root]);
    }

    #[test]
    fn numbers_compare_by_value() {
        let root = list(vec![
            (Key::Int(7), Value::Null),
            (Key::from("funds"), Value::Int(7)),
        ]);
        assert_eq!(find_containers(&root, &Value::Float(7.0)), vec![&root, &root]);
        let root = list(vec![(Key::Int(0), Value::Float(2.0))]);
        assert_eq!(find_containers(&root, &Value::Int(2)), vec![&root]);
        assert!(find_containers(&root, &Value::Float(2.5)).is_empty());
    }

    #[test]
    fn float_needle_text_keeps_its_fraction() {
        let root = list(vec![(Key::Int(0), Value::from("x1y"))]);
        assert!(find_containers(&root, &Value::Float(1.0)).is_empty());
        let root = list(vec![(Key::Int(0), Value::from("ratio 1.0"))]);
        assert_eq!(find_containers(&root, &Value::Float(1.0)), vec![&root]);
    }

    #[test]
    fn no_match_and_bare_leaf() {
        let root = list(vec![(Key::Int(0), Value::Int(1))]);
        assert!(find_containers(&root, &Value::Int(2)).is_empty());
        assert!(find_containers(&Value::Int(2), &Value::Int(2)).is_empty());
    }
}
