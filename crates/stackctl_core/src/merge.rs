//! Merge Engine: deep-merges `serde_yaml::Value` documents.
//!
//! Maps recurse key by key, sequences concatenate left-then-right, and
//! scalars take the right-hand value. Neither input is mutated in place;
//! the result is a fresh value so callers never alias input substructures.

use serde_yaml::{Mapping, Value};

/// Deep-merge `right` on top of `left`, returning a new value.
pub fn merge(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Mapping(l), Value::Mapping(r)) => Value::Mapping(merge_mappings(l, r)),
        (Value::Sequence(l), Value::Sequence(r)) => {
            let mut combined = l.clone();
            combined.extend(r.clone());
            Value::Sequence(combined)
        }
        (_, Value::Null) => left.clone(),
        _ => right.clone(),
    }
}

/// Deep-merge two mappings, as [`merge`] does for the `Value::Mapping` case.
pub fn merge_mappings(left: &Mapping, right: &Mapping) -> Mapping {
    let mut result = left.clone();
    for (key, right_value) in right {
        match result.get(key) {
            Some(left_value) => {
                let merged = merge(left_value, right_value);
                result.insert(key.clone(), merged);
            }
            None => {
                result.insert(key.clone(), right_value.clone());
            }
        }
    }
    result
}

/// Merge a sequence of mappings left to right; later entries win on
/// scalar conflicts.
pub fn merge_all<'a>(layers: impl IntoIterator<Item = &'a Mapping>) -> Mapping {
    layers
        .into_iter()
        .fold(Mapping::new(), |acc, layer| merge_mappings(&acc, layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (Value::String(k.to_string()), v.clone()))
            .collect()
    }

    #[test]
    fn scalars_take_right_hand_value() {
        let left = map(&[("a", Value::from(1))]);
        let right = map(&[("a", Value::from(2))]);
        let merged = merge_mappings(&left, &right);
        assert_eq!(merged.get("a"), Some(&Value::from(2)));
    }

    #[test]
    fn maps_recurse() {
        let left = map(&[("nested", Value::Mapping(map(&[("x", Value::from(1)), ("y", Value::from(1))])))]);
        let right = map(&[("nested", Value::Mapping(map(&[("y", Value::from(2))])))]);
        let merged = merge_mappings(&left, &right);
        let nested = merged.get("nested").unwrap().as_mapping().unwrap();
        assert_eq!(nested.get("x"), Some(&Value::from(1)));
        assert_eq!(nested.get("y"), Some(&Value::from(2)));
    }

    #[test]
    fn sequences_concatenate() {
        let left = map(&[("list", Value::Sequence(vec![Value::from(1)]))]);
        let right = map(&[("list", Value::Sequence(vec![Value::from(2)]))]);
        let merged = merge_mappings(&left, &right);
        assert_eq!(
            merged.get("list"),
            Some(&Value::Sequence(vec![Value::from(1), Value::from(2)]))
        );
    }

    #[test]
    fn merge_does_not_alias_inputs() {
        let left = map(&[("nested", Value::Mapping(map(&[("x", Value::from(1))])))]);
        let right = map(&[("nested", Value::Mapping(map(&[("y", Value::from(2))])))]);
        let merged = merge_mappings(&left, &right);
        // mutate merged, left must be unaffected
        let mut merged_nested = merged.get("nested").unwrap().as_mapping().unwrap().clone();
        merged_nested.insert(Value::from("z"), Value::from(3));
        let left_nested = left.get("nested").unwrap().as_mapping().unwrap();
        assert!(!left_nested.contains_key("z"));
    }

    #[test]
    fn merge_all_applies_layers_in_order() {
        let a = map(&[("a", Value::from(1))]);
        let b = map(&[("a", Value::from(2)), ("b", Value::from(3))]);
        let c = map(&[("b", Value::from(4))]);
        let merged = merge_all([&a, &b, &c]);
        assert_eq!(merged.get("a"), Some(&Value::from(2)));
        assert_eq!(merged.get("b"), Some(&Value::from(4)));
    }
}
