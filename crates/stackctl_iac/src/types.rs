//! Variable type inference: derives each rendered Terraform variable's
//! type (`map`/`list`/`bool`/`number`/`string`) from the module's *derived*
//! scope — the vars computed before the user's own `vars.yaml` is merged
//! in — so a user-supplied map can never retroactively promote a variable
//! that was a scalar in the module's own definition.

use serde_yaml::{Mapping, Value};

use stackctl_core::Variable;

/// Fixed set of variable names every module gets implicitly (backend
/// plumbing, cluster metadata) that are never re-emitted as Terraform
/// variables.
pub const EXCLUDED_VARS: &[&str] = &[
    "vault_address",
    "location",
    "kubernetes_version",
    "control_plane_endpoint",
    "ingress_kind",
    "mimir_url",
    "ingress_port_http",
    "ingress_port_https",
];

/// Infer a Terraform-ish type name for a YAML value.
pub fn infer_type(value: &Value) -> &'static str {
    match value {
        Value::Mapping(_) => "map",
        Value::Sequence(_) => "list",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        _ => "string",
    }
}

/// Build the variable list to emit, deriving each entry's type from
/// `derived_scope` (pre-user-merge) but taking its value from
/// `final_scope` (post-user-merge), skipping [`EXCLUDED_VARS`].
pub fn variables_list(derived_scope: &Mapping, final_scope: &Mapping) -> Vec<Variable> {
    derived_scope
        .iter()
        .filter_map(|(key, derived_value)| {
            let name = key.as_str()?.to_string();
            if EXCLUDED_VARS.contains(&name.as_str()) {
                return None;
            }
            let var_type = infer_type(derived_value).to_string();
            let value = final_scope.get(key).cloned().unwrap_or_else(|| derived_value.clone());
            Some(Variable { name, value, var_type })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> Mapping {
        pairs.iter().map(|(k, v)| (Value::from(*k), v.clone())).collect()
    }

    #[test]
    fn excluded_vars_are_skipped() {
        let derived = map(&[("vault_address", Value::from("https://vault")), ("service", Value::from("api"))]);
        let vars = variables_list(&derived, &derived);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "service");
    }

    #[test]
    fn type_is_derived_from_pre_merge_scope_not_final_scope() {
        let derived = map(&[("replicas", Value::from(1))]);
        // user vars.yaml overrides `replicas` with a map — type must stay "number".
        let mut overridden = Mapping::new();
        overridden.insert(Value::from("replicas"), Value::Mapping(map(&[("min", Value::from(1))])));

        let vars = variables_list(&derived, &overridden);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].var_type, "number");
        assert!(vars[0].value.is_mapping());
    }

    #[test]
    fn infers_each_scalar_kind() {
        assert_eq!(infer_type(&Value::from(true)), "bool");
        assert_eq!(infer_type(&Value::from(3)), "number");
        assert_eq!(infer_type(&Value::from("x")), "string");
        assert_eq!(infer_type(&Value::Sequence(vec![])), "list");
        assert_eq!(infer_type(&Value::Mapping(Mapping::new())), "map");
    }
}
