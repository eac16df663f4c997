//! Dataset join transform with an optional cartesian-product guard.

use serde_json::json;

use crate::component::{
    CodeFragment, ComponentDescriptor, ComponentKind, Config, HelperFunction, NodeContract,
    config_str, config_str_list, require_output,
};
use crate::error::CompileError;
use crate::form::{FieldSpec, FormSchema, VisibilityCondition};

use super::{py_str, py_str_list};

/// Join types for which duplicate keys can multiply rows; the guard field
/// only applies to these.
const GUARDED_JOIN_TYPES: &[&str] = &["inner", "left", "right", "outer", "anti-right", "anti-left"];

pub fn descriptor() -> ComponentDescriptor {
    let mut defaults = Config::new();
    defaults.insert("how".to_string(), json!("left"));
    defaults.insert("select_action_if_cartesian_product".to_string(), json!("0"));

    ComponentDescriptor::new("join", "Join Datasets", ComponentKind::DoubleProcessor, "transforms")
        .with_description("Combine two datasets by one or more key columns.")
        .with_icon("merge")
        .with_default_config(defaults)
        .with_form(FormSchema::new(vec![
            FieldSpec::columns("left_keys", "Left Input Column(s)"),
            FieldSpec::columns("right_keys", "Right Input Column(s)"),
            FieldSpec::select(
                "how",
                "Join type",
                &[
                    ("inner", "Inner"),
                    ("left", "Left"),
                    ("right", "Right"),
                    ("outer", "Outer"),
                    ("cross", "Cross"),
                    ("anti-left", "Anti Left"),
                    ("anti-right", "Anti Right"),
                ],
            ),
            FieldSpec::select(
                "select_action_if_cartesian_product",
                "Cartesian Product (duplicate keys)",
                &[
                    ("0", "Do nothing"),
                    ("2", "Raise error if Cartesian product is detected"),
                    ("3", "Raise warning if Cartesian product is detected"),
                ],
            )
            .with_condition(VisibilityCondition::when_in("how", GUARDED_JOIN_TYPES)),
        ]))
}

/// Joins its two inputs through the `main_join` helper.
///
/// Anti joins are a left-outer merge filtered on the match indicator rather
/// than a set-difference join.
pub struct Join;

/// Resolve the guard action for the configured join type.
///
/// Cross joins hide the guard field, so whatever value it still stores is
/// ignored and the action is forced to 0.
fn guard_action(config: &Config, how: &str) -> Result<u8, CompileError> {
    if how == "cross" {
        return Ok(0);
    }
    match config_str(config, "select_action_if_cartesian_product").unwrap_or("0") {
        "0" => Ok(0),
        "2" => Ok(2),
        "3" => Ok(3),
        other => Err(CompileError::UnsupportedConfigValue {
            node: String::new(),
            field: "select_action_if_cartesian_product".to_string(),
            value: format!("'{other}'"),
        }),
    }
}

impl NodeContract for Join {
    fn imports(&self, config: &Config) -> Vec<String> {
        let mut imports = vec!["import pandas as pd".to_string()];
        let how = config_str(config, "how").unwrap_or("left");
        // The warnings module is only needed when the guard actually warns.
        if matches!(guard_action(config, how), Ok(3)) {
            imports.push("import warnings".to_string());
        }
        imports
    }

    fn helper_functions(&self, _config: &Config) -> Vec<HelperFunction> {
        vec![
            HelperFunction::new(
                "check_cartesian_product",
                r#"
def check_cartesian_product(df1, df2, key_left, key_right):
    # A cartesian blow-up needs duplicate keys on both sides.
    is_left_unique = not df1.duplicated(subset=key_left).any()
    is_right_unique = not df2.duplicated(subset=key_right).any()
    return not (is_left_unique or is_right_unique)
"#,
            ),
            HelperFunction::new(
                "perform_join",
                r#"
def perform_join(df1, df2, key_left, key_right, join_type):
    if join_type in ['inner', 'left', 'right', 'outer']:
        return pd.merge(df1, df2, how=join_type, left_on=key_left, right_on=key_right)
    elif join_type == 'cross':
        return df1.merge(df2, how='cross')
    elif join_type == 'anti-left':
        merged = pd.merge(df1, df2, how='left', left_on=key_left, right_on=key_right, indicator=True)
        return merged[merged['_merge'] == 'left_only'].drop(columns=['_merge'])
    elif join_type == 'anti-right':
        merged = pd.merge(df2, df1, how='left', left_on=key_right, right_on=key_left, indicator=True)
        return merged[merged['_merge'] == 'left_only'].drop(columns=['_merge'])
    else:
        raise ValueError(f"Unsupported join type: {join_type}")
"#,
            ),
            HelperFunction::new(
                "main_join",
                r#"
def main_join(df1, df2, key_left, key_right, join_type, action_if_cartesian_product=0):
    if isinstance(key_left, str):
        key_left = [key_left]
    if isinstance(key_right, str):
        key_right = [key_right]
    if join_type != 'cross' and action_if_cartesian_product in [2, 3]:
        if check_cartesian_product(df1, df2, key_left, key_right):
            if action_if_cartesian_product == 2:
                raise ValueError("Cartesian product detected and not allowed.")
            elif action_if_cartesian_product == 3:
                warnings.warn("Cartesian product detected.")
    return perform_join(df1, df2, key_left, key_right, join_type)
"#,
            ),
        ]
    }

    fn emit(
        &self,
        config: &Config,
        inputs: &[String],
        output: Option<&str>,
    ) -> Result<CodeFragment, CompileError> {
        let out = require_output(output)?;
        let left = inputs.first().cloned().unwrap_or_default();
        let right = inputs.get(1).cloned().unwrap_or_default();

        let how = config_str(config, "how").unwrap_or("left");
        if how != "cross" && !GUARDED_JOIN_TYPES.contains(&how) {
            return Err(CompileError::UnsupportedConfigValue {
                node: String::new(),
                field: "how".to_string(),
                value: format!("'{how}'"),
            });
        }
        let action = guard_action(config, how)?;
        let left_keys = config_str_list(config, "left_keys");
        let right_keys = config_str_list(config, "right_keys");

        Ok(CodeFragment {
            lines: vec![
                format!("# Join {left} and {right}"),
                format!(
                    "{out} = main_join({left}, {right}, key_left={}, key_right={}, join_type={}, action_if_cartesian_product={action})",
                    py_str_list(&left_keys),
                    py_str_list(&right_keys),
                    py_str(how)
                ),
            ],
            reads: vec![left, right],
            writes: Some(out.to_string()),
        })
    }
}
