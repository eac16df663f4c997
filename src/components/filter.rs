//! Row filter transform.

use serde_json::json;

use crate::component::{
    CodeFragment, ComponentDescriptor, ComponentKind, Config, NodeContract, config_str,
    require_output,
};
use crate::error::CompileError;
use crate::form::{FieldSpec, FormSchema};

use super::py_str;

pub fn descriptor() -> ComponentDescriptor {
    let mut defaults = Config::new();
    defaults.insert("column".to_string(), json!(""));
    defaults.insert("operator".to_string(), json!("=="));
    defaults.insert("value".to_string(), json!(""));

    ComponentDescriptor::new(
        "filter_rows",
        "Filter Rows",
        ComponentKind::SingleProcessor,
        "transforms",
    )
    .with_description("Keep the rows whose column value matches a condition.")
    .with_icon("filter")
    .with_default_config(defaults)
    .with_form(FormSchema::new(vec![
        FieldSpec::text("column", "Column").required(),
        FieldSpec::select(
            "operator",
            "Condition",
            &[
                ("==", "Equals"),
                ("!=", "Not equal"),
                (">", "Greater than"),
                (">=", "Greater or equal"),
                ("<", "Less than"),
                ("<=", "Less or equal"),
                ("contains", "Contains"),
            ],
        )
        .required(),
        FieldSpec::text("value", "Value").required(),
    ]))
}

/// Emits a boolean-mask row selection on the input dataframe.
pub struct FilterRows;

/// Numbers pass through unquoted, everything else becomes a string literal.
fn comparison_literal(value: &str) -> String {
    if value.parse::<f64>().is_ok() {
        value.to_string()
    } else {
        py_str(value)
    }
}

impl NodeContract for FilterRows {
    fn imports(&self, _config: &Config) -> Vec<String> {
        vec!["import pandas as pd".to_string()]
    }

    fn emit(
        &self,
        config: &Config,
        inputs: &[String],
        output: Option<&str>,
    ) -> Result<CodeFragment, CompileError> {
        let out = require_output(output)?;
        let input = inputs.first().cloned().unwrap_or_default();
        let column = config_str(config, "column").unwrap_or_default();
        let operator = config_str(config, "operator").unwrap_or("==");
        let value = config_str(config, "value").unwrap_or_default();

        let line = match operator {
            "contains" => format!(
                "{out} = {input}[{input}[{}].str.contains({}, na=False)]",
                py_str(column),
                py_str(value)
            ),
            "==" | "!=" | ">" | ">=" | "<" | "<=" => format!(
                "{out} = {input}[{input}[{}] {operator} {}]",
                py_str(column),
                comparison_literal(value)
            ),
            other => {
                return Err(CompileError::UnsupportedConfigValue {
                    node: String::new(),
                    field: "operator".to_string(),
                    value: format!("'{other}'"),
                })
            }
        };

        Ok(CodeFragment {
            lines: vec![line],
            reads: vec![input],
            writes: Some(out.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(column: &str, operator: &str, value: &str) -> Config {
        let mut config = Config::new();
        config.insert("column".to_string(), json!(column));
        config.insert("operator".to_string(), json!(operator));
        config.insert("value".to_string(), json!(value));
        config
    }

    #[test]
    fn test_numeric_comparison_is_unquoted() {
        let fragment = FilterRows
            .emit(
                &config("amount", ">", "100"),
                &["var_in".to_string()],
                Some("var_out"),
            )
            .unwrap();
        assert_eq!(fragment.text(), "var_out = var_in[var_in['amount'] > 100]");
    }

    #[test]
    fn test_string_comparison_is_quoted() {
        let fragment = FilterRows
            .emit(
                &config("region", "==", "EMEA"),
                &["var_in".to_string()],
                Some("var_out"),
            )
            .unwrap();
        assert_eq!(
            fragment.text(),
            "var_out = var_in[var_in['region'] == 'EMEA']"
        );
    }

    #[test]
    fn test_contains_uses_str_accessor() {
        let fragment = FilterRows
            .emit(
                &config("name", "contains", "Ltd"),
                &["var_in".to_string()],
                Some("var_out"),
            )
            .unwrap();
        assert_eq!(
            fragment.text(),
            "var_out = var_in[var_in['name'].str.contains('Ltd', na=False)]"
        );
        assert_eq!(fragment.reads, vec!["var_in"]);
    }

    #[test]
    fn test_unknown_operator_is_unsupported() {
        let err = FilterRows
            .emit(
                &config("a", "matches", "x"),
                &["var_in".to_string()],
                Some("var_out"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedConfigValue { field, .. } if field == "operator"
        ));
    }
}
