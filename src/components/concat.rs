//! Dataset concatenation transform.

use serde_json::json;

use crate::component::{
    CodeFragment, ComponentDescriptor, ComponentKind, Config, NodeContract, config_bool,
    require_output,
};
use crate::error::CompileError;
use crate::form::{FieldSpec, FormSchema};

use super::py_bool;

pub fn descriptor() -> ComponentDescriptor {
    let mut defaults = Config::new();
    defaults.insert("ignore_index".to_string(), json!(true));

    ComponentDescriptor::new(
        "concat",
        "Concatenate Datasets",
        ComponentKind::MultiProcessor,
        "transforms",
    )
    .with_description("Stack two or more datasets on top of each other.")
    .with_icon("layers")
    .with_default_config(defaults)
    .with_form(FormSchema::new(vec![FieldSpec::boolean(
        "ignore_index",
        "Reset index",
    )]))
}

/// Stacks all bound inputs with `pd.concat`, in slot order.
pub struct Concat;

impl NodeContract for Concat {
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
        let ignore_index = config_bool(config, "ignore_index").unwrap_or(true);

        Ok(CodeFragment {
            lines: vec![format!(
                "{out} = pd.concat([{}], ignore_index={})",
                inputs.join(", "),
                py_bool(ignore_index)
            )],
            reads: inputs.to_vec(),
            writes: Some(out.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_stacks_all_inputs_in_slot_order() {
        let inputs = vec![
            "var_a".to_string(),
            "var_b".to_string(),
            "var_c".to_string(),
        ];
        let fragment = Concat.emit(&Config::new(), &inputs, Some("var_out")).unwrap();
        assert_eq!(
            fragment.text(),
            "var_out = pd.concat([var_a, var_b, var_c], ignore_index=True)"
        );
        assert_eq!(fragment.reads, inputs);
    }

    #[test]
    fn test_ignore_index_can_be_disabled() {
        let mut config = Config::new();
        config.insert("ignore_index".to_string(), json!(false));
        let fragment = Concat
            .emit(&config, &["var_a".to_string(), "var_b".to_string()], Some("var_out"))
            .unwrap();
        assert!(fragment.text().ends_with("ignore_index=False)"));
    }
}
