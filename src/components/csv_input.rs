//! CSV file reader source.

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
    defaults.insert("file_path".to_string(), json!(""));
    defaults.insert("sep".to_string(), json!(","));

    ComponentDescriptor::new("csv_file_input", "CSV File Input", ComponentKind::Source, "inputs")
        .with_subcategory("files")
        .with_description("Read a CSV file into a dataframe.")
        .with_icon("file-text")
        .with_default_config(defaults)
        .with_form(FormSchema::new(vec![
            FieldSpec::text("file_path", "File path").required(),
            FieldSpec::text("sep", "Separator"),
        ]))
}

/// Reads a CSV file into the node's output dataframe.
pub struct CsvFileInput;

impl NodeContract for CsvFileInput {
    fn imports(&self, _config: &Config) -> Vec<String> {
        vec!["import pandas as pd".to_string()]
    }

    fn emit(
        &self,
        config: &Config,
        _inputs: &[String],
        output: Option<&str>,
    ) -> Result<CodeFragment, CompileError> {
        let out = require_output(output)?;
        let path = config_str(config, "file_path").unwrap_or_default();
        let sep = config_str(config, "sep").unwrap_or(",");

        Ok(CodeFragment {
            lines: vec![format!(
                "{out} = pd.read_csv({}, sep={})",
                py_str(path),
                py_str(sep)
            )],
            reads: Vec::new(),
            writes: Some(out.to_string()),
        })
    }
}
