//! CSV file writer sink.

use serde_json::json;

use crate::component::{
    CodeFragment, ComponentDescriptor, ComponentKind, Config, NodeContract, config_bool,
    config_str,
};
use crate::error::CompileError;
use crate::form::{FieldSpec, FormSchema};

use super::{py_bool, py_str};

pub fn descriptor() -> ComponentDescriptor {
    let mut defaults = Config::new();
    defaults.insert("file_path".to_string(), json!(""));
    defaults.insert("index".to_string(), json!(false));

    ComponentDescriptor::new(
        "csv_file_output",
        "CSV File Output",
        ComponentKind::Sink,
        "outputs",
    )
    .with_subcategory("files")
    .with_description("Write the input dataframe to a CSV file.")
    .with_icon("save")
    .with_default_config(defaults)
    .with_form(FormSchema::new(vec![
        FieldSpec::text("file_path", "File path").required(),
        FieldSpec::boolean("index", "Write row index"),
    ]))
}

/// Writes its single input to disk; binds no output variable.
pub struct CsvFileOutput;

impl NodeContract for CsvFileOutput {
    fn imports(&self, _config: &Config) -> Vec<String> {
        vec!["import pandas as pd".to_string()]
    }

    fn emit(
        &self,
        config: &Config,
        inputs: &[String],
        _output: Option<&str>,
    ) -> Result<CodeFragment, CompileError> {
        let input = inputs.first().cloned().unwrap_or_default();
        let path = config_str(config, "file_path").unwrap_or_default();
        let index = config_bool(config, "index").unwrap_or(false);

        Ok(CodeFragment {
            lines: vec![format!(
                "{input}.to_csv({}, index={})",
                py_str(path),
                py_bool(index)
            )],
            reads: vec![input],
            writes: None,
        })
    }
}
