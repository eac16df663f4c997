//! # Configuration Form Schemas
//!
//! Declarative description of a component's configuration form, used by the
//! external UI to render controls and by the compiler to validate node
//! configurations before code generation.
//!
//! A field may carry a [`VisibilityCondition`] tying its relevance to a
//! sibling field's current value; hidden fields are exempt from validation.

use serde_json::Value;

use crate::component::Config;
use crate::error::CompileError;

/// One choice of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Value shape a form field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Free-form string.
    Text,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// One of a closed option set.
    Select { options: Vec<SelectOption> },
    /// Ordered list of column names.
    Columns,
}

/// Declarative predicate making a field's relevance depend on a sibling
/// field's current value.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityCondition {
    pub depends_on: String,
    pub visible_when: Vec<Value>,
}

impl VisibilityCondition {
    /// Visible when `depends_on` currently holds one of `values`.
    pub fn when_in(depends_on: &str, values: &[&str]) -> Self {
        Self {
            depends_on: depends_on.to_string(),
            visible_when: values.iter().map(|v| Value::from(*v)).collect(),
        }
    }
}

/// One field of a configuration form.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub id: String,
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    pub condition: Option<VisibilityCondition>,
}

impl FieldSpec {
    fn new(id: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            id: id.to_string(),
            field_type,
            label: label.to_string(),
            required: false,
            condition: None,
        }
    }

    pub fn text(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldType::Text)
    }

    pub fn number(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldType::Number)
    }

    pub fn boolean(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldType::Boolean)
    }

    pub fn columns(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldType::Columns)
    }

    /// A select field over `(value, label)` pairs.
    pub fn select(id: &str, label: &str, options: &[(&str, &str)]) -> Self {
        Self::new(
            id,
            label,
            FieldType::Select {
                options: options
                    .iter()
                    .map(|(value, label)| SelectOption {
                        value: value.to_string(),
                        label: label.to_string(),
                    })
                    .collect(),
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_condition(mut self, condition: VisibilityCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether the field applies under the current configuration.
    pub fn is_visible(&self, config: &Config) -> bool {
        match &self.condition {
            None => true,
            Some(condition) => config
                .get(&condition.depends_on)
                .map(|value| condition.visible_when.contains(value))
                .unwrap_or(false),
        }
    }

    fn check_value(&self, value: &Value) -> Result<(), String> {
        match &self.field_type {
            FieldType::Text => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected a string, got {value}"))
                }
            }
            FieldType::Number => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err(format!("expected a number, got {value}"))
                }
            }
            FieldType::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected a boolean, got {value}"))
                }
            }
            FieldType::Select { options } => {
                let chosen = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {value}"))?;
                if options.iter().any(|option| option.value == chosen) {
                    Ok(())
                } else {
                    Err(format!("'{chosen}' is not one of the declared options"))
                }
            }
            FieldType::Columns => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("expected a list of column names, got {value}"))?;
                if items.iter().all(Value::is_string) {
                    Ok(())
                } else {
                    Err("column lists may only contain strings".to_string())
                }
            }
        }
    }
}

/// Ordered field list making up a component's configuration form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Check a configuration against this schema.
    ///
    /// A configuration is well-formed when every *currently visible* field
    /// holds a value compatible with its declared type; fields hidden by
    /// their condition are not validated at all. The returned error carries
    /// an empty node id; the compiler fills it in.
    pub fn validate(&self, config: &Config) -> Result<(), CompileError> {
        for field in &self.fields {
            if !field.is_visible(config) {
                continue;
            }
            match config.get(&field.id) {
                None => {
                    if field.required {
                        return Err(CompileError::InvalidFieldValue {
                            node: String::new(),
                            field: field.id.clone(),
                            reason: "required field has no value".to_string(),
                        });
                    }
                }
                Some(value) => {
                    field.check_value(value).map_err(|reason| {
                        CompileError::InvalidFieldValue {
                            node: String::new(),
                            field: field.id.clone(),
                            reason,
                        }
                    })?;
                }
            }
        }
        Ok(())
    }
}
