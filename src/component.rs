//! # Component Descriptors and the Node Contract
//!
//! Static metadata for each component kind, plus the behavioral interface
//! every kind implements for code generation.
//!
//! A component contributes three things to a compiled script: import
//! statements, named helper-function definitions, and one statement fragment
//! per placed node. The compiler deduplicates the first two across the whole
//! graph and threads variable names through the third.

use serde_json::{Map, Value};

use crate::error::CompileError;
use crate::form::FormSchema;

/// Per-node configuration as stored by the visual editor.
pub type Config = Map<String, Value>;

/// Input/output arity class of a component.
///
/// The observed component families have at most one output; sinks have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// No inputs, one output (file readers, generators).
    Source,
    /// One input, one output.
    SingleProcessor,
    /// Two inputs, one output (joins).
    DoubleProcessor,
    /// Two or more inputs, one output (concatenation).
    MultiProcessor,
    /// One input, no output (file writers).
    Sink,
}

impl ComponentKind {
    /// Number of input slots that must each be fed by exactly one edge.
    pub fn min_inputs(&self) -> usize {
        match self {
            ComponentKind::Source => 0,
            ComponentKind::SingleProcessor => 1,
            ComponentKind::DoubleProcessor => 2,
            ComponentKind::MultiProcessor => 2,
            ComponentKind::Sink => 1,
        }
    }

    /// Highest allowed input slot count, `None` for unbounded.
    pub fn max_inputs(&self) -> Option<usize> {
        match self {
            ComponentKind::Source => Some(0),
            ComponentKind::SingleProcessor => Some(1),
            ComponentKind::DoubleProcessor => Some(2),
            ComponentKind::MultiProcessor => None,
            ComponentKind::Sink => Some(1),
        }
    }

    /// Number of output variables the node binds (0 or 1 in this domain).
    pub fn output_arity(&self) -> usize {
        match self {
            ComponentKind::Sink => 0,
            _ => 1,
        }
    }

    /// Get a human-readable name for this kind
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Source => "source",
            ComponentKind::SingleProcessor => "single-input processor",
            ComponentKind::DoubleProcessor => "double-input processor",
            ComponentKind::MultiProcessor => "multi-input processor",
            ComponentKind::Sink => "sink",
        }
    }
}

/// Static metadata for one component kind - the single source of truth the
/// registry serves to both the compiler and the browsing UI.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    /// Absent means the component lists ungrouped under its category.
    pub subcategory: Option<String>,
    pub icon: String,
    pub kind: ComponentKind,
    pub default_config: Config,
    pub form: FormSchema,
}

impl ComponentDescriptor {
    /// Create a descriptor with empty defaults and form.
    pub fn new(id: &str, display_name: &str, kind: ComponentKind, category: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            description: String::new(),
            category: category.to_string(),
            subcategory: None,
            icon: String::new(),
            kind,
            default_config: Config::new(),
            form: FormSchema::default(),
        }
    }

    /// Builder pattern methods for fluent configuration
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_subcategory(mut self, subcategory: &str) -> Self {
        self.subcategory = Some(subcategory.to_string());
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn with_default_config(mut self, default_config: Config) -> Self {
        self.default_config = default_config;
        self
    }

    pub fn with_form(mut self, form: FormSchema) -> Self {
        self.form = form;
        self
    }
}

/// A named, self-contained function definition a statement fragment calls.
///
/// Helper identity is the function name: two components emitting the same
/// name with the same source collapse to one definition, while the same name
/// with differing sources is a collision the compiler reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperFunction {
    pub name: String,
    pub source: String,
}

impl HelperFunction {
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
        }
    }
}

/// A structured statement fragment emitted for one node.
///
/// The fragment declares which variables it reads and writes so the compiler
/// can verify variable threading before concatenating anything, instead of
/// trusting opaque text.
#[derive(Debug, Clone, Default)]
pub struct CodeFragment {
    /// Statement lines, emitted verbatim in order.
    pub lines: Vec<String>,
    /// Input variables the statement reads. Must be a subset of the node's
    /// resolved input variable names.
    pub reads: Vec<String>,
    /// The variable the statement assigns, `None` for sinks.
    pub writes: Option<String>,
}

impl CodeFragment {
    /// Joined statement text.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Behavioral interface implemented by every component kind.
///
/// New kinds are added by implementing this trait and registering the
/// implementation next to a descriptor; the compiler never branches on
/// component identity.
pub trait NodeContract: Send + Sync {
    /// Import statements this node needs, in emission order. May depend on
    /// the configuration (e.g. a module only imported when a guarded
    /// feature is enabled).
    fn imports(&self, config: &Config) -> Vec<String>;

    /// Named helper-function definitions the statement body calls.
    fn helper_functions(&self, _config: &Config) -> Vec<HelperFunction> {
        Vec::new()
    }

    /// Produce the statement fragment for one node.
    ///
    /// `inputs` are the resolved input variable names in declared slot
    /// order; `output` is the variable to assign, `None` when the kind has
    /// no output. The fragment must not reference any other variable.
    fn emit(
        &self,
        config: &Config,
        inputs: &[String],
        output: Option<&str>,
    ) -> Result<CodeFragment, CompileError>;
}

/// Fetch a string-valued config entry.
pub fn config_str<'a>(config: &'a Config, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}

/// Fetch a boolean config entry.
pub fn config_bool(config: &Config, key: &str) -> Option<bool> {
    config.get(key).and_then(Value::as_bool)
}

/// Fetch a list-of-strings config entry (column lists). Non-string items
/// are skipped; a missing key yields an empty list.
pub fn config_str_list(config: &Config, key: &str) -> Vec<String> {
    config
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Unwrap the output variable handed to `emit` by the compiler.
///
/// The compiler always passes `Some` for kinds with an output; a `None`
/// here means the caller broke the contract, not the component.
pub fn require_output<'a>(output: Option<&'a str>) -> Result<&'a str, CompileError> {
    output.ok_or_else(|| CompileError::EmitContract {
        node: String::new(),
        detail: "no output variable was provided".to_string(),
    })
}
