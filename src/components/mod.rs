//! # Built-in Component Library
//!
//! The standard pandas component family: file readers, row filter, join,
//! concatenation, and file writers. Each component contributes a descriptor
//! (identity, category, defaults, configuration form) and a [`NodeContract`]
//! implementation.
//!
//! The library is handed to [`ComponentRegistry::register_all`] by the
//! process entry point; nothing here registers itself implicitly.
//!
//! [`ComponentRegistry::register_all`]: crate::registry::ComponentRegistry::register_all

mod concat;
mod csv_input;
mod csv_output;
mod filter;
mod join;

pub use concat::Concat;
pub use csv_input::CsvFileInput;
pub use csv_output::CsvFileOutput;
pub use filter::FilterRows;
pub use join::Join;

use crate::component::{ComponentDescriptor, NodeContract};

/// The `(descriptor, contract)` pairs of the standard library, in the order
/// they should appear in the browsing UI.
pub fn standard_components() -> Vec<(ComponentDescriptor, Box<dyn NodeContract>)> {
    vec![
        (csv_input::descriptor(), Box::new(CsvFileInput) as Box<dyn NodeContract>),
        (filter::descriptor(), Box::new(FilterRows)),
        (join::descriptor(), Box::new(Join)),
        (concat::descriptor(), Box::new(Concat)),
        (csv_output::descriptor(), Box::new(CsvFileOutput)),
    ]
}

/// Quote a string as a Python single-quoted literal.
pub(crate) fn py_str(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render a list of strings as a Python list literal.
pub(crate) fn py_str_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| py_str(value)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Render a boolean as a Python literal.
pub(crate) fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
