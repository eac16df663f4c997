//! # Pandas Pipeline Graph Compiler (PPGC)
//!
//! Production-ready compiler for transforming visual data-pipeline node
//! graphs into executable pandas scripts.
//!
//! A pipeline is a directed acyclic graph of components - data sources,
//! transforms, and outputs - each bound to a declarative descriptor and a
//! code-emission contract. PPGC validates the graph, orders it, and
//! assembles one deduplicated, deterministic script from the per-node
//! fragments:
//! - Explicit component registry populated from `(descriptor, contract)` pairs
//! - Declarative configuration forms with conditionally visible fields
//! - Structured statement fragments with verified variable threading
//! - A built-in pandas component library (readers, filter, join, concat, writers)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ppgc::{compile_graph, ComponentRegistry, GraphSnapshot, standard_components};
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register_all(standard_components())?;
//!
//! let graph = GraphSnapshot::new();
//! // ... build graph with nodes and edges
//!
//! match compile_graph(&graph, &registry) {
//!     Ok(script) => {
//!         std::fs::write("pipeline.py", script)?;
//!     }
//!     Err(e) => eprintln!("Compilation failed: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! PPGC follows a multi-phase compilation pipeline:
//!
//! 1. **Registry Population** - Components register once at process start
//! 2. **Structural Validation** - Arity, binding, and acyclicity checks
//! 3. **Ordering & Naming** - Topological order with stable tie-breaking,
//!    deterministic result-variable names
//! 4. **Code Generation** - Per-node emission, import/helper deduplication,
//!    block assembly

pub mod codegen;
pub mod compiler;
pub mod component;
pub mod components;
pub mod error;
pub mod form;
pub mod graph;
pub mod registry;

// Re-export the main compilation API
pub use compiler::compile_graph;
pub use error::CompileError;

// Re-export the component model
pub use component::{
    CodeFragment, ComponentDescriptor, ComponentKind, Config, HelperFunction, NodeContract,
};
pub use form::{FieldSpec, FieldType, FormSchema, SelectOption, VisibilityCondition};
pub use graph::{Edge, GraphNode, GraphSnapshot};
pub use registry::{CategoryGroup, ComponentRegistry, RegisteredComponent, SubcategoryGroup};

// Re-export the built-in component library
pub use components::standard_components;
