//! # Pipeline Compiler
//!
//! Main entry point for compiling pipeline graphs to pandas scripts.

use crate::codegen::ScriptGenerator;
use crate::error::CompileError;
use crate::graph::GraphSnapshot;
use crate::registry::ComponentRegistry;

/// Compile a pipeline graph snapshot to a pandas script.
///
/// This is the main entry point for the pipeline compiler. It takes a
/// visual node graph and the shared component registry and produces one
/// ordered script: imports, helper functions, then statements.
///
/// Compilation is a pure, synchronous pass over the snapshot: no I/O, no
/// shared mutable state, and no partial output on failure.
///
/// # Arguments
///
/// * `graph` - The graph snapshot to compile
/// * `registry` - The process-wide component registry
///
/// # Returns
///
/// * `Ok(String)` - The generated pandas script
/// * `Err(CompileError)` - A structured error naming the offending element
///
/// # Examples
///
/// ```rust,no_run
/// use ppgc::{compile_graph, ComponentRegistry, GraphSnapshot, standard_components};
///
/// let mut registry = ComponentRegistry::new();
/// registry.register_all(standard_components())?;
///
/// let graph = GraphSnapshot::new();
/// // ... add nodes and edges
///
/// match compile_graph(&graph, &registry) {
///     Ok(script) => println!("Generated:\n{}", script),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// # Ok::<(), ppgc::CompileError>(())
/// ```
pub fn compile_graph(
    graph: &GraphSnapshot,
    registry: &ComponentRegistry,
) -> Result<String, CompileError> {
    tracing::info!("[PPGC] Starting pipeline compilation");
    tracing::info!(
        "[PPGC] Graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );

    // Phase 1: Structural validation
    tracing::info!("[PPGC] Phase 1: Validating graph structure...");
    graph.validate(registry)?;
    tracing::info!("[PPGC] Graph structure valid");

    // Phase 2: Code generation
    tracing::info!("[PPGC] Phase 2: Generating pandas script...");
    let generator = ScriptGenerator::new(graph, registry);
    let code = generator.generate_script()?;

    tracing::info!("[PPGC] Code generation complete ({} bytes)", code.len());
    tracing::info!("[PPGC] Compilation successful!");

    Ok(code)
}
