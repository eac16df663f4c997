//! # Pandas Script Generator
//!
//! Assembles a validated pipeline graph into one ordered pandas script:
//! imports block, helper-functions block, statements block.

use std::collections::{HashMap, HashSet};

use crate::component::{CodeFragment, HelperFunction};
use crate::error::CompileError;
use crate::graph::{GraphNode, GraphSnapshot};
use crate::registry::ComponentRegistry;

/// Derive the result-variable name for a node from its identity.
///
/// Depends only on the node id, so names are stable across recompilation of
/// an unchanged graph. Characters outside `[A-Za-z0-9_]` map to `_`.
pub fn variable_name(node_id: &str) -> String {
    let sanitized: String = node_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("var_{sanitized}")
}

/// Pipeline-graph to pandas-script generator
pub struct ScriptGenerator<'a> {
    graph: &'a GraphSnapshot,
    registry: &'a ComponentRegistry,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(graph: &'a GraphSnapshot, registry: &'a ComponentRegistry) -> Self {
        Self { graph, registry }
    }

    /// Generate the complete script from the graph.
    ///
    /// The graph must already have passed structural validation. Any
    /// failure here aborts with no partial script.
    pub fn generate_script(&self) -> Result<String, CompileError> {
        let order = self.graph.kahn_order()?;
        let names = self.assign_variables()?;

        // Configurations are checked before any emission so a failure can
        // never leave a half-built statements block behind.
        for node in &self.graph.nodes {
            let component = self.registry.lookup(&node.descriptor_id)?;
            component
                .descriptor
                .form
                .validate(&node.config)
                .map_err(|e| e.with_node(&node.node_id))?;
        }

        let mut imports: Vec<String> = Vec::new();
        let mut seen_imports: HashSet<String> = HashSet::new();
        let mut helpers: Vec<(HelperFunction, String)> = Vec::new();
        let mut helper_index: HashMap<String, usize> = HashMap::new();
        let mut statements: Vec<String> = Vec::new();

        for &index in &order {
            let node = &self.graph.nodes[index];
            let component = self.registry.lookup(&node.descriptor_id)?;

            for import in component.contract.imports(&node.config) {
                if seen_imports.insert(import.clone()) {
                    imports.push(import);
                }
            }

            for helper in component.contract.helper_functions(&node.config) {
                match helper_index.get(&helper.name) {
                    None => {
                        helper_index.insert(helper.name.clone(), helpers.len());
                        helpers.push((helper, node.descriptor_id.clone()));
                    }
                    Some(&existing) => {
                        let (known, owner) = &helpers[existing];
                        if known.source != helper.source {
                            return Err(CompileError::HelperCollision {
                                name: helper.name,
                                first: owner.clone(),
                                second: node.descriptor_id.clone(),
                            });
                        }
                    }
                }
            }

            let inputs = self.input_variables(index, &names);
            let output = names[index].as_deref();

            tracing::debug!(
                "[CODEGEN] Emitting node '{}' ({}): inputs {:?} -> {:?}",
                node.node_id,
                node.descriptor_id,
                inputs,
                output
            );

            let fragment = component
                .contract
                .emit(&node.config, &inputs, output)
                .map_err(|e| e.with_node(&node.node_id))?;
            check_fragment(node, &fragment, &inputs, output)?;
            statements.push(fragment.text());
        }

        Ok(assemble(&imports, &helpers, &statements))
    }

    /// Assign every producing node a unique result-variable name.
    ///
    /// Names derive from node ids alone; if two distinct ids sanitize to
    /// the same name, later nodes (insertion order) get a numeric suffix so
    /// the assignment stays deterministic.
    fn assign_variables(&self) -> Result<Vec<Option<String>>, CompileError> {
        let mut taken: HashSet<String> = HashSet::new();
        let mut names = Vec::with_capacity(self.graph.nodes.len());

        for node in &self.graph.nodes {
            let kind = self.registry.lookup(&node.descriptor_id)?.descriptor.kind;
            if kind.output_arity() == 0 {
                names.push(None);
                continue;
            }
            let base = variable_name(&node.node_id);
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            names.push(Some(name));
        }

        Ok(names)
    }

    /// Resolve a node's input variable names from its in-edges, ordered by
    /// input-slot index. Validation has already guaranteed density.
    fn input_variables(&self, index: usize, names: &[Option<String>]) -> Vec<String> {
        let node = &self.graph.nodes[index];
        let mut slots: Vec<(usize, String)> = self
            .graph
            .edges
            .iter()
            .filter(|edge| edge.target == node.node_id)
            .filter_map(|edge| {
                self.graph
                    .nodes
                    .iter()
                    .position(|candidate| candidate.node_id == edge.source)
                    .and_then(|source| names[source].clone())
                    .map(|name| (edge.target_input_index, name))
            })
            .collect();
        slots.sort_by_key(|(slot, _)| *slot);
        slots.into_iter().map(|(_, name)| name).collect()
    }
}

/// Verify a fragment's declared reads/writes against the resolved names.
fn check_fragment(
    node: &GraphNode,
    fragment: &CodeFragment,
    inputs: &[String],
    output: Option<&str>,
) -> Result<(), CompileError> {
    for read in &fragment.reads {
        if !inputs.iter().any(|input| input == read) {
            return Err(CompileError::EmitContract {
                node: node.node_id.clone(),
                detail: format!("fragment reads undeclared variable '{read}'"),
            });
        }
    }
    if fragment.writes.as_deref() != output {
        return Err(CompileError::EmitContract {
            node: node.node_id.clone(),
            detail: format!(
                "fragment writes {:?}, expected {:?}",
                fragment.writes, output
            ),
        });
    }
    Ok(())
}

/// Concatenate the three blocks, blank-line separated, under the generated
/// header.
fn assemble(imports: &[String], helpers: &[(HelperFunction, String)], statements: &[String]) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if !imports.is_empty() {
        blocks.push(imports.join("\n"));
    }
    if !helpers.is_empty() {
        let definitions: Vec<&str> = helpers
            .iter()
            .map(|(helper, _)| helper.source.trim())
            .collect();
        blocks.push(definitions.join("\n\n"));
    }
    if !statements.is_empty() {
        blocks.push(statements.join("\n\n"));
    }

    let mut code = String::new();
    code.push_str("# Auto-generated code from a visual pipeline graph\n");
    code.push_str("# DO NOT EDIT - Changes will be overwritten\n");
    code.push_str("# Compiled with PPGC (Pandas Pipeline Graph Compiler)\n\n");
    code.push_str(&blocks.join("\n\n"));
    code.push('\n');
    code
}
