//! # Pipeline Graph Snapshots
//!
//! The DAG instance handed over by the external editor: nodes bound to a
//! descriptor id plus a configuration value, and directed edges carrying
//! input-slot indices.
//!
//! A snapshot is immutable from the compiler's point of view; the editor
//! mutates its own working copy and serializes a fresh snapshot per
//! compilation request.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::Config;
use crate::error::CompileError;
use crate::registry::ComponentRegistry;

/// One placed component instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique within the graph.
    pub node_id: String,
    /// Weak reference into the registry; the registry owns the descriptor.
    pub descriptor_id: String,
    #[serde(default)]
    pub config: Config,
}

/// A directed connection from a node's output into a target input slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: String,
    #[serde(default)]
    pub source_output_index: usize,
    pub target: String,
    pub target_input_index: usize,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] -> {}[{}]",
            self.source, self.source_output_index, self.target, self.target_input_index
        )
    }
}

/// An immutable copy of the visual pipeline graph at the moment compilation
/// is requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Creates a new empty graph snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node bound to a descriptor id with the given configuration.
    pub fn add_node(&mut self, node_id: &str, descriptor_id: &str, config: Config) {
        self.nodes.push(GraphNode {
            node_id: node_id.to_string(),
            descriptor_id: descriptor_id.to_string(),
            config,
        });
    }

    /// Adds an edge from `source` output 0 into `target_input` of `target`.
    pub fn add_edge(&mut self, source: &str, target: &str, target_input: usize) {
        self.edges.push(Edge {
            source: source.to_string(),
            source_output_index: 0,
            target: target.to_string(),
            target_input_index: target_input,
        });
    }

    /// Find a node by id.
    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.node_id == node_id)
    }

    /// Deserialize a snapshot from the editor's JSON form.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string(self)?)
    }

    fn index_by_id(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.node_id.as_str(), index))
            .collect()
    }

    /// Check the structural invariants against the registry's arity rules.
    ///
    /// Runs before every compilation; the compiler never attempts to
    /// compile a graph this rejects.
    pub fn validate(&self, registry: &ComponentRegistry) -> Result<(), CompileError> {
        // Node ids must be unique before anything else can be checked.
        let mut seen_ids = HashSet::new();
        for node in &self.nodes {
            if !seen_ids.insert(node.node_id.as_str()) {
                return Err(CompileError::DuplicateNode {
                    node: node.node_id.clone(),
                });
            }
        }

        for node in &self.nodes {
            if !registry.contains(&node.descriptor_id) {
                return Err(CompileError::UnknownDescriptor {
                    node: node.node_id.clone(),
                    descriptor: node.descriptor_id.clone(),
                });
            }
        }

        let index_of = self.index_by_id();

        for edge in &self.edges {
            let source_index = *index_of.get(edge.source.as_str()).ok_or_else(|| {
                CompileError::InvalidEdge {
                    edge: edge.to_string(),
                }
            })?;
            let target_index = *index_of.get(edge.target.as_str()).ok_or_else(|| {
                CompileError::InvalidEdge {
                    edge: edge.to_string(),
                }
            })?;

            let source_kind = registry
                .lookup(&self.nodes[source_index].descriptor_id)?
                .descriptor
                .kind;
            let target_kind = registry
                .lookup(&self.nodes[target_index].descriptor_id)?
                .descriptor
                .kind;

            if edge.source_output_index >= source_kind.output_arity() {
                return Err(CompileError::InvalidEdge {
                    edge: edge.to_string(),
                });
            }
            if let Some(max_inputs) = target_kind.max_inputs() {
                if edge.target_input_index >= max_inputs {
                    return Err(CompileError::InvalidEdge {
                        edge: edge.to_string(),
                    });
                }
            }
        }

        // No two edges may feed the same (target, slot).
        let mut bound_slots = HashSet::new();
        for edge in &self.edges {
            if !bound_slots.insert((edge.target.as_str(), edge.target_input_index)) {
                return Err(CompileError::DuplicateInputBinding {
                    node: edge.target.clone(),
                    slot: edge.target_input_index,
                });
            }
        }

        // Every required slot must be fed, and bound slots must be
        // contiguous from 0 for the unbounded kinds.
        for node in &self.nodes {
            let kind = registry.lookup(&node.descriptor_id)?.descriptor.kind;
            let mut slots: Vec<usize> = self
                .edges
                .iter()
                .filter(|edge| edge.target == node.node_id)
                .map(|edge| edge.target_input_index)
                .collect();
            slots.sort_unstable();

            let expected = slots.len().max(kind.min_inputs());
            for slot in 0..expected {
                if slots.get(slot) != Some(&slot) {
                    return Err(CompileError::MissingInput {
                        node: node.node_id.clone(),
                        slot,
                    });
                }
            }
        }

        self.kahn_order().map(|_| ())
    }

    /// Topological order over node indices.
    ///
    /// Kahn's algorithm with the ready set kept ordered by node insertion
    /// index, so equal-rank nodes always emit in insertion order and the
    /// order is reproducible for identical snapshots.
    pub(crate) fn kahn_order(&self) -> Result<Vec<usize>, CompileError> {
        let index_of = self.index_by_id();
        let mut indegree = vec![0usize; self.nodes.len()];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for edge in &self.edges {
            // Dangling edges are rejected by validate; skip them here so
            // ordering stays total over the node set.
            let (Some(&source), Some(&target)) = (
                index_of.get(edge.source.as_str()),
                index_of.get(edge.target.as_str()),
            ) else {
                continue;
            };
            indegree[target] += 1;
            successors[source].push(target);
        }

        let mut ready: BTreeSet<usize> = indegree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(index, _)| index)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut placed = vec![false; self.nodes.len()];

        while let Some(&index) = ready.iter().next() {
            ready.remove(&index);
            placed[index] = true;
            order.push(index);
            for &next in &successors[index] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() < self.nodes.len() {
            // Everything left unplaced sits on or downstream of a cycle;
            // name the first such node in insertion order.
            let stuck = placed.iter().position(|&done| !done).unwrap_or(0);
            return Err(CompileError::Cycle {
                node: self.nodes[stuck].node_id.clone(),
            });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentDescriptor, ComponentKind};
    use crate::registry::ComponentRegistry;

    use crate::component::{CodeFragment, Config, NodeContract, require_output};

    struct Probe;

    impl NodeContract for Probe {
        fn imports(&self, _config: &Config) -> Vec<String> {
            Vec::new()
        }

        fn emit(
            &self,
            _config: &Config,
            inputs: &[String],
            output: Option<&str>,
        ) -> Result<CodeFragment, CompileError> {
            let out = require_output(output)?;
            Ok(CodeFragment {
                lines: vec![format!("{out} = probe({})", inputs.join(", "))],
                reads: inputs.to_vec(),
                writes: Some(out.to_string()),
            })
        }
    }

    fn test_registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for (id, kind) in [
            ("src", ComponentKind::Source),
            ("xform", ComponentKind::SingleProcessor),
            ("pair", ComponentKind::DoubleProcessor),
        ] {
            registry
                .register(
                    ComponentDescriptor::new(id, id, kind, "test"),
                    Box::new(Probe),
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_valid_linear_graph() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("a", "src", Config::new());
        graph.add_node("b", "xform", Config::new());
        graph.add_edge("a", "b", 0);
        graph.validate(&registry).unwrap();
        assert_eq!(graph.kahn_order().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("a", "xform", Config::new());
        graph.add_node("b", "xform", Config::new());
        graph.add_edge("a", "b", 0);
        graph.add_edge("b", "a", 0);
        let err = graph.validate(&registry).unwrap_err();
        assert!(matches!(err, CompileError::Cycle { node } if node == "a"));
    }

    #[test]
    fn test_missing_second_input_names_node_and_slot() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("a", "src", Config::new());
        graph.add_node("j", "pair", Config::new());
        graph.add_edge("a", "j", 0);
        let err = graph.validate(&registry).unwrap_err();
        match err {
            CompileError::MissingInput { node, slot } => {
                assert_eq!(node, "j");
                assert_eq!(slot, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_input_binding() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("a", "src", Config::new());
        graph.add_node("b", "src", Config::new());
        graph.add_node("x", "xform", Config::new());
        graph.add_edge("a", "x", 0);
        graph.add_edge("b", "x", 0);
        let err = graph.validate(&registry).unwrap_err();
        assert!(
            matches!(err, CompileError::DuplicateInputBinding { node, slot } if node == "x" && slot == 0)
        );
    }

    #[test]
    fn test_unknown_descriptor() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("a", "no_such_component", Config::new());
        let err = graph.validate(&registry).unwrap_err();
        assert!(matches!(err, CompileError::UnknownDescriptor { node, .. } if node == "a"));
    }

    #[test]
    fn test_edge_into_slot_beyond_arity() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("a", "src", Config::new());
        graph.add_node("x", "xform", Config::new());
        graph.add_edge("a", "x", 1);
        let err = graph.validate(&registry).unwrap_err();
        assert!(matches!(err, CompileError::InvalidEdge { .. }));
    }

    #[test]
    fn test_insertion_order_breaks_topological_ties() {
        let registry = test_registry();
        let mut graph = GraphSnapshot::new();
        graph.add_node("later", "src", Config::new());
        graph.add_node("earlier", "src", Config::new());
        graph.add_node("j", "pair", Config::new());
        graph.add_edge("later", "j", 1);
        graph.add_edge("earlier", "j", 0);
        // Both sources are ready at once; insertion order decides.
        assert_eq!(graph.kahn_order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "nodes": [
                {"nodeId": "a", "descriptorId": "src"},
                {"nodeId": "b", "descriptorId": "xform", "config": {"column": "x"}}
            ],
            "edges": [
                {"source": "a", "target": "b", "targetInputIndex": 0}
            ]
        }"#;
        let graph = GraphSnapshot::from_json(json).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].source_output_index, 0);
        assert_eq!(
            graph.node("b").unwrap().config.get("column"),
            Some(&serde_json::Value::from("x"))
        );

        let round = GraphSnapshot::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(round.edges, graph.edges);
    }
}
