//! Type Graph Analysis
//!
//! Builds the type reference graph and computes strongly connected
//! components (SCCs) so recursive types can be flagged for the generators.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::types::{Type, TypeOrigin};

// =============================================================================
// Type Graph
// =============================================================================

/// Directed graph of complex types and named collection schemas.
///
/// A complex type has an edge for every property whose type reaches
/// another node through collection nesting; a named collection has one
/// edge to the node its element reaches.
pub struct TypeGraph {
    graph: DiGraph<String, String>,
    node_indices: HashMap<String, NodeIndex>,
}

impl TypeGraph {
    pub fn build(types: &BTreeMap<String, Type>) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for ty in types.values().filter(|t| is_node(t)) {
            let idx = graph.add_node(ty.name.clone());
            node_indices.insert(ty.name.clone(), idx);
        }

        for ty in types.values().filter(|t| is_node(t)) {
            let from = node_indices[&ty.name];
            if let Some(element) = ty.element_type() {
                if let Some(&to) = first_node(types, &node_indices, element) {
                    graph.add_edge(from, to, "item".to_string());
                }
                continue;
            }
            for prop in ty.properties() {
                if let Some(&to) = first_node(types, &node_indices, &prop.type_name) {
                    graph.add_edge(from, to, prop.name.clone());
                }
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Types directly referenced by properties of `name`
    pub fn refs_out(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|e| self.graph.node_weight(e.target()))
            .map(String::as_str)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Cycle groups: multi-member SCCs plus self-referencing types.
    ///
    /// Members are sorted, and groups are ordered by their first member.
    pub fn cycle_groups(&self) -> Vec<Vec<String>> {
        let mut groups = Vec::new();
        for scc in kosaraju_scc(&self.graph) {
            let cyclic = scc.len() > 1
                || self
                    .graph
                    .edges_directed(scc[0], Direction::Outgoing)
                    .any(|e| e.target() == scc[0]);
            if !cyclic {
                continue;
            }
            let mut members: Vec<String> = scc
                .iter()
                .filter_map(|idx| self.graph.node_weight(*idx).cloned())
                .collect();
            members.sort();
            groups.push(members);
        }
        groups.sort();
        groups
    }
}

fn is_node(ty: &Type) -> bool {
    ty.is_complex() || (ty.is_collection() && ty.origin != TypeOrigin::Collection)
}

/// First graph node on the element chain starting at `name`
fn first_node<'g>(
    types: &BTreeMap<String, Type>,
    nodes: &'g HashMap<String, NodeIndex>,
    name: &str,
) -> Option<&'g NodeIndex> {
    let mut seen = HashSet::new();
    let mut current = name;
    loop {
        if let Some(idx) = nodes.get(current) {
            return Some(idx);
        }
        if !seen.insert(current) {
            return None;
        }
        current = types.get(current).and_then(Type::element_type)?;
    }
}

/// Follow collection element types down to the non-collection base.
///
/// A named collection that contains itself (`Tree: Hash[Tree]`) has no
/// such base; the walk stops at the first repeated name.
pub fn base_type<'a>(types: &'a BTreeMap<String, Type>, name: &'a str) -> &'a str {
    let mut seen = HashSet::new();
    let mut current = name;
    while let Some(element) = types.get(current).and_then(Type::element_type) {
        seen.insert(current);
        if seen.contains(element) {
            break;
        }
        current = element;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{Property, TypeKind, TypeOrigin};
    use indexmap::IndexMap;

    fn complex(name: &str, props: &[(&str, &str)]) -> Type {
        let properties: IndexMap<String, Property> = props
            .iter()
            .map(|(prop, ty)| {
                (
                    prop.to_string(),
                    Property {
                        name: prop.to_string(),
                        json_name: prop.to_string(),
                        owner: name.to_string(),
                        type_name: ty.to_string(),
                        description: String::new(),
                        required: false,
                        read_only: false,
                        write_only: false,
                        nullable: false,
                        deprecated: false,
                        status: String::new(),
                    },
                )
            })
            .collect();
        Type::new(name, TypeKind::Complex { properties }, TypeOrigin::Schema)
    }

    fn array(element: &str) -> Type {
        Type::new(
            format!("{}[]", element),
            TypeKind::Array {
                element: element.to_string(),
            },
            TypeOrigin::Collection,
        )
    }

    fn named_hash(name: &str, element: &str) -> Type {
        Type::new(
            name,
            TypeKind::Hash {
                element: element.to_string(),
            },
            TypeOrigin::Schema,
        )
    }

    fn table(types: Vec<Type>) -> BTreeMap<String, Type> {
        types.into_iter().map(|t| (t.name.clone(), t)).collect()
    }

    #[test]
    fn test_self_reference_through_array() {
        let types = table(vec![complex("Node", &[("children", "Node[]")]), array("Node")]);
        let graph = TypeGraph::build(&types);
        assert_eq!(graph.cycle_groups(), vec![vec!["Node".to_string()]]);
        assert_eq!(graph.refs_out("Node"), vec!["Node"]);
    }

    #[test]
    fn test_mutual_recursion_single_group() {
        let types = table(vec![
            complex("A", &[("b", "B")]),
            complex("B", &[("a", "A")]),
            complex("Leaf", &[("a", "A")]),
        ]);
        let graph = TypeGraph::build(&types);
        assert_eq!(graph.cycle_groups(), vec![vec!["A".to_string(), "B".to_string()]]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_acyclic_graph_has_no_groups() {
        let types = table(vec![complex("A", &[("b", "B")]), complex("B", &[("name", "string")])]);
        let graph = TypeGraph::build(&types);
        assert!(graph.cycle_groups().is_empty());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_named_collection_of_itself() {
        let types = table(vec![named_hash("Tree", "Tree"), complex("Forest", &[("root", "Tree")])]);
        assert_eq!(base_type(&types, "Tree"), "Tree");
        let graph = TypeGraph::build(&types);
        assert_eq!(graph.cycle_groups(), vec![vec!["Tree".to_string()]]);
        assert_eq!(graph.refs_out("Forest"), vec!["Tree"]);
    }

    #[test]
    fn test_cycle_through_named_collections() {
        let types = table(vec![
            named_hash("Index", "Shelf[]"),
            array("Shelf"),
            named_hash("Shelf", "Index"),
            named_hash("Tags", "string"),
        ]);
        assert_eq!(base_type(&types, "Index"), "Shelf");
        let graph = TypeGraph::build(&types);
        assert_eq!(graph.cycle_groups(), vec![vec!["Index".to_string(), "Shelf".to_string()]]);
        assert!(graph.refs_out("Tags").is_empty());
    }
}
