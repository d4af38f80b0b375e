//! This module defines [AttributeGraph].

use std::collections::BTreeMap;
use std::collections::HashSet;

use enum_assoc::Assoc;
use petgraph::{
    graph::{Graph, NodeIndex},
    visit::{Bfs, EdgeRef},
    Undirected,
};

use crate::parser::ast::SelectStatement;

use super::rule::{attributes_match, Annotation};

/// Kind of an edge between two attributes
#[derive(Assoc, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[func(pub fn name(&self) -> &'static str)]
pub enum AttributeEdgeKind {
    /// Equality join between attributes of two relations
    #[assoc(name = "JOIN")]
    Join,
    /// Two attributes of the same relation used together
    #[assoc(name = "RELATIONAL")]
    Relational,
    /// Aggregate dependency; reserved
    #[assoc(name = "GROUPBY")]
    GroupBy,
}

/// Weight assigned to newly created edges
pub const DEFAULT_EDGE_WEIGHT: u32 = 1;

/// A typed, weighted edge between two attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeEdge {
    /// Kind of this edge
    kind: AttributeEdgeKind,
    /// Weight of this edge
    weight: u32,
}

impl AttributeEdge {
    /// Create a new [AttributeEdge] with the default weight.
    pub fn new(kind: AttributeEdgeKind) -> Self {
        Self {
            kind,
            weight: DEFAULT_EDGE_WEIGHT,
        }
    }

    /// Return the kind of this edge.
    pub fn kind(&self) -> AttributeEdgeKind {
        self.kind
    }

    /// Return the weight of this edge.
    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// A node representing one canonical attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNode {
    /// Canonical name of the attribute
    name: String,
    /// Relation the attribute belongs to, when known
    relation: Option<String>,
    /// Annotations attached to the attribute
    annotations: Vec<Annotation>,
}

impl AttributeNode {
    /// Create a new [AttributeNode] without annotations.
    pub fn new(name: impl Into<String>, relation: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            relation: relation.map(Into::into),
            annotations: Vec::new(),
        }
    }

    /// Return the canonical name of this attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the relation of this attribute, when known.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// Return the annotations attached to this attribute.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Attach an annotation to this attribute.
    pub fn annotate(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Check whether the annotation lists of two nodes are compatible:
    /// both empty, or at least one pair intersects.
    pub fn is_annotation_compatible(&self, other: &Self) -> bool {
        if self.annotations.is_empty() && other.annotations.is_empty() {
            return true;
        }

        self.annotations.iter().any(|annotation| {
            other
                .annotations
                .iter()
                .any(|other_annotation| annotation.intersects(other_annotation))
        })
    }
}

/// Undirected graph over canonical attributes
///
/// Nodes are identified by their attribute name; adding a node under an
/// existing name keeps the node already present. Edges are typed and
/// weighted and may connect a pair of nodes more than once.
#[derive(Debug, Default, Clone)]
pub struct AttributeGraph {
    graph: Graph<AttributeNode, AttributeEdge, Undirected>,
    index: BTreeMap<String, NodeIndex>,
}

impl AttributeGraph {
    /// Create a new empty [AttributeGraph].
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    ///
    /// If a node with the same name is already present it is kept
    /// unchanged. Returns the index of the node.
    pub fn add_node(&mut self, node: AttributeNode) -> NodeIndex {
        match self.index.get(node.name()) {
            Some(index) => *index,
            None => {
                let name = node.name().to_owned();
                let index = self.graph.add_node(node);
                self.index.insert(name, index);

                index
            }
        }
    }

    /// Attach an annotation to the named node,
    /// creating the node first if it is not present.
    pub fn annotate(&mut self, name: &str, relation: Option<&str>, annotation: Annotation) {
        let index = self.add_node(AttributeNode::new(name, relation));
        self.graph[index].annotate(annotation);
    }

    /// Return the node with the given name,
    /// or `None` if there is no such node.
    pub fn node(&self, name: &str) -> Option<&AttributeNode> {
        self.index.get(name).map(|index| &self.graph[*index])
    }

    /// Return the first node whose name denotes the same column as `name`,
    /// preferring an exact match.
    pub fn matching_node(&self, name: &str) -> Option<&AttributeNode> {
        if let Some(node) = self.node(name) {
            return Some(node);
        }

        self.index
            .iter()
            .find(|(node_name, _)| attributes_match(node_name, name))
            .map(|(_, index)| &self.graph[*index])
    }

    /// Return `true` if a node with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return an iterator over the nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &AttributeNode> {
        self.graph.node_weights()
    }

    /// Add an edge between the named nodes,
    /// creating relation-less nodes for unknown names.
    pub fn add_edge(&mut self, from: &str, to: &str, edge: AttributeEdge) {
        let from_index = self.add_node(AttributeNode::new(from, None::<&str>));
        let to_index = self.add_node(AttributeNode::new(to, None::<&str>));

        self.graph.add_edge(from_index, to_index, edge);
    }

    /// Return an iterator over the edges with their endpoint nodes.
    pub fn edges(&self) -> impl Iterator<Item = (&AttributeNode, &AttributeNode, &AttributeEdge)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                edge.weight(),
            )
        })
    }

    /// Check whether the named attributes all exist and lie in a single
    /// connected component of the graph.
    ///
    /// A single name only needs to exist; an empty list is not connected.
    pub fn connects(&self, names: &[String]) -> bool {
        let Some(first) = names.first() else {
            return false;
        };

        if names.iter().any(|name| !self.contains(name)) {
            return false;
        }

        let start = self.index[first];
        let mut reached = HashSet::new();
        let mut search = Bfs::new(&self.graph, start);
        while let Some(index) = search.next(&self.graph) {
            reached.insert(index);
        }

        names.iter().all(|name| reached.contains(&self.index[name]))
    }

    /// Build the attribute graph of a parsed statement.
    ///
    /// Nodes are the canonical names of the projected attributes and of
    /// both sides of every equality; each equality contributes one edge,
    /// relational if both sides resolve to the same relation and a join
    /// otherwise.
    pub fn from_statement(statement: &SelectStatement) -> Self {
        let mut graph = Self::new();

        for attribute in statement.projection() {
            graph.add_node(AttributeNode::new(
                statement.canonical(attribute),
                attribute.qualifier().map(|qualifier| statement.resolve(qualifier)),
            ));
        }

        for predicate in statement.predicates() {
            let left_relation = predicate
                .left()
                .qualifier()
                .map(|qualifier| statement.resolve(qualifier).to_owned());
            let right_relation = predicate
                .right()
                .qualifier()
                .map(|qualifier| statement.resolve(qualifier).to_owned());

            let left = statement.canonical(predicate.left());
            let right = statement.canonical(predicate.right());

            graph.add_node(AttributeNode::new(&left, left_relation.as_deref()));
            graph.add_node(AttributeNode::new(&right, right_relation.as_deref()));

            let kind = match (&left_relation, &right_relation) {
                (Some(left_relation), Some(right_relation))
                    if left_relation == right_relation =>
                {
                    AttributeEdgeKind::Relational
                }
                _ => AttributeEdgeKind::Join,
            };

            graph.add_edge(&left, &right, AttributeEdge::new(kind));
        }

        graph
    }
}

#[cfg(test)]
mod test {
    use crate::parser::parse_select;

    use super::{AttributeEdge, AttributeEdgeKind, AttributeGraph, AttributeNode};

    fn graph_of(sql: &str) -> AttributeGraph {
        AttributeGraph::from_statement(
            &parse_select(sql).expect("statement belongs to the dialect"),
        )
    }

    #[test]
    fn join_and_relational_edges() {
        let graph = graph_of(
            "SELECT c.name FROM Customer c, Nation n \
             WHERE c.nationkey = n.nationkey AND c.name = c.address",
        );

        let kinds: Vec<AttributeEdgeKind> =
            graph.edges().map(|(_, _, edge)| edge.kind()).collect();
        assert_eq!(
            kinds,
            vec![AttributeEdgeKind::Join, AttributeEdgeKind::Relational]
        );
        assert!(graph.contains("Customer.name"));
        assert!(graph.contains("Customer.nationkey"));
        assert!(graph.contains("Nation.nationkey"));
        assert!(graph.contains("Customer.address"));
    }

    #[test]
    fn bare_attributes_make_join_edges() {
        let graph = graph_of(
            "SELECT c_name FROM customer, nation WHERE c_nationkey = n_nationkey",
        );

        let kinds: Vec<AttributeEdgeKind> =
            graph.edges().map(|(_, _, edge)| edge.kind()).collect();
        assert_eq!(kinds, vec![AttributeEdgeKind::Join]);
    }

    #[test]
    fn connectivity_over_named_attributes() {
        let mut graph = AttributeGraph::new();
        graph.add_edge("a", "b", AttributeEdge::new(AttributeEdgeKind::Join));
        graph.add_edge("c", "d", AttributeEdge::new(AttributeEdgeKind::Join));

        assert!(graph.connects(&["a".to_owned(), "b".to_owned()]));
        assert!(!graph.connects(&["a".to_owned(), "c".to_owned()]));
        assert!(graph.connects(&["d".to_owned()]));
        assert!(!graph.connects(&["a".to_owned(), "missing".to_owned()]));
        assert!(!graph.connects(&[]));
    }

    #[test]
    fn duplicate_node_names_keep_the_first_node() {
        let mut graph = AttributeGraph::new();
        graph.add_node(AttributeNode::new("a", Some("R")));
        graph.add_node(AttributeNode::new("a", Some("S")));

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("a").and_then(AttributeNode::relation), Some("R"));
    }

    #[test]
    fn matching_node_prefers_exact_names() {
        let mut graph = AttributeGraph::new();
        graph.add_node(AttributeNode::new("customer.c_name", Some("customer")));

        assert!(graph.matching_node("c_name").is_some());
        assert!(graph.matching_node("customer.c_name").is_some());
        assert!(graph.matching_node("n_name").is_none());
    }
}
