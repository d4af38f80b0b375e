//! Location-aware compliance checking for parsed queries.

pub mod evaluation;
pub mod forest;
pub mod graph;
pub mod rule;

pub use evaluation::evaluate;
pub use forest::LocationForests;
pub use graph::{AttributeEdge, AttributeEdgeKind, AttributeGraph, AttributeNode};
pub use rule::{Annotation, ComplianceRule};
