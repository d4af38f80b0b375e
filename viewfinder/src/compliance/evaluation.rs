//! This module defines [evaluate], the compliance decision procedure.

use itertools::Itertools;

use crate::{error::Error, parser::ast::SelectStatement};

use super::{
    forest::LocationForests,
    graph::{AttributeEdge, AttributeEdgeKind, AttributeGraph, AttributeNode},
    rule::ComplianceRule,
};

/// Edges of this weight or above are never admitted into the merged view.
///
/// Every edge currently produced carries
/// [DEFAULT_EDGE_WEIGHT][super::graph::DEFAULT_EDGE_WEIGHT], so the bound
/// only bites once reserved higher-weight (group-by) edges exist.
const EDGE_ADMISSION_BOUND: u32 = 3;

/// Decide whether a parsed query can be answered at the result location
/// without violating the given rules.
///
/// Every other location contributes a view: the query attributes its rules
/// make available, minus those it refuses to let go (a non-transferable
/// rule at the source) and those the result location refuses to receive.
/// The result location is open: an attribute its rules do not mention may
/// be received, and only an explicit non-transferable rule there blocks
/// admission. The views are merged, equi-join edges of the query are laid
/// over the merged attributes, and the query is compliant iff all of its
/// projections survived and form a single connected component.
///
/// # Error
/// Returns [Error::MalformedRule] for a rule with missing fields and
/// [Error::UnknownResultLocation] if `result_location` appears in no rule.
pub fn evaluate(
    statement: &SelectStatement,
    rules: &[ComplianceRule],
    result_location: &str,
) -> Result<bool, Error> {
    let forests = LocationForests::from_rules(rules)?;
    let Some(result_forest) = forests.forest(result_location) else {
        return Err(Error::UnknownResultLocation {
            location: result_location.to_owned(),
        });
    };

    let query_graph = AttributeGraph::from_statement(statement);

    let mut merged = AttributeGraph::new();
    for (location, forest) in forests.iter() {
        if location == result_location {
            continue;
        }

        let view = location_view(&query_graph, forest, result_forest, rules, location, result_location);
        log::debug!("location {location}: {} admitted attributes", view.node_count());

        merge_into(&mut merged, &view);
    }

    // Equi-joins resolve across locations, so their edges are admitted
    // against the merged attribute set rather than per location.
    for (from, to, edge) in query_graph.edges() {
        if edge.weight() < EDGE_ADMISSION_BOUND
            && merged.contains(from.name())
            && merged.contains(to.name())
        {
            merged.add_edge(from.name(), to.name(), *edge);
        }
    }

    let projections: Vec<String> = statement
        .projection()
        .iter()
        .map(|attribute| statement.canonical(attribute))
        .collect();

    let verdict = merged.connects(&projections);
    log::debug!(
        "{} projected attributes, verdict: {}",
        projections.len(),
        if verdict { "compliant" } else { "non-compliant" }
    );

    Ok(verdict)
}

/// Compute the part of the query observable at one location
/// and admissible at the result location.
fn location_view(
    query_graph: &AttributeGraph,
    forest: &AttributeGraph,
    result_forest: &AttributeGraph,
    rules: &[ComplianceRule],
    location: &str,
    result_location: &str,
) -> AttributeGraph {
    let mut view = AttributeGraph::new();

    for node in query_graph.nodes() {
        let Some(local) = forest.matching_node(node.name()) else {
            continue;
        };

        // The attribute must be allowed to leave this location.
        if blocking_rule(rules, location, node.name()) {
            continue;
        }

        let received = match result_forest.matching_node(node.name()) {
            Some(receiving) => receiving.is_annotation_compatible(local),
            None => !blocking_rule(rules, result_location, node.name()),
        };
        if !received {
            continue;
        }

        // Keep the query-side name but the ruled relation and constraints.
        let mut kept = AttributeNode::new(node.name(), local.relation());
        for annotation in local.annotations() {
            kept.annotate(annotation.clone());
        }
        view.add_node(kept);
    }

    // Attributes of one relation available at one location are usable
    // together: connect them with relational edges.
    let colocated: Vec<(String, String)> = view
        .nodes()
        .filter_map(|node| {
            node.relation()
                .map(|relation| (node.name().to_owned(), relation.to_owned()))
        })
        .collect();
    for ((left, left_relation), (right, right_relation)) in colocated.iter().tuple_combinations() {
        if left_relation == right_relation {
            view.add_edge(
                left,
                right,
                AttributeEdge::new(AttributeEdgeKind::Relational),
            );
        }
    }

    view
}

/// Check whether some rule at `location` forbids the attribute to move.
fn blocking_rule(rules: &[ComplianceRule], location: &str, attribute: &str) -> bool {
    rules.iter().any(|rule| {
        rule.location() == location && !rule.can_transfer() && rule.matches_attribute(attribute)
    })
}

/// Union a location view into the merged graph:
/// nodes by name with the first occurrence winning, edges concatenated.
fn merge_into(merged: &mut AttributeGraph, view: &AttributeGraph) {
    for node in view.nodes() {
        merged.add_node(node.clone());
    }
    for (from, to, edge) in view.edges() {
        merged.add_edge(from.name(), to.name(), *edge);
    }
}

#[cfg(test)]
mod test {
    use crate::{compliance::rule::ComplianceRule, error::Error, parser::parse_select};

    use super::evaluate;

    fn rule(
        location: &str,
        attribute: &str,
        relation: Option<&str>,
        can_transfer: bool,
    ) -> ComplianceRule {
        ComplianceRule::new(location, attribute, relation, can_transfer, None::<String>)
    }

    fn transferable_rules() -> Vec<ComplianceRule> {
        vec![
            rule("L1", "c_name", Some("customer"), true),
            rule("L1", "c_nationkey", Some("customer"), true),
            rule("L2", "n_name", Some("nation"), true),
            rule("L2", "n_nationkey", Some("nation"), true),
            rule("LR", "c_name", None, true),
            rule("LR", "n_name", None, true),
        ]
    }

    const QUERY: &str =
        "SELECT c_name, n_name FROM customer, nation WHERE c_nationkey = n_nationkey";

    #[test]
    fn joined_projections_are_compliant() {
        let statement = parse_select(QUERY).expect("statement belongs to the dialect");

        let verdict = evaluate(&statement, &transferable_rules(), "LR")
            .expect("result location appears in the rules");
        assert!(verdict);
    }

    #[test]
    fn non_transferable_source_attribute_breaks_compliance() {
        let statement = parse_select(QUERY).expect("statement belongs to the dialect");

        // c_name may not leave L1 and LR does not rule it either.
        let rules = vec![
            rule("L1", "c_name", Some("customer"), false),
            rule("L1", "c_nationkey", Some("customer"), true),
            rule("L2", "n_name", Some("nation"), true),
            rule("L2", "n_nationkey", Some("nation"), true),
            rule("LR", "n_name", None, true),
        ];

        let verdict =
            evaluate(&statement, &rules, "LR").expect("result location appears in the rules");
        assert!(!verdict);
    }

    #[test]
    fn non_transferable_rule_at_result_location_blocks_admission() {
        let statement = parse_select(QUERY).expect("statement belongs to the dialect");

        let mut rules = transferable_rules();
        rules.retain(|existing| {
            !(existing.location() == "LR" && existing.attribute() == "c_name")
        });
        rules.push(rule("LR", "c_name", None, false));

        let verdict =
            evaluate(&statement, &rules, "LR").expect("result location appears in the rules");
        assert!(!verdict);
    }

    #[test]
    fn unmentioned_attribute_is_received_by_default() {
        let statement = parse_select(QUERY).expect("statement belongs to the dialect");

        // LR rules neither of the projections; absence is permission.
        let rules = vec![
            rule("L1", "c_name", Some("customer"), true),
            rule("L1", "c_nationkey", Some("customer"), true),
            rule("L2", "n_name", Some("nation"), true),
            rule("L2", "n_nationkey", Some("nation"), true),
            rule("LR", "o_orderkey", None, true),
        ];

        let verdict =
            evaluate(&statement, &rules, "LR").expect("result location appears in the rules");
        assert!(verdict);
    }

    #[test]
    fn conflicting_constraints_block_admission() {
        let statement =
            parse_select("SELECT c_name FROM customer").expect("statement belongs to the dialect");

        let rules = vec![
            ComplianceRule::new("L1", "c_name", Some("customer"), true, Some("region = 'EU'")),
            ComplianceRule::new("LR", "c_name", None::<String>, true, Some("region = 'US'")),
        ];
        assert!(!evaluate(&statement, &rules, "LR").expect("known result location"));

        let rules = vec![
            ComplianceRule::new("L1", "c_name", Some("customer"), true, Some("region = 'EU'")),
            ComplianceRule::new("LR", "c_name", None::<String>, true, None::<String>),
        ];
        assert!(evaluate(&statement, &rules, "LR").expect("known result location"));
    }

    #[test]
    fn unknown_result_location_is_an_error() {
        let statement = parse_select(QUERY).expect("statement belongs to the dialect");

        assert!(matches!(
            evaluate(&statement, &transferable_rules(), "L9"),
            Err(Error::UnknownResultLocation { .. })
        ));
    }

    #[test]
    fn single_projection_needs_only_receivability() {
        let statement =
            parse_select("SELECT c_name FROM customer").expect("statement belongs to the dialect");

        let rules = vec![
            rule("L1", "c_name", Some("customer"), true),
            rule("LR", "c_name", None, true),
        ];
        assert!(evaluate(&statement, &rules, "LR").expect("known result location"));

        // Not available at any source location.
        let rules = vec![
            rule("L1", "c_address", Some("customer"), true),
            rule("LR", "c_name", None, true),
        ];
        assert!(!evaluate(&statement, &rules, "LR").expect("known result location"));
    }

    #[test]
    fn verdict_is_independent_of_rule_order() {
        let statement = parse_select(QUERY).expect("statement belongs to the dialect");

        let mut rules = transferable_rules();
        let forward =
            evaluate(&statement, &rules, "LR").expect("result location appears in the rules");
        rules.reverse();
        let backward =
            evaluate(&statement, &rules, "LR").expect("result location appears in the rules");

        assert_eq!(forward, backward);
    }
}
