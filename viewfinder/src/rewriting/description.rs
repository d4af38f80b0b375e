//! This module defines [MiniconDescription].

use std::collections::BTreeSet;
use std::fmt::Display;

use itertools::Itertools;

use crate::model::{ConjunctiveQuery, Term};

use super::mapping::Mapping;

/// Maximal coverage record of a single view over part of a query
///
/// Records which query subgoals the view covers, the variable mapping
/// witnessing the coverage, and the query head variables whose images the
/// view exposes through its own head.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MiniconDescription {
    /// Index of the view into the view list
    view_index: usize,
    /// Indices of the covered query subgoals
    covered: BTreeSet<usize>,
    /// Mapping from view variables to query variables
    mapping: Mapping,
    /// Query head variables carried by this description
    distinguished: BTreeSet<Term>,
}

impl MiniconDescription {
    /// Return the index of the view this description belongs to.
    pub fn view_index(&self) -> usize {
        self.view_index
    }

    /// Return the indices of the covered query subgoals.
    pub fn covered(&self) -> &BTreeSet<usize> {
        &self.covered
    }

    /// Return the mapping from view variables to query variables.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Return the query head variables carried by this description.
    pub fn distinguished(&self) -> &BTreeSet<Term> {
        &self.distinguished
    }
}

impl Display for MiniconDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "V{} covers {{{}}} with {}",
            self.view_index,
            self.covered.iter().format(", "),
            self.mapping
        )
    }
}

/// Enumerate the maximally extended [MiniconDescription]s
/// of every view over the given query.
///
/// Each (query subgoal, view subgoal) pair that maps under the empty
/// mapping seeds one candidate, which is then extended to a fixed point
/// over the remaining subgoals. A candidate in which some query head
/// variable is reachable only through view variables that the view
/// existentially quantifies away is discarded: such a variable cannot be
/// recovered from the view's output. The result is deduplicated and
/// totally ordered.
pub fn view_descriptions(
    query: &ConjunctiveQuery,
    views: &[ConjunctiveQuery],
) -> Vec<MiniconDescription> {
    let mut unique = BTreeSet::new();

    for (view_index, view) in views.iter().enumerate() {
        let before = unique.len();

        for (subgoal_index, query_atom) in query.body().iter().enumerate() {
            for view_atom in view.body() {
                let Some(seed) = Mapping::try_map_atom(view_atom, query_atom, &Mapping::new())
                else {
                    continue;
                };

                let mut covered = BTreeSet::from([subgoal_index]);
                let mut mapping = seed;
                extend_to_fixed_point(query, view, &mut covered, &mut mapping);

                let Some(distinguished) = carried_head_variables(query, view, &mapping) else {
                    continue;
                };

                unique.insert(MiniconDescription {
                    view_index,
                    covered,
                    mapping,
                    distinguished,
                });
            }
        }

        log::trace!(
            "view {} ({}): {} descriptions",
            view_index,
            view.name(),
            unique.len() - before
        );
    }

    unique.into_iter().collect()
}

/// Repeatedly cover further query subgoals under the merged mapping
/// until a full pass applies no extension.
fn extend_to_fixed_point(
    query: &ConjunctiveQuery,
    view: &ConjunctiveQuery,
    covered: &mut BTreeSet<usize>,
    mapping: &mut Mapping,
) {
    let mut extended = true;
    while extended {
        extended = false;

        for (subgoal_index, query_atom) in query.body().iter().enumerate() {
            if covered.contains(&subgoal_index) {
                continue;
            }

            for view_atom in view.body() {
                if let Some(merged) = Mapping::try_map_atom(view_atom, query_atom, mapping) {
                    covered.insert(subgoal_index);
                    *mapping = merged;
                    extended = true;
                    break;
                }
            }
        }
    }
}

/// Collect the query head variables the view can expose,
/// or `None` if some covered head variable is existential in the view.
fn carried_head_variables(
    query: &ConjunctiveQuery,
    view: &ConjunctiveQuery,
    mapping: &Mapping,
) -> Option<BTreeSet<Term>> {
    let view_head = view.head_variables();

    let mut carried = BTreeSet::new();
    for head_variable in query.head_variables() {
        let mut preimages = mapping
            .iter()
            .filter(|(_, image)| *image == head_variable)
            .map(|(term, _)| term)
            .peekable();

        if preimages.peek().is_none() {
            continue;
        }

        if preimages.any(|preimage| view_head.contains(preimage)) {
            carried.insert(head_variable.clone());
        } else {
            return None;
        }
    }

    Some(carried)
}
