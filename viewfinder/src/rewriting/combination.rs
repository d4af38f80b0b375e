//! This module defines [Rewriting].

use std::collections::BTreeSet;
use std::fmt::Display;

use itertools::Itertools;

use crate::model::{ConjunctiveQuery, Term};

use super::{description::MiniconDescription, mapping::Mapping};

/// A combination of view uses that answers the whole query
///
/// The covered subgoals of the uses partition into the full query body,
/// their mappings agree pairwise, and together they expose every query
/// head variable. Each use carries its own copy of its mapping, so the
/// same view may appear twice (a self-join over the view) without the
/// uses sharing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewriting {
    /// Index of the used view, per use
    view_indices: Vec<usize>,
    /// Mapping from view variables to query variables, per use
    mappings: Vec<Mapping>,
    /// Pointwise union of the per-use mappings
    merged: Mapping,
    /// Union of the covered query subgoals; the full body
    covered: BTreeSet<usize>,
}

impl Rewriting {
    /// Return the indices of the used views, one entry per use.
    pub fn view_indices(&self) -> &[usize] {
        &self.view_indices
    }

    /// Return the per-use variable mappings, parallel to
    /// [view_indices][Self::view_indices].
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Return the union of all per-use mappings.
    pub fn merged_mapping(&self) -> &Mapping {
        &self.merged
    }

    /// Return the covered query subgoals.
    pub fn covered(&self) -> &BTreeSet<usize> {
        &self.covered
    }
}

impl Display for Rewriting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] with {}",
            self.view_indices
                .iter()
                .map(|index| format!("V{index}"))
                .format(", "),
            self.merged
        )
    }
}

/// Enumerate every valid combination of the given view descriptions.
///
/// Subsets are visited in increasing size with an iterative enumeration,
/// a subset being dropped as soon as two of its members disagree on a
/// shared view variable. Combinations that produce the same multiset of
/// views with the same merged mapping are emitted once.
pub fn combine(query: &ConjunctiveQuery, descriptions: &[MiniconDescription]) -> Vec<Rewriting> {
    let full_body: BTreeSet<usize> = (0..query.subgoal_count()).collect();
    let head_variables: BTreeSet<&Term> = query.head_variables();

    let mut seen = BTreeSet::<(Vec<usize>, Mapping)>::new();
    let mut rewritings = Vec::new();

    for size in 1..=descriptions.len() {
        for selection in (0..descriptions.len()).combinations(size) {
            let members: Vec<&MiniconDescription> =
                selection.iter().map(|&index| &descriptions[index]).collect();

            if members
                .iter()
                .tuple_combinations()
                .any(|(left, right)| !left.mapping().is_compatible(right.mapping()))
            {
                continue;
            }

            let covered: BTreeSet<usize> = members
                .iter()
                .flat_map(|member| member.covered().iter().copied())
                .collect();
            if covered != full_body {
                continue;
            }

            let distinguished: BTreeSet<&Term> = members
                .iter()
                .flat_map(|member| member.distinguished().iter())
                .collect();
            if !head_variables.is_subset(&distinguished) {
                continue;
            }

            let merged = members
                .iter()
                .fold(Mapping::new(), |accumulated, member| {
                    accumulated
                        .merged(member.mapping())
                        .expect("pairwise compatible mappings merge pointwise")
                });

            let mut uses: Vec<usize> = members.iter().map(|member| member.view_index()).collect();
            uses.sort_unstable();

            if seen.insert((uses.clone(), merged.clone())) {
                rewritings.push(Rewriting {
                    view_indices: members.iter().map(|member| member.view_index()).collect(),
                    mappings: members
                        .iter()
                        .map(|member| member.mapping().clone())
                        .collect(),
                    merged,
                    covered,
                });
            }
        }
    }

    rewritings
}

#[cfg(test)]
mod test {
    use crate::{
        parser::parse_select, rewriting::description::view_descriptions,
        translation::select_to_query,
    };

    use super::combine;

    fn query(name: &str, sql: &str) -> crate::model::ConjunctiveQuery {
        select_to_query(name, &parse_select(sql).expect("statement belongs to the dialect"))
    }

    #[test]
    fn two_single_table_views_combine_once() {
        let target = query("Q", "SELECT R.x, S.z FROM R, S WHERE R.y = S.y");
        let views = vec![
            query("V0", "SELECT R.x, R.y FROM R"),
            query("V1", "SELECT S.y, S.z FROM S"),
        ];

        let descriptions = view_descriptions(&target, &views);
        let rewritings = combine(&target, &descriptions);

        assert_eq!(rewritings.len(), 1);
        assert_eq!(rewritings[0].view_indices(), &[0, 1]);
        assert_eq!(
            rewritings[0].covered().iter().copied().collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn prejoined_view_rewrites_alone() {
        let target = query("Q", "SELECT R.x, S.z FROM R, S WHERE R.y = S.y");
        let views = vec![query("V0", "SELECT R.x, S.z FROM R, S WHERE R.y = S.y")];

        let descriptions = view_descriptions(&target, &views);
        let rewritings = combine(&target, &descriptions);

        assert_eq!(rewritings.len(), 1);
        assert_eq!(rewritings[0].view_indices(), &[0]);
    }

    #[test]
    fn incompatible_or_incomplete_subsets_are_dropped() {
        let target = query("Q", "SELECT R.x, R.y FROM R, S WHERE R.y = S.y");
        let views = vec![query("V0", "SELECT R.x FROM R")];

        let descriptions = view_descriptions(&target, &views);
        assert!(combine(&target, &descriptions).is_empty());
    }

    #[test]
    fn per_use_mappings_are_copies() {
        let target = query("Q", "SELECT R.x, S.z FROM R, S WHERE R.y = S.y");
        let views = vec![
            query("V0", "SELECT R.x, R.y FROM R"),
            query("V1", "SELECT S.y, S.z FROM S"),
        ];

        let descriptions = view_descriptions(&target, &views);
        let rewritings = combine(&target, &descriptions);

        let rewriting = &rewritings[0];
        assert_eq!(rewriting.mappings().len(), rewriting.view_indices().len());
        for (use_index, mapping) in rewriting.mappings().iter().enumerate() {
            let description = &descriptions[use_index];
            assert_eq!(mapping, description.mapping());
        }
    }
}
