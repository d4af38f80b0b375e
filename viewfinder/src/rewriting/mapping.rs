//! This module defines [Mapping].

use std::collections::btree_map::{self, BTreeMap};
use std::fmt::Display;

use itertools::Itertools;

use crate::model::{Atom, Term};

/// Partial map from view variables to query variables
///
/// Witnesses that (part of) a view maps homomorphically into a query.
/// Backed by an ordered map so that mappings themselves carry a total
/// order and can serve as deduplication keys.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mapping {
    assignment: BTreeMap<Term, Term>,
}

impl Mapping {
    /// Create a new empty [Mapping].
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the image of a view term, if assigned.
    pub fn image(&self, term: &Term) -> Option<&Term> {
        self.assignment.get(term)
    }

    /// Return an iterator over the assignment pairs, in term order.
    pub fn iter(&self) -> btree_map::Iter<'_, Term, Term> {
        self.assignment.iter()
    }

    /// Return `true` if this mapping assigns no variable.
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Check whether two mappings agree on their common domain.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.assignment.iter().all(|(term, image)| {
            other
                .assignment
                .get(term)
                .map_or(true, |other_image| other_image == image)
        })
    }

    /// Merge two mappings into their pointwise union,
    /// or return `None` if they disagree on a common term.
    pub fn merged(&self, other: &Self) -> Option<Self> {
        if !self.is_compatible(other) {
            return None;
        }

        let mut assignment = self.assignment.clone();
        assignment.extend(
            other
                .assignment
                .iter()
                .map(|(term, image)| (term.clone(), image.clone())),
        );

        Some(Self { assignment })
    }

    /// Try to map a view atom onto a query atom, extending `existing`.
    ///
    /// The mapping for a given atom pair is uniquely determined by
    /// position: a view variable binds to the query term at its position
    /// (consistently across repeated occurrences), while a view constant
    /// must equal the query term exactly. Returns the merge of the
    /// positional mapping with `existing`, or `None` if the relations,
    /// the arities, or the assignments conflict.
    pub fn try_map_atom(view_atom: &Atom, query_atom: &Atom, existing: &Self) -> Option<Self> {
        if view_atom.predicate() != query_atom.predicate()
            || view_atom.arity() != query_atom.arity()
        {
            return None;
        }

        let mut local = Self::new();
        for (view_term, query_term) in view_atom.terms().iter().zip(query_atom.terms()) {
            if view_term.is_variable() {
                match local.assignment.get(view_term) {
                    Some(image) if image != query_term => return None,
                    Some(_) => {}
                    None => {
                        local
                            .assignment
                            .insert(view_term.clone(), query_term.clone());
                    }
                }
            } else if view_term != query_term {
                return None;
            }
        }

        existing.merged(&local)
    }
}

impl Display for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.assignment
                .iter()
                .map(|(term, image)| format!("{term} -> {image}"))
                .format(", ")
        )
    }
}

impl FromIterator<(Term, Term)> for Mapping {
    fn from_iter<Iterator: IntoIterator<Item = (Term, Term)>>(iter: Iterator) -> Self {
        Self {
            assignment: iter.into_iter().collect(),
        }
    }
}
