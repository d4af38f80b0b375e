//! This module defines [Atom].

use std::fmt::Display;

use itertools::Itertools;

use super::{tag::Tag, term::Term};

/// A relational atom: a predicate applied to an ordered sequence of terms
///
/// The arity of a relation is implicit in its atoms; within one query every
/// atom over the same relation carries the same number of terms with the
/// same positional meaning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom {
    /// Predicate name associated with this atom
    predicate: Tag,
    /// Terms of this atom, in positional order
    terms: Vec<Term>,
}

impl Atom {
    /// Create a new [Atom].
    pub fn new(predicate: impl Into<Tag>, terms: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms,
        }
    }

    /// Return the predicate of this atom.
    pub fn predicate(&self) -> &Tag {
        &self.predicate
    }

    /// Return the number of terms of this atom.
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Return the terms of this atom, in positional order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Return an iterator over the variables of this atom.
    pub fn variables(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter().filter(|term| term.is_variable())
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({})",
            self.predicate,
            self.terms.iter().format(", ")
        )
    }
}
