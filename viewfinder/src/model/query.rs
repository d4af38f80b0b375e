//! This module defines [ConjunctiveQuery].

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use itertools::Itertools;

use super::{atom::Atom, term::Term};

/// A conjunctive query: a named head over a conjunction of atoms
///
/// The head lists the distinguished (projected) variables in projection
/// order; duplicates are allowed. Every head variable also appears in the
/// body, and every body variable that is not a head variable is understood
/// to be existentially quantified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjunctiveQuery {
    /// Name of the query
    name: String,
    /// Head terms, in projection order
    head: Vec<Term>,
    /// Body atoms (subgoals)
    body: Vec<Atom>,
}

impl ConjunctiveQuery {
    /// Create a new [ConjunctiveQuery].
    ///
    /// # Panics
    /// Panics if two body atoms over the same relation disagree on arity,
    /// naming the offending relation.
    pub fn new(name: impl Into<String>, head: Vec<Term>, body: Vec<Atom>) -> Self {
        let mut arities = HashMap::<&str, usize>::new();
        for atom in &body {
            let arity = arities
                .entry(atom.predicate().name())
                .or_insert_with(|| atom.arity());
            assert_eq!(
                *arity,
                atom.arity(),
                "atoms over relation {} disagree on arity",
                atom.predicate()
            );
        }

        Self {
            name: name.into(),
            head,
            body,
        }
    }

    /// Return the name of this query.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the head terms, in projection order.
    pub fn head(&self) -> &[Term] {
        &self.head
    }

    /// Return the body atoms.
    pub fn body(&self) -> &[Atom] {
        &self.body
    }

    /// Return the number of subgoals in the body.
    pub fn subgoal_count(&self) -> usize {
        self.body.len()
    }

    /// Return the set of all variables of this query.
    pub fn variables(&self) -> BTreeSet<&Term> {
        self.head
            .iter()
            .filter(|term| term.is_variable())
            .chain(self.body.iter().flat_map(Atom::variables))
            .collect()
    }

    /// Return the set of head variables of this query.
    pub fn head_variables(&self) -> BTreeSet<&Term> {
        self.head
            .iter()
            .filter(|term| term.is_variable())
            .collect()
    }

    /// Return `true` if this query contains a head variable
    /// that does not occur in the body, and `false` otherwise.
    pub fn has_unsafe_head(&self) -> bool {
        let body_variables: BTreeSet<&Term> =
            self.body.iter().flat_map(Atom::variables).collect();

        self.head_variables()
            .iter()
            .any(|variable| !body_variables.contains(*variable))
    }
}

impl Display for ConjunctiveQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) :- {}",
            self.name,
            self.head.iter().format(", "),
            self.body.iter().format(", ")
        )
    }
}

#[cfg(test)]
mod test {
    use crate::model::{atom::Atom, term::Term};

    use super::ConjunctiveQuery;

    fn example_query() -> ConjunctiveQuery {
        ConjunctiveQuery::new(
            "Q",
            vec![Term::variable("R.x"), Term::variable("S.z")],
            vec![
                Atom::new("R", vec![Term::variable("R.x"), Term::variable("R.y")]),
                Atom::new("S", vec![Term::variable("R.y"), Term::variable("S.z")]),
            ],
        )
    }

    #[test]
    fn variable_sets() {
        let query = example_query();

        let variables: Vec<&str> = query.variables().iter().map(|t| t.name()).collect();
        assert_eq!(variables, vec!["R.x", "R.y", "S.z"]);

        let head: Vec<&str> = query.head_variables().iter().map(|t| t.name()).collect();
        assert_eq!(head, vec!["R.x", "S.z"]);

        assert!(!query.has_unsafe_head());
    }

    #[test]
    fn display() {
        assert_eq!(
            example_query().to_string(),
            "Q(R.x, S.z) :- R(R.x, R.y), S(R.y, S.z)"
        );
    }

    #[test]
    #[should_panic(expected = "disagree on arity")]
    fn arity_mismatch_panics() {
        ConjunctiveQuery::new(
            "Q",
            vec![],
            vec![
                Atom::new("R", vec![Term::variable("R.x")]),
                Atom::new("R", vec![Term::variable("R.x"), Term::variable("R.y")]),
            ],
        );
    }
}
