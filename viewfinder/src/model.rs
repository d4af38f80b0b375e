//! The logical data model: terms, atoms, and conjunctive queries.

pub mod atom;
pub mod query;
pub mod tag;
pub mod term;

pub use atom::Atom;
pub use query::ConjunctiveQuery;
pub use tag::Tag;
pub use term::{Term, TermKind};
