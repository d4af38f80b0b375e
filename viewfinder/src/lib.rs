//! An in-memory reasoning engine for conjunctive SQL queries.
//!
//! The crate answers two related questions about queries of the restricted
//! `SELECT … FROM … WHERE` dialect over a fixed relational schema:
//!
//! * **Rewriting using views** ([`rewrite`]): given a query and a set of
//!   views of the same shape, enumerate every combination of views that
//!   covers the query, together with the variable mappings that witness the
//!   coverage (the MiniCon algorithm).
//! * **Location compliance** ([`check_compliance`]): given a query, a set of
//!   per-location rules stating which attributes may be observed and
//!   transferred, and a designated result location, decide whether the query
//!   can be answered at the result location without violating any rule.
//!
//! Both paths share the SQL front end ([`parser`] and [`translation`]) and
//! are pure functions of their inputs: no I/O, no shared state, and
//! deterministic output order throughout.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    variant_size_differences
)]

pub mod api;
pub mod compliance;
pub mod error;
pub mod model;
pub mod parser;
pub mod rewriting;
pub mod translation;

pub use api::{check_compliance, rewrite};
pub use compliance::ComplianceRule;
pub use error::Error;
