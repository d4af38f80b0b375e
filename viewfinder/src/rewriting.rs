//! Enumeration of query rewritings over views.

pub mod combination;
pub mod description;
pub mod mapping;

pub use combination::{combine, Rewriting};
pub use description::{view_descriptions, MiniconDescription};
pub use mapping::Mapping;

use crate::model::ConjunctiveQuery;

/// Enumerate every rewriting of `query` that uses only `views`
/// as source relations.
///
/// The result is deterministic: rewritings are ordered by size first
/// and content second, and duplicates (same multiset of views, same
/// merged mapping) are emitted once.
pub fn rewrite_query(query: &ConjunctiveQuery, views: &[ConjunctiveQuery]) -> Vec<Rewriting> {
    let descriptions = view_descriptions(query, views);
    log::debug!(
        "{} candidate view descriptions for {} subgoals",
        descriptions.len(),
        query.subgoal_count()
    );

    let rewritings = combine(query, &descriptions);
    log::debug!("{} rewritings", rewritings.len());

    rewritings
}
