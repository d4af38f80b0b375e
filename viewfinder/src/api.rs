//! High-level entry points over SQL strings.

use crate::{
    compliance::{self, ComplianceRule},
    error::Error,
    parser::parse_select,
    rewriting::{self, Rewriting},
    translation::select_to_query,
};

/// Enumerate every rewriting of the query that uses only the given views
/// as source relations.
///
/// The query is translated under the name `Q` and the views under
/// `V0 … Vn-1` in input order; rewritings reference views by that index.
/// An empty result means no combination of the views answers the query.
///
/// # Error
/// Returns [Error::MalformedQuery] if the query or one of the views does
/// not belong to the supported dialect.
pub fn rewrite(query_sql: &str, views_sql: &[&str]) -> Result<Vec<Rewriting>, Error> {
    let query = select_to_query("Q", &parse_select(query_sql)?);
    log::debug!("rewriting {query}");

    let views = views_sql
        .iter()
        .enumerate()
        .map(|(index, sql)| Ok(select_to_query(&format!("V{index}"), &parse_select(sql)?)))
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(rewriting::rewrite_query(&query, &views))
}

/// Decide whether the query can be answered at `result_location` without
/// violating the given rules.
///
/// A `false` verdict is a result, not an error: some projected attribute
/// is unavailable, non-transferable, non-receivable, or unreachable from
/// the others.
///
/// # Error
/// Returns [Error::MalformedQuery] for a query outside the dialect,
/// [Error::MalformedRule] for a rule with missing fields, and
/// [Error::UnknownResultLocation] if no rule mentions `result_location`.
pub fn check_compliance(
    query_sql: &str,
    rules: &[ComplianceRule],
    result_location: &str,
) -> Result<bool, Error> {
    let statement = parse_select(query_sql)?;

    compliance::evaluate(&statement, rules, result_location)
}
