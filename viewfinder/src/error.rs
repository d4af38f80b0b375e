//! Error-handling module for the crate

use thiserror::Error;

/// Errors surfaced at the crate boundary
///
/// Semantic emptiness (a query with no rewritings, a non-compliant verdict)
/// is expressed through return values and never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The query does not belong to the supported SELECT dialect
    #[error("malformed query: {reason}")]
    MalformedQuery {
        /// Description of the offending part of the input
        reason: String,
    },
    /// A compliance rule is missing a required field
    #[error("malformed rule: {reason}")]
    MalformedRule {
        /// Description of the offending rule
        reason: String,
    },
    /// The designated result location does not appear in any rule
    #[error("result location \"{location}\" does not appear in any rule")]
    UnknownResultLocation {
        /// The location named by the caller
        location: String,
    },
}

impl Error {
    /// Create a [Error::MalformedQuery] from anything printable.
    pub(crate) fn malformed_query(reason: impl Into<String>) -> Self {
        Self::MalformedQuery {
            reason: reason.into(),
        }
    }

    /// Create a [Error::MalformedRule] from anything printable.
    pub(crate) fn malformed_rule(reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            reason: reason.into(),
        }
    }
}
