//! This module defines [ComplianceRule] and [Annotation].

use crate::error::Error;

/// A constraint descriptor attached to an attribute node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Predicate narrowing the permitted values; `None` means unconstrained
    predicate: Option<String>,
    /// Whether the constraint must hold for the attribute to be used
    compulsory: bool,
}

impl Annotation {
    /// Create a new [Annotation].
    pub fn new(predicate: Option<String>, compulsory: bool) -> Self {
        Self {
            predicate,
            compulsory,
        }
    }

    /// Return the predicate of this annotation, if any.
    pub fn predicate(&self) -> Option<&str> {
        self.predicate.as_deref()
    }

    /// Return `true` if this annotation is compulsory.
    pub fn is_compulsory(&self) -> bool {
        self.compulsory
    }

    /// Check whether two annotations intersect:
    /// either is unconstrained, or both carry the same predicate.
    pub fn intersects(&self, other: &Self) -> bool {
        match (&self.predicate, &other.predicate) {
            (None, _) | (_, None) => true,
            (Some(left), Some(right)) => left == right,
        }
    }
}

/// A single statement about an attribute at a location
///
/// Asserts that at `location` the given attribute is available, may (or may
/// not) leave that location, and is narrowed by an optional constraint.
/// An attribute no rule mentions is implicitly denied at that location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRule {
    /// Location the rule applies to
    location: String,
    /// Attribute the rule applies to; canonical `Table.column` when the
    /// rule is bound to a relation, a bare column name otherwise
    attribute: String,
    /// Relation carrying the attribute, if the rule is bound to one
    relation: Option<String>,
    /// Whether the attribute may leave the location
    can_transfer: bool,
    /// Constraint narrowing the permitted values, if any
    constraint: Option<String>,
}

impl ComplianceRule {
    /// Create a new [ComplianceRule].
    pub fn new(
        location: impl Into<String>,
        attribute: impl Into<String>,
        relation: Option<impl Into<String>>,
        can_transfer: bool,
        constraint: Option<impl Into<String>>,
    ) -> Self {
        Self {
            location: location.into(),
            attribute: attribute.into(),
            relation: relation.map(Into::into),
            can_transfer,
            constraint: constraint.map(Into::into),
        }
    }

    /// Return the location of this rule.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Return the attribute of this rule.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Return the relation of this rule, if bound to one.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// Return `true` if the attribute may leave the location.
    pub fn can_transfer(&self) -> bool {
        self.can_transfer
    }

    /// Return the constraint of this rule, if any.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// Check whether this rule speaks about the named query attribute.
    pub fn matches_attribute(&self, name: &str) -> bool {
        attributes_match(&self.attribute, name)
    }

    /// Check that the required fields of this rule are present.
    pub fn validate(&self) -> Result<(), Error> {
        if self.location.is_empty() {
            return Err(Error::malformed_rule(format!(
                "rule for attribute \"{}\" has an empty location",
                self.attribute
            )));
        }
        if self.attribute.is_empty() {
            return Err(Error::malformed_rule(format!(
                "rule at location \"{}\" has an empty attribute",
                self.location
            )));
        }

        Ok(())
    }
}

/// Return the column part of a canonical attribute name.
fn column_part(name: &str) -> &str {
    name.split_once('.').map(|(_, column)| column).unwrap_or(name)
}

/// Check whether two attribute names denote the same column.
///
/// Full canonical names must be equal; a bare name also matches the column
/// part of a qualified name, so rules written without a relation apply to
/// any relation carrying the attribute.
pub(crate) fn attributes_match(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }

    match (left.contains('.'), right.contains('.')) {
        (true, false) => column_part(left) == right,
        (false, true) => left == column_part(right),
        _ => false,
    }
}
