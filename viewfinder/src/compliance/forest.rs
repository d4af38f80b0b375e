//! This module defines [LocationForests].

use std::collections::BTreeMap;

use crate::error::Error;

use super::{
    graph::AttributeGraph,
    rule::{Annotation, ComplianceRule},
};

/// Per-location graphs of authorised attributes
///
/// Each location owns one graph with a node per attribute its rules
/// mention; every rule contributes one compulsory annotation to its
/// attribute's node. The forests carry no edges of their own; edges are
/// inherited from the query graph when the per-location views are
/// computed.
#[derive(Debug, Default, Clone)]
pub struct LocationForests {
    forests: BTreeMap<String, AttributeGraph>,
}

impl LocationForests {
    /// Build the forests of a rule set.
    ///
    /// # Error
    /// Returns [Error::MalformedRule] if a rule is missing its location
    /// or its attribute.
    pub fn from_rules(rules: &[ComplianceRule]) -> Result<Self, Error> {
        let mut forests = BTreeMap::<String, AttributeGraph>::new();

        for rule in rules {
            rule.validate()?;

            forests.entry(rule.location().to_owned()).or_default().annotate(
                rule.attribute(),
                rule.relation(),
                Annotation::new(rule.constraint().map(str::to_owned), true),
            );
        }

        Ok(Self { forests })
    }

    /// Return the forest of a location,
    /// or `None` if no rule mentions the location.
    pub fn forest(&self, location: &str) -> Option<&AttributeGraph> {
        self.forests.get(location)
    }

    /// Return `true` if some rule mentions the location.
    pub fn contains(&self, location: &str) -> bool {
        self.forests.contains_key(location)
    }

    /// Return an iterator over (location, forest) pairs, in location order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeGraph)> {
        self.forests
            .iter()
            .map(|(location, forest)| (location.as_str(), forest))
    }
}
