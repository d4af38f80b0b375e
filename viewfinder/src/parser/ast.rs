//! Abstract syntax tree for the supported SELECT dialect.

use std::collections::HashMap;
use std::fmt::Display;

/// A possibly qualified attribute reference, e.g. `c.name` or `c_name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    /// Table name or alias qualifying the column, if any
    qualifier: Option<String>,
    /// Name of the column
    column: String,
}

impl AttributeRef {
    /// Create a new qualified [AttributeRef].
    pub fn qualified(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            column: column.into(),
        }
    }

    /// Create a new unqualified [AttributeRef].
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: column.into(),
        }
    }

    /// Return the qualifier of this reference, if any.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Return the column name of this reference.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.column),
            None => f.write_str(&self.column),
        }
    }
}

/// A table listed in the FROM clause, with an optional alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Base name of the table
    name: String,
    /// Alias under which the table is referenced, if any
    alias: Option<String>,
}

impl TableRef {
    /// Create a new [TableRef].
    pub fn new(name: impl Into<String>, alias: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            alias: alias.map(Into::into),
        }
    }

    /// Return the base name of this table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the alias of this table, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// An equality between two attributes in the WHERE clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityPredicate {
    /// Left-hand side of the equality
    left: AttributeRef,
    /// Right-hand side of the equality
    right: AttributeRef,
}

impl EqualityPredicate {
    /// Create a new [EqualityPredicate].
    pub fn new(left: AttributeRef, right: AttributeRef) -> Self {
        Self { left, right }
    }

    /// Return the left-hand side of this equality.
    pub fn left(&self) -> &AttributeRef {
        &self.left
    }

    /// Return the right-hand side of this equality.
    pub fn right(&self) -> &AttributeRef {
        &self.right
    }
}

/// A parsed statement of the supported dialect:
/// `SELECT <attrs> FROM <tables> [WHERE <eq> (AND <eq>)*]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    /// Projected attributes, in SELECT order
    projection: Vec<AttributeRef>,
    /// Tables of the FROM clause, in order
    tables: Vec<TableRef>,
    /// Equality predicates of the WHERE clause, in order
    predicates: Vec<EqualityPredicate>,
}

impl SelectStatement {
    /// Create a new [SelectStatement].
    pub fn new(
        projection: Vec<AttributeRef>,
        tables: Vec<TableRef>,
        predicates: Vec<EqualityPredicate>,
    ) -> Self {
        Self {
            projection,
            tables,
            predicates,
        }
    }

    /// Return the projected attributes, in SELECT order.
    pub fn projection(&self) -> &[AttributeRef] {
        &self.projection
    }

    /// Return the tables of the FROM clause.
    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    /// Return the equality predicates of the WHERE clause.
    pub fn predicates(&self) -> &[EqualityPredicate] {
        &self.predicates
    }

    /// Return the map from alias to base table name.
    pub fn aliases(&self) -> HashMap<&str, &str> {
        self.tables
            .iter()
            .filter_map(|table| table.alias().map(|alias| (alias, table.name())))
            .collect()
    }

    /// Resolve a qualifier to a base table name.
    ///
    /// A qualifier that is not a known alias is taken to be a base name.
    pub fn resolve<'a>(&'a self, qualifier: &'a str) -> &'a str {
        self.aliases().get(qualifier).copied().unwrap_or(qualifier)
    }

    /// Return the canonical key of an attribute:
    /// `Table.column` with aliases resolved, or the bare column name.
    pub fn canonical(&self, attribute: &AttributeRef) -> String {
        match attribute.qualifier() {
            Some(qualifier) => format!("{}.{}", self.resolve(qualifier), attribute.column()),
            None => attribute.column().to_owned(),
        }
    }
}
