//! Translation of parsed statements into [ConjunctiveQuery]s.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    model::{Atom, ConjunctiveQuery, Term},
    parser::ast::SelectStatement,
};

/// Union-find over canonical attribute keys.
///
/// Equi-joins merge the classes of their two sides; the representative of a
/// class is its lexicographically smallest key, so independently translated
/// statements assign identical variable names to identical columns.
#[derive(Debug, Default)]
struct KeyClasses {
    parent: HashMap<String, String>,
}

impl KeyClasses {
    /// Register a key in its own class.
    fn add(&mut self, key: &str) {
        if !self.parent.contains_key(key) {
            self.parent.insert(key.to_owned(), key.to_owned());
        }
    }

    /// Return the representative of a key's class.
    fn find(&self, key: &str) -> String {
        let mut current = key;
        while let Some(parent) = self.parent.get(current) {
            if parent == current {
                break;
            }
            current = parent;
        }

        current.to_owned()
    }

    /// Merge the classes of two keys,
    /// keeping the lexicographically smaller representative.
    fn union(&mut self, left: &str, right: &str) {
        self.add(left);
        self.add(right);

        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return;
        }

        let (canonical, other) = if left_root < right_root {
            (left_root, right_root)
        } else {
            (right_root, left_root)
        };
        self.parent.insert(other, canonical);
    }
}

/// Translate a parsed statement into a [ConjunctiveQuery] with the given name.
///
/// One variable is assigned per canonical attribute key, equi-joins force
/// both sides onto the same variable, and each base table contributes one
/// atom whose terms follow the lexicographic order of the table's keys.
/// An unqualified attribute belongs to every table without qualified
/// attributes of its own; a table with no attributes at all is kept alive
/// through a single placeholder variable.
pub fn select_to_query(name: &str, statement: &SelectStatement) -> ConjunctiveQuery {
    let mut classes = KeyClasses::default();

    for attribute in statement.projection() {
        classes.add(&statement.canonical(attribute));
    }
    for predicate in statement.predicates() {
        classes.union(
            &statement.canonical(predicate.left()),
            &statement.canonical(predicate.right()),
        );
    }

    // Group the keys by the table they qualify to.
    let mut qualified = BTreeMap::<String, BTreeSet<String>>::new();
    let mut bare = BTreeSet::<String>::new();
    for key in classes.parent.keys() {
        match key.split_once('.') {
            Some((table, _)) => {
                qualified
                    .entry(table.to_owned())
                    .or_default()
                    .insert(key.clone());
            }
            None => {
                bare.insert(key.clone());
            }
        }
    }

    let mut body = Vec::new();
    let mut seen = BTreeSet::new();
    for table in statement.tables() {
        if !seen.insert(table.name().to_owned()) {
            continue;
        }

        let keys = match qualified.get(table.name()) {
            Some(keys) => keys,
            None => &bare,
        };

        let terms = if keys.is_empty() {
            vec![Term::variable(format!("{}._", table.name()))]
        } else {
            keys.iter()
                .map(|key| Term::variable(classes.find(key)))
                .collect()
        };

        body.push(Atom::new(table.name(), terms));
    }

    let head = statement
        .projection()
        .iter()
        .map(|attribute| Term::variable(classes.find(&statement.canonical(attribute))))
        .collect();

    ConjunctiveQuery::new(name, head, body)
}

#[cfg(test)]
mod test {
    use crate::parser::parse_select;

    use super::select_to_query;

    fn translate(sql: &str) -> crate::model::ConjunctiveQuery {
        select_to_query("Q", &parse_select(sql).expect("statement belongs to the dialect"))
    }

    #[test]
    fn join_unifies_variables() {
        let query = translate("SELECT R.x, S.z FROM R, S WHERE R.y = S.y");

        assert_eq!(query.to_string(), "Q(R.x, S.z) :- R(R.x, R.y), S(R.y, S.z)");
    }

    #[test]
    fn aliases_resolve_to_base_tables() {
        let aliased = translate("SELECT a.x FROM A a");
        let bare = translate("SELECT A.x FROM A");

        assert_eq!(aliased, bare);
        assert_eq!(aliased.to_string(), "Q(A.x) :- A(A.x)");
    }

    #[test]
    fn join_chain_shares_one_variable() {
        let query = translate(
            "SELECT c.name, n.name, s.name FROM Customer c, Nation n, Supplier s \
             WHERE c.nationkey = n.nationkey AND n.nationkey = s.nationkey",
        );

        // All three nationkey columns collapse onto the smallest key.
        assert_eq!(
            query.to_string(),
            "Q(Customer.name, Nation.name, Supplier.name) :- \
             Customer(Customer.name, Customer.nationkey), \
             Nation(Nation.name, Customer.nationkey), \
             Supplier(Supplier.name, Customer.nationkey)"
        );
    }

    #[test]
    fn bare_attributes_fall_back_to_attributeless_tables() {
        let query = translate("SELECT x FROM R");

        assert_eq!(query.to_string(), "Q(x) :- R(x)");
        assert!(!query.has_unsafe_head());
    }

    #[test]
    fn attributeless_table_gets_placeholder() {
        let query = translate("SELECT R.x FROM R, T");

        assert_eq!(query.to_string(), "Q(R.x) :- R(R.x), T(T._)");
    }

    #[test]
    fn duplicate_tables_emit_one_atom() {
        let query = translate("SELECT R.x FROM R, R");

        assert_eq!(query.to_string(), "Q(R.x) :- R(R.x)");
    }

    #[test]
    fn head_duplicates_are_preserved() {
        let query = translate("SELECT R.x, R.x FROM R");

        assert_eq!(query.to_string(), "Q(R.x, R.x) :- R(R.x)");
    }
}
