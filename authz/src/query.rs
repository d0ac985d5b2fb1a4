//! Composable description of a DAG listing query.
//!
//! The data-access layer builds a [`QueryDescription`] with whatever clauses it
//! needs; the scope filter only appends one membership predicate and never looks
//! at the others.

use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeSet;

use crate::error::{AuthzError, Result};
use crate::types::ResourceId;

/// One conjunctive clause of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Opaque SQL with `?` placeholders, one per bind value.
    Sql { fragment: String, binds: Vec<String> },
    /// `column IN (values)`. An empty set matches no rows.
    MemberOf {
        column: String,
        values: BTreeSet<ResourceId>,
    },
}

/// A `SELECT` over one table, narrowed by a conjunction of predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescription {
    table: String,
    predicates: Vec<Predicate>,
}

/// Reject anything but plain (optionally dotted) SQL identifiers.
pub fn validate_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(())
    } else {
        Err(AuthzError::InvalidInput(format!(
            "Not a valid SQL identifier: {:?}",
            name
        )))
    }
}

impl QueryDescription {
    /// Select every row of `table`.
    pub fn select_from(table: &str) -> Result<Self> {
        validate_identifier(table)?;
        Ok(Self {
            table: table.to_string(),
            predicates: Vec::new(),
        })
    }

    /// Add an opaque clause. `fragment` must contain one `?` per bind value.
    ///
    /// Every `?` counts as a placeholder, including one inside a quoted SQL
    /// literal. Bind such values instead of writing them into `fragment`.
    pub fn filter(mut self, fragment: &str, binds: Vec<String>) -> Result<Self> {
        let placeholders = fragment.matches('?').count();
        if placeholders != binds.len() {
            return Err(AuthzError::InvalidInput(format!(
                "Filter has {} placeholders but {} bind values",
                placeholders,
                binds.len()
            )));
        }

        self.predicates.push(Predicate::Sql {
            fragment: fragment.to_string(),
            binds,
        });
        Ok(self)
    }

    /// A copy of this query further restricted to rows whose `column` is in `ids`.
    ///
    /// `self` is left untouched.
    pub fn and_member_of(&self, column: &str, ids: &BTreeSet<ResourceId>) -> Result<Self> {
        validate_identifier(column)?;

        let mut narrowed = self.clone();
        narrowed.predicates.push(Predicate::MemberOf {
            column: column.to_string(),
            values: ids.clone(),
        });
        Ok(narrowed)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Render as a SQLite query with every value bound, never interpolated.
    pub fn to_query_builder(&self) -> QueryBuilder<'_, Sqlite> {
        let mut query = QueryBuilder::new(format!("SELECT * FROM {}", self.table));

        for (i, predicate) in self.predicates.iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });

            match predicate {
                Predicate::Sql { fragment, binds } => {
                    let mut parts = fragment.split('?');
                    query.push("(");
                    query.push(parts.next().unwrap_or_default());
                    for (part, value) in parts.zip(binds) {
                        query.push_bind(value.as_str());
                        query.push(part);
                    }
                    query.push(")");
                }
                Predicate::MemberOf { values, .. } if values.is_empty() => {
                    query.push("1 = 0");
                }
                Predicate::MemberOf { column, values } => {
                    query.push(column.as_str());
                    query.push(" IN (");
                    let mut list = query.separated(", ");
                    for value in values {
                        list.push_bind(value.as_str());
                    }
                    list.push_unseparated(")");
                }
            }
        }

        query
    }

    /// The rendered SQL text, placeholders included.
    pub fn sql(&self) -> String {
        self.to_query_builder().sql().to_string()
    }
}
