use crate::query::{
    BuildError, CriteriaCondition, Sort,
    fluent::{SelectBuilder, select, select_columns},
};
use serde::{Deserialize, Serialize};

///
/// SelectQuery
///
/// Immutable descriptor of a select operation: entity name, projected
/// columns, sort list, skip/limit window, optional condition, and a count
/// marker. Built once via a builder or parser and handed read-only to a
/// manager; structural equality.
///
/// `limit == 0` means unbounded.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SelectQuery {
    name: String,
    columns: Vec<String>,
    sorts: Vec<Sort>,
    skip: u64,
    limit: u64,
    condition: Option<CriteriaCondition>,
    count: bool,
}

impl SelectQuery {
    pub(crate) const fn new(
        name: String,
        columns: Vec<String>,
        sorts: Vec<Sort>,
        skip: u64,
        limit: u64,
        condition: Option<CriteriaCondition>,
        count: bool,
    ) -> Self {
        Self {
            name,
            columns,
            sorts,
            skip,
            limit,
            condition,
            count,
        }
    }

    /// Start the staged fluent DSL, selecting all columns.
    #[must_use]
    pub fn select() -> SelectBuilder {
        select()
    }

    /// Start the staged fluent DSL with a column projection.
    #[must_use]
    pub fn select_columns<I, S>(columns: I) -> SelectBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        select_columns(columns)
    }

    /// Start the runtime-validated builder surface.
    #[must_use]
    pub fn builder() -> SelectQueryBuilder {
        SelectQueryBuilder::default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.skip
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub const fn condition(&self) -> Option<&CriteriaCondition> {
        self.condition.as_ref()
    }

    #[must_use]
    pub const fn is_count(&self) -> bool {
        self.count
    }
}

///
/// SelectQueryBuilder
///
/// Runtime-validated builder: all setters are always available and ordering
/// is checked at `build()`. Conditions are taken whole; repeated `where_`
/// calls AND-combine implicitly.
///

#[derive(Clone, Debug, Default)]
pub struct SelectQueryBuilder {
    name: Option<String>,
    columns: Vec<String>,
    sorts: Vec<Sort>,
    skip: u64,
    limit: u64,
    condition: Option<CriteriaCondition>,
    count: bool,
}

impl SelectQueryBuilder {
    /// Set the entity name. Mandatory before `build()`.
    #[must_use]
    pub fn from(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append one projected column.
    #[must_use]
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Add a condition, implicitly AND-ing with any existing condition.
    #[must_use]
    pub fn where_(mut self, condition: CriteriaCondition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => CriteriaCondition::and_all(vec![existing, condition]),
            None => condition,
        });
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Mark this query as a count.
    #[must_use]
    pub const fn count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Finalize into an immutable query.
    ///
    /// Requires `from(..)`; the attached condition, if any, is locked
    /// read-only as part of the built query.
    pub fn build(self) -> Result<SelectQuery, BuildError> {
        let name = self.name.ok_or(BuildError::MissingEntity)?;

        Ok(SelectQuery::new(
            name,
            self.columns,
            self.sorts,
            self.skip,
            self.limit,
            self.condition.map(CriteriaCondition::read_only),
            self.count,
        ))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Element;

    #[test]
    fn build_without_from_fails() {
        let err = SelectQuery::builder().build().expect_err("entity required");
        assert_eq!(err, BuildError::MissingEntity);
    }

    #[test]
    fn build_locks_the_condition_read_only() {
        let query = SelectQuery::builder()
            .from("Person")
            .where_(CriteriaCondition::eq(Element::of("name", "Ada")))
            .build()
            .expect("valid query");

        let condition = query.condition().expect("condition attached");
        assert!(condition.is_read_only());
    }

    #[test]
    fn repeated_where_and_combines() {
        let query = SelectQuery::builder()
            .from("Person")
            .where_(CriteriaCondition::eq(Element::of("name", "Ada")))
            .where_(CriteriaCondition::gt(Element::of("age", 18i64)))
            .build()
            .expect("valid query");

        let condition = query.condition().expect("condition attached");
        assert_eq!(condition.children().expect("and children").len(), 2);
    }

    #[test]
    fn builder_snapshots_window_and_projection() {
        let query = SelectQuery::builder()
            .from("Person")
            .select("name")
            .select("age")
            .sort(Sort::asc("age"))
            .skip(10)
            .limit(5)
            .build()
            .expect("valid query");

        assert_eq!(query.name(), "Person");
        assert_eq!(query.columns(), ["name", "age"]);
        assert_eq!(query.sorts(), [Sort::asc("age")]);
        assert_eq!(query.skip(), 10);
        assert_eq!(query.limit(), 5);
        assert!(!query.is_count());
    }
}
