use crate::query::{
    BuildError, CriteriaCondition,
    fluent::{DeleteBuilder, delete, delete_columns},
};
use serde::{Deserialize, Serialize};

///
/// DeleteQuery
///
/// Immutable descriptor of a delete operation. Columns restrict the delete
/// to field level where the backend supports it; an empty column list means
/// whole-entity deletion.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DeleteQuery {
    name: String,
    columns: Vec<String>,
    condition: Option<CriteriaCondition>,
}

impl DeleteQuery {
    pub(crate) const fn new(
        name: String,
        columns: Vec<String>,
        condition: Option<CriteriaCondition>,
    ) -> Self {
        Self {
            name,
            columns,
            condition,
        }
    }

    /// Start the staged fluent DSL, deleting whole entities.
    #[must_use]
    pub fn delete() -> DeleteBuilder {
        delete()
    }

    /// Start the staged fluent DSL with a field-level column restriction.
    #[must_use]
    pub fn delete_columns<I, S>(columns: I) -> DeleteBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        delete_columns(columns)
    }

    /// Start the runtime-validated builder surface.
    #[must_use]
    pub fn builder() -> DeleteQueryBuilder {
        DeleteQueryBuilder::default()
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
    pub const fn condition(&self) -> Option<&CriteriaCondition> {
        self.condition.as_ref()
    }
}

///
/// DeleteQueryBuilder
///

#[derive(Clone, Debug, Default)]
pub struct DeleteQueryBuilder {
    name: Option<String>,
    columns: Vec<String>,
    condition: Option<CriteriaCondition>,
}

impl DeleteQueryBuilder {
    /// Set the entity name. Mandatory before `build()`.
    #[must_use]
    pub fn from(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the delete to one more column.
    #[must_use]
    pub fn delete(mut self, column: impl Into<String>) -> Self {
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

    /// Finalize into an immutable query; locks the condition read-only.
    pub fn build(self) -> Result<DeleteQuery, BuildError> {
        let name = self.name.ok_or(BuildError::MissingEntity)?;

        Ok(DeleteQuery::new(
            name,
            self.columns,
            self.condition.map(CriteriaCondition::read_only),
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
        let err = DeleteQuery::builder().build().expect_err("entity required");
        assert_eq!(err, BuildError::MissingEntity);
    }

    #[test]
    fn build_collects_columns_and_locks_condition() {
        let query = DeleteQuery::builder()
            .from("Person")
            .delete("nickname")
            .where_(CriteriaCondition::eq(Element::of("name", "Ada")))
            .build()
            .expect("valid query");

        assert_eq!(query.name(), "Person");
        assert_eq!(query.columns(), ["nickname"]);
        assert!(query.condition().expect("condition").is_read_only());
    }
}
