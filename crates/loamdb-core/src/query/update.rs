use crate::{
    entity::Element,
    query::{
        BuildError, CriteriaCondition, SelectQuery,
        fluent::{UpdateBuilder, update},
    },
};
use serde::{Deserialize, Serialize};

///
/// UpdateQuery
///
/// Immutable descriptor of an update operation: the entity name, the
/// elements to set, and an optional condition selecting the rows to touch.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UpdateQuery {
    name: String,
    set: Vec<Element>,
    condition: Option<CriteriaCondition>,
}

impl UpdateQuery {
    pub(crate) const fn new(
        name: String,
        set: Vec<Element>,
        condition: Option<CriteriaCondition>,
    ) -> Self {
        Self {
            name,
            set,
            condition,
        }
    }

    /// Start the staged fluent DSL.
    #[must_use]
    pub fn update(entity: impl Into<String>) -> UpdateBuilder {
        update(entity)
    }

    /// Start the runtime-validated builder surface.
    #[must_use]
    pub fn builder() -> UpdateQueryBuilder {
        UpdateQueryBuilder::default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn set(&self) -> &[Element] {
        &self.set
    }

    #[must_use]
    pub const fn condition(&self) -> Option<&CriteriaCondition> {
        self.condition.as_ref()
    }

    /// Derive the equivalent select query for the default select-then-write
    /// update strategy: same entity and condition, no columns or sorts.
    #[must_use]
    pub fn to_select_query(&self) -> SelectQuery {
        SelectQuery::new(
            self.name.clone(),
            Vec::new(),
            Vec::new(),
            0,
            0,
            self.condition.clone(),
            false,
        )
    }
}

///
/// UpdateQueryBuilder
///

#[derive(Clone, Debug, Default)]
pub struct UpdateQueryBuilder {
    name: Option<String>,
    set: Vec<Element>,
    condition: Option<CriteriaCondition>,
}

impl UpdateQueryBuilder {
    /// Set the entity name. Mandatory before `build()`.
    #[must_use]
    pub fn from(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append one element to write. Mandatory before `build()`.
    #[must_use]
    pub fn set(mut self, element: Element) -> Self {
        self.set.push(element);
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
    pub fn build(self) -> Result<UpdateQuery, BuildError> {
        let name = self.name.ok_or(BuildError::MissingEntity)?;
        if self.set.is_empty() {
            return Err(BuildError::MissingSet);
        }

        Ok(UpdateQuery::new(
            name,
            self.set,
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

    #[test]
    fn build_without_from_fails() {
        let err = UpdateQuery::builder()
            .set(Element::of("active", false))
            .build()
            .expect_err("entity required");
        assert_eq!(err, BuildError::MissingEntity);
    }

    #[test]
    fn build_without_set_fails() {
        let err = UpdateQuery::builder()
            .from("Person")
            .build()
            .expect_err("set required");
        assert_eq!(err, BuildError::MissingSet);
    }

    #[test]
    fn to_select_query_shares_the_condition() {
        let query = UpdateQuery::builder()
            .from("Person")
            .set(Element::of("active", false))
            .where_(CriteriaCondition::eq(Element::of("name", "Ada")))
            .build()
            .expect("valid query");

        let select = query.to_select_query();
        assert_eq!(select.name(), "Person");
        assert!(select.columns().is_empty());
        assert!(select.sorts().is_empty());
        assert_eq!(select.condition(), query.condition());
    }
}
