use crate::{
    entity::Entity,
    error::{CommunicationError, ResultError},
    page::{CursorPage, PageRequest, cursor_executor},
    query::{DeleteQuery, SelectQuery, UpdateQuery},
};

/// A finite, non-restartable, lazily produced sequence of entities.
/// Single-pass and forward-only; consumers needing multiple passes must
/// materialize into a collection first.
pub type EntityStream = Box<dyn Iterator<Item = Entity>>;

///
/// DatabaseManager
///
/// The opaque storage-engine surface this core talks to. A conforming
/// vendor implements the primitive insert/update/delete/select/count
/// operations; everything else here is provided purely in terms of those.
/// Timeouts, retries, and backpressure live below this trait.
///

pub trait DatabaseManager {
    /// The managed database/collection family name.
    fn name(&self) -> &str;

    /// Persist a new entity, returning the stored representation.
    fn insert(&mut self, entity: Entity) -> Result<Entity, CommunicationError>;

    /// Overwrite an existing entity, returning the stored representation.
    fn update(&mut self, entity: Entity) -> Result<Entity, CommunicationError>;

    /// Delete entities (or their columns) matching the query.
    fn delete(&mut self, query: &DeleteQuery) -> Result<(), CommunicationError>;

    /// Run a select, producing a lazy single-pass stream.
    fn select(&self, query: &SelectQuery) -> Result<EntityStream, CommunicationError>;

    /// Count all entities under the given entity name.
    fn count(&self, entity: &str) -> Result<u64, CommunicationError>;

    /// Release any underlying resources.
    fn close(&mut self) {}

    ///
    /// PROVIDED COMBINATORS
    ///

    /// Persist a batch in iteration order.
    fn insert_all(&mut self, entities: Vec<Entity>) -> Result<Vec<Entity>, CommunicationError> {
        entities
            .into_iter()
            .map(|entity| self.insert(entity))
            .collect()
    }

    /// Default select-then-write update strategy: select the matching
    /// entities, overlay the set elements, and write each back. Returns the
    /// updated entities.
    fn update_query(&mut self, query: &UpdateQuery) -> Result<Vec<Entity>, CommunicationError> {
        let matches: Vec<Entity> = self.select(&query.to_select_query())?.collect();

        let mut updated = Vec::with_capacity(matches.len());
        for mut entity in matches {
            for element in query.set() {
                entity.add(element.clone());
            }
            updated.push(self.update(entity)?);
        }

        Ok(updated)
    }

    /// Count the entities a select would produce, ignoring its window.
    fn count_query(&self, query: &SelectQuery) -> Result<u64, CommunicationError> {
        let unwindowed = SelectQuery::new(
            query.name().to_string(),
            Vec::new(),
            Vec::new(),
            0,
            0,
            query.condition().cloned(),
            false,
        );
        let count = self.select(&unwindowed)?.count();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    /// True if the query matches at least one entity.
    fn exists(&self, query: &SelectQuery) -> Result<bool, CommunicationError> {
        Ok(self.select(query)?.next().is_some())
    }

    /// At most one entity; more than one is a cardinality error.
    fn single_result(&self, query: &SelectQuery) -> Result<Option<Entity>, CommunicationError> {
        let mut stream = self.select(query)?;
        let first = stream.next();
        if first.is_some() && stream.next().is_some() {
            return Err(ResultError::NonUnique.into());
        }

        Ok(first)
    }

    /// Keyset/cursor pagination over a sorted select.
    fn select_cursor(
        &self,
        query: &SelectQuery,
        request: &PageRequest,
    ) -> Result<CursorPage, CommunicationError> {
        cursor_executor::execute(query, request, self)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::Element,
        query::CriteriaCondition,
        test_support::StubManager,
    };

    fn person(name: &str, age: i64) -> Entity {
        Entity::of(
            "Person",
            vec![Element::of("name", name), Element::of("age", age)],
        )
    }

    fn select_all() -> SelectQuery {
        SelectQuery::builder()
            .from("Person")
            .build()
            .expect("valid query")
    }

    #[test]
    fn single_result_cardinality() {
        let empty = StubManager::with_entities(vec![]);
        assert_eq!(empty.single_result(&select_all()), Ok(None));

        let one = StubManager::with_entities(vec![person("Ada", 36)]);
        assert_eq!(
            one.single_result(&select_all()),
            Ok(Some(person("Ada", 36)))
        );

        let two = StubManager::with_entities(vec![person("Ada", 36), person("Grace", 45)]);
        assert_eq!(
            two.single_result(&select_all()),
            Err(ResultError::NonUnique.into())
        );
    }

    #[test]
    fn exists_and_count_query() {
        let manager = StubManager::with_entities(vec![person("Ada", 36), person("Grace", 45)]);
        assert_eq!(manager.exists(&select_all()), Ok(true));
        assert_eq!(manager.count_query(&select_all()), Ok(2));

        let empty = StubManager::with_entities(vec![]);
        assert_eq!(empty.exists(&select_all()), Ok(false));
    }

    #[test]
    fn update_query_overlays_set_elements() {
        let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
        let update = UpdateQuery::builder()
            .from("Person")
            .set(Element::of("active", false))
            .where_(CriteriaCondition::eq(Element::of("name", "Ada")))
            .build()
            .expect("valid update");

        let updated = manager.update_query(&update).expect("update succeeds");
        assert_eq!(updated.len(), 1);
        assert_eq!(
            updated[0].find_value("active"),
            Some(&crate::value::Value::Bool(false))
        );
        assert_eq!(manager.updated().len(), 1);
    }

    #[test]
    fn streams_are_single_pass() {
        let manager = StubManager::with_entities(vec![person("Ada", 36)]);
        let mut stream = manager.select(&select_all()).expect("select succeeds");
        assert!(stream.next().is_some());
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }
}
