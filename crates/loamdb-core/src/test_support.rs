use crate::{
    entity::Entity,
    error::CommunicationError,
    manager::{DatabaseManager, EntityStream},
    query::{DeleteQuery, SelectQuery},
};
use std::cell::RefCell;

///
/// StubManager
///
/// In-memory manager used across the crate's tests: serves canned entities
/// for every select, records the queries and mutations it receives, and
/// never fails.
///

#[derive(Debug, Default)]
pub(crate) struct StubManager {
    entities: Vec<Entity>,
    selects: RefCell<Vec<SelectQuery>>,
    deletes: Vec<DeleteQuery>,
    inserted: Vec<Entity>,
    updated: Vec<Entity>,
}

impl StubManager {
    pub(crate) fn with_entities(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    /// Every select query observed, in call order.
    pub(crate) fn selects(&self) -> Vec<SelectQuery> {
        self.selects.borrow().clone()
    }

    pub(crate) fn deletes(&self) -> &[DeleteQuery] {
        &self.deletes
    }

    pub(crate) fn updated(&self) -> &[Entity] {
        &self.updated
    }
}

impl DatabaseManager for StubManager {
    fn name(&self) -> &str {
        "stub"
    }

    fn insert(&mut self, entity: Entity) -> Result<Entity, CommunicationError> {
        self.inserted.push(entity.clone());
        Ok(entity)
    }

    fn update(&mut self, entity: Entity) -> Result<Entity, CommunicationError> {
        self.updated.push(entity.clone());
        Ok(entity)
    }

    fn delete(&mut self, query: &DeleteQuery) -> Result<(), CommunicationError> {
        self.deletes.push(query.clone());
        Ok(())
    }

    fn select(&self, query: &SelectQuery) -> Result<EntityStream, CommunicationError> {
        self.selects.borrow_mut().push(query.clone());
        Ok(Box::new(self.entities.clone().into_iter()))
    }

    fn count(&self, _entity: &str) -> Result<u64, CommunicationError> {
        Ok(self.entities.len() as u64)
    }
}
