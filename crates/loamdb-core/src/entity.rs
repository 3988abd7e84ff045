use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

///
/// Element
///
/// A named, typed unit of data within an entity.
/// Immutable once constructed; equality is by name + value.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Element {
    name: String,
    value: Value,
}

impl Element {
    /// Build an element from a name and anything convertible to a value.
    pub fn of(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Decompose into the name/value pair.
    #[must_use]
    pub fn into_parts(self) -> (String, Value) {
        (self.name, self.value)
    }
}

/// Find an element by name inside a nested element list.
#[must_use]
pub fn find_in<'a>(elements: &'a [Element], name: &str) -> Option<&'a Element> {
    elements.iter().find(|element| element.name == name)
}

///
/// Entity
///
/// A flat, named bag of elements exchanged with the storage layer.
/// Keys are unique; insertion order is irrelevant (hash-backed).
/// Mutable and single-owner; not shared across threads while being built.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Entity {
    name: String,
    elements: HashMap<String, Element>,
}

impl Entity {
    /// Create an empty entity for the given type/collection name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: HashMap::new(),
        }
    }

    /// Create an entity pre-populated with elements.
    /// Duplicate names resolve last-write-wins, as with [`add`](Self::add).
    pub fn of(name: impl Into<String>, elements: Vec<Element>) -> Self {
        let mut entity = Self::new(name);
        for element in elements {
            entity.add(element);
        }
        entity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an element; an element with the same name is replaced.
    pub fn add(&mut self, element: Element) {
        self.elements.insert(element.name.clone(), element);
    }

    /// Convenience for `add(Element::of(name, value))`.
    pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.add(Element::of(name, value));
    }

    /// Remove and return the named element, if present.
    pub fn remove(&mut self, name: &str) -> Option<Element> {
        self.elements.remove(name)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements.get(name)
    }

    #[must_use]
    pub fn find_value(&self, name: &str) -> Option<&Value> {
        self.find(name).map(Element::value)
    }

    /// Resolve a possibly-dotted path (e.g. `"address.city"`) by walking
    /// nested [`Value::Elements`] sub-documents.
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut value = self.find_value(first)?;

        for segment in segments {
            value = find_in(value.as_elements()?, segment).map(Element::value)?;
        }

        Some(value)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Entity {
        Entity::of(
            "Person",
            vec![
                Element::of("name", "Ada"),
                Element::of("age", 36i64),
                Element::of(
                    "address",
                    vec![
                        Element::of("city", "London"),
                        Element::of("street", "Baker"),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn add_is_last_write_wins() {
        let mut entity = person();
        assert_eq!(entity.len(), 3);

        entity.add(Element::of("name", "Grace"));
        assert_eq!(entity.len(), 3);
        assert_eq!(
            entity.find_value("name"),
            Some(&Value::Text("Grace".to_string()))
        );
    }

    #[test]
    fn remove_and_clear() {
        let mut entity = person();
        let removed = entity.remove("age").expect("age element exists");
        assert_eq!(removed.value(), &Value::Int(36));
        assert!(entity.find("age").is_none());

        entity.clear();
        assert!(entity.is_empty());
    }

    #[test]
    fn find_path_walks_nested_elements() {
        let entity = person();
        assert_eq!(
            entity.find_path("address.city"),
            Some(&Value::Text("London".to_string()))
        );
        assert_eq!(entity.find_path("address.zip"), None);
        assert_eq!(entity.find_path("name.city"), None);
    }

    #[test]
    fn clone_is_a_shallow_element_duplicate() {
        let entity = person();
        let mut copy = entity.clone();
        copy.add_value("name", "Grace");

        assert_eq!(
            entity.find_value("name"),
            Some(&Value::Text("Ada".to_string()))
        );
        assert_eq!(entity, person());
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = Entity::of(
            "Person",
            vec![Element::of("a", 1i64), Element::of("b", 2i64)],
        );
        let b = Entity::of(
            "Person",
            vec![Element::of("b", 2i64), Element::of("a", 1i64)],
        );
        assert_eq!(a, b);
    }
}
