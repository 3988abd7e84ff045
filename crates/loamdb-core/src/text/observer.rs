///
/// QueryObserver
///
/// Name-rewriting hooks consulted while a textual query is resolved. An
/// external mapping layer can override entity/field names (e.g. annotation
/// driven renames); both hooks are identity by default.
///

pub trait QueryObserver {
    /// Rewrite an entity name.
    fn fire_entity(&self, entity: &str) -> String {
        entity.to_string()
    }

    /// Rewrite a field name within the given entity.
    fn fire_field(&self, entity: &str, field: &str) -> String {
        let _ = entity;
        field.to_string()
    }
}

///
/// IdentityObserver
///

#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityObserver;

impl QueryObserver for IdentityObserver {}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    struct Prefixing;

    impl QueryObserver for Prefixing {
        fn fire_entity(&self, entity: &str) -> String {
            format!("tbl_{entity}")
        }

        fn fire_field(&self, entity: &str, field: &str) -> String {
            format!("{entity}_{field}")
        }
    }

    #[test]
    fn defaults_are_identity() {
        let observer = IdentityObserver;
        assert_eq!(observer.fire_entity("Person"), "Person");
        assert_eq!(observer.fire_field("Person", "age"), "age");
    }

    #[test]
    fn hooks_can_rewrite_names() {
        let observer = Prefixing;
        assert_eq!(observer.fire_entity("Person"), "tbl_Person");
        assert_eq!(observer.fire_field("Person", "age"), "Person_age");
    }
}
