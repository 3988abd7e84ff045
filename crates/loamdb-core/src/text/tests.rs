use crate::{
    entity::{Element, Entity},
    error::CommunicationError,
    query::ConditionKind,
    test_support::StubManager,
    text::{
        IdentityObserver, QueryCommand, QueryParser, StatementError, SyntaxError,
    },
    value::Value,
};

fn person(name: &str, age: i64) -> Entity {
    Entity::of(
        "Person",
        vec![Element::of("name", name), Element::of("age", age)],
    )
}

///
/// COMMAND DISPATCH
///

#[test]
fn command_sniff_routes_delete_and_update() {
    assert_eq!(QueryParser::command("DELETE FROM x"), QueryCommand::Delete);
    assert_eq!(QueryParser::command("delete FROM x"), QueryCommand::Delete);
    assert_eq!(
        QueryParser::command("UPDATE x SET a = 1"),
        QueryCommand::Update
    );
    assert_eq!(QueryParser::command("SELECT * FROM x"), QueryCommand::Select);
}

// The sniff is a fixed-width six-character prefix, not a tokenizer: short
// strings fall through to SELECT by construction.
#[test]
fn command_sniff_short_strings_fall_through_to_select() {
    assert_eq!(QueryParser::command("DROP"), QueryCommand::Select);
    assert_eq!(QueryParser::command(""), QueryCommand::Select);
    assert_eq!(QueryParser::command("DELET"), QueryCommand::Select);
}

// Leading whitespace defeats the sniff; the string routes to SELECT and the
// select grammar reports it.
#[test]
fn command_sniff_is_confused_by_leading_whitespace() {
    assert_eq!(
        QueryParser::command(" DELETE FROM x"),
        QueryCommand::Select
    );
}

///
/// IMMEDIATE EXECUTION
///

#[test]
fn select_query_executes_against_the_manager() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let stream = QueryParser::query(
        "SELECT * FROM Person WHERE age >= 18 ORDER BY age LIMIT 10",
        &mut manager,
        &IdentityObserver,
    )
    .expect("query executes");

    let entities: Vec<Entity> = stream.collect();
    assert_eq!(entities, vec![person("Ada", 36)]);

    let seen = manager.selects();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name(), "Person");
    assert_eq!(seen[0].limit(), 10);
    assert_eq!(
        seen[0].condition().expect("condition").kind(),
        ConditionKind::Gte
    );
}

#[test]
fn delete_query_yields_an_empty_sequence() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let stream = QueryParser::query(
        "DELETE FROM Person WHERE age < 18",
        &mut manager,
        &IdentityObserver,
    )
    .expect("delete executes");

    assert_eq!(stream.count(), 0);
    assert_eq!(manager.deletes().len(), 1);
    assert_eq!(manager.deletes()[0].name(), "Person");
}

#[test]
fn update_query_returns_the_updated_entities() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let stream = QueryParser::query(
        "UPDATE Person SET active = true WHERE name = 'Ada'",
        &mut manager,
        &IdentityObserver,
    )
    .expect("update executes");

    let entities: Vec<Entity> = stream.collect();
    assert_eq!(entities.len(), 1);
    assert_eq!(
        entities[0].find_value("active"),
        Some(&Value::Bool(true))
    );
    assert_eq!(manager.updated().len(), 1);
}

#[test]
fn parameterized_query_requires_prepare() {
    let mut manager = StubManager::default();
    let err = match QueryParser::query(
        "SELECT * FROM Person WHERE age > @age",
        &mut manager,
        &IdentityObserver,
    ) {
        Ok(_) => panic!("raw parameterized query must fail"),
        Err(err) => err,
    };

    assert_eq!(
        err,
        CommunicationError::Syntax(SyntaxError::ParametersRequirePrepare {
            names: vec!["age".to_string()],
        })
    );
}

#[test]
fn observer_rewrites_names_during_parsing() {
    struct Prefixing;
    impl crate::text::QueryObserver for Prefixing {
        fn fire_entity(&self, entity: &str) -> String {
            format!("tbl_{entity}")
        }

        fn fire_field(&self, _entity: &str, field: &str) -> String {
            format!("c_{field}")
        }
    }

    let mut manager = StubManager::default();
    QueryParser::query(
        "SELECT * FROM Person WHERE age > 18 ORDER BY age",
        &mut manager,
        &Prefixing,
    )
    .expect("query executes");

    let seen = manager.selects();
    assert_eq!(seen[0].name(), "tbl_Person");
    assert_eq!(seen[0].sorts()[0].field(), "c_age");
    assert_eq!(
        seen[0]
            .condition()
            .expect("condition")
            .element()
            .expect("leaf")
            .name(),
        "c_age"
    );
}

///
/// PREPARED STATEMENTS
///

#[test]
fn unbound_parameters_fail_result_listing_names() {
    let mut manager = StubManager::default();
    let statement = QueryParser::prepare(
        "SELECT * FROM Person WHERE age > @age AND name = @name",
        &IdentityObserver,
    )
    .expect("statement prepares");

    let err = match statement.result(&mut manager) {
        Ok(_) => panic!("unbound params"),
        Err(err) => err,
    };
    assert_eq!(
        err,
        CommunicationError::Statement(StatementError::UnboundParameters {
            names: vec!["age".to_string(), "name".to_string()],
        })
    );
}

#[test]
fn bound_parameters_substitute_into_the_condition_tree() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let mut statement = QueryParser::prepare(
        "SELECT * FROM Person WHERE age > @age",
        &IdentityObserver,
    )
    .expect("statement prepares");

    statement.bind("age", 18i64).expect("known parameter");
    let entities: Vec<Entity> = statement
        .result(&mut manager)
        .expect("bound statement executes")
        .collect();
    assert_eq!(entities.len(), 1);

    let seen = manager.selects();
    assert_eq!(
        seen[0]
            .condition()
            .expect("condition")
            .element()
            .expect("leaf"),
        &Element::of("age", 18i64)
    );
}

#[test]
fn bind_at_uses_declaration_order() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let mut statement = QueryParser::prepare(
        "SELECT * FROM Person WHERE age > @age AND name = @name",
        &IdentityObserver,
    )
    .expect("statement prepares");

    statement.bind_at(1, 18i64).expect("first slot");
    statement.bind_at(2, "Ada").expect("second slot");
    assert!(statement.unbound_names().is_empty());
    assert!(statement.result(&mut manager).is_ok());
}

#[test]
fn prepared_update_substitutes_set_values() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let mut statement = QueryParser::prepare(
        "UPDATE Person SET role = @role WHERE name = 'Ada'",
        &IdentityObserver,
    )
    .expect("statement prepares");

    statement.bind("role", "admin").expect("known parameter");
    let entities: Vec<Entity> = statement
        .result(&mut manager)
        .expect("update executes")
        .collect();
    assert_eq!(
        entities[0].find_value("role"),
        Some(&Value::Text("admin".to_string()))
    );
}

#[test]
fn count_statement_counts_and_rejects_other_types() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36), person("Grace", 45)]);

    let statement = QueryParser::prepare("SELECT COUNT(*) FROM Person", &IdentityObserver)
        .expect("count prepares");
    assert_eq!(statement.count(&manager), Ok(2));

    let entities: Vec<Entity> = statement
        .result(&mut manager)
        .expect("count result")
        .collect();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].find_value("count"), Some(&Value::UInt(2)));

    let plain = QueryParser::prepare("SELECT * FROM Person", &IdentityObserver)
        .expect("select prepares");
    assert_eq!(
        plain.count(&manager),
        Err(CommunicationError::Statement(StatementError::NotCount))
    );
}

#[test]
fn single_result_enforces_cardinality() {
    let mut two = StubManager::with_entities(vec![person("Ada", 36), person("Grace", 45)]);
    let statement =
        QueryParser::prepare("SELECT * FROM Person", &IdentityObserver).expect("prepares");
    assert!(statement.single_result(&mut two).is_err());

    let mut one = StubManager::with_entities(vec![person("Ada", 36)]);
    assert_eq!(
        statement.single_result(&mut one),
        Ok(Some(person("Ada", 36)))
    );

    let mut none = StubManager::with_entities(vec![]);
    assert_eq!(statement.single_result(&mut none), Ok(None));
}

#[test]
fn on_select_transform_rewrites_the_query_before_execution() {
    let mut manager = StubManager::with_entities(vec![person("Ada", 36)]);
    let mut statement =
        QueryParser::prepare("SELECT * FROM Person", &IdentityObserver).expect("prepares");

    statement.on_select(|query| {
        crate::query::SelectQuery::builder()
            .from(query.name())
            .limit(1)
            .build()
            .expect("rewritten query is valid")
    });

    statement.result(&mut manager).expect("executes");
    let seen = manager.selects();
    assert_eq!(seen[0].limit(), 1);
}

#[test]
fn malformed_bind_fails_between_revalidation() {
    let mut manager = StubManager::default();
    let mut statement = QueryParser::prepare(
        "SELECT * FROM Person WHERE age BETWEEN @range AND @range2",
        &IdentityObserver,
    )
    .expect("statement prepares");

    // The grammar shapes BETWEEN as a two-slot array, so each slot binds
    // independently; a scalar bind keeps the pair well-formed.
    statement.bind("range", 18i64).expect("known parameter");
    statement.bind("range2", 65i64).expect("known parameter");
    assert!(statement.result(&mut manager).is_ok());
}
