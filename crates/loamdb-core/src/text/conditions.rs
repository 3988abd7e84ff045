use crate::{
    entity::Element,
    error::CommunicationError,
    query::CriteriaCondition,
    text::{
        Params, QueryObserver, SyntaxError, Values,
        ast::{Operator, QueryCondition, QueryValue},
    },
};

///
/// Conditions
///
/// Recursively lowers an AST condition into the condition algebra,
/// dispatching exhaustively on the node operator. NOT/AND/OR recurse into
/// their condition payloads; comparison nodes materialize their value and
/// rewrite the field name through the observer.
///

pub struct Conditions;

impl Conditions {
    pub fn get_condition(
        condition: &QueryCondition,
        entity: &str,
        params: &mut Params,
        observer: &dyn QueryObserver,
    ) -> Result<CriteriaCondition, CommunicationError> {
        match condition.operator {
            Operator::Eq => Self::leaf(condition, entity, params, observer, CriteriaCondition::eq),
            Operator::Gt => Self::leaf(condition, entity, params, observer, CriteriaCondition::gt),
            Operator::Gte => {
                Self::leaf(condition, entity, params, observer, CriteriaCondition::gte)
            }
            Operator::Lt => Self::leaf(condition, entity, params, observer, CriteriaCondition::lt),
            Operator::Lte => {
                Self::leaf(condition, entity, params, observer, CriteriaCondition::lte)
            }
            Operator::Like => {
                Self::leaf(condition, entity, params, observer, CriteriaCondition::like)
            }
            Operator::In => {
                let element = Self::element(condition, entity, params, observer)?;
                Ok(CriteriaCondition::in_(element)?)
            }
            Operator::Between => {
                let element = Self::element(condition, entity, params, observer)?;
                Ok(CriteriaCondition::between(element)?)
            }
            Operator::And => {
                let children = Self::children(condition, entity, params, observer)?;
                Ok(CriteriaCondition::and_all(children))
            }
            Operator::Or => {
                let children = Self::children(condition, entity, params, observer)?;
                Ok(CriteriaCondition::or_all(children))
            }
            Operator::Not => {
                let QueryValue::Condition(inner) = &condition.value else {
                    return Err(SyntaxError::UnsupportedValue {
                        kind: condition.value.kind_name().to_string(),
                    }
                    .into());
                };
                let inner = Self::get_condition(inner, entity, params, observer)?;
                Ok(inner.negate()?)
            }
        }
    }

    fn element(
        condition: &QueryCondition,
        entity: &str,
        params: &mut Params,
        observer: &dyn QueryObserver,
    ) -> Result<Element, CommunicationError> {
        let value = Values::get(&condition.value, params)?;
        let field = observer.fire_field(entity, &condition.field);

        Ok(Element::of(field, value))
    }

    fn leaf(
        condition: &QueryCondition,
        entity: &str,
        params: &mut Params,
        observer: &dyn QueryObserver,
        build: impl FnOnce(Element) -> CriteriaCondition,
    ) -> Result<CriteriaCondition, CommunicationError> {
        Self::element(condition, entity, params, observer).map(build)
    }

    fn children(
        condition: &QueryCondition,
        entity: &str,
        params: &mut Params,
        observer: &dyn QueryObserver,
    ) -> Result<Vec<CriteriaCondition>, CommunicationError> {
        let QueryValue::Conditions(children) = &condition.value else {
            return Err(SyntaxError::UnsupportedValue {
                kind: condition.value.kind_name().to_string(),
            }
            .into());
        };

        children
            .iter()
            .map(|child| Self::get_condition(child, entity, params, observer))
            .collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::{ConditionKind, ConditionError},
        text::IdentityObserver,
        value::Value,
    };

    fn resolve(condition: &QueryCondition) -> Result<CriteriaCondition, CommunicationError> {
        let mut params = Params::default();
        Conditions::get_condition(condition, "Person", &mut params, &IdentityObserver)
    }

    #[test]
    fn comparison_nodes_resolve_to_leaves() {
        let condition = resolve(&QueryCondition::compare(
            "age",
            Operator::Gte,
            QueryValue::Int(18),
        ))
        .expect("leaf resolves");

        assert_eq!(condition.kind(), ConditionKind::Gte);
        assert_eq!(condition.element(), Some(&Element::of("age", 18i64)));
    }

    #[test]
    fn and_or_recurse_into_child_lists() {
        let ast = QueryCondition::and(vec![
            QueryCondition::compare("age", Operator::Gt, QueryValue::Int(18)),
            QueryCondition::or(vec![
                QueryCondition::compare("city", Operator::Eq, QueryValue::Text("London".into())),
                QueryCondition::compare("city", Operator::Eq, QueryValue::Text("Paris".into())),
            ]),
        ]);

        let condition = resolve(&ast).expect("tree resolves");
        assert_eq!(condition.kind(), ConditionKind::And);
        let children = condition.children().expect("and children");
        assert_eq!(children[1].kind(), ConditionKind::Or);
    }

    #[test]
    fn not_unwraps_into_negation() {
        let ast = QueryCondition::not(QueryCondition::compare(
            "name",
            Operator::Eq,
            QueryValue::Text("Ada".into()),
        ));
        let condition = resolve(&ast).expect("not resolves");
        assert_eq!(condition.kind(), ConditionKind::Not);
    }

    #[test]
    fn in_nodes_materialize_list_payloads() {
        let ast = QueryCondition::compare(
            "city",
            Operator::In,
            QueryValue::Array(vec![
                QueryValue::Text("London".into()),
                QueryValue::Text("Paris".into()),
            ]),
        );
        let condition = resolve(&ast).expect("in resolves");
        assert_eq!(condition.kind(), ConditionKind::In);
        assert!(matches!(
            condition.element().expect("element").value(),
            Value::List(items) if items.len() == 2
        ));
    }

    #[test]
    fn malformed_between_surfaces_the_validation_error() {
        let ast = QueryCondition::compare(
            "age",
            Operator::Between,
            QueryValue::Array(vec![
                QueryValue::Int(1),
                QueryValue::Int(2),
                QueryValue::Int(3),
            ]),
        );
        let err = resolve(&ast).expect_err("three values must fail");
        assert_eq!(
            err,
            CommunicationError::Condition(ConditionError::BetweenArity {
                element: "age".to_string(),
                found: 3,
            })
        );
    }

    #[test]
    fn combinator_with_non_condition_payload_is_unsupported() {
        let ast = QueryCondition {
            field: String::new(),
            operator: Operator::And,
            value: QueryValue::Int(1),
        };
        let err = resolve(&ast).expect_err("int payload under AND");
        assert_eq!(
            err,
            CommunicationError::Syntax(SyntaxError::UnsupportedValue {
                kind: "int".to_string()
            })
        );
    }

    #[test]
    fn observer_rewrites_field_names() {
        struct Upper;
        impl QueryObserver for Upper {
            fn fire_field(&self, _entity: &str, field: &str) -> String {
                field.to_uppercase()
            }
        }

        let mut params = Params::default();
        let condition = Conditions::get_condition(
            &QueryCondition::compare("age", Operator::Eq, QueryValue::Int(1)),
            "Person",
            &mut params,
            &Upper,
        )
        .expect("leaf resolves");
        assert_eq!(condition.element().expect("element").name(), "AGE");
    }

    #[test]
    fn parameters_flow_into_the_params_container() {
        let mut params = Params::default();
        let condition = Conditions::get_condition(
            &QueryCondition::compare("age", Operator::Eq, QueryValue::Parameter("age".into())),
            "Person",
            &mut params,
            &IdentityObserver,
        )
        .expect("parameter leaf resolves");

        assert_eq!(
            condition.element().expect("element").value(),
            &Value::Param("age".to_string())
        );
        assert_eq!(params.unbound_names(), vec!["age".to_string()]);
    }
}
