use crate::{
    text::{Params, SyntaxError, ast::QueryValue},
    value::Value,
};

///
/// Values
///
/// Materializes AST values: literals pass through, `@name` parameters
/// register an unbound placeholder, arrays recurse, enum tokens resolve to
/// their name string. Condition-valued nodes are not values and fail with a
/// query-syntax error naming the kind.
///

pub struct Values;

impl Values {
    pub fn get(value: &QueryValue, params: &mut Params) -> Result<Value, SyntaxError> {
        match value {
            QueryValue::Bool(b) => Ok(Value::Bool(*b)),
            QueryValue::Int(n) => Ok(Value::Int(*n)),
            QueryValue::Float(f) => Ok(Value::Float(*f)),
            QueryValue::Text(s) => Ok(Value::Text(s.clone())),
            QueryValue::Enum(name) => Ok(Value::Text(name.clone())),
            QueryValue::Parameter(name) => Ok(params.register(name)),
            QueryValue::Array(items) => items
                .iter()
                .map(|item| Self::get(item, params))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            QueryValue::Condition(_) | QueryValue::Conditions(_) => {
                Err(SyntaxError::UnsupportedValue {
                    kind: value.kind_name().to_string(),
                })
            }
        }
    }
}

///
/// TESTS
///
