use crate::{
    entity::{Element, Entity},
    error::{CommunicationError, ResultError},
    manager::{DatabaseManager, EntityStream},
    query::{
        ConditionNode, CompareOp, CriteriaCondition, DeleteQuery, SelectQuery, UpdateQuery,
    },
    text::Params,
    value::Value,
};
use std::fmt;
use thiserror::Error as ThisError;
use tracing::debug;

///
/// StatementError
///
/// Prepared-statement misuse: incomplete bindings or calling the wrong
/// execution surface for the statement type.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StatementError {
    #[error("query has unbound parameters: {}", names.join(", "))]
    UnboundParameters { names: Vec<String> },

    #[error("count() requires a count statement")]
    NotCount,
}

///
/// StatementType
///

enum StatementType {
    Select(SelectQuery),
    Delete(DeleteQuery),
    Update(UpdateQuery),
    Count(SelectQuery),
}

impl StatementType {
    const fn label(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Delete(_) => "delete",
            Self::Update(_) => "update",
            Self::Count(_) => "count",
        }
    }
}

/// Transform applied to a select query just before execution; used by
/// pagination wrapping to rewrite the window.
type SelectTransform = Box<dyn Fn(SelectQuery) -> SelectQuery>;

///
/// PreparedStatement
///
/// A parsed query awaiting parameter binding. Execution is deferred until
/// `result()`/`count()`; at that point the bound values are substituted
/// through the condition tree (an immutable rewrite) and the statement
/// dispatches to the manager.
///

pub struct PreparedStatement {
    statement: StatementType,
    params: Params,
    text: String,
    operator: Option<SelectTransform>,
}

impl fmt::Debug for PreparedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("type", &self.statement.label())
            .field("text", &self.text)
            .field("unbound", &self.params.unbound_names())
            .finish()
    }
}

impl PreparedStatement {
    pub(crate) fn select(query: SelectQuery, params: Params, text: String) -> Self {
        let statement = if query.is_count() {
            StatementType::Count(query)
        } else {
            StatementType::Select(query)
        };

        Self {
            statement,
            params,
            text,
            operator: None,
        }
    }

    pub(crate) fn delete(query: DeleteQuery, params: Params, text: String) -> Self {
        Self {
            statement: StatementType::Delete(query),
            params,
            text,
            operator: None,
        }
    }

    pub(crate) fn update(query: UpdateQuery, params: Params, text: String) -> Self {
        Self {
            statement: StatementType::Update(query),
            params,
            text,
            operator: None,
        }
    }

    /// The raw query text this statement was prepared from.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names still waiting for a bind, in declaration order.
    #[must_use]
    pub fn unbound_names(&self) -> Vec<String> {
        self.params.unbound_names()
    }

    /// Bind a named parameter.
    pub fn bind(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, CommunicationError> {
        self.params.bind(name, value.into())?;
        Ok(self)
    }

    /// Bind a parameter by 1-based declaration position.
    pub fn bind_at(
        &mut self,
        index: usize,
        value: impl Into<Value>,
    ) -> Result<&mut Self, CommunicationError> {
        self.params.bind_at(index, value.into())?;
        Ok(self)
    }

    /// Install a select transform applied just before execution.
    pub fn on_select(&mut self, transform: impl Fn(SelectQuery) -> SelectQuery + 'static) {
        self.operator = Some(Box::new(transform));
    }

    /// Execute the statement.
    ///
    /// Select streams entities; delete always yields an empty stream; update
    /// yields the updated entities; count yields one synthetic entity
    /// carrying a single `count` element.
    pub fn result(
        &self,
        manager: &mut dyn DatabaseManager,
    ) -> Result<EntityStream, CommunicationError> {
        self.ensure_bound()?;
        debug!(statement = self.statement.label(), "executing prepared statement");

        match &self.statement {
            StatementType::Select(query) => {
                let mut query = resolve_select(query, &self.params)?;
                if let Some(transform) = &self.operator {
                    query = transform(query);
                }
                manager.select(&query)
            }
            StatementType::Delete(query) => {
                let query = resolve_delete(query, &self.params)?;
                manager.delete(&query)?;
                Ok(Box::new(std::iter::empty()))
            }
            StatementType::Update(query) => {
                let query = resolve_update(query, &self.params)?;
                let updated = manager.update_query(&query)?;
                Ok(Box::new(updated.into_iter()))
            }
            StatementType::Count(query) => {
                let query = resolve_select(query, &self.params)?;
                let count = manager.count_query(&query)?;
                let mut entity = Entity::new(query.name());
                entity.add_value("count", count);
                Ok(Box::new(std::iter::once(entity)))
            }
        }
    }

    /// Execute a count statement.
    pub fn count(&self, manager: &dyn DatabaseManager) -> Result<u64, CommunicationError> {
        self.ensure_bound()?;

        let StatementType::Count(query) = &self.statement else {
            return Err(StatementError::NotCount.into());
        };
        let query = resolve_select(query, &self.params)?;

        manager.count_query(&query)
    }

    /// At most one entity; more than one is a cardinality error.
    pub fn single_result(
        &self,
        manager: &mut dyn DatabaseManager,
    ) -> Result<Option<Entity>, CommunicationError> {
        let mut stream = self.result(manager)?;
        let first = stream.next();
        if first.is_some() && stream.next().is_some() {
            return Err(ResultError::NonUnique.into());
        }

        Ok(first)
    }

    fn ensure_bound(&self) -> Result<(), StatementError> {
        let names = self.params.unbound_names();
        if names.is_empty() {
            Ok(())
        } else {
            Err(StatementError::UnboundParameters { names })
        }
    }
}

///
/// SUBSTITUTION
///
/// Immutable rewrites replacing `Value::Param` placeholders with their bound
/// values. IN/BETWEEN leaves re-run shape validation against the now-real
/// value, so a malformed bind fails here rather than at the backend.
///

fn resolve_select(
    query: &SelectQuery,
    params: &Params,
) -> Result<SelectQuery, CommunicationError> {
    let condition = query
        .condition()
        .map(|condition| resolve_condition(condition, params))
        .transpose()?;

    Ok(SelectQuery::new(
        query.name().to_string(),
        query.columns().to_vec(),
        query.sorts().to_vec(),
        query.skip(),
        query.limit(),
        condition.map(CriteriaCondition::read_only),
        query.is_count(),
    ))
}

fn resolve_delete(
    query: &DeleteQuery,
    params: &Params,
) -> Result<DeleteQuery, CommunicationError> {
    let condition = query
        .condition()
        .map(|condition| resolve_condition(condition, params))
        .transpose()?;

    Ok(DeleteQuery::new(
        query.name().to_string(),
        query.columns().to_vec(),
        condition.map(CriteriaCondition::read_only),
    ))
}

fn resolve_update(
    query: &UpdateQuery,
    params: &Params,
) -> Result<UpdateQuery, CommunicationError> {
    let set = query
        .set()
        .iter()
        .map(|element| {
            resolve_value(element.value(), params)
                .map(|value| Element::of(element.name(), value))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let condition = query
        .condition()
        .map(|condition| resolve_condition(condition, params))
        .transpose()?;

    Ok(UpdateQuery::new(
        query.name().to_string(),
        set,
        condition.map(CriteriaCondition::read_only),
    ))
}

fn resolve_condition(
    condition: &CriteriaCondition,
    params: &Params,
) -> Result<CriteriaCondition, CommunicationError> {
    match condition.node() {
        ConditionNode::Compare { element, op } => {
            let value = resolve_value(element.value(), params)?;
            let element = Element::of(element.name(), value);

            Ok(match op {
                CompareOp::Eq => CriteriaCondition::eq(element),
                CompareOp::Gt => CriteriaCondition::gt(element),
                CompareOp::Gte => CriteriaCondition::gte(element),
                CompareOp::Lt => CriteriaCondition::lt(element),
                CompareOp::Lte => CriteriaCondition::lte(element),
                CompareOp::Like => CriteriaCondition::like(element),
                CompareOp::In => CriteriaCondition::in_(element)?,
                CompareOp::Between => CriteriaCondition::between(element)?,
            })
        }
        ConditionNode::And(children) => children
            .iter()
            .map(|child| resolve_condition(child, params))
            .collect::<Result<Vec<_>, _>>()
            .map(CriteriaCondition::and_all),
        ConditionNode::Or(children) => children
            .iter()
            .map(|child| resolve_condition(child, params))
            .collect::<Result<Vec<_>, _>>()
            .map(CriteriaCondition::or_all),
        ConditionNode::Not(inner) => Ok(resolve_condition(inner, params)?
            .negate()
            .expect("freshly rebuilt conditions are mutable")),
    }
}

fn resolve_value(value: &Value, params: &Params) -> Result<Value, CommunicationError> {
    match value {
        Value::Param(name) => params.get(name).cloned().ok_or_else(|| {
            StatementError::UnboundParameters {
                names: vec![name.clone()],
            }
            .into()
        }),
        Value::List(items) => items
            .iter()
            .map(|item| resolve_value(item, params))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Ok(other.clone()),
    }
}
