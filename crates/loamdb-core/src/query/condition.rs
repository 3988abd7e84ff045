use crate::{entity::Element, value::Value};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Condition algebra
///
/// Pure representation of query predicates over named elements.
/// This layer contains no schema knowledge, index logic, or execution
/// semantics; managers interpret the tree however their backend requires.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    Between,
}

///
/// ConditionKind
///
/// The full dispatch surface: leaf comparison kinds plus the combinators.
/// Every dispatch site matches this exhaustively, so a new kind is a compile
/// error everywhere it must be handled.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ConditionKind {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    Between,
    And,
    Or,
    Not,
}

impl From<CompareOp> for ConditionKind {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => Self::Eq,
            CompareOp::Gt => Self::Gt,
            CompareOp::Gte => Self::Gte,
            CompareOp::Lt => Self::Lt,
            CompareOp::Lte => Self::Lte,
            CompareOp::In => Self::In,
            CompareOp::Like => Self::Like,
            CompareOp::Between => Self::Between,
        }
    }
}

///
/// ConditionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConditionError {
    #[error("IN condition requires a list value for element '{element}', found {found}")]
    InRequiresList { element: String, found: &'static str },

    #[error("BETWEEN condition requires a list value for element '{element}', found {found}")]
    BetweenRequiresList { element: String, found: &'static str },

    #[error(
        "BETWEEN condition requires exactly two values for element '{element}', found {found}"
    )]
    BetweenArity { element: String, found: usize },

    #[error("condition is read-only; combinators are disabled once the owning query is built")]
    ReadOnly,
}

///
/// ConditionNode
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum ConditionNode {
    Compare { element: Element, op: CompareOp },
    And(Vec<CriteriaCondition>),
    Or(Vec<CriteriaCondition>),
    Not(Box<CriteriaCondition>),
}

///
/// CriteriaCondition
///
/// An immutable predicate node: a leaf comparison or an AND/OR/NOT
/// combinator. Combinators return new instances; the only state transition
/// is the read-only flag, applied via a copy when the owning query is built.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CriteriaCondition {
    node: ConditionNode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    read_only: bool,
}

impl CriteriaCondition {
    const fn from_node(node: ConditionNode) -> Self {
        Self {
            node,
            read_only: false,
        }
    }

    const fn compare(element: Element, op: CompareOp) -> Self {
        Self::from_node(ConditionNode::Compare { element, op })
    }

    ///
    /// LEAF CONSTRUCTORS
    ///

    #[must_use]
    pub const fn eq(element: Element) -> Self {
        Self::compare(element, CompareOp::Eq)
    }

    #[must_use]
    pub const fn gt(element: Element) -> Self {
        Self::compare(element, CompareOp::Gt)
    }

    #[must_use]
    pub const fn gte(element: Element) -> Self {
        Self::compare(element, CompareOp::Gte)
    }

    #[must_use]
    pub const fn lt(element: Element) -> Self {
        Self::compare(element, CompareOp::Lt)
    }

    #[must_use]
    pub const fn lte(element: Element) -> Self {
        Self::compare(element, CompareOp::Lte)
    }

    #[must_use]
    pub const fn like(element: Element) -> Self {
        Self::compare(element, CompareOp::Like)
    }

    /// Build an IN leaf. The element's value must be a list.
    ///
    /// An unbound [`Value::Param`] placeholder passes here and is re-validated
    /// when the owning prepared statement substitutes the bound value.
    pub fn in_(element: Element) -> Result<Self, ConditionError> {
        match element.value() {
            Value::List(_) | Value::Param(_) => Ok(Self::compare(element, CompareOp::In)),
            other => Err(ConditionError::InRequiresList {
                element: element.name().to_string(),
                found: other.type_name(),
            }),
        }
    }

    /// Build a BETWEEN leaf. The element's value must be a two-element list.
    ///
    /// An unbound [`Value::Param`] placeholder passes here and is re-validated
    /// when the owning prepared statement substitutes the bound value.
    pub fn between(element: Element) -> Result<Self, ConditionError> {
        match element.value() {
            Value::List(values) if values.len() == 2 => {
                Ok(Self::compare(element, CompareOp::Between))
            }
            Value::List(values) => Err(ConditionError::BetweenArity {
                element: element.name().to_string(),
                found: values.len(),
            }),
            Value::Param(_) => Ok(Self::compare(element, CompareOp::Between)),
            other => Err(ConditionError::BetweenRequiresList {
                element: element.name().to_string(),
                found: other.type_name(),
            }),
        }
    }

    ///
    /// COMBINATORS
    ///

    /// AND-combine with `other`.
    ///
    /// If `self` is already an AND node, `other` is appended to the existing
    /// child list (consecutive ANDs flatten into one n-ary node). Otherwise a
    /// fresh two-child AND node wraps both sides. Only the left accumulator
    /// flattens; `other` keeps its own shape.
    pub fn and(self, other: Self) -> Result<Self, ConditionError> {
        self.ensure_mutable()?;

        Ok(match self.node {
            ConditionNode::And(mut children) => {
                children.push(other);
                Self::from_node(ConditionNode::And(children))
            }
            node => Self::from_node(ConditionNode::And(vec![Self::from_node(node), other])),
        })
    }

    /// OR-combine with `other`. Flattening mirrors [`and`](Self::and).
    pub fn or(self, other: Self) -> Result<Self, ConditionError> {
        self.ensure_mutable()?;

        Ok(match self.node {
            ConditionNode::Or(mut children) => {
                children.push(other);
                Self::from_node(ConditionNode::Or(children))
            }
            node => Self::from_node(ConditionNode::Or(vec![Self::from_node(node), other])),
        })
    }

    /// Negate this condition. Negating a NOT node unwraps it, so double
    /// negation returns the original wrapped condition.
    pub fn negate(self) -> Result<Self, ConditionError> {
        self.ensure_mutable()?;

        Ok(match self.node {
            ConditionNode::Not(inner) => *inner,
            node => Self::from_node(ConditionNode::Not(Box::new(Self::from_node(node)))),
        })
    }

    /// Build an n-ary AND node from exactly the given conditions, regardless
    /// of the children's own kinds.
    #[must_use]
    pub const fn and_all(conditions: Vec<Self>) -> Self {
        Self::from_node(ConditionNode::And(conditions))
    }

    /// Build an n-ary OR node from exactly the given conditions, regardless
    /// of the children's own kinds.
    #[must_use]
    pub const fn or_all(conditions: Vec<Self>) -> Self {
        Self::from_node(ConditionNode::Or(conditions))
    }

    ///
    /// READ-ONLY LOCKING
    ///

    /// Return a copy with the read-only flag set. Combinators called on the
    /// returned instance fail with [`ConditionError::ReadOnly`].
    #[must_use]
    pub fn read_only(condition: Self) -> Self {
        Self {
            read_only: true,
            ..condition
        }
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    const fn ensure_mutable(&self) -> Result<(), ConditionError> {
        if self.read_only {
            Err(ConditionError::ReadOnly)
        } else {
            Ok(())
        }
    }

    ///
    /// INSPECTION
    ///

    #[must_use]
    pub const fn node(&self) -> &ConditionNode {
        &self.node
    }

    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        match &self.node {
            ConditionNode::Compare { op, .. } => match op {
                CompareOp::Eq => ConditionKind::Eq,
                CompareOp::Gt => ConditionKind::Gt,
                CompareOp::Gte => ConditionKind::Gte,
                CompareOp::Lt => ConditionKind::Lt,
                CompareOp::Lte => ConditionKind::Lte,
                CompareOp::In => ConditionKind::In,
                CompareOp::Like => ConditionKind::Like,
                CompareOp::Between => ConditionKind::Between,
            },
            ConditionNode::And(_) => ConditionKind::And,
            ConditionNode::Or(_) => ConditionKind::Or,
            ConditionNode::Not(_) => ConditionKind::Not,
        }
    }

    /// The compared element, for leaf nodes.
    #[must_use]
    pub const fn element(&self) -> Option<&Element> {
        if let ConditionNode::Compare { element, .. } = &self.node {
            Some(element)
        } else {
            None
        }
    }

    /// Child conditions, for AND/OR nodes.
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        match &self.node {
            ConditionNode::And(children) | ConditionNode::Or(children) => {
                Some(children.as_slice())
            }
            _ => None,
        }
    }

    /// The wrapped condition, for NOT nodes.
    #[must_use]
    pub fn negated(&self) -> Option<&Self> {
        if let ConditionNode::Not(inner) = &self.node {
            Some(inner)
        } else {
            None
        }
    }
}

///
/// TESTS
///
