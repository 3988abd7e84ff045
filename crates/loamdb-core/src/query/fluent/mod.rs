//! Staged fluent query DSL.
//!
//! Each query kind progresses through distinct stage structs
//! (`from → (where → operator → and/or)* → skip/limit/order_by → build`),
//! so out-of-order calls are unrepresentable rather than runtime errors.
//! All stages share one accumulator holding the pending field name, the
//! negate flag, the AND/OR flag for the next combinator, and the condition
//! built so far.

mod delete;
mod select;
mod update;


use crate::{
    entity::Element,
    query::{CompareOp, CriteriaCondition},
    value::Value,
};

// re-exports
pub use delete::{DeleteBuilder, DeleteCondition, DeleteFrom, DeleteWhere};
pub use select::{SelectBuilder, SelectCondition, SelectFrom, SelectPage, SelectWhere};
pub use update::{UpdateBuilder, UpdateCondition, UpdateSet, UpdateWhere};

/// Start a select over all columns.
#[must_use]
pub fn select() -> SelectBuilder {
    SelectBuilder::new(Vec::new())
}

/// Start a select with a column projection.
pub fn select_columns<I, S>(columns: I) -> SelectBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SelectBuilder::new(columns.into_iter().map(Into::into).collect())
}

/// Start a whole-entity delete.
#[must_use]
pub fn delete() -> DeleteBuilder {
    DeleteBuilder::new(Vec::new())
}

/// Start a field-level delete restricted to the given columns.
pub fn delete_columns<I, S>(columns: I) -> DeleteBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DeleteBuilder::new(columns.into_iter().map(Into::into).collect())
}

/// Start an update of the given entity.
pub fn update(entity: impl Into<String>) -> UpdateBuilder {
    UpdateBuilder::new(entity.into())
}

///
/// BaseBuilder
///
/// Condition accumulator shared by every fluent stage: the pending field
/// name, the negate flag, the AND/OR flag consumed by the next operator, and
/// the condition built so far. Transient state (field, negate) resets after
/// each operator; the combinator flag is rewritten by `and`/`or`.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct BaseBuilder {
    field: Option<String>,
    negate: bool,
    or_next: bool,
    condition: Option<CriteriaCondition>,
}

impl BaseBuilder {
    pub(crate) fn begin(&mut self, field: impl Into<String>) {
        self.field = Some(field.into());
    }

    pub(crate) fn begin_and(&mut self, field: impl Into<String>) {
        self.or_next = false;
        self.begin(field);
    }

    pub(crate) fn begin_or(&mut self, field: impl Into<String>) {
        self.or_next = true;
        self.begin(field);
    }

    pub(crate) const fn mark_negate(&mut self) {
        self.negate = true;
    }

    /// Synthesize a leaf from the pending state and fold it into the
    /// accumulated condition per the AND/OR flag.
    pub(crate) fn append(&mut self, op: CompareOp, value: Value) {
        let field = self
            .field
            .take()
            .expect("a pending field name is set by the stage transition");
        let element = Element::of(field, value);

        let mut leaf = match op {
            CompareOp::Eq => CriteriaCondition::eq(element),
            CompareOp::Gt => CriteriaCondition::gt(element),
            CompareOp::Gte => CriteriaCondition::gte(element),
            CompareOp::Lt => CriteriaCondition::lt(element),
            CompareOp::Lte => CriteriaCondition::lte(element),
            CompareOp::Like => CriteriaCondition::like(element),
            CompareOp::In => {
                CriteriaCondition::in_(element).expect("fluent IN always supplies a list")
            }
            CompareOp::Between => CriteriaCondition::between(element)
                .expect("fluent BETWEEN always supplies two values"),
        };

        if self.negate {
            leaf = leaf.negate().expect("fresh leaf conditions are mutable");
        }

        self.condition = Some(match self.condition.take() {
            None => leaf,
            Some(existing) if self.or_next => existing
                .or(leaf)
                .expect("accumulated fluent conditions are mutable"),
            Some(existing) => existing
                .and(leaf)
                .expect("accumulated fluent conditions are mutable"),
        });
        self.negate = false;
    }

    pub(crate) fn take_condition(&mut self) -> Option<CriteriaCondition> {
        self.condition.take()
    }
}

/// Expand the comparison-operator surface on a condition stage, transitioning
/// into the given post-operator stage.
macro_rules! impl_condition_ops {
    ( $stage:ident => $next:ident ) => {
        impl $stage {
            /// Negate the next comparison.
            #[must_use]
            pub fn not(mut self) -> Self {
                self.state.base.mark_negate();
                self
            }

            #[must_use]
            pub fn eq(self, value: impl Into<Value>) -> $next {
                self.op(CompareOp::Eq, value.into())
            }

            #[must_use]
            pub fn gt(self, value: impl Into<Value>) -> $next {
                self.op(CompareOp::Gt, value.into())
            }

            #[must_use]
            pub fn gte(self, value: impl Into<Value>) -> $next {
                self.op(CompareOp::Gte, value.into())
            }

            #[must_use]
            pub fn lt(self, value: impl Into<Value>) -> $next {
                self.op(CompareOp::Lt, value.into())
            }

            #[must_use]
            pub fn lte(self, value: impl Into<Value>) -> $next {
                self.op(CompareOp::Lte, value.into())
            }

            #[must_use]
            pub fn like(self, value: impl Into<Value>) -> $next {
                self.op(CompareOp::Like, value.into())
            }

            /// Membership test over the given values.
            #[must_use]
            pub fn in_<I, V>(self, values: I) -> $next
            where
                I: IntoIterator<Item = V>,
                V: Into<Value>,
            {
                self.op(CompareOp::In, Value::from_list(values.into_iter().collect()))
            }

            /// Inclusive range test between `low` and `high`.
            #[must_use]
            pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> $next {
                self.op(
                    CompareOp::Between,
                    Value::List(vec![low.into(), high.into()]),
                )
            }

            fn op(mut self, op: CompareOp, value: Value) -> $next {
                self.state.base.append(op, value);
                $next { state: self.state }
            }
        }
    };
}

pub(crate) use impl_condition_ops;
