use crate::{
    query::{
        CompareOp, CriteriaCondition, DeleteQuery,
        fluent::{BaseBuilder, impl_condition_ops},
    },
    value::Value,
};

///
/// DeleteState
///

#[derive(Clone, Debug)]
pub(crate) struct DeleteState {
    entity: String,
    columns: Vec<String>,
    pub(crate) base: BaseBuilder,
}

impl DeleteState {
    fn build(mut self) -> DeleteQuery {
        DeleteQuery::new(
            self.entity,
            self.columns,
            self.base.take_condition().map(CriteriaCondition::read_only),
        )
    }
}

///
/// DeleteBuilder
///
/// Entry stage: only the target entity can be chosen here.
///

#[derive(Clone, Debug)]
pub struct DeleteBuilder {
    columns: Vec<String>,
}

impl DeleteBuilder {
    pub(crate) const fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Name the entity to delete from.
    #[must_use]
    pub fn from(self, entity: impl Into<String>) -> DeleteFrom {
        DeleteFrom {
            state: DeleteState {
                entity: entity.into(),
                columns: self.columns,
                base: BaseBuilder::default(),
            },
        }
    }
}

///
/// DeleteFrom
///

#[derive(Clone, Debug)]
pub struct DeleteFrom {
    pub(crate) state: DeleteState,
}

impl DeleteFrom {
    /// Open a condition on the given field.
    #[must_use]
    pub fn where_(mut self, field: impl Into<String>) -> DeleteCondition {
        self.state.base.begin(field);
        DeleteCondition { state: self.state }
    }

    #[must_use]
    pub fn build(self) -> DeleteQuery {
        self.state.build()
    }
}

///
/// DeleteCondition
///

#[derive(Clone, Debug)]
pub struct DeleteCondition {
    pub(crate) state: DeleteState,
}

impl_condition_ops!(DeleteCondition => DeleteWhere);

///
/// DeleteWhere
///

#[derive(Clone, Debug)]
pub struct DeleteWhere {
    pub(crate) state: DeleteState,
}

impl DeleteWhere {
    /// AND-chain a condition on the given field.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>) -> DeleteCondition {
        self.state.base.begin_and(field);
        DeleteCondition { state: self.state }
    }

    /// OR-chain a condition on the given field.
    #[must_use]
    pub fn or(mut self, field: impl Into<String>) -> DeleteCondition {
        self.state.base.begin_or(field);
        DeleteCondition { state: self.state }
    }

    #[must_use]
    pub fn build(self) -> DeleteQuery {
        self.state.build()
    }
}
