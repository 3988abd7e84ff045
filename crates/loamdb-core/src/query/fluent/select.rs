use crate::{
    query::{
        CompareOp, CriteriaCondition, SelectQuery, Sort,
        fluent::{BaseBuilder, impl_condition_ops},
    },
    value::Value,
};

///
/// SelectState
///
/// Internal state threaded through every select stage.
///

#[derive(Clone, Debug)]
pub(crate) struct SelectState {
    entity: String,
    columns: Vec<String>,
    sorts: Vec<Sort>,
    skip: u64,
    limit: u64,
    pub(crate) base: BaseBuilder,
}

impl SelectState {
    fn build(mut self) -> SelectQuery {
        SelectQuery::new(
            self.entity,
            self.columns,
            self.sorts,
            self.skip,
            self.limit,
            self.base.take_condition().map(CriteriaCondition::read_only),
            false,
        )
    }
}

///
/// SelectBuilder
///
/// Entry stage: only the target entity can be chosen here.
///

#[derive(Clone, Debug)]
pub struct SelectBuilder {
    columns: Vec<String>,
}

impl SelectBuilder {
    pub(crate) const fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Name the entity to select from.
    #[must_use]
    pub fn from(self, entity: impl Into<String>) -> SelectFrom {
        SelectFrom {
            state: SelectState {
                entity: entity.into(),
                columns: self.columns,
                sorts: Vec::new(),
                skip: 0,
                limit: 0,
                base: BaseBuilder::default(),
            },
        }
    }
}

///
/// SelectFrom
///
/// Post-`from` stage: open a condition, page, sort, or build.
///

#[derive(Clone, Debug)]
pub struct SelectFrom {
    pub(crate) state: SelectState,
}

impl SelectFrom {
    /// Open a condition on the given field.
    #[must_use]
    pub fn where_(mut self, field: impl Into<String>) -> SelectCondition {
        self.state.base.begin(field);
        SelectCondition { state: self.state }
    }

    #[must_use]
    pub fn skip(self, skip: u64) -> SelectPage {
        SelectPage { state: self.state }.skip(skip)
    }

    #[must_use]
    pub fn limit(self, limit: u64) -> SelectPage {
        SelectPage { state: self.state }.limit(limit)
    }

    #[must_use]
    pub fn order_by(self, sort: Sort) -> SelectPage {
        SelectPage { state: self.state }.order_by(sort)
    }

    #[must_use]
    pub fn build(self) -> SelectQuery {
        self.state.build()
    }
}

///
/// SelectCondition
///
/// A field name is pending; exactly one comparison operator must follow.
///

#[derive(Clone, Debug)]
pub struct SelectCondition {
    pub(crate) state: SelectState,
}

impl_condition_ops!(SelectCondition => SelectWhere);

///
/// SelectWhere
///
/// Post-operator stage: chain another condition, page, sort, or build.
///

#[derive(Clone, Debug)]
pub struct SelectWhere {
    pub(crate) state: SelectState,
}

impl SelectWhere {
    /// AND-chain a condition on the given field.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>) -> SelectCondition {
        self.state.base.begin_and(field);
        SelectCondition { state: self.state }
    }

    /// OR-chain a condition on the given field.
    #[must_use]
    pub fn or(mut self, field: impl Into<String>) -> SelectCondition {
        self.state.base.begin_or(field);
        SelectCondition { state: self.state }
    }

    #[must_use]
    pub fn skip(self, skip: u64) -> SelectPage {
        SelectPage { state: self.state }.skip(skip)
    }

    #[must_use]
    pub fn limit(self, limit: u64) -> SelectPage {
        SelectPage { state: self.state }.limit(limit)
    }

    #[must_use]
    pub fn order_by(self, sort: Sort) -> SelectPage {
        SelectPage { state: self.state }.order_by(sort)
    }

    #[must_use]
    pub fn build(self) -> SelectQuery {
        self.state.build()
    }
}

///
/// SelectPage
///
/// Window/ordering stage; conditions can no longer be opened.
///

#[derive(Clone, Debug)]
pub struct SelectPage {
    pub(crate) state: SelectState,
}

impl SelectPage {
    #[must_use]
    pub const fn skip(mut self, skip: u64) -> Self {
        self.state.skip = skip;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.state.limit = limit;
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn order_by(mut self, sort: Sort) -> Self {
        self.state.sorts.push(sort);
        self
    }

    #[must_use]
    pub fn build(self) -> SelectQuery {
        self.state.build()
    }
}
