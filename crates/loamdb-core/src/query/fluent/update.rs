use crate::{
    entity::Element,
    query::{
        CompareOp, CriteriaCondition, UpdateQuery,
        fluent::{BaseBuilder, impl_condition_ops},
    },
    value::Value,
};

///
/// UpdateState
///

#[derive(Clone, Debug)]
pub(crate) struct UpdateState {
    entity: String,
    set: Vec<Element>,
    pub(crate) base: BaseBuilder,
}

impl UpdateState {
    fn build(mut self) -> UpdateQuery {
        UpdateQuery::new(
            self.entity,
            self.set,
            self.base.take_condition().map(CriteriaCondition::read_only),
        )
    }
}

///
/// UpdateBuilder
///
/// Entry stage: at least one `set` is required before anything else.
///

#[derive(Clone, Debug)]
pub struct UpdateBuilder {
    state: UpdateState,
}

impl UpdateBuilder {
    pub(crate) fn new(entity: String) -> Self {
        Self {
            state: UpdateState {
                entity,
                set: Vec::new(),
                base: BaseBuilder::default(),
            },
        }
    }

    /// Write one element.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> UpdateSet {
        self.state.set.push(Element::of(name, value));
        UpdateSet { state: self.state }
    }
}

///
/// UpdateSet
///
/// At least one element is staged; more sets, a condition, or build.
///

#[derive(Clone, Debug)]
pub struct UpdateSet {
    pub(crate) state: UpdateState,
}

impl UpdateSet {
    /// Write one more element.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.set.push(Element::of(name, value));
        self
    }

    /// Open a condition on the given field.
    #[must_use]
    pub fn where_(mut self, field: impl Into<String>) -> UpdateCondition {
        self.state.base.begin(field);
        UpdateCondition { state: self.state }
    }

    #[must_use]
    pub fn build(self) -> UpdateQuery {
        self.state.build()
    }
}

///
/// UpdateCondition
///

#[derive(Clone, Debug)]
pub struct UpdateCondition {
    pub(crate) state: UpdateState,
}

impl_condition_ops!(UpdateCondition => UpdateWhere);

///
/// UpdateWhere
///

#[derive(Clone, Debug)]
pub struct UpdateWhere {
    pub(crate) state: UpdateState,
}

impl UpdateWhere {
    /// AND-chain a condition on the given field.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>) -> UpdateCondition {
        self.state.base.begin_and(field);
        UpdateCondition { state: self.state }
    }

    /// OR-chain a condition on the given field.
    #[must_use]
    pub fn or(mut self, field: impl Into<String>) -> UpdateCondition {
        self.state.base.begin_or(field);
        UpdateCondition { state: self.state }
    }

    #[must_use]
    pub fn build(self) -> UpdateQuery {
        self.state.build()
    }
}
