mod condition;
mod delete;
mod select;
mod sort;
mod update;

pub mod fluent;

use thiserror::Error as ThisError;

// re-exports
pub use condition::{CompareOp, ConditionError, ConditionKind, ConditionNode, CriteriaCondition};
pub use delete::{DeleteQuery, DeleteQueryBuilder};
pub use select::{SelectQuery, SelectQueryBuilder};
pub use sort::{Direction, Sort};
pub use update::{UpdateQuery, UpdateQueryBuilder};

///
/// BuildError
///
/// Raised by the runtime-validated `builder()` surfaces when a mandatory
/// field is missing at `build()` time.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BuildError {
    #[error("the entity name is required; call from() before build()")]
    MissingEntity,

    #[error("an update query requires at least one set element")]
    MissingSet,
}
