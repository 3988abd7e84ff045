//! loamdb — a semi-structured query model and condition-resolution core for
//! heterogeneous NoSQL backends.
//!
//! ## Crate layout
//! - `core`: the engine — values, entities, the condition algebra, query
//!   descriptors and builders, the textual query surface, and cursor
//!   pagination.
//!
//! A query is built either through the staged fluent DSL, the
//! runtime-validated builders, or the textual surface, then handed to a
//! [`DatabaseManager`](core::manager::DatabaseManager) implementation:
//!
//! ```ignore
//! use loamdb::prelude::*;
//!
//! let query = SelectQuery::select()
//!     .from("Person")
//!     .where_("age")
//!     .gte(18i64)
//!     .and("active")
//!     .eq(true)
//!     .build();
//! let adults = manager.select(&query)?;
//! ```

pub use loamdb_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// surface re-exports
pub use loamdb_core::{
    entity::{Element, Entity},
    error::CommunicationError,
    manager::{DatabaseManager, EntityStream},
    page::{Cursor, CursorPage, PageMode, PageRequest},
    query::{
        CriteriaCondition, DeleteQuery, Direction, SelectQuery, Sort, UpdateQuery,
    },
    text::{IdentityObserver, PreparedStatement, QueryObserver, QueryParser},
    value::Value,
};

///
/// Prelude
///
/// Domain vocabulary only; parsers and executors stay one level down.
///

pub mod prelude {
    pub use crate::core::prelude::*;
}
