//! Keyset/cursor pagination contract and executor.
//!
//! A page request carries a size, a mode, and (for cursor modes) an ordered
//! key tuple — one value per sort column. The executor issues exactly one
//! select per page and hands back pre-built next/previous requests.

pub(crate) mod cursor_executor;
mod token;


use crate::{entity::Entity, value::Value};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

// re-exports
pub use token::{decode_token, encode_token, shape_signature};

///
/// PaginationError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PaginationError {
    #[error("cursor pagination requires at least one sort column")]
    MissingSort,

    #[error("cursor-mode page request carries no cursor")]
    MissingCursor,

    #[error("cursor key arity {found} does not match the {expected} sort columns")]
    KeyArity { expected: usize, found: usize },

    #[error("sort column path '{path}' not found in entity: missing segment '{segment}'")]
    ColumnNotFound { path: String, segment: String },

    #[error("continuation token failed to encode: {message}")]
    TokenEncode { message: String },

    #[error("continuation token payload is malformed: {message}")]
    TokenDecode { message: String },

    #[error("continuation token version {version} is not supported")]
    UnsupportedTokenVersion { version: u8 },

    #[error("continuation token does not match this query shape")]
    SignatureMismatch,
}

///
/// PageMode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PageMode {
    /// Bootstrap request: no cursor yet, plain windowed select.
    Offset,
    CursorNext,
    CursorPrevious,
}

///
/// Cursor
///
/// Ordered key tuple resuming a sorted select: one value per sort column,
/// taken from the boundary entity of the previous page.
///

#[derive(Clone, Debug, Deref, Deserialize, IntoIterator, PartialEq, Serialize)]
pub struct Cursor(Vec<Value>);

impl Cursor {
    #[must_use]
    pub const fn of(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

///
/// PageRequest
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PageRequest {
    size: u64,
    mode: PageMode,
    cursor: Option<Cursor>,
}

impl PageRequest {
    /// Bootstrap request for the first page.
    #[must_use]
    pub const fn of_size(size: u64) -> Self {
        Self {
            size,
            mode: PageMode::Offset,
            cursor: None,
        }
    }

    /// Request the page after the given cursor.
    #[must_use]
    pub const fn after_cursor(cursor: Cursor, size: u64) -> Self {
        Self {
            size,
            mode: PageMode::CursorNext,
            cursor: Some(cursor),
        }
    }

    /// Request the page before the given cursor.
    #[must_use]
    pub const fn before_cursor(cursor: Cursor, size: u64) -> Self {
        Self {
            size,
            mode: PageMode::CursorPrevious,
            cursor: Some(cursor),
        }
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub const fn mode(&self) -> PageMode {
        self.mode
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }
}

///
/// CursorPage
///
/// One retrieved page plus the pre-built boundary requests. A missing
/// request means the boundary is unknown (empty page) in that direction.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CursorPage {
    entities: Vec<Entity>,
    next: Option<PageRequest>,
    previous: Option<PageRequest>,
}

impl IntoIterator for CursorPage {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl CursorPage {
    pub(crate) const fn new(
        entities: Vec<Entity>,
        next: Option<PageRequest>,
        previous: Option<PageRequest>,
    ) -> Self {
        Self {
            entities,
            next,
            previous,
        }
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    /// Request for the following page, when a forward boundary exists.
    #[must_use]
    pub const fn next_request(&self) -> Option<&PageRequest> {
        self.next.as_ref()
    }

    /// Request for the preceding page, when a backward boundary exists.
    #[must_use]
    pub const fn previous_request(&self) -> Option<&PageRequest> {
        self.previous.as_ref()
    }

    /// The forward boundary cursor, when one exists.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next.as_ref().and_then(PageRequest::cursor)
    }

    /// The backward boundary cursor, when one exists.
    #[must_use]
    pub fn previous_cursor(&self) -> Option<&Cursor> {
        self.previous.as_ref().and_then(PageRequest::cursor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
