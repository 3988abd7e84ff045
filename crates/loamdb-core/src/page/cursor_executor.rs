//! Keyset pagination state machine.
//!
//! Three variants, selected by the request mode: offset bootstrap,
//! cursor-next, and cursor-previous. Cursor modes synthesize the standard
//! seek-method predicate from the sort columns and the cursor key tuple:
//! for sorts `(s1..sn)` and keys `(k1..kn)`,
//! `(s1>k1) OR (s1=k1 AND s2>k2) OR (s1=k1 AND s2=k2 AND s3>k3) ...`
//! with the strict comparison only on the last column of each disjunct
//! (mirrored with `<` for the backward direction).

use crate::{
    entity::{Element, Entity, find_in},
    error::CommunicationError,
    manager::DatabaseManager,
    page::{Cursor, CursorPage, PageMode, PageRequest, PaginationError},
    query::{CriteriaCondition, SelectQuery, Sort},
    value::Value,
};
use tracing::debug;

///
/// SeekDirection
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum SeekDirection {
    Forward,
    Backward,
}

impl SeekDirection {
    fn strict_leaf(self, field: &str, key: Value) -> CriteriaCondition {
        let element = Element::of(field, key);
        match self {
            Self::Forward => CriteriaCondition::gt(element),
            Self::Backward => CriteriaCondition::lt(element),
        }
    }
}

/// Run one page of a cursor-paginated select.
///
/// Exactly one underlying select is issued per call. The query must declare
/// at least one sort column.
pub(crate) fn execute<M>(
    query: &SelectQuery,
    request: &PageRequest,
    manager: &M,
) -> Result<CursorPage, CommunicationError>
where
    M: DatabaseManager + ?Sized,
{
    if query.sorts().is_empty() {
        return Err(PaginationError::MissingSort.into());
    }

    match request.mode() {
        PageMode::Offset => bootstrap(query, request, manager),
        PageMode::CursorNext => paged(query, request, manager, SeekDirection::Forward),
        PageMode::CursorPrevious => paged(query, request, manager, SeekDirection::Backward),
    }
}

/// Initial request: no cursor yet. Runs the base query with the page size
/// and derives the forward cursor from the last returned entity.
fn bootstrap<M>(
    query: &SelectQuery,
    request: &PageRequest,
    manager: &M,
) -> Result<CursorPage, CommunicationError>
where
    M: DatabaseManager + ?Sized,
{
    let windowed = windowed(query, query.condition().cloned(), query.skip(), request.size());
    let entities: Vec<Entity> = manager.select(&windowed)?.collect();
    debug!(entities = entities.len(), "cursor bootstrap page");

    let Some(last) = entities.last() else {
        return Ok(CursorPage::new(entities, None, None));
    };
    let next = PageRequest::after_cursor(cursor_from(query.sorts(), last)?, request.size());

    Ok(CursorPage::new(entities, Some(next), None))
}

/// Cursor continuation in either direction.
fn paged<M>(
    query: &SelectQuery,
    request: &PageRequest,
    manager: &M,
    direction: SeekDirection,
) -> Result<CursorPage, CommunicationError>
where
    M: DatabaseManager + ?Sized,
{
    let cursor = request.cursor().ok_or(PaginationError::MissingCursor)?;
    check_cursor_key_sizes(query.sorts(), cursor)?;

    let seek = seek_condition(query.sorts(), cursor, direction);
    let condition = match query.condition() {
        Some(existing) => CriteriaCondition::and_all(vec![existing.clone(), seek]),
        None => seek,
    };

    let windowed = windowed(query, Some(condition), 0, request.size());
    let entities: Vec<Entity> = manager.select(&windowed)?.collect();
    debug!(entities = entities.len(), ?direction, "cursor continuation page");

    let Some(last) = entities.last() else {
        return Ok(CursorPage::new(entities, None, None));
    };
    let boundary = cursor_from(query.sorts(), last)?;

    let (next, previous) = match direction {
        SeekDirection::Forward => (
            PageRequest::after_cursor(boundary, request.size()),
            PageRequest::before_cursor(cursor.clone(), request.size()),
        ),
        SeekDirection::Backward => (
            PageRequest::after_cursor(cursor.clone(), request.size()),
            PageRequest::before_cursor(boundary, request.size()),
        ),
    };

    Ok(CursorPage::new(entities, Some(next), Some(previous)))
}

/// Clone the query with a rewritten condition and window.
fn windowed(
    query: &SelectQuery,
    condition: Option<CriteriaCondition>,
    skip: u64,
    limit: u64,
) -> SelectQuery {
    SelectQuery::new(
        query.name().to_string(),
        query.columns().to_vec(),
        query.sorts().to_vec(),
        skip,
        limit,
        condition.map(CriteriaCondition::read_only),
        false,
    )
}

/// The cursor tuple's arity must equal the number of sort columns.
fn check_cursor_key_sizes(sorts: &[Sort], cursor: &Cursor) -> Result<(), PaginationError> {
    if sorts.len() == cursor.len() {
        Ok(())
    } else {
        Err(PaginationError::KeyArity {
            expected: sorts.len(),
            found: cursor.len(),
        })
    }
}

/// Synthesize the lexicographic seek predicate, accumulating the equality
/// chain as the "previous" condition and OR-ing in `previous AND strict` at
/// each step.
pub(crate) fn seek_condition(
    sorts: &[Sort],
    cursor: &Cursor,
    direction: SeekDirection,
) -> CriteriaCondition {
    let mut pairs = sorts.iter().zip(cursor.values());
    let (first_sort, first_key) = pairs
        .next()
        .expect("at least one sort column was validated before dispatch");

    let mut condition = direction.strict_leaf(first_sort.field(), first_key.clone());
    let mut previous = CriteriaCondition::eq(Element::of(first_sort.field(), first_key.clone()));

    for (sort, key) in pairs {
        let strict = direction.strict_leaf(sort.field(), key.clone());
        let equals = CriteriaCondition::eq(Element::of(sort.field(), key.clone()));

        let disjunct = previous
            .clone()
            .and(strict)
            .expect("cursor conditions are freshly built");
        condition = condition
            .or(disjunct)
            .expect("cursor conditions are freshly built");
        previous = previous
            .and(equals)
            .expect("cursor conditions are freshly built");
    }

    condition
}

/// Derive the cursor key tuple from a boundary entity's sort-column values.
pub(crate) fn cursor_from(sorts: &[Sort], entity: &Entity) -> Result<Cursor, PaginationError> {
    sorts
        .iter()
        .map(|sort| value_at(sort.field(), entity))
        .collect::<Result<Vec<_>, _>>()
        .map(Cursor::of)
}

/// Resolve a possibly-dotted sort-column path by walking nested sub-element
/// lists; a missing intermediate or leaf segment names itself in the error.
pub(crate) fn value_at(path: &str, entity: &Entity) -> Result<Value, PaginationError> {
    let not_found = |segment: &str| PaginationError::ColumnNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let mut segments = path.split('.');
    let first = segments.next().unwrap_or_default();
    let mut current = entity.find_value(first).ok_or_else(|| not_found(first))?;

    for segment in segments {
        let elements = current.as_elements().ok_or_else(|| not_found(segment))?;
        current = find_in(elements, segment)
            .map(Element::value)
            .ok_or_else(|| not_found(segment))?;
    }

    Ok(current.clone())
}
