use crate::{
    error::CommunicationError,
    manager::{DatabaseManager, EntityStream},
    query::{CriteriaCondition, DeleteQuery, SelectQuery, Sort, UpdateQuery},
    text::{
        Conditions, Params, PreparedStatement, QueryObserver, SyntaxError, Values, grammar,
    },
};
use tracing::debug;

///
/// QueryCommand
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryCommand {
    Select,
    Delete,
    Update,
}

///
/// QueryParser
///
/// Routes a raw query string to the matching sub-parser by uppercasing the
/// first six characters and comparing against `DELETE`/`UPDATE`; everything
/// else falls through to SELECT. This is a fixed-width prefix sniff, not a
/// tokenizer: inputs shorter than six characters, or whose command keyword
/// differs in length, route to SELECT and fail in its grammar instead.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryParser;

impl QueryParser {
    /// Extract the command by the fixed-width prefix sniff.
    #[must_use]
    pub fn command(query: &str) -> QueryCommand {
        let prefix = query.chars().take(6).collect::<String>().to_uppercase();

        match prefix.as_str() {
            "DELETE" => QueryCommand::Delete,
            "UPDATE" => QueryCommand::Update,
            _ => QueryCommand::Select,
        }
    }

    /// Parse and execute immediately. Fails if the query declares `@name`
    /// parameters; those require [`prepare`](Self::prepare).
    pub fn query(
        query: &str,
        manager: &mut dyn DatabaseManager,
        observer: &dyn QueryObserver,
    ) -> Result<EntityStream, CommunicationError> {
        let command = Self::command(query);
        debug!(?command, "dispatching query string");

        match command {
            QueryCommand::Select => SelectQueryParser::query(query, manager, observer),
            QueryCommand::Delete => DeleteQueryParser::query(query, manager, observer),
            QueryCommand::Update => UpdateQueryParser::query(query, manager, observer),
        }
    }

    /// Parse into a prepared statement deferring execution until the
    /// parameters are bound.
    pub fn prepare(
        query: &str,
        observer: &dyn QueryObserver,
    ) -> Result<PreparedStatement, CommunicationError> {
        let command = Self::command(query);
        debug!(?command, "preparing query string");

        match command {
            QueryCommand::Select => SelectQueryParser::prepare(query, observer),
            QueryCommand::Delete => DeleteQueryParser::prepare(query, observer),
            QueryCommand::Update => UpdateQueryParser::prepare(query, observer),
        }
    }
}

fn ensure_no_parameters(params: &Params) -> Result<(), SyntaxError> {
    if params.is_empty() {
        Ok(())
    } else {
        Err(SyntaxError::ParametersRequirePrepare {
            names: params.names().map(ToString::to_string).collect(),
        })
    }
}

///
/// SelectQueryParser
///

pub struct SelectQueryParser;

impl SelectQueryParser {
    fn parse(
        text: &str,
        observer: &dyn QueryObserver,
    ) -> Result<(SelectQuery, Params), CommunicationError> {
        let statement = grammar::parse_select(text)?;
        let mut params = Params::default();

        let columns = statement
            .columns
            .iter()
            .map(|column| observer.fire_field(&statement.entity, column))
            .collect();
        let sorts = statement
            .sorts
            .iter()
            .map(|sort| {
                let field = observer.fire_field(&statement.entity, sort.field());
                Sort::new(field, sort.direction())
            })
            .collect();
        let condition = statement
            .condition
            .as_ref()
            .map(|condition| {
                Conditions::get_condition(condition, &statement.entity, &mut params, observer)
            })
            .transpose()?;

        let query = SelectQuery::new(
            observer.fire_entity(&statement.entity),
            columns,
            sorts,
            statement.skip,
            statement.limit,
            condition.map(CriteriaCondition::read_only),
            statement.count,
        );

        Ok((query, params))
    }

    pub fn query(
        text: &str,
        manager: &mut dyn DatabaseManager,
        observer: &dyn QueryObserver,
    ) -> Result<EntityStream, CommunicationError> {
        let (query, params) = Self::parse(text, observer)?;
        ensure_no_parameters(&params)?;

        if query.is_count() {
            let count = manager.count_query(&query)?;
            let mut entity = crate::entity::Entity::new(query.name());
            entity.add_value("count", count);
            return Ok(Box::new(std::iter::once(entity)));
        }

        manager.select(&query)
    }

    pub fn prepare(
        text: &str,
        observer: &dyn QueryObserver,
    ) -> Result<PreparedStatement, CommunicationError> {
        let (query, params) = Self::parse(text, observer)?;

        Ok(PreparedStatement::select(query, params, text.to_string()))
    }
}

///
/// DeleteQueryParser
///

pub struct DeleteQueryParser;

impl DeleteQueryParser {
    fn parse(
        text: &str,
        observer: &dyn QueryObserver,
    ) -> Result<(DeleteQuery, Params), CommunicationError> {
        let statement = grammar::parse_delete(text)?;
        let mut params = Params::default();

        let columns = statement
            .columns
            .iter()
            .map(|column| observer.fire_field(&statement.entity, column))
            .collect();
        let condition = statement
            .condition
            .as_ref()
            .map(|condition| {
                Conditions::get_condition(condition, &statement.entity, &mut params, observer)
            })
            .transpose()?;

        let query = DeleteQuery::new(
            observer.fire_entity(&statement.entity),
            columns,
            condition.map(CriteriaCondition::read_only),
        );

        Ok((query, params))
    }

    pub fn query(
        text: &str,
        manager: &mut dyn DatabaseManager,
        observer: &dyn QueryObserver,
    ) -> Result<EntityStream, CommunicationError> {
        let (query, params) = Self::parse(text, observer)?;
        ensure_no_parameters(&params)?;

        manager.delete(&query)?;

        // delete always yields an empty sequence
        Ok(Box::new(std::iter::empty()))
    }

    pub fn prepare(
        text: &str,
        observer: &dyn QueryObserver,
    ) -> Result<PreparedStatement, CommunicationError> {
        let (query, params) = Self::parse(text, observer)?;

        Ok(PreparedStatement::delete(query, params, text.to_string()))
    }
}

///
/// UpdateQueryParser
///

pub struct UpdateQueryParser;

impl UpdateQueryParser {
    fn parse(
        text: &str,
        observer: &dyn QueryObserver,
    ) -> Result<(UpdateQuery, Params), CommunicationError> {
        let statement = grammar::parse_update(text)?;
        let mut params = Params::default();

        let set = statement
            .set
            .iter()
            .map(|(field, value)| {
                let field = observer.fire_field(&statement.entity, field);
                Values::get(value, &mut params)
                    .map(|value| crate::entity::Element::of(field, value))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let condition = statement
            .condition
            .as_ref()
            .map(|condition| {
                Conditions::get_condition(condition, &statement.entity, &mut params, observer)
            })
            .transpose()?;

        let query = UpdateQuery::new(
            observer.fire_entity(&statement.entity),
            set,
            condition.map(CriteriaCondition::read_only),
        );

        Ok((query, params))
    }

    pub fn query(
        text: &str,
        manager: &mut dyn DatabaseManager,
        observer: &dyn QueryObserver,
    ) -> Result<EntityStream, CommunicationError> {
        let (query, params) = Self::parse(text, observer)?;
        ensure_no_parameters(&params)?;

        let updated = manager.update_query(&query)?;

        Ok(Box::new(updated.into_iter()))
    }

    pub fn prepare(
        text: &str,
        observer: &dyn QueryObserver,
    ) -> Result<PreparedStatement, CommunicationError> {
        let (query, params) = Self::parse(text, observer)?;

        Ok(PreparedStatement::update(query, params, text.to_string()))
    }
}
