//! Tokenizer and recursive-descent parser for the minimal SQL-like surface.
//!
//! Command dispatch (which statement shape to parse) is NOT done here; the
//! caller routes through [`QueryParser`](crate::text::QueryParser)'s
//! fixed-width command sniff first.

use crate::{
    query::Sort,
    text::{
        SyntaxError,
        ast::{DeleteStatement, Operator, QueryCondition, QueryValue, SelectStatement,
            UpdateStatement},
    },
};

///
/// Token
///

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Param(String),
    Star,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Str(_) => "string literal".to_string(),
            Self::Int(_) | Self::Float(_) => "number literal".to_string(),
            Self::Param(name) => format!("parameter '@{name}'"),
            Self::Star => "'*'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Eq => "'='".to_string(),
            Self::Gt => "'>'".to_string(),
            Self::Gte => "'>='".to_string(),
            Self::Lt => "'<'".to_string(),
            Self::Lte => "'<='".to_string(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

///
/// Scanner
///

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, SyntaxError> {
    let mut tokens = Vec::new();
    let bytes = input.char_indices().collect::<Vec<_>>();
    let mut i = 0;

    while i < bytes.len() {
        let (position, c) = bytes[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '*' => {
                tokens.push((Token::Star, position));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, position));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, position));
                i += 1;
            }
            '{' => {
                tokens.push((Token::LBrace, position));
                i += 1;
            }
            '}' => {
                tokens.push((Token::RBrace, position));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, position));
                i += 1;
            }
            '=' => {
                tokens.push((Token::Eq, position));
                i += 1;
            }
            '>' => {
                if matches!(bytes.get(i + 1), Some((_, '='))) {
                    tokens.push((Token::Gte, position));
                    i += 2;
                } else {
                    tokens.push((Token::Gt, position));
                    i += 1;
                }
            }
            '<' => {
                if matches!(bytes.get(i + 1), Some((_, '='))) {
                    tokens.push((Token::Lte, position));
                    i += 2;
                } else {
                    tokens.push((Token::Lt, position));
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                let mut j = i + 1;
                let mut closed = false;
                while j < bytes.len() {
                    let (_, cj) = bytes[j];
                    if cj == '\\' && j + 1 < bytes.len() {
                        text.push(bytes[j + 1].1);
                        j += 2;
                        continue;
                    }
                    if cj == quote {
                        closed = true;
                        break;
                    }
                    text.push(cj);
                    j += 1;
                }
                if !closed {
                    return Err(SyntaxError::parse("unterminated string literal", position));
                }
                tokens.push((Token::Str(text), position));
                i = j + 1;
            }
            '@' => {
                let mut name = String::new();
                let mut j = i + 1;
                while j < bytes.len() && is_ident_continue(bytes[j].1) {
                    name.push(bytes[j].1);
                    j += 1;
                }
                if name.is_empty() {
                    return Err(SyntaxError::parse("'@' must be followed by a parameter name", position));
                }
                tokens.push((Token::Param(name), position));
                i = j;
            }
            _ if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                text.push(c);
                let mut j = i + 1;
                let mut is_float = false;
                while j < bytes.len() {
                    let cj = bytes[j].1;
                    if cj.is_ascii_digit() {
                        text.push(cj);
                    } else if cj == '.' && !is_float {
                        is_float = true;
                        text.push(cj);
                    } else {
                        break;
                    }
                    j += 1;
                }
                let token = if is_float {
                    text.parse::<f64>()
                        .map(Token::Float)
                        .map_err(|_| SyntaxError::parse("malformed number literal", position))?
                } else {
                    text.parse::<i64>()
                        .map(Token::Int)
                        .map_err(|_| SyntaxError::parse("malformed number literal", position))?
                };
                tokens.push((token, position));
                i = j;
            }
            _ if is_ident_start(c) => {
                let mut name = String::new();
                name.push(c);
                let mut j = i + 1;
                while j < bytes.len() && is_ident_continue(bytes[j].1) {
                    name.push(bytes[j].1);
                    j += 1;
                }
                tokens.push((Token::Ident(name), position));
                i = j;
            }
            _ => {
                return Err(SyntaxError::parse(
                    format!("unexpected character '{c}'"),
                    position,
                ));
            }
        }
    }

    Ok(tokens)
}

///
/// Parser
///

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, SyntaxError> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            end: input.len(),
        })
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, p)| *p)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::parse(message, self.position())
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), SyntaxError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected keyword '{keyword}'")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            Some(token) => Err(self.error(format!("expected {what}, found {}", token.describe()))),
            None => Err(self.error(format!("expected {what}, found end of query"))),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), SyntaxError> {
        match self.advance() {
            Some(token) if token == *expected => Ok(()),
            Some(token) => Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                token.describe()
            ))),
            None => Err(self.error(format!(
                "expected {}, found end of query",
                expected.describe()
            ))),
        }
    }

    fn expect_uint(&mut self, what: &str) -> Result<u64, SyntaxError> {
        match self.advance() {
            Some(Token::Int(n)) if n >= 0 => Ok(u64::try_from(n).unwrap_or_default()),
            Some(Token::Int(_)) => Err(self.error(format!("{what} must be non-negative"))),
            Some(token) => Err(self.error(format!("expected {what}, found {}", token.describe()))),
            None => Err(self.error(format!("expected {what}, found end of query"))),
        }
    }

    fn expect_end(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("unexpected trailing {}", token.describe()))),
        }
    }

    ///
    /// STATEMENTS
    ///

    fn select_statement(&mut self) -> Result<SelectStatement, SyntaxError> {
        self.expect_keyword("select")?;

        let mut columns = Vec::new();
        let mut count = false;
        if self.peek() == Some(&Token::Star) {
            self.pos += 1;
        } else if self.peek_keyword("count") {
            self.pos += 1;
            self.expect_token(&Token::LParen)?;
            self.expect_token(&Token::Star)?;
            self.expect_token(&Token::RParen)?;
            count = true;
        } else {
            loop {
                columns.push(self.expect_ident("a column name")?);
                if self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    continue;
                }
                break;
            }
        }

        self.expect_keyword("from")?;
        let entity = self.expect_ident("an entity name")?;

        let condition = if self.eat_keyword("where") {
            Some(self.or_expression()?)
        } else {
            None
        };

        let mut sorts = Vec::new();
        if self.eat_keyword("order") {
            self.expect_keyword("by")?;
            loop {
                let field = self.expect_ident("a sort field")?;
                let sort = if self.eat_keyword("desc") {
                    Sort::desc(field)
                } else {
                    self.eat_keyword("asc");
                    Sort::asc(field)
                };
                sorts.push(sort);
                if self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    continue;
                }
                break;
            }
        }

        let skip = if self.eat_keyword("skip") {
            self.expect_uint("a skip count")?
        } else {
            0
        };
        let limit = if self.eat_keyword("limit") {
            self.expect_uint("a limit")?
        } else {
            0
        };

        self.expect_end()?;

        Ok(SelectStatement {
            entity,
            columns,
            sorts,
            skip,
            limit,
            condition,
            count,
        })
    }

    fn delete_statement(&mut self) -> Result<DeleteStatement, SyntaxError> {
        self.expect_keyword("delete")?;

        let mut columns = Vec::new();
        if !self.peek_keyword("from") {
            loop {
                columns.push(self.expect_ident("a column name")?);
                if self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    continue;
                }
                break;
            }
        }

        self.expect_keyword("from")?;
        let entity = self.expect_ident("an entity name")?;

        let condition = if self.eat_keyword("where") {
            Some(self.or_expression()?)
        } else {
            None
        };

        self.expect_end()?;

        Ok(DeleteStatement {
            entity,
            columns,
            condition,
        })
    }

    fn update_statement(&mut self) -> Result<UpdateStatement, SyntaxError> {
        self.expect_keyword("update")?;
        let entity = self.expect_ident("an entity name")?;
        self.expect_keyword("set")?;

        let mut set = Vec::new();
        loop {
            let field = self.expect_ident("a field name")?;
            self.expect_token(&Token::Eq)?;
            let value = self.value()?;
            set.push((field, value));
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                continue;
            }
            break;
        }

        let condition = if self.eat_keyword("where") {
            Some(self.or_expression()?)
        } else {
            None
        };

        self.expect_end()?;

        Ok(UpdateStatement {
            entity,
            set,
            condition,
        })
    }

    ///
    /// CONDITIONS
    ///

    fn or_expression(&mut self) -> Result<QueryCondition, SyntaxError> {
        let first = self.and_expression()?;
        if !self.peek_keyword("or") {
            return Ok(first);
        }

        let mut children = vec![first];
        while self.eat_keyword("or") {
            children.push(self.and_expression()?);
        }
        Ok(QueryCondition::or(children))
    }

    fn and_expression(&mut self) -> Result<QueryCondition, SyntaxError> {
        let first = self.unary_expression()?;
        if !self.peek_keyword("and") {
            return Ok(first);
        }

        let mut children = vec![first];
        while self.eat_keyword("and") {
            children.push(self.unary_expression()?);
        }
        Ok(QueryCondition::and(children))
    }

    fn unary_expression(&mut self) -> Result<QueryCondition, SyntaxError> {
        if self.eat_keyword("not") {
            return Ok(QueryCondition::not(self.unary_expression()?));
        }
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.or_expression()?;
            self.expect_token(&Token::RParen)?;
            return Ok(inner);
        }

        self.comparison()
    }

    fn comparison(&mut self) -> Result<QueryCondition, SyntaxError> {
        let field = self.expect_ident("a field name")?;

        if self.eat_keyword("in") {
            self.expect_token(&Token::LParen)?;
            let mut items = Vec::new();
            if self.peek() != Some(&Token::RParen) {
                loop {
                    items.push(self.value()?);
                    if self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
            }
            self.expect_token(&Token::RParen)?;
            return Ok(QueryCondition::compare(
                field,
                Operator::In,
                QueryValue::Array(items),
            ));
        }

        if self.eat_keyword("between") {
            let low = self.value()?;
            self.expect_keyword("and")?;
            let high = self.value()?;
            return Ok(QueryCondition::compare(
                field,
                Operator::Between,
                QueryValue::Array(vec![low, high]),
            ));
        }

        if self.eat_keyword("like") {
            let value = self.value()?;
            return Ok(QueryCondition::compare(field, Operator::Like, value));
        }

        let operator = match self.advance() {
            Some(Token::Eq) => Operator::Eq,
            Some(Token::Gt) => Operator::Gt,
            Some(Token::Gte) => Operator::Gte,
            Some(Token::Lt) => Operator::Lt,
            Some(Token::Lte) => Operator::Lte,
            Some(token) => {
                return Err(self.error(format!(
                    "expected a comparison operator, found {}",
                    token.describe()
                )));
            }
            None => {
                return Err(self.error("expected a comparison operator, found end of query"));
            }
        };
        let value = self.value()?;

        Ok(QueryCondition::compare(field, operator, value))
    }

    ///
    /// VALUES
    ///

    fn value(&mut self) -> Result<QueryValue, SyntaxError> {
        if self.peek() == Some(&Token::LBrace) {
            self.pos += 1;
            let mut items = Vec::new();
            if self.peek() != Some(&Token::RBrace) {
                loop {
                    items.push(self.value()?);
                    if self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
            }
            self.expect_token(&Token::RBrace)?;
            return Ok(QueryValue::Array(items));
        }

        match self.advance() {
            Some(Token::Int(n)) => Ok(QueryValue::Int(n)),
            Some(Token::Float(f)) => Ok(QueryValue::Float(f)),
            Some(Token::Str(s)) => Ok(QueryValue::Text(s)),
            Some(Token::Param(name)) => Ok(QueryValue::Parameter(name)),
            Some(Token::Ident(name)) if name.eq_ignore_ascii_case("true") => {
                Ok(QueryValue::Bool(true))
            }
            Some(Token::Ident(name)) if name.eq_ignore_ascii_case("false") => {
                Ok(QueryValue::Bool(false))
            }
            Some(Token::Ident(name)) => Ok(QueryValue::Enum(name)),
            Some(token) => Err(self.error(format!("expected a value, found {}", token.describe()))),
            None => Err(self.error("expected a value, found end of query")),
        }
    }
}

/// Parse a `SELECT` statement.
pub(crate) fn parse_select(input: &str) -> Result<SelectStatement, SyntaxError> {
    Parser::new(input)?.select_statement()
}

/// Parse a `DELETE` statement.
pub(crate) fn parse_delete(input: &str) -> Result<DeleteStatement, SyntaxError> {
    Parser::new(input)?.delete_statement()
}

/// Parse an `UPDATE` statement.
pub(crate) fn parse_update(input: &str) -> Result<UpdateStatement, SyntaxError> {
    Parser::new(input)?.update_statement()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_star_with_full_clause_set() {
        let statement = parse_select(
            "SELECT * FROM Person WHERE age >= 18 AND active = true ORDER BY age ASC, name DESC SKIP 4 LIMIT 10",
        )
        .expect("valid select");

        assert_eq!(statement.entity, "Person");
        assert!(statement.columns.is_empty());
        assert_eq!(statement.sorts, vec![Sort::asc("age"), Sort::desc("name")]);
        assert_eq!(statement.skip, 4);
        assert_eq!(statement.limit, 10);
        assert!(!statement.count);

        let condition = statement.condition.expect("where clause");
        assert_eq!(condition.operator, Operator::And);
        let QueryValue::Conditions(children) = condition.value else {
            panic!("AND carries a child list");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].field, "age");
        assert_eq!(children[0].operator, Operator::Gte);
        assert_eq!(children[0].value, QueryValue::Int(18));
        assert_eq!(children[1].value, QueryValue::Bool(true));
    }

    #[test]
    fn select_with_column_projection() {
        let statement =
            parse_select("select name, age from Person").expect("valid select");
        assert_eq!(statement.columns, vec!["name", "age"]);
        assert!(statement.condition.is_none());
    }

    #[test]
    fn select_count_star() {
        let statement =
            parse_select("SELECT COUNT(*) FROM Person WHERE age > 18").expect("valid count");
        assert!(statement.count);
        assert!(statement.columns.is_empty());
    }

    #[test]
    fn or_binds_looser_than_and() {
        let statement = parse_select("SELECT * FROM p WHERE a = 1 AND b = 2 OR c = 3")
            .expect("valid select");
        let condition = statement.condition.expect("where clause");
        assert_eq!(condition.operator, Operator::Or);
        let QueryValue::Conditions(children) = condition.value else {
            panic!("OR carries a child list");
        };
        assert_eq!(children[0].operator, Operator::And);
        assert_eq!(children[1].operator, Operator::Eq);
    }

    #[test]
    fn parentheses_group_conditions() {
        let statement = parse_select("SELECT * FROM p WHERE a = 1 AND (b = 2 OR c = 3)")
            .expect("valid select");
        let condition = statement.condition.expect("where clause");
        assert_eq!(condition.operator, Operator::And);
        let QueryValue::Conditions(children) = condition.value else {
            panic!("AND carries a child list");
        };
        assert_eq!(children[1].operator, Operator::Or);
    }

    #[test]
    fn not_in_between_like_and_params() {
        let statement = parse_select(
            "SELECT * FROM p WHERE NOT name = 'Ada' AND age BETWEEN 18 AND 65 AND city IN ('a', 'b') AND bio LIKE @pattern",
        )
        .expect("valid select");
        let condition = statement.condition.expect("where clause");
        let QueryValue::Conditions(children) = condition.value else {
            panic!("AND carries a child list");
        };

        assert_eq!(children[0].operator, Operator::Not);
        assert_eq!(
            children[1].value,
            QueryValue::Array(vec![QueryValue::Int(18), QueryValue::Int(65)])
        );
        assert_eq!(children[2].operator, Operator::In);
        assert_eq!(
            children[3].value,
            QueryValue::Parameter("pattern".to_string())
        );
    }

    #[test]
    fn dotted_field_paths_and_enum_values() {
        let statement = parse_select("SELECT * FROM p WHERE address.city = London")
            .expect("valid select");
        let condition = statement.condition.expect("where clause");
        assert_eq!(condition.field, "address.city");
        assert_eq!(condition.value, QueryValue::Enum("London".to_string()));
    }

    #[test]
    fn array_literal_values() {
        let statement =
            parse_update("UPDATE p SET tags = {1, 2, 3}").expect("valid update");
        assert_eq!(
            statement.set[0].1,
            QueryValue::Array(vec![
                QueryValue::Int(1),
                QueryValue::Int(2),
                QueryValue::Int(3),
            ])
        );
    }

    #[test]
    fn delete_with_and_without_columns() {
        let whole = parse_delete("DELETE FROM Person WHERE age < 18").expect("valid delete");
        assert!(whole.columns.is_empty());
        assert!(whole.condition.is_some());

        let fields =
            parse_delete("DELETE nickname, bio FROM Person").expect("valid delete");
        assert_eq!(fields.columns, vec!["nickname", "bio"]);
    }

    #[test]
    fn update_with_condition_and_params() {
        let statement = parse_update("UPDATE Person SET active = false, role = @role WHERE name = 'Ada'")
            .expect("valid update");
        assert_eq!(statement.entity, "Person");
        assert_eq!(statement.set.len(), 2);
        assert_eq!(statement.set[1].1, QueryValue::Parameter("role".to_string()));
        assert!(statement.condition.is_some());
    }

    #[test]
    fn negative_and_float_literals() {
        let statement =
            parse_select("SELECT * FROM p WHERE delta = -4 AND ratio = 1.5").expect("valid select");
        let QueryValue::Conditions(children) = statement.condition.expect("where").value else {
            panic!("AND carries a child list");
        };
        assert_eq!(children[0].value, QueryValue::Int(-4));
        assert_eq!(children[1].value, QueryValue::Float(1.5));
    }

    #[test]
    fn parse_errors_carry_positions() {
        let err = parse_select("SELECT * FROM").expect_err("missing entity");
        assert!(err.to_string().contains("entity name"));

        let err = parse_select("SELECT * FROM p WHERE age ~ 1").expect_err("bad operator");
        assert!(err.to_string().contains("unexpected character"));

        let err = parse_select("SELECT * FROM p WHERE name = 'open").expect_err("open string");
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_select("SELECT * FROM p LIMIT 5 garbage").expect_err("trailing junk");
        assert!(err.to_string().contains("trailing"));
    }
}
