use crate::query::Sort;

///
/// Textual-query AST
///
/// Pure parsed representation of the minimal SQL-like surface. Nothing here
/// is resolved: field names are raw, parameters are unbound, and values are
/// literals. Resolution into the condition algebra happens in
/// [`Conditions`](crate::text::Conditions) / [`Values`](crate::text::Values).
///

///
/// Operator
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    Between,
    And,
    Or,
    Not,
}

///
/// QueryValue
///

#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A bare identifier in value position; resolves to its name string.
    Enum(String),
    /// An `@name` placeholder, bound later through a prepared statement.
    Parameter(String),
    Array(Vec<Self>),
    /// A single wrapped condition (NOT).
    Condition(Box<QueryCondition>),
    /// A child-condition list (AND/OR).
    Conditions(Vec<QueryCondition>),
}

impl QueryValue {
    /// Stable kind label used by error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Enum(_) => "enum",
            Self::Parameter(_) => "parameter",
            Self::Array(_) => "array",
            Self::Condition(_) => "condition",
            Self::Conditions(_) => "conditions",
        }
    }
}

///
/// QueryCondition
///
/// One AST predicate node. Combinator nodes carry an empty field name and a
/// condition-valued payload; the resolver validates the combination.
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: Operator,
    pub value: QueryValue,
}

impl QueryCondition {
    /// Build a comparison node.
    pub fn compare(field: impl Into<String>, operator: Operator, value: QueryValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Build an n-ary AND node.
    #[must_use]
    pub fn and(conditions: Vec<Self>) -> Self {
        Self {
            field: String::new(),
            operator: Operator::And,
            value: QueryValue::Conditions(conditions),
        }
    }

    /// Build an n-ary OR node.
    #[must_use]
    pub fn or(conditions: Vec<Self>) -> Self {
        Self {
            field: String::new(),
            operator: Operator::Or,
            value: QueryValue::Conditions(conditions),
        }
    }

    /// Build a NOT node.
    #[must_use]
    pub fn not(condition: Self) -> Self {
        Self {
            field: String::new(),
            operator: Operator::Not,
            value: QueryValue::Condition(Box::new(condition)),
        }
    }
}

///
/// SelectStatement
///

#[derive(Clone, Debug, PartialEq)]
pub struct SelectStatement {
    pub entity: String,
    pub columns: Vec<String>,
    pub sorts: Vec<Sort>,
    pub skip: u64,
    pub limit: u64,
    pub condition: Option<QueryCondition>,
    pub count: bool,
}

///
/// DeleteStatement
///

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteStatement {
    pub entity: String,
    pub columns: Vec<String>,
    pub condition: Option<QueryCondition>,
}

///
/// UpdateStatement
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateStatement {
    pub entity: String,
    pub set: Vec<(String, QueryValue)>,
    pub condition: Option<QueryCondition>,
}
