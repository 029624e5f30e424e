//! Expression types for the SQL plan

use crate::types::BqType;

/// A column reference
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Table alias; empty for unqualified references
    pub table: String,
    /// Column name
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Create an unqualified column reference (no table prefix)
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            table: String::new(),
            name: name.into(),
        }
    }

    /// Fully qualified name: table.column
    pub fn qualified_name(&self) -> String {
        if self.table.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.table, self.name)
        }
    }
}

/// Scalar expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(Column),
    /// Literal value
    Literal(Literal),
    /// Binary comparison (e.g., a = b)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// IFNULL(expr, fallback)
    IfNull(Box<Expr>, Box<Expr>),
    /// COUNT(expr)
    Count(Box<Expr>),
    /// expr IN (subquery)
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<super::clause::Subquery>,
    },
    /// CAST(expr AS type)
    Cast { expr: Box<Expr>, to: BqType },
}

impl Expr {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column(Column::new(table, name))
    }

    pub fn cast(expr: Expr, to: BqType) -> Self {
        Expr::Cast {
            expr: Box::new(expr),
            to,
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::Eq,
            right: Box::new(right),
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Eq,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
        }
    }
}
