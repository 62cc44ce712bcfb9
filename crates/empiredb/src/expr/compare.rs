//! Comparison predicates and their AND/OR/NOT composition.

use super::{ColumnExpr, SqlContext};
use crate::builder::SqlBuilder;
use crate::command::Command;
use crate::error::{DbError, DbResult};
use crate::table::RowSetMeta;
use crate::types::{DataType, Value};
use std::sync::Arc;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Less,
    LessOrEq,
    Greater,
    GreaterOrEq,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
    Between,
    NotBetween,
    In,
    NotIn,
}

impl CompareOp {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => " = ",
            Self::NotEq => " <> ",
            Self::Less => " < ",
            Self::LessOrEq => " <= ",
            Self::Greater => " > ",
            Self::GreaterOrEq => " >= ",
            Self::Like => " LIKE ",
            Self::NotLike => " NOT LIKE ",
            Self::IsNull => " IS NULL",
            Self::IsNotNull => " IS NOT NULL",
            Self::Between => " BETWEEN ",
            Self::NotBetween => " NOT BETWEEN ",
            Self::In => " IN ",
            Self::NotIn => " NOT IN ",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone)]
pub enum CompareValue {
    None,
    Single(ColumnExpr),
    Range(ColumnExpr, ColumnExpr),
    List(Vec<ColumnExpr>),
    SubQuery(Box<Command>),
}

impl CompareValue {
    fn typed_as(self, data_type: DataType) -> Self {
        match self {
            Self::Single(e) => Self::Single(e.typed_as(data_type)),
            Self::Range(a, b) => Self::Range(a.typed_as(data_type), b.typed_as(data_type)),
            Self::List(items) => {
                Self::List(items.into_iter().map(|e| e.typed_as(data_type)).collect())
            }
            other => other,
        }
    }
}

/// A boolean predicate.
#[derive(Debug, Clone)]
pub enum CompareExpr {
    Compare {
        left: ColumnExpr,
        op: CompareOp,
        right: CompareValue,
    },
    AndOr {
        left: Box<CompareExpr>,
        right: Box<CompareExpr>,
        or: bool,
    },
    Not(Box<CompareExpr>),
    Exists(Box<Command>),
}

impl CompareExpr {
    /// Build a comparison. Values on the right take the type of the left
    /// expression; equality with null becomes `IS NULL` / `IS NOT NULL`.
    pub fn new(left: ColumnExpr, op: CompareOp, right: CompareValue) -> Self {
        let is_null = matches!(
            &right,
            CompareValue::Single(ColumnExpr::Value {
                value: Value::Null,
                ..
            })
        );
        let (op, right) = match op {
            CompareOp::Eq if is_null => (CompareOp::IsNull, CompareValue::None),
            CompareOp::NotEq if is_null => (CompareOp::IsNotNull, CompareValue::None),
            CompareOp::IsNull | CompareOp::IsNotNull => (op, CompareValue::None),
            CompareOp::Like | CompareOp::NotLike => (op, right.typed_as(DataType::Varchar)),
            _ => (op, right.typed_as(left.data_type())),
        };
        Self::Compare { left, op, right }
    }

    pub fn exists(cmd: Command) -> Self {
        Self::Exists(Box::new(cmd))
    }

    pub fn and(self, other: CompareExpr) -> Self {
        Self::AndOr {
            left: Box::new(self),
            right: Box::new(other),
            or: false,
        }
    }

    pub fn or(self, other: CompareExpr) -> Self {
        Self::AndOr {
            left: Box::new(self),
            right: Box::new(other),
            or: true,
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn is_aggregate(&self) -> bool {
        match self {
            Self::Compare { left, right, .. } => {
                left.is_aggregate()
                    || match right {
                        CompareValue::Single(e) => e.is_aggregate(),
                        CompareValue::Range(a, b) => a.is_aggregate() || b.is_aggregate(),
                        CompareValue::List(items) => items.iter().any(ColumnExpr::is_aggregate),
                        CompareValue::None | CompareValue::SubQuery(_) => false,
                    }
            }
            Self::AndOr { left, right, .. } => left.is_aggregate() || right.is_aggregate(),
            Self::Not(inner) => inner.is_aggregate(),
            Self::Exists(_) => false,
        }
    }

    pub fn collect_rowsets(&self, out: &mut Vec<Arc<RowSetMeta>>) {
        match self {
            Self::Compare { left, right, .. } => {
                left.collect_rowsets(out);
                match right {
                    CompareValue::Single(e) => e.collect_rowsets(out),
                    CompareValue::Range(a, b) => {
                        a.collect_rowsets(out);
                        b.collect_rowsets(out);
                    }
                    CompareValue::List(items) => items.iter().for_each(|e| e.collect_rowsets(out)),
                    CompareValue::None | CompareValue::SubQuery(_) => {}
                }
            }
            Self::AndOr { left, right, .. } => {
                left.collect_rowsets(out);
                right.collect_rowsets(out);
            }
            Self::Not(inner) => inner.collect_rowsets(out),
            Self::Exists(_) => {}
        }
    }

    /// Identity used when a new constraint replaces an older one:
    /// the compared column together with the operator.
    pub(crate) fn replace_key(&self) -> Option<(String, CompareOp)> {
        match self {
            Self::Compare { left, op, .. } => {
                let col = left.column_ref()?;
                if let ColumnExpr::Alias { .. } = left {
                    return None;
                }
                let key = format!(
                    "{}.{}",
                    col.rowset().key(),
                    col.column_name().to_ascii_uppercase()
                );
                Some((key, *op))
            }
            _ => None,
        }
    }

    pub fn append_sql(&self, b: &mut SqlBuilder, ctx: SqlContext) -> DbResult<()> {
        match self {
            Self::Compare { left, op, right } => append_compare(b, left, *op, right, ctx),
            Self::AndOr { left, right, or } => {
                let parens = *or && !ctx.contains(SqlContext::NOPARENTHESES);
                if parens {
                    b.push('(');
                }
                left.append_sql(b, ctx.child())?;
                b.push_str(if *or { " OR " } else { " AND " });
                right.append_sql(b, ctx.child())?;
                if parens {
                    b.push(')');
                }
                Ok(())
            }
            Self::Not(inner) => {
                b.push_str("NOT (");
                inner.append_sql(b, ctx.child() | SqlContext::NOPARENTHESES)?;
                b.push(')');
                Ok(())
            }
            Self::Exists(cmd) => {
                b.push_str("EXISTS (");
                cmd.append_select(b)?;
                b.push(')');
                Ok(())
            }
        }
    }
}

fn append_compare(
    b: &mut SqlBuilder,
    left: &ColumnExpr,
    op: CompareOp,
    right: &CompareValue,
    ctx: SqlContext,
) -> DbResult<()> {
    // empty lists cannot be rendered as IN (); emit a constant predicate
    if let CompareValue::List(items) = right
        && items.is_empty()
    {
        match op {
            CompareOp::In => b.push_str("1=0"),
            CompareOp::NotIn => b.push_str("1=1"),
            _ => return Err(mismatch(op)),
        }
        return Ok(());
    }
    left.append_sql(b, ctx.child())?;
    match (op, right) {
        (CompareOp::IsNull | CompareOp::IsNotNull, _) => b.push_str(op.sql()),
        (CompareOp::Between | CompareOp::NotBetween, CompareValue::Range(low, high)) => {
            b.push_str(op.sql());
            low.append_sql(b, ctx.child())?;
            b.push_str(" AND ");
            high.append_sql(b, ctx.child())?;
        }
        (CompareOp::In | CompareOp::NotIn, CompareValue::List(items)) => {
            b.push_str(op.sql());
            b.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    b.push_str(", ");
                }
                item.append_sql(b, ctx.child())?;
            }
            b.push(')');
        }
        (
            CompareOp::Between | CompareOp::NotBetween | CompareOp::In | CompareOp::NotIn,
            CompareValue::Single(_),
        )
        | (CompareOp::Between | CompareOp::NotBetween, CompareValue::SubQuery(_))
        | (_, CompareValue::None | CompareValue::Range(..) | CompareValue::List(_)) => {
            return Err(mismatch(op));
        }
        (_, CompareValue::Single(value)) => {
            b.push_str(op.sql());
            value.append_sql(b, ctx.child())?;
        }
        (_, CompareValue::SubQuery(cmd)) => {
            b.push_str(op.sql());
            b.push('(');
            cmd.append_select(b)?;
            b.push(')');
        }
    }
    Ok(())
}

fn mismatch(op: CompareOp) -> DbError {
    DbError::invalid_expression(format!("operator {op:?} does not accept this kind of operand"))
}
