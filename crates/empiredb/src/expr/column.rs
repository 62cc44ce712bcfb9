//! Column expressions and phrase-template rendering.

use super::{CmdParam, CompareExpr, CompareOp, CompareValue, IntoExpr, SqlContext};
use crate::builder::SqlBuilder;
use crate::command::{Command, OrderBy};
use crate::config::ParamMode;
use crate::dbms::DbmsHandler;
use crate::error::{DbError, DbResult};
use crate::phrase::{Phrase, PhraseTemplate, Segment};
use crate::table::{ColumnRef, RowSetMeta};
use crate::types::{DataType, Value};
use std::sync::Arc;

/// Arithmetic operator of a calculated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CalcOp {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Add => " + ",
            Self::Sub => " - ",
            Self::Mul => " * ",
            Self::Div => " / ",
        }
    }
}

/// A function call resolved through a dialect phrase.
#[derive(Debug, Clone)]
pub struct FuncExpr {
    pub phrase: Phrase,
    /// Substituted for `?`.
    pub operand: Option<ColumnExpr>,
    /// Substituted for `{0}`, `{1}`, ...
    pub args: Vec<ColumnExpr>,
    pub data_type: DataType,
    pub aggregate: bool,
}

impl FuncExpr {
    fn append_sql(&self, b: &mut SqlBuilder, ctx: SqlContext) -> DbResult<()> {
        let template = b.dbms().require_phrase(self.phrase)?;
        if self.aggregate {
            if b.in_where {
                return Err(DbError::invalid_expression(format!(
                    "aggregate function {} is not allowed in WHERE",
                    self.phrase
                )));
            }
            if b.aggregate_depth > 0 {
                return Err(DbError::invalid_expression(format!(
                    "aggregate function {} is nested inside another aggregate",
                    self.phrase
                )));
            }
            b.aggregate_depth += 1;
        }
        let result = append_template(
            b,
            template,
            |b| match &self.operand {
                Some(operand) => operand.append_sql(b, ctx.child()),
                None => Err(missing_operand(template)),
            },
            |b, index, data_type| match self.args.get(index) {
                Some(arg) => append_arg(b, arg, data_type, ctx),
                None => Err(missing_arg(template, index)),
            },
        );
        if self.aggregate {
            b.aggregate_depth -= 1;
        }
        result
    }
}

/// A node of a column expression tree.
#[derive(Debug, Clone)]
pub enum ColumnExpr {
    Column(ColumnRef),
    Value {
        value: Value,
        data_type: DataType,
    },
    Param(CmdParam),
    Func(Box<FuncExpr>),
    Calc {
        op: CalcOp,
        left: Box<ColumnExpr>,
        right: Box<ColumnExpr>,
    },
    /// Concatenation through the dialect's concat operator or function.
    Concat(Vec<ColumnExpr>),
    Alias {
        expr: Box<ColumnExpr>,
        alias: String,
    },
    /// Value mapping rendered with the DECODE phrases.
    Case {
        operand: Box<ColumnExpr>,
        whens: Vec<(ColumnExpr, ColumnExpr)>,
        otherwise: Option<Box<ColumnExpr>>,
    },
    /// Searched `CASE WHEN condition THEN value ... END`.
    CaseWhen {
        whens: Vec<(CompareExpr, ColumnExpr)>,
        otherwise: Option<Box<ColumnExpr>>,
    },
    /// Type conversion through the dialect's conversion template.
    Convert {
        expr: Box<ColumnExpr>,
        to: DataType,
        format: Option<String>,
    },
    SubQuery(Box<Command>),
    /// SQL text emitted verbatim.
    Raw {
        sql: String,
        data_type: DataType,
    },
}

impl ColumnExpr {
    /// A value typed by its natural data type.
    pub fn value(value: impl Into<Value>) -> Self {
        let value = value.into();
        let data_type = value.data_type();
        Self::Value { value, data_type }
    }

    pub fn typed_value(value: impl Into<Value>, data_type: DataType) -> Self {
        Self::Value {
            value: value.into(),
            data_type,
        }
    }

    pub fn raw(sql: impl Into<String>, data_type: DataType) -> Self {
        Self::Raw {
            sql: sql.into(),
            data_type,
        }
    }

    /// A phrase-based function; aggregate phrases mark the node aggregate.
    pub fn func(
        phrase: Phrase,
        operand: Option<ColumnExpr>,
        args: Vec<ColumnExpr>,
        data_type: DataType,
    ) -> Self {
        Self::Func(Box::new(FuncExpr {
            phrase,
            operand,
            args,
            data_type,
            aggregate: phrase.is_aggregate(),
        }))
    }

    pub fn current_date() -> Self {
        Self::func(Phrase::SQL_CURRENT_DATE, None, Vec::new(), DataType::Date)
    }

    pub fn current_time() -> Self {
        Self::func(Phrase::SQL_CURRENT_TIME, None, Vec::new(), DataType::Time)
    }

    pub fn current_timestamp() -> Self {
        Self::func(Phrase::SQL_CURRENT_TIMESTAMP, None, Vec::new(), DataType::DateTime)
    }

    /// `count(*)`
    pub fn count_all() -> Self {
        Self::func(
            Phrase::SQL_FUNC_COUNT,
            Some(Self::raw("*", DataType::Unknown)),
            Vec::new(),
            DataType::Integer,
        )
    }

    pub fn subquery(cmd: Command) -> Self {
        Self::SubQuery(Box::new(cmd))
    }

    pub fn case_when<I>(whens: I, otherwise: Option<ColumnExpr>) -> Self
    where
        I: IntoIterator<Item = (CompareExpr, ColumnExpr)>,
    {
        Self::CaseWhen {
            whens: whens.into_iter().collect(),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// Give a value node the type of the expression it is compared with or assigned to.
    pub(crate) fn typed_as(self, data_type: DataType) -> Self {
        match self {
            Self::Value { value, .. } if data_type != DataType::Unknown => Self::Value {
                value,
                data_type: match data_type {
                    DataType::AutoInc => DataType::Integer,
                    other => other,
                },
            },
            other => other,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Column(c) => c.data_type(),
            Self::Value { data_type, .. } | Self::Raw { data_type, .. } => *data_type,
            Self::Param(p) => p.data_type(),
            Self::Func(f) => f.data_type,
            Self::Calc { left, right, .. } => match (left.data_type(), right.data_type()) {
                (DataType::Float, _) | (_, DataType::Float) => DataType::Float,
                (DataType::Decimal, _) | (_, DataType::Decimal) => DataType::Decimal,
                (DataType::AutoInc, _) => DataType::Integer,
                (l, _) => l,
            },
            Self::Concat(_) => DataType::Varchar,
            Self::Alias { expr, .. } => expr.data_type(),
            Self::Case { whens, .. } => whens
                .first()
                .map_or(DataType::Unknown, |(_, then)| then.data_type()),
            Self::CaseWhen { whens, .. } => whens
                .first()
                .map_or(DataType::Unknown, |(_, then)| then.data_type()),
            Self::Convert { to, .. } => *to,
            Self::SubQuery(cmd) => cmd.select_data_type(),
        }
    }

    /// Whether this expression aggregates over rows.
    pub fn is_aggregate(&self) -> bool {
        match self {
            Self::Func(f) => {
                f.aggregate
                    || f.operand.as_ref().is_some_and(ColumnExpr::is_aggregate)
                    || f.args.iter().any(ColumnExpr::is_aggregate)
            }
            Self::Calc { left, right, .. } => left.is_aggregate() || right.is_aggregate(),
            Self::Concat(items) => items.iter().any(ColumnExpr::is_aggregate),
            Self::Alias { expr, .. } | Self::Convert { expr, .. } => expr.is_aggregate(),
            Self::Case {
                operand,
                whens,
                otherwise,
            } => {
                operand.is_aggregate()
                    || whens.iter().any(|(w, t)| w.is_aggregate() || t.is_aggregate())
                    || otherwise.as_ref().is_some_and(|o| o.is_aggregate())
            }
            Self::CaseWhen { whens, otherwise } => {
                whens.iter().any(|(c, t)| c.is_aggregate() || t.is_aggregate())
                    || otherwise.as_ref().is_some_and(|o| o.is_aggregate())
            }
            Self::Column(_)
            | Self::Value { .. }
            | Self::Param(_)
            | Self::SubQuery(_)
            | Self::Raw { .. } => false,
        }
    }

    /// The column behind a plain or aliased column expression.
    pub fn column_ref(&self) -> Option<&ColumnRef> {
        match self {
            Self::Column(c) => Some(c),
            Self::Alias { expr, .. } => expr.column_ref(),
            _ => None,
        }
    }

    /// The expression without any alias wrappers.
    pub fn unaliased(&self) -> &ColumnExpr {
        match self {
            Self::Alias { expr, .. } => expr.unaliased(),
            other => other,
        }
    }

    /// Collect the rowsets referenced by this expression (subqueries excluded).
    pub fn collect_rowsets(&self, out: &mut Vec<Arc<RowSetMeta>>) {
        match self {
            Self::Column(c) => add_rowset(out, c.rowset()),
            Self::Func(f) => {
                if let Some(operand) = &f.operand {
                    operand.collect_rowsets(out);
                }
                for arg in &f.args {
                    arg.collect_rowsets(out);
                }
            }
            Self::Calc { left, right, .. } => {
                left.collect_rowsets(out);
                right.collect_rowsets(out);
            }
            Self::Concat(items) => items.iter().for_each(|i| i.collect_rowsets(out)),
            Self::Alias { expr, .. } | Self::Convert { expr, .. } => expr.collect_rowsets(out),
            Self::Case {
                operand,
                whens,
                otherwise,
            } => {
                operand.collect_rowsets(out);
                for (w, t) in whens {
                    w.collect_rowsets(out);
                    t.collect_rowsets(out);
                }
                if let Some(o) = otherwise {
                    o.collect_rowsets(out);
                }
            }
            Self::CaseWhen { whens, otherwise } => {
                for (c, t) in whens {
                    c.collect_rowsets(out);
                    t.collect_rowsets(out);
                }
                if let Some(o) = otherwise {
                    o.collect_rowsets(out);
                }
            }
            Self::Value { .. } | Self::Param(_) | Self::SubQuery(_) | Self::Raw { .. } => {}
        }
    }

    /// Append this expression to `b`.
    pub fn append_sql(&self, b: &mut SqlBuilder, ctx: SqlContext) -> DbResult<()> {
        match self {
            Self::Column(col) => {
                append_column(b, col, ctx);
                Ok(())
            }
            Self::Value { value, data_type } => {
                b.push_value(value, *data_type, ctx.contains(SqlContext::INLINE))
            }
            Self::Param(p) => p.append_sql(b, ctx.contains(SqlContext::INLINE)),
            Self::Func(f) => f.append_sql(b, ctx),
            Self::Calc { op, left, right } => {
                let parens = !ctx.contains(SqlContext::NOPARENTHESES);
                if parens {
                    b.push('(');
                }
                left.append_sql(b, ctx.child())?;
                b.push_str(op.sql());
                right.append_sql(b, ctx.child())?;
                if parens {
                    b.push(')');
                }
                Ok(())
            }
            Self::Concat(items) => append_concat(b, items, ctx),
            Self::Alias { expr, alias } => {
                if ctx.contains(SqlContext::ALIAS) {
                    expr.append_sql(b, ctx.without(SqlContext::ALIAS))?;
                    let rename = b.dbms().require_phrase(Phrase::SQL_RENAME_COLUMN)?;
                    b.push_str(rename);
                    b.push_name(alias);
                    Ok(())
                } else if ctx.contains(SqlContext::VALUE) {
                    expr.append_sql(b, ctx)
                } else {
                    b.push_name(alias);
                    Ok(())
                }
            }
            Self::Case {
                operand,
                whens,
                otherwise,
            } => append_decode(b, operand, whens, otherwise.as_deref(), ctx),
            Self::CaseWhen { whens, otherwise } => {
                if whens.is_empty() {
                    return Err(DbError::invalid_expression("CASE without WHEN branches"));
                }
                b.push_str("CASE");
                for (cond, then) in whens {
                    b.push_str(" WHEN ");
                    cond.append_sql(b, ctx.child() | SqlContext::NOPARENTHESES)?;
                    b.push_str(" THEN ");
                    then.append_sql(b, ctx.child())?;
                }
                if let Some(otherwise) = otherwise {
                    b.push_str(" ELSE ");
                    otherwise.append_sql(b, ctx.child())?;
                }
                b.push_str(" END");
                Ok(())
            }
            Self::Convert { expr, to, format } => {
                let template = b.dbms().convert_phrase(*to, expr.data_type(), format.as_deref())?;
                append_template(
                    b,
                    &template,
                    |b| expr.append_sql(b, ctx.child()),
                    |b, index, data_type| match (index, format) {
                        (0, Some(format)) => b.push_literal(
                            &Value::Text(format.clone()),
                            data_type.unwrap_or(DataType::Varchar),
                        ),
                        _ => Err(missing_arg(&template, index)),
                    },
                )
            }
            Self::SubQuery(cmd) => {
                b.push('(');
                cmd.append_select(b)?;
                b.push(')');
                Ok(())
            }
            Self::Raw { sql, .. } => {
                b.push_str(sql);
                Ok(())
            }
        }
    }

    /// Render with the default context and inline literals.
    pub fn to_sql(&self, dbms: &Arc<dyn DbmsHandler>) -> DbResult<String> {
        let mut b = SqlBuilder::new(Arc::clone(dbms), ParamMode::Literal);
        self.append_sql(&mut b, SqlContext::DEFAULT)?;
        Ok(b.finish().sql)
    }
}

impl From<ColumnRef> for ColumnExpr {
    fn from(col: ColumnRef) -> Self {
        Self::Column(col)
    }
}

impl From<&ColumnRef> for ColumnExpr {
    fn from(col: &ColumnRef) -> Self {
        Self::Column(col.clone())
    }
}

pub(crate) fn add_rowset(out: &mut Vec<Arc<RowSetMeta>>, rowset: &Arc<RowSetMeta>) {
    let key = rowset.key();
    if !out.iter().any(|r| r.key() == key) {
        out.push(Arc::clone(rowset));
    }
}

fn append_column(b: &mut SqlBuilder, col: &ColumnRef, ctx: SqlContext) {
    if ctx.contains(SqlContext::FULLNAME) && b.qualify {
        b.push_name(col.rowset().qualifier());
        b.push('.');
    }
    b.push_name(col.column_name());
}

fn missing_operand(template: &str) -> DbError {
    DbError::invalid_expression(format!(
        "template \"{template}\" has no expression to substitute for '?'"
    ))
}

fn missing_arg(template: &str, index: usize) -> DbError {
    DbError::invalid_expression(format!(
        "template \"{template}\" references missing argument {{{index}}}"
    ))
}

/// Substitute a phrase template segment by segment, in textual order.
pub(crate) fn append_template<O, A>(
    b: &mut SqlBuilder,
    template: &str,
    mut operand: O,
    mut arg: A,
) -> DbResult<()>
where
    O: FnMut(&mut SqlBuilder) -> DbResult<()>,
    A: FnMut(&mut SqlBuilder, usize, Option<DataType>) -> DbResult<()>,
{
    let parsed = PhraseTemplate::parse(template)?;
    for segment in &parsed.segments {
        match segment {
            Segment::Text(text) => b.push_str(text),
            Segment::Operand => operand(b)?,
            Segment::Arg { index, data_type } => arg(b, *index, *data_type)?,
        }
    }
    Ok(())
}

/// Function arguments are always emitted as literals.
fn append_arg(
    b: &mut SqlBuilder,
    arg: &ColumnExpr,
    data_type: Option<DataType>,
    ctx: SqlContext,
) -> DbResult<()> {
    match arg {
        ColumnExpr::Value {
            value,
            data_type: natural,
        } => b.push_literal(value, data_type.unwrap_or(*natural)),
        ColumnExpr::Param(p) => b.push_literal(&p.value(), data_type.unwrap_or(p.data_type())),
        other => other.append_sql(b, ctx.child() | SqlContext::INLINE),
    }
}

fn append_concat(b: &mut SqlBuilder, items: &[ColumnExpr], ctx: SqlContext) -> DbResult<()> {
    if items.is_empty() {
        return Err(DbError::invalid_expression("concatenation without operands"));
    }
    if let Some(op) = b.dbms().phrase(Phrase::SQL_CONCAT_EXPR) {
        let parens = items.len() > 1 && !ctx.contains(SqlContext::NOPARENTHESES);
        if parens {
            b.push('(');
        }
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                b.push_str(op);
            }
            item.append_sql(b, ctx.child())?;
        }
        if parens {
            b.push(')');
        }
        return Ok(());
    }
    let func = b.dbms().require_phrase(Phrase::SQL_FUNC_CONCAT)?;
    append_template(
        b,
        func,
        |b| {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    b.push_str(", ");
                }
                item.append_sql(b, ctx.child())?;
            }
            Ok(())
        },
        |_, index, _| Err(missing_arg(func, index)),
    )
}

fn append_decode(
    b: &mut SqlBuilder,
    operand: &ColumnExpr,
    whens: &[(ColumnExpr, ColumnExpr)],
    otherwise: Option<&ColumnExpr>,
    ctx: SqlContext,
) -> DbResult<()> {
    if whens.is_empty() {
        return Err(DbError::invalid_expression("decode without value mappings"));
    }
    let dbms = b.dbms();
    let template = dbms.require_phrase(Phrase::SQL_FUNC_DECODE)?;
    let sep = dbms.require_phrase(Phrase::SQL_FUNC_DECODE_SEP)?;
    let part = dbms.require_phrase(Phrase::SQL_FUNC_DECODE_PART)?;
    let else_part = dbms.require_phrase(Phrase::SQL_FUNC_DECODE_ELSE)?;
    append_template(
        b,
        template,
        |b| operand.append_sql(b, ctx.child()),
        |b, index, _| {
            if index != 0 {
                return Err(missing_arg(template, index));
            }
            for (i, (when, then)) in whens.iter().enumerate() {
                if i > 0 {
                    b.push_str(sep);
                }
                append_template(
                    b,
                    part,
                    |_| Err(missing_operand(part)),
                    |b, index, data_type| match index {
                        0 => append_arg(b, when, data_type, ctx),
                        1 => append_arg(b, then, data_type, ctx),
                        _ => Err(missing_arg(part, index)),
                    },
                )?;
            }
            if let Some(otherwise) = otherwise {
                b.push_str(sep);
                append_template(
                    b,
                    else_part,
                    |_| Err(missing_operand(else_part)),
                    |b, index, data_type| match index {
                        0 => append_arg(b, otherwise, data_type, ctx),
                        _ => Err(missing_arg(else_part, index)),
                    },
                )?;
            }
            Ok(())
        },
    )
}

/// Expression builder methods shared by column handles and expressions.
pub trait SqlExpr {
    fn to_expr(&self) -> ColumnExpr;

    /// Apply `phrase` with this expression as operand.
    fn func(&self, phrase: Phrase, args: Vec<ColumnExpr>, data_type: DataType) -> ColumnExpr {
        ColumnExpr::func(phrase, Some(self.to_expr()), args, data_type)
    }

    #[doc(hidden)]
    fn same_type_func(&self, phrase: Phrase, args: Vec<ColumnExpr>) -> ColumnExpr {
        let expr = self.to_expr();
        let data_type = match expr.data_type() {
            DataType::AutoInc => DataType::Integer,
            other => other,
        };
        ColumnExpr::func(phrase, Some(expr), args, data_type)
    }

    fn alias(&self, alias: impl Into<String>) -> ColumnExpr {
        ColumnExpr::Alias {
            expr: Box::new(self.to_expr()),
            alias: alias.into(),
        }
    }

    fn upper(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_UPPER, Vec::new())
    }

    fn lower(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_LOWER, Vec::new())
    }

    fn trim(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_TRIM, Vec::new())
    }

    fn trim_left(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_LTRIM, Vec::new())
    }

    fn trim_right(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_RTRIM, Vec::new())
    }

    fn reverse(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_REVERSE, Vec::new())
    }

    fn length(&self) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_LENGTH, Vec::new(), DataType::Integer)
    }

    /// `substring` from a 1-based position.
    fn substring(&self, pos: impl IntoExpr) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_SUBSTRING, vec![pos.into_expr()], DataType::Varchar)
    }

    fn substring_len(&self, pos: impl IntoExpr, len: impl IntoExpr) -> ColumnExpr {
        self.func(
            Phrase::SQL_FUNC_SUBSTRINGEX,
            vec![pos.into_expr(), len.into_expr()],
            DataType::Varchar,
        )
    }

    fn replace(&self, from: impl IntoExpr, to: impl IntoExpr) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_REPLACE, vec![from.into_expr(), to.into_expr()])
    }

    /// 1-based position of `needle`, 0 when absent.
    fn index_of(&self, needle: impl IntoExpr) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_STRINDEX, vec![needle.into_expr()], DataType::Integer)
    }

    fn index_of_from(&self, needle: impl IntoExpr, from: impl IntoExpr) -> ColumnExpr {
        self.func(
            Phrase::SQL_FUNC_STRINDEXFROM,
            vec![needle.into_expr(), from.into_expr()],
            DataType::Integer,
        )
    }

    fn coalesce(&self, fallback: impl IntoExpr) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_COALESCE, vec![fallback.into_expr()])
    }

    fn abs(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_ABS, Vec::new())
    }

    fn ceiling(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_CEILING, Vec::new())
    }

    fn floor(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_FLOOR, Vec::new())
    }

    fn round(&self, decimals: i32) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_ROUND, vec![ColumnExpr::value(decimals)])
    }

    fn trunc(&self, decimals: i32) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_TRUNC, vec![ColumnExpr::value(decimals)])
    }

    fn modulo(&self, divisor: impl IntoExpr) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_MODULO, vec![divisor.into_expr()])
    }

    /// Dialect-specific formatting with a format string.
    fn format(&self, format: &str) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_FORMAT, vec![ColumnExpr::value(format)], DataType::Varchar)
    }

    fn day(&self) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_DAY, Vec::new(), DataType::Integer)
    }

    fn month(&self) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_MONTH, Vec::new(), DataType::Integer)
    }

    fn year(&self) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_YEAR, Vec::new(), DataType::Integer)
    }

    fn sum(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_SUM, Vec::new())
    }

    fn max(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_MAX, Vec::new())
    }

    fn min(&self) -> ColumnExpr {
        self.same_type_func(Phrase::SQL_FUNC_MIN, Vec::new())
    }

    fn avg(&self) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_AVG, Vec::new(), DataType::Decimal)
    }

    fn count(&self) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_COUNT, Vec::new(), DataType::Integer)
    }

    /// String aggregation with a separator.
    fn string_agg(&self, separator: &str) -> ColumnExpr {
        self.func(Phrase::SQL_FUNC_STRAGG, vec![ColumnExpr::value(separator)], DataType::Varchar)
    }

    fn calc(&self, op: CalcOp, other: impl IntoExpr) -> ColumnExpr {
        ColumnExpr::Calc {
            op,
            left: Box::new(self.to_expr()),
            right: Box::new(other.into_expr()),
        }
    }

    fn plus(&self, other: impl IntoExpr) -> ColumnExpr {
        self.calc(CalcOp::Add, other)
    }

    fn minus(&self, other: impl IntoExpr) -> ColumnExpr {
        self.calc(CalcOp::Sub, other)
    }

    fn multiply_with(&self, other: impl IntoExpr) -> ColumnExpr {
        self.calc(CalcOp::Mul, other)
    }

    fn divide_by(&self, other: impl IntoExpr) -> ColumnExpr {
        self.calc(CalcOp::Div, other)
    }

    /// Concatenate `other` after this expression.
    fn append(&self, other: impl IntoExpr) -> ColumnExpr {
        let mut items = match self.to_expr() {
            ColumnExpr::Concat(items) => items,
            expr => vec![expr],
        };
        items.push(other.into_expr());
        ColumnExpr::Concat(items)
    }

    fn convert_to(&self, to: DataType) -> ColumnExpr {
        ColumnExpr::Convert {
            expr: Box::new(self.to_expr()),
            to,
            format: None,
        }
    }

    fn convert_to_format(&self, to: DataType, format: impl Into<String>) -> ColumnExpr {
        ColumnExpr::Convert {
            expr: Box::new(self.to_expr()),
            to,
            format: Some(format.into()),
        }
    }

    /// Map values: `case X when a then b ... end` (or the dialect's decode form).
    fn decode<I, K, V>(&self, pairs: I) -> ColumnExpr
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoExpr,
        V: IntoExpr,
    {
        ColumnExpr::Case {
            operand: Box::new(self.to_expr()),
            whens: pairs
                .into_iter()
                .map(|(k, v)| (k.into_expr(), v.into_expr()))
                .collect(),
            otherwise: None,
        }
    }

    fn decode_else<I, K, V>(&self, pairs: I, otherwise: impl IntoExpr) -> ColumnExpr
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoExpr,
        V: IntoExpr,
    {
        match self.decode(pairs) {
            ColumnExpr::Case { operand, whens, .. } => ColumnExpr::Case {
                operand,
                whens,
                otherwise: Some(Box::new(otherwise.into_expr())),
            },
            other => other,
        }
    }

    fn cmp(&self, op: CompareOp, value: impl IntoExpr) -> CompareExpr {
        CompareExpr::new(self.to_expr(), op, CompareValue::Single(value.into_expr()))
    }

    /// Equality; a null value renders `IS NULL`.
    fn is(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::Eq, value)
    }

    fn eq(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::Eq, value)
    }

    fn not_eq(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::NotEq, value)
    }

    fn less(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::Less, value)
    }

    fn less_or_eq(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::LessOrEq, value)
    }

    fn greater(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::Greater, value)
    }

    fn greater_or_eq(&self, value: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::GreaterOrEq, value)
    }

    fn like(&self, pattern: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::Like, pattern)
    }

    fn not_like(&self, pattern: impl IntoExpr) -> CompareExpr {
        self.cmp(CompareOp::NotLike, pattern)
    }

    fn is_null(&self) -> CompareExpr {
        CompareExpr::new(self.to_expr(), CompareOp::IsNull, CompareValue::None)
    }

    fn is_not_null(&self) -> CompareExpr {
        CompareExpr::new(self.to_expr(), CompareOp::IsNotNull, CompareValue::None)
    }

    fn between(&self, low: impl IntoExpr, high: impl IntoExpr) -> CompareExpr {
        CompareExpr::new(
            self.to_expr(),
            CompareOp::Between,
            CompareValue::Range(low.into_expr(), high.into_expr()),
        )
    }

    fn not_between(&self, low: impl IntoExpr, high: impl IntoExpr) -> CompareExpr {
        CompareExpr::new(
            self.to_expr(),
            CompareOp::NotBetween,
            CompareValue::Range(low.into_expr(), high.into_expr()),
        )
    }

    fn in_list<I, T>(&self, values: I) -> CompareExpr
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        CompareExpr::new(
            self.to_expr(),
            CompareOp::In,
            CompareValue::List(values.into_iter().map(IntoExpr::into_expr).collect()),
        )
    }

    fn not_in<I, T>(&self, values: I) -> CompareExpr
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        CompareExpr::new(
            self.to_expr(),
            CompareOp::NotIn,
            CompareValue::List(values.into_iter().map(IntoExpr::into_expr).collect()),
        )
    }

    fn in_query(&self, cmd: Command) -> CompareExpr {
        CompareExpr::new(self.to_expr(), CompareOp::In, CompareValue::SubQuery(Box::new(cmd)))
    }

    fn asc(&self) -> OrderBy {
        OrderBy::asc(self.to_expr())
    }

    fn desc(&self) -> OrderBy {
        OrderBy::desc(self.to_expr())
    }
}

impl SqlExpr for ColumnExpr {
    fn to_expr(&self) -> ColumnExpr {
        self.clone()
    }
}

impl SqlExpr for ColumnRef {
    fn to_expr(&self) -> ColumnExpr {
        ColumnExpr::Column(self.clone())
    }
}

impl SqlExpr for CmdParam {
    fn to_expr(&self) -> ColumnExpr {
        ColumnExpr::Param(self.clone())
    }
}
