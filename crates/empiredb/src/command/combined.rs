//! UNION / INTERSECT / EXCEPT of two commands.

use super::select::append_order_by;
use super::{Command, OrderBy};
use crate::builder::{SqlBuilder, Statement};
use crate::config::ParamMode;
use crate::error::{DbError, DbResult};
use crate::expr::SqlContext;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl CombineOp {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Union => " UNION ",
            Self::UnionAll => " UNION ALL ",
            Self::Intersect => " INTERSECT ",
            Self::Except => " EXCEPT ",
        }
    }
}

/// Two selects combined by a set operator.
#[derive(Debug, Clone)]
pub struct CombinedCommand {
    left: Command,
    right: Command,
    op: CombineOp,
    order_by: Vec<OrderBy>,
}

impl CombinedCommand {
    pub fn new(left: Command, op: CombineOp, right: Command) -> Self {
        Self {
            left,
            right,
            op,
            order_by: Vec::new(),
        }
    }

    pub fn union(left: Command, right: Command) -> Self {
        Self::new(left, CombineOp::Union, right)
    }

    pub fn union_all(left: Command, right: Command) -> Self {
        Self::new(left, CombineOp::UnionAll, right)
    }

    pub fn intersect(left: Command, right: Command) -> Self {
        Self::new(left, CombineOp::Intersect, right)
    }

    pub fn except(left: Command, right: Command) -> Self {
        Self::new(left, CombineOp::Except, right)
    }

    /// Order the combined result. Columns are referenced by name or alias.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn build(&self) -> DbResult<Statement> {
        if self.left.select.len() != self.right.select.len() {
            return Err(DbError::invalid_expression(format!(
                "combined selects differ in column count ({} vs {})",
                self.left.select.len(),
                self.right.select.len()
            )));
        }
        let dbms = Arc::clone(&self.left.dbms);
        let mode: ParamMode = self.left.mode;
        let mut b = SqlBuilder::new(dbms, mode).with_schema(self.left.schema.clone());
        let parens = b.dbms().parenthesize_combined();
        self.append_member(&mut b, &self.left, parens)?;
        b.push_str(self.op.sql());
        self.append_member(&mut b, &self.right, parens)?;
        b.qualify = false;
        append_order_by(&mut b, &self.order_by, SqlContext::NAME)?;
        Ok(b.finish())
    }

    fn append_member(&self, b: &mut SqlBuilder, cmd: &Command, parens: bool) -> DbResult<()> {
        if parens {
            b.push('(');
        }
        b.qualify = false;
        cmd.append_select(b)?;
        if parens {
            b.push(')');
        }
        Ok(())
    }
}
