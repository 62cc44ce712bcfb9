//! Expression tree: column expressions, comparisons and command parameters.
//!
//! Every node appends itself to a [`SqlBuilder`](crate::builder::SqlBuilder)
//! under a [`SqlContext`] that selects which form is emitted.

mod column;
mod compare;
mod param;

pub use column::{CalcOp, ColumnExpr, FuncExpr, SqlExpr};
pub(crate) use column::add_rowset;
pub use compare::{CompareExpr, CompareOp, CompareValue};
pub use param::CmdParam;

use crate::table::ColumnRef;
use crate::types::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use uuid::Uuid;

/// Rendering context flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlContext(u32);

impl SqlContext {
    /// Plain column names.
    pub const NAME: Self = Self(1);
    /// Column names qualified with their rowset when the command joins rowsets.
    pub const FULLNAME: Self = Self(1 << 1);
    /// Value form of an expression (alias expressions render their inner expression).
    pub const VALUE: Self = Self(1 << 2);
    /// Emit `expr AS alias` for aliased expressions.
    pub const ALIAS: Self = Self(1 << 3);
    /// Omit the outer parentheses of calculations and OR groups.
    pub const NOPARENTHESES: Self = Self(1 << 4);
    /// Render values as literals even in prepared mode.
    pub const INLINE: Self = Self(1 << 5);

    pub const DEFAULT: Self = Self(Self::NAME.0 | Self::FULLNAME.0 | Self::VALUE.0);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Context for child nodes: aliases and parenthesis suppression do not propagate.
    pub(crate) const fn child(self) -> Self {
        self.without(Self(Self::ALIAS.0 | Self::NOPARENTHESES.0))
    }
}

impl Default for SqlContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for SqlContext {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SqlContext {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SqlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(SqlContext, &str); 6] = [
            (SqlContext::NAME, "NAME"),
            (SqlContext::FULLNAME, "FULLNAME"),
            (SqlContext::VALUE, "VALUE"),
            (SqlContext::ALIAS, "ALIAS"),
            (SqlContext::NOPARENTHESES, "NOPARENTHESES"),
            (SqlContext::INLINE, "INLINE"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "SqlContext({})", set.join(" | "))
    }
}

/// Conversion into an expression operand.
pub trait IntoExpr {
    fn into_expr(self) -> ColumnExpr;
}

impl IntoExpr for ColumnExpr {
    fn into_expr(self) -> ColumnExpr {
        self
    }
}

impl IntoExpr for ColumnRef {
    fn into_expr(self) -> ColumnExpr {
        ColumnExpr::Column(self)
    }
}

impl IntoExpr for &ColumnRef {
    fn into_expr(self) -> ColumnExpr {
        ColumnExpr::Column(self.clone())
    }
}

impl IntoExpr for CmdParam {
    fn into_expr(self) -> ColumnExpr {
        ColumnExpr::Param(self)
    }
}

impl IntoExpr for &CmdParam {
    fn into_expr(self) -> ColumnExpr {
        ColumnExpr::Param(self.clone())
    }
}

impl IntoExpr for Value {
    fn into_expr(self) -> ColumnExpr {
        ColumnExpr::value(self)
    }
}

macro_rules! impl_into_expr_for_values {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoExpr for $t {
                fn into_expr(self) -> ColumnExpr {
                    ColumnExpr::value(self)
                }
            }
        )*
    };
}

impl_into_expr_for_values!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    Decimal,
    String,
    &str,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    Uuid,
);
