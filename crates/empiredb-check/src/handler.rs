//! Callbacks receiving model differences.

use crate::error::CheckResult;
use empiredb::{ColumnRef, DataType, Relation, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::ControlFlow;

/// Kind of schema object named in an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    View,
    Column,
    Relation,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Column => "column",
            Self::Relation => "relation",
        })
    }
}

/// One difference between the declared model and the live database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelIssue {
    ObjectNotFound {
        object: ObjectKind,
        name: String,
    },
    ColumnTypeMismatch {
        table: String,
        column: String,
        expected: DataType,
        found: DataType,
    },
    ColumnSizeMismatch {
        table: String,
        column: String,
        expected: u32,
        found: u32,
    },
    ColumnScaleMismatch {
        table: String,
        column: String,
        expected: u32,
        found: u32,
    },
    ColumnNullabilityMismatch {
        table: String,
        column: String,
        expected_required: bool,
        found_required: bool,
    },
    PrimaryKeyMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    RelationMismatch {
        relation: String,
        expected: String,
        found: String,
    },
}

impl ModelIssue {
    /// Stable name of the issue kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ObjectNotFound { .. } => "object_not_found",
            Self::ColumnTypeMismatch { .. } => "column_type_mismatch",
            Self::ColumnSizeMismatch { .. } => "column_size_mismatch",
            Self::ColumnScaleMismatch { .. } => "column_scale_mismatch",
            Self::ColumnNullabilityMismatch { .. } => "column_nullability_mismatch",
            Self::PrimaryKeyMismatch { .. } => "primary_key_mismatch",
            Self::RelationMismatch { .. } => "relation_mismatch",
        }
    }

    /// The object the issue is about, as `TABLE` or `TABLE.COLUMN`.
    pub fn object(&self) -> String {
        match self {
            Self::ObjectNotFound { name, .. } => name.clone(),
            Self::ColumnTypeMismatch { table, column, .. }
            | Self::ColumnSizeMismatch { table, column, .. }
            | Self::ColumnScaleMismatch { table, column, .. }
            | Self::ColumnNullabilityMismatch { table, column, .. } => format!("{table}.{column}"),
            Self::PrimaryKeyMismatch { table, .. } => table.clone(),
            Self::RelationMismatch { relation, .. } => relation.clone(),
        }
    }

    /// Human-readable description without the object name.
    pub fn detail(&self) -> String {
        match self {
            Self::ObjectNotFound { object, .. } => format!("{object} does not exist"),
            Self::ColumnTypeMismatch { expected, found, .. } => {
                format!("type {expected} expected, found {found}")
            }
            Self::ColumnSizeMismatch { expected, found, .. } => {
                format!("size {expected} expected, found {found}")
            }
            Self::ColumnScaleMismatch { expected, found, .. } => {
                format!("scale {expected} expected, found {found}")
            }
            Self::ColumnNullabilityMismatch { expected_required, .. } => {
                if *expected_required {
                    "NOT NULL expected, column is nullable".to_string()
                } else {
                    "nullable expected, column is NOT NULL".to_string()
                }
            }
            Self::PrimaryKeyMismatch { expected, found, .. } => format!(
                "primary key ({}) expected, found ({})",
                expected.join(", "),
                found.join(", ")
            ),
            Self::RelationMismatch { expected, found, .. } => {
                format!("{expected} expected, found {found}")
            }
        }
    }
}

impl fmt::Display for ModelIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.object(), self.detail())
    }
}

/// Receives differences found by the [`ModelChecker`](crate::ModelChecker).
///
/// Returning [`ControlFlow::Break`] stops the check pass. The typed callbacks
/// all funnel into [`report`](ModelErrorHandler::report) unless overridden.
pub trait ModelErrorHandler {
    fn report(&mut self, issue: ModelIssue) -> ControlFlow<()>;

    fn object_not_found(&mut self, object: ObjectKind, name: &str) -> ControlFlow<()> {
        self.report(ModelIssue::ObjectNotFound {
            object,
            name: name.to_string(),
        })
    }

    fn column_type_mismatch(&mut self, column: &ColumnRef, found: DataType) -> ControlFlow<()> {
        self.report(ModelIssue::ColumnTypeMismatch {
            table: column.table_name().to_string(),
            column: column.column_name().to_string(),
            expected: column.data_type(),
            found,
        })
    }

    fn column_size_mismatch(&mut self, column: &ColumnRef, found: u32) -> ControlFlow<()> {
        self.report(ModelIssue::ColumnSizeMismatch {
            table: column.table_name().to_string(),
            column: column.column_name().to_string(),
            expected: column.column().size,
            found,
        })
    }

    fn column_scale_mismatch(&mut self, column: &ColumnRef, found: u32) -> ControlFlow<()> {
        self.report(ModelIssue::ColumnScaleMismatch {
            table: column.table_name().to_string(),
            column: column.column_name().to_string(),
            expected: column.column().scale,
            found,
        })
    }

    fn column_nullability_mismatch(
        &mut self,
        column: &ColumnRef,
        expected_required: bool,
    ) -> ControlFlow<()> {
        self.report(ModelIssue::ColumnNullabilityMismatch {
            table: column.table_name().to_string(),
            column: column.column_name().to_string(),
            expected_required,
            found_required: !expected_required,
        })
    }

    fn primary_key_mismatch(&mut self, table: &Table, found: &[String]) -> ControlFlow<()> {
        self.report(ModelIssue::PrimaryKeyMismatch {
            table: table.name().to_string(),
            expected: table.primary_key().to_vec(),
            found: found.to_vec(),
        })
    }

    fn relation_mismatch(&mut self, relation: &Relation, found: &Relation) -> ControlFlow<()> {
        self.report(ModelIssue::RelationMismatch {
            relation: relation.name.clone(),
            expected: describe_relation(relation),
            found: describe_relation(found),
        })
    }
}

/// `SRC(A, B) -> TGT(X, Y)`, with ` ON DELETE CASCADE` when set.
pub fn describe_relation(relation: &Relation) -> String {
    let names = |cols: Vec<&ColumnRef>| {
        cols.iter()
            .map(|c| c.column_name().to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut out = format!(
        "{}({}) -> {}({})",
        relation.source_table().to_ascii_uppercase(),
        names(relation.source_columns().collect()),
        relation.target_table().to_ascii_uppercase(),
        names(relation.target_columns().collect()),
    );
    if relation.on_delete_cascade {
        out.push_str(" ON DELETE CASCADE");
    }
    out
}

// ==================== Handlers ====================

/// Logs every issue at WARN and keeps going.
#[derive(Debug, Default)]
pub struct ModelErrorLogger {
    count: usize,
}

impl ModelErrorLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of issues logged so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl ModelErrorHandler for ModelErrorLogger {
    fn report(&mut self, issue: ModelIssue) -> ControlFlow<()> {
        self.count += 1;
        tracing::warn!(
            target: "empiredb.check",
            kind = issue.kind(),
            object = %issue.object(),
            "{}",
            issue.detail(),
        );
        ControlFlow::Continue(())
    }
}

/// Collects every issue.
#[derive(Debug, Default, Clone)]
pub struct ModelErrorCollector {
    issues: Vec<ModelIssue>,
}

impl ModelErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> &[ModelIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ModelIssue> {
        self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// The collected issues as a JSON array.
    pub fn to_json(&self) -> CheckResult<String> {
        Ok(serde_json::to_string_pretty(&self.issues)?)
    }
}

impl ModelErrorHandler for ModelErrorCollector {
    fn report(&mut self, issue: ModelIssue) -> ControlFlow<()> {
        self.issues.push(issue);
        ControlFlow::Continue(())
    }
}

/// Keeps the first issue and stops the pass.
#[derive(Debug, Default)]
pub struct FailFast {
    first: Option<ModelIssue>,
}

impl FailFast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&ModelIssue> {
        self.first.as_ref()
    }

    pub fn into_first(self) -> Option<ModelIssue> {
        self.first
    }
}

impl ModelErrorHandler for FailFast {
    fn report(&mut self, issue: ModelIssue) -> ControlFlow<()> {
        self.first.get_or_insert(issue);
        ControlFlow::Break(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_serialize_with_kind_tag() {
        let issue = ModelIssue::ColumnSizeMismatch {
            table: "EMPLOYEES".into(),
            column: "NAME".into(),
            expected: 40,
            found: 20,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "column_size_mismatch");
        assert_eq!(json["expected"], 40);
        assert_eq!(issue.to_string(), "EMPLOYEES.NAME: size 40 expected, found 20");

        let back: ModelIssue = serde_json::from_value(json).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn type_mismatch_uses_type_names() {
        let issue = ModelIssue::ColumnTypeMismatch {
            table: "T".into(),
            column: "C".into(),
            expected: DataType::Varchar,
            found: DataType::Integer,
        };
        assert_eq!(serde_json::to_value(&issue).unwrap()["expected"], "VARCHAR");
        assert_eq!(issue.kind(), "column_type_mismatch");
    }

    #[test]
    fn fail_fast_keeps_first_issue() {
        let mut handler = FailFast::new();
        assert!(handler.object_not_found(ObjectKind::Table, "A").is_break());
        let _ = handler.object_not_found(ObjectKind::Table, "B");
        assert_eq!(handler.first().map(ModelIssue::object).as_deref(), Some("A"));
    }

    #[test]
    fn logger_counts_and_continues() {
        let mut logger = ModelErrorLogger::new();
        assert!(logger.object_not_found(ObjectKind::View, "V").is_continue());
        assert_eq!(logger.count(), 1);
    }
}
