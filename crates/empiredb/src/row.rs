//! Result rows and typed value access.

use crate::error::{DbError, DbResult};
use crate::types::{DataType, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Conversion from a [`Value`] read from a result row.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> DbResult<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> DbResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn unexpected(value: &Value, target: &str) -> DbError {
    DbError::invalid_argument(format!("cannot read {value:?} as {target}"))
}

macro_rules! impl_from_value {
    ($($t:ty => $data_type:expr, $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> DbResult<Self> {
                    match value.coerce($data_type)? {
                        Value::$variant(v) => Ok(v),
                        _ => Err(unexpected(value, stringify!($t))),
                    }
                }
            }
        )*
    };
}

impl_from_value!(
    i64 => DataType::Integer, Int,
    bool => DataType::Bool, Bool,
    f64 => DataType::Float, Float,
    Decimal => DataType::Decimal, Decimal,
    String => DataType::Varchar, Text,
    NaiveDate => DataType::Date, Date,
    NaiveTime => DataType::Time, Time,
    NaiveDateTime => DataType::DateTime, DateTime,
    Uuid => DataType::UniqueId, Uuid,
    Vec<u8> => DataType::Blob, Bytes,
);

impl FromValue for i32 {
    fn from_value(value: &Value) -> DbResult<Self> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|_| unexpected(value, "i32"))
    }
}

/// One result row: shared column names and the row's values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Position of `column` (case-insensitive).
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn value(&self, column: &str) -> DbResult<&Value> {
        self.index_of(column)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| DbError::decode(column, "no such column in result"))
    }

    /// Typed access by column name.
    pub fn get<T: FromValue>(&self, column: &str) -> DbResult<T> {
        let value = self.value(column)?;
        T::from_value(value).map_err(|e| DbError::decode(column, e.to_string()))
    }

    /// Typed access by position.
    pub fn get_at<T: FromValue>(&self, index: usize) -> DbResult<T> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| DbError::decode(format!("#{index}"), "index out of range"))?;
        T::from_value(value).map_err(|e| {
            let column = self.columns.get(index).cloned().unwrap_or_default();
            DbError::decode(column, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::from(vec!["ID".to_string(), "NAME".to_string(), "BOSS".to_string()]),
            vec![Value::Int(7), Value::from("Smith"), Value::Null],
        )
    }

    #[test]
    fn typed_access_by_name_and_index() {
        let r = row();
        assert_eq!(r.get::<i64>("id").unwrap(), 7);
        assert_eq!(r.get::<i32>("ID").unwrap(), 7);
        assert_eq!(r.get::<String>("NAME").unwrap(), "Smith");
        assert_eq!(r.get_at::<String>(0).unwrap(), "7");
        assert_eq!(r.get::<Option<i64>>("BOSS").unwrap(), None);
    }

    #[test]
    fn decode_errors_name_the_column() {
        let r = row();
        let err = r.get::<i64>("NAME").unwrap_err();
        assert!(matches!(err, DbError::Decode { ref column, .. } if column == "NAME"));
        assert!(r.get::<i64>("MISSING").is_err());
        assert!(r.get_at::<i64>(9).is_err());
    }
}
