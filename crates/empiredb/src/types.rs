//! Column data types and runtime values.

use crate::error::{DbError, DbResult};
use bytes::BytesMut;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// Logical data type of a column or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Unknown,
    Integer,
    AutoInc,
    Varchar,
    Char,
    Clob,
    Blob,
    Bool,
    Date,
    Time,
    DateTime,
    Timestamp,
    Decimal,
    Float,
    UniqueId,
}

impl DataType {
    /// Upper-case name as used in `{n:TYPE}` template suffixes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Integer => "INTEGER",
            Self::AutoInc => "AUTOINC",
            Self::Varchar => "VARCHAR",
            Self::Char => "CHAR",
            Self::Clob => "CLOB",
            Self::Blob => "BLOB",
            Self::Bool => "BOOL",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Decimal => "DECIMAL",
            Self::Float => "FLOAT",
            Self::UniqueId => "UNIQUEID",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::Varchar | Self::Char | Self::Clob)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::AutoInc | Self::Decimal | Self::Float
        )
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::DateTime | Self::Timestamp
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = match s.trim().to_ascii_uppercase().as_str() {
            "UNKNOWN" => Self::Unknown,
            "INTEGER" | "INT" | "BIGINT" => Self::Integer,
            "AUTOINC" => Self::AutoInc,
            "VARCHAR" | "TEXT" => Self::Varchar,
            "CHAR" => Self::Char,
            "CLOB" => Self::Clob,
            "BLOB" => Self::Blob,
            "BOOL" | "BOOLEAN" => Self::Bool,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "DECIMAL" | "NUMERIC" => Self::Decimal,
            "FLOAT" | "DOUBLE" => Self::Float,
            "UNIQUEID" | "UUID" => Self::UniqueId,
            other => return Err(DbError::invalid_argument(format!("unknown data type: {other}"))),
        };
        Ok(t)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// A runtime value bound to a column, parameter or literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The natural data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Unknown,
            Self::Bool(_) => DataType::Bool,
            Self::Int(_) => DataType::Integer,
            Self::Float(_) => DataType::Float,
            Self::Decimal(_) => DataType::Decimal,
            Self::Text(_) => DataType::Varchar,
            Self::Date(_) => DataType::Date,
            Self::Time(_) => DataType::Time,
            Self::DateTime(_) => DataType::DateTime,
            Self::Uuid(_) => DataType::UniqueId,
            Self::Bytes(_) => DataType::Blob,
        }
    }

    /// Convert this value into the representation required by `data_type`.
    ///
    /// `Null` coerces to every type; `Unknown` leaves the value untouched.
    pub fn coerce(&self, data_type: DataType) -> DbResult<Value> {
        if self.is_null() || data_type == DataType::Unknown {
            return Ok(self.clone());
        }
        let fail = || {
            DbError::invalid_argument(format!("cannot convert {self:?} to {data_type}"))
        };
        let v = match data_type {
            DataType::Unknown => self.clone(),
            DataType::Integer | DataType::AutoInc => match self {
                Self::Int(v) => Self::Int(*v),
                Self::Bool(b) => Self::Int(i64::from(*b)),
                // i64::MAX as f64 rounds up to 2^63, which is out of range
                Self::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                    Self::Int(*f as i64)
                }
                Self::Decimal(d) if d.fract().is_zero() => {
                    Self::Int(d.to_i64().ok_or_else(fail)?)
                }
                Self::Text(s) => Self::Int(s.trim().parse::<i64>().map_err(|_| fail())?),
                _ => return Err(fail()),
            },
            DataType::Varchar | DataType::Char | DataType::Clob => match self {
                Self::Bytes(_) => return Err(fail()),
                Self::Text(s) => Self::Text(s.clone()),
                other => Self::Text(other.to_string()),
            },
            DataType::Bool => match self {
                Self::Bool(b) => Self::Bool(*b),
                Self::Int(0) => Self::Bool(false),
                Self::Int(1) => Self::Bool(true),
                Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "y" | "yes" => Self::Bool(true),
                    "false" | "0" | "n" | "no" => Self::Bool(false),
                    _ => return Err(fail()),
                },
                _ => return Err(fail()),
            },
            DataType::Date => match self {
                Self::Date(d) => Self::Date(*d),
                Self::DateTime(dt) => Self::Date(dt.date()),
                Self::Text(s) => Self::Date(
                    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| fail())?,
                ),
                _ => return Err(fail()),
            },
            DataType::Time => match self {
                Self::Time(t) => Self::Time(*t),
                Self::DateTime(dt) => Self::Time(dt.time()),
                Self::Text(s) => Self::Time(
                    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| fail())?,
                ),
                _ => return Err(fail()),
            },
            DataType::DateTime | DataType::Timestamp => match self {
                Self::DateTime(dt) => Self::DateTime(*dt),
                Self::Date(d) => Self::DateTime(d.and_time(NaiveTime::MIN)),
                Self::Text(s) => Self::DateTime(parse_datetime(s.trim()).ok_or_else(fail)?),
                _ => return Err(fail()),
            },
            DataType::Decimal => match self {
                Self::Decimal(d) => Self::Decimal(*d),
                Self::Int(v) => Self::Decimal(Decimal::from(*v)),
                Self::Float(f) => Self::Decimal(Decimal::from_f64(*f).ok_or_else(fail)?),
                Self::Text(s) => Self::Decimal(Decimal::from_str(s.trim()).map_err(|_| fail())?),
                _ => return Err(fail()),
            },
            DataType::Float => match self {
                Self::Float(f) => Self::Float(*f),
                Self::Int(v) => Self::Float(*v as f64),
                Self::Decimal(d) => Self::Float(d.to_f64().ok_or_else(fail)?),
                Self::Text(s) => Self::Float(s.trim().parse::<f64>().map_err(|_| fail())?),
                _ => return Err(fail()),
            },
            DataType::UniqueId => match self {
                Self::Uuid(u) => Self::Uuid(*u),
                Self::Text(s) => Self::Uuid(Uuid::parse_str(s.trim()).map_err(|_| fail())?),
                _ => return Err(fail()),
            },
            DataType::Blob => match self {
                Self::Bytes(b) => Self::Bytes(b.clone()),
                Self::Text(s) => Self::Bytes(s.as_bytes().to_vec()),
                _ => return Err(fail()),
            },
        };
        Ok(v)
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! impl_from_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_value!(
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    Uuid => Uuid,
    Vec<u8> => Bytes,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

type BoxError = Box<dyn std::error::Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*v as f64).to_sql(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from(*v).to_sql(ty, out)
                } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
                    v.to_string().to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from_f64(*v)
                        .ok_or("float out of numeric range")?
                        .to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Decimal(v) => {
                if *ty == Type::FLOAT8 {
                    v.to_f64().ok_or("decimal out of float range")?.to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(v) => {
                if *ty == Type::UUID {
                    Uuid::parse_str(v)?.to_sql(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from_str(v)?.to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Date(v) => {
                if *ty == Type::TIMESTAMP {
                    v.and_time(NaiveTime::MIN).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Time(v) => v.to_sql(ty, out),
            Value::DateTime(v) => {
                if *ty == Type::TIMESTAMPTZ {
                    Utc.from_utc_datetime(v).to_sql(ty, out)
                } else if *ty == Type::DATE {
                    v.date().to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
