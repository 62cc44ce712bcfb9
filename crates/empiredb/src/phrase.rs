//! SQL phrases: named template fragments supplied per dialect.
//!
//! A template uses `?` for the primary operand and `{n}` (optionally `{n:TYPE}`)
//! for auxiliary arguments. [`PhraseTemplate::parse`] splits a template into
//! [`Segment`]s which the renderer substitutes in textual order.

use crate::error::{DbError, DbResult};
use crate::types::DataType;
use std::fmt;

/// Identifier of a dialect-specific SQL fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
pub enum Phrase {
    // sql base
    SQL_NULL,
    SQL_RENAME_TABLE,
    SQL_RENAME_COLUMN,
    SQL_DATABASE_LINK,
    SQL_QUOTES_OPEN,
    SQL_QUOTES_CLOSE,
    SQL_CONCAT_EXPR,
    SQL_PSEUDO_TABLE,
    SQL_FUNC_CONCAT,
    // data types
    SQL_BOOLEAN_TRUE,
    SQL_BOOLEAN_FALSE,
    SQL_CURRENT_DATE,
    SQL_DATE_PATTERN,
    SQL_DATE_TEMPLATE,
    SQL_CURRENT_TIME,
    SQL_TIME_PATTERN,
    SQL_TIME_TEMPLATE,
    SQL_CURRENT_TIMESTAMP,
    SQL_DATETIME_PATTERN,
    SQL_DATETIME_TEMPLATE,
    SQL_TIMESTAMP_PATTERN,
    SQL_TIMESTAMP_TEMPLATE,
    // functions
    SQL_FUNC_COALESCE,
    SQL_FUNC_SUBSTRING,
    SQL_FUNC_SUBSTRINGEX,
    SQL_FUNC_REPLACE,
    SQL_FUNC_REVERSE,
    SQL_FUNC_STRINDEX,
    SQL_FUNC_STRINDEXFROM,
    SQL_FUNC_LENGTH,
    SQL_FUNC_UPPER,
    SQL_FUNC_LOWER,
    SQL_FUNC_TRIM,
    SQL_FUNC_LTRIM,
    SQL_FUNC_RTRIM,
    SQL_FUNC_ESCAPE,
    // numeric
    SQL_FUNC_ABS,
    SQL_FUNC_ROUND,
    SQL_FUNC_TRUNC,
    SQL_FUNC_CEILING,
    SQL_FUNC_FLOOR,
    SQL_FUNC_MODULO,
    SQL_FUNC_FORMAT,
    // date
    SQL_FUNC_DAY,
    SQL_FUNC_MONTH,
    SQL_FUNC_YEAR,
    // aggregation
    SQL_FUNC_SUM,
    SQL_FUNC_MAX,
    SQL_FUNC_MIN,
    SQL_FUNC_AVG,
    SQL_FUNC_COUNT,
    SQL_FUNC_STRAGG,
    // decode
    SQL_FUNC_DECODE,
    SQL_FUNC_DECODE_SEP,
    SQL_FUNC_DECODE_PART,
    SQL_FUNC_DECODE_ELSE,
}

/// Placeholder contract of a phrase: whether it takes the `?` operand and
/// how many distinct `{n}` arguments it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseContract {
    pub operand: bool,
    pub args: usize,
}

const fn contract(operand: bool, args: usize) -> PhraseContract {
    PhraseContract { operand, args }
}

impl Phrase {
    pub const ALL: [Phrase; 56] = [
        Phrase::SQL_NULL,
        Phrase::SQL_RENAME_TABLE,
        Phrase::SQL_RENAME_COLUMN,
        Phrase::SQL_DATABASE_LINK,
        Phrase::SQL_QUOTES_OPEN,
        Phrase::SQL_QUOTES_CLOSE,
        Phrase::SQL_CONCAT_EXPR,
        Phrase::SQL_PSEUDO_TABLE,
        Phrase::SQL_FUNC_CONCAT,
        Phrase::SQL_BOOLEAN_TRUE,
        Phrase::SQL_BOOLEAN_FALSE,
        Phrase::SQL_CURRENT_DATE,
        Phrase::SQL_DATE_PATTERN,
        Phrase::SQL_DATE_TEMPLATE,
        Phrase::SQL_CURRENT_TIME,
        Phrase::SQL_TIME_PATTERN,
        Phrase::SQL_TIME_TEMPLATE,
        Phrase::SQL_CURRENT_TIMESTAMP,
        Phrase::SQL_DATETIME_PATTERN,
        Phrase::SQL_DATETIME_TEMPLATE,
        Phrase::SQL_TIMESTAMP_PATTERN,
        Phrase::SQL_TIMESTAMP_TEMPLATE,
        Phrase::SQL_FUNC_COALESCE,
        Phrase::SQL_FUNC_SUBSTRING,
        Phrase::SQL_FUNC_SUBSTRINGEX,
        Phrase::SQL_FUNC_REPLACE,
        Phrase::SQL_FUNC_REVERSE,
        Phrase::SQL_FUNC_STRINDEX,
        Phrase::SQL_FUNC_STRINDEXFROM,
        Phrase::SQL_FUNC_LENGTH,
        Phrase::SQL_FUNC_UPPER,
        Phrase::SQL_FUNC_LOWER,
        Phrase::SQL_FUNC_TRIM,
        Phrase::SQL_FUNC_LTRIM,
        Phrase::SQL_FUNC_RTRIM,
        Phrase::SQL_FUNC_ESCAPE,
        Phrase::SQL_FUNC_ABS,
        Phrase::SQL_FUNC_ROUND,
        Phrase::SQL_FUNC_TRUNC,
        Phrase::SQL_FUNC_CEILING,
        Phrase::SQL_FUNC_FLOOR,
        Phrase::SQL_FUNC_MODULO,
        Phrase::SQL_FUNC_FORMAT,
        Phrase::SQL_FUNC_DAY,
        Phrase::SQL_FUNC_MONTH,
        Phrase::SQL_FUNC_YEAR,
        Phrase::SQL_FUNC_SUM,
        Phrase::SQL_FUNC_MAX,
        Phrase::SQL_FUNC_MIN,
        Phrase::SQL_FUNC_AVG,
        Phrase::SQL_FUNC_COUNT,
        Phrase::SQL_FUNC_STRAGG,
        Phrase::SQL_FUNC_DECODE,
        Phrase::SQL_FUNC_DECODE_SEP,
        Phrase::SQL_FUNC_DECODE_PART,
        Phrase::SQL_FUNC_DECODE_ELSE,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SQL_NULL => "SQL_NULL",
            Self::SQL_RENAME_TABLE => "SQL_RENAME_TABLE",
            Self::SQL_RENAME_COLUMN => "SQL_RENAME_COLUMN",
            Self::SQL_DATABASE_LINK => "SQL_DATABASE_LINK",
            Self::SQL_QUOTES_OPEN => "SQL_QUOTES_OPEN",
            Self::SQL_QUOTES_CLOSE => "SQL_QUOTES_CLOSE",
            Self::SQL_CONCAT_EXPR => "SQL_CONCAT_EXPR",
            Self::SQL_PSEUDO_TABLE => "SQL_PSEUDO_TABLE",
            Self::SQL_FUNC_CONCAT => "SQL_FUNC_CONCAT",
            Self::SQL_BOOLEAN_TRUE => "SQL_BOOLEAN_TRUE",
            Self::SQL_BOOLEAN_FALSE => "SQL_BOOLEAN_FALSE",
            Self::SQL_CURRENT_DATE => "SQL_CURRENT_DATE",
            Self::SQL_DATE_PATTERN => "SQL_DATE_PATTERN",
            Self::SQL_DATE_TEMPLATE => "SQL_DATE_TEMPLATE",
            Self::SQL_CURRENT_TIME => "SQL_CURRENT_TIME",
            Self::SQL_TIME_PATTERN => "SQL_TIME_PATTERN",
            Self::SQL_TIME_TEMPLATE => "SQL_TIME_TEMPLATE",
            Self::SQL_CURRENT_TIMESTAMP => "SQL_CURRENT_TIMESTAMP",
            Self::SQL_DATETIME_PATTERN => "SQL_DATETIME_PATTERN",
            Self::SQL_DATETIME_TEMPLATE => "SQL_DATETIME_TEMPLATE",
            Self::SQL_TIMESTAMP_PATTERN => "SQL_TIMESTAMP_PATTERN",
            Self::SQL_TIMESTAMP_TEMPLATE => "SQL_TIMESTAMP_TEMPLATE",
            Self::SQL_FUNC_COALESCE => "SQL_FUNC_COALESCE",
            Self::SQL_FUNC_SUBSTRING => "SQL_FUNC_SUBSTRING",
            Self::SQL_FUNC_SUBSTRINGEX => "SQL_FUNC_SUBSTRINGEX",
            Self::SQL_FUNC_REPLACE => "SQL_FUNC_REPLACE",
            Self::SQL_FUNC_REVERSE => "SQL_FUNC_REVERSE",
            Self::SQL_FUNC_STRINDEX => "SQL_FUNC_STRINDEX",
            Self::SQL_FUNC_STRINDEXFROM => "SQL_FUNC_STRINDEXFROM",
            Self::SQL_FUNC_LENGTH => "SQL_FUNC_LENGTH",
            Self::SQL_FUNC_UPPER => "SQL_FUNC_UPPER",
            Self::SQL_FUNC_LOWER => "SQL_FUNC_LOWER",
            Self::SQL_FUNC_TRIM => "SQL_FUNC_TRIM",
            Self::SQL_FUNC_LTRIM => "SQL_FUNC_LTRIM",
            Self::SQL_FUNC_RTRIM => "SQL_FUNC_RTRIM",
            Self::SQL_FUNC_ESCAPE => "SQL_FUNC_ESCAPE",
            Self::SQL_FUNC_ABS => "SQL_FUNC_ABS",
            Self::SQL_FUNC_ROUND => "SQL_FUNC_ROUND",
            Self::SQL_FUNC_TRUNC => "SQL_FUNC_TRUNC",
            Self::SQL_FUNC_CEILING => "SQL_FUNC_CEILING",
            Self::SQL_FUNC_FLOOR => "SQL_FUNC_FLOOR",
            Self::SQL_FUNC_MODULO => "SQL_FUNC_MODULO",
            Self::SQL_FUNC_FORMAT => "SQL_FUNC_FORMAT",
            Self::SQL_FUNC_DAY => "SQL_FUNC_DAY",
            Self::SQL_FUNC_MONTH => "SQL_FUNC_MONTH",
            Self::SQL_FUNC_YEAR => "SQL_FUNC_YEAR",
            Self::SQL_FUNC_SUM => "SQL_FUNC_SUM",
            Self::SQL_FUNC_MAX => "SQL_FUNC_MAX",
            Self::SQL_FUNC_MIN => "SQL_FUNC_MIN",
            Self::SQL_FUNC_AVG => "SQL_FUNC_AVG",
            Self::SQL_FUNC_COUNT => "SQL_FUNC_COUNT",
            Self::SQL_FUNC_STRAGG => "SQL_FUNC_STRAGG",
            Self::SQL_FUNC_DECODE => "SQL_FUNC_DECODE",
            Self::SQL_FUNC_DECODE_SEP => "SQL_FUNC_DECODE_SEP",
            Self::SQL_FUNC_DECODE_PART => "SQL_FUNC_DECODE_PART",
            Self::SQL_FUNC_DECODE_ELSE => "SQL_FUNC_DECODE_ELSE",
        }
    }

    /// Placeholders every dialect's template for this phrase must declare.
    ///
    /// Pattern phrases are chrono format strings and carry no placeholders.
    pub fn contract(self) -> PhraseContract {
        match self {
            Self::SQL_NULL
            | Self::SQL_RENAME_TABLE
            | Self::SQL_RENAME_COLUMN
            | Self::SQL_DATABASE_LINK
            | Self::SQL_QUOTES_OPEN
            | Self::SQL_QUOTES_CLOSE
            | Self::SQL_CONCAT_EXPR
            | Self::SQL_PSEUDO_TABLE
            | Self::SQL_BOOLEAN_TRUE
            | Self::SQL_BOOLEAN_FALSE
            | Self::SQL_CURRENT_DATE
            | Self::SQL_DATE_PATTERN
            | Self::SQL_CURRENT_TIME
            | Self::SQL_TIME_PATTERN
            | Self::SQL_CURRENT_TIMESTAMP
            | Self::SQL_DATETIME_PATTERN
            | Self::SQL_TIMESTAMP_PATTERN
            | Self::SQL_FUNC_DECODE_SEP => contract(false, 0),
            Self::SQL_DATE_TEMPLATE
            | Self::SQL_TIME_TEMPLATE
            | Self::SQL_DATETIME_TEMPLATE
            | Self::SQL_TIMESTAMP_TEMPLATE
            | Self::SQL_FUNC_ESCAPE
            | Self::SQL_FUNC_DECODE_ELSE => contract(false, 1),
            Self::SQL_FUNC_DECODE_PART => contract(false, 2),
            Self::SQL_FUNC_CONCAT
            | Self::SQL_FUNC_REVERSE
            | Self::SQL_FUNC_LENGTH
            | Self::SQL_FUNC_UPPER
            | Self::SQL_FUNC_LOWER
            | Self::SQL_FUNC_TRIM
            | Self::SQL_FUNC_LTRIM
            | Self::SQL_FUNC_RTRIM
            | Self::SQL_FUNC_ABS
            | Self::SQL_FUNC_CEILING
            | Self::SQL_FUNC_FLOOR
            | Self::SQL_FUNC_DAY
            | Self::SQL_FUNC_MONTH
            | Self::SQL_FUNC_YEAR
            | Self::SQL_FUNC_SUM
            | Self::SQL_FUNC_MAX
            | Self::SQL_FUNC_MIN
            | Self::SQL_FUNC_AVG
            | Self::SQL_FUNC_COUNT => contract(true, 0),
            Self::SQL_FUNC_COALESCE
            | Self::SQL_FUNC_SUBSTRING
            | Self::SQL_FUNC_STRINDEX
            | Self::SQL_FUNC_ROUND
            | Self::SQL_FUNC_TRUNC
            | Self::SQL_FUNC_MODULO
            | Self::SQL_FUNC_FORMAT
            | Self::SQL_FUNC_STRAGG
            | Self::SQL_FUNC_DECODE => contract(true, 1),
            Self::SQL_FUNC_SUBSTRINGEX | Self::SQL_FUNC_REPLACE | Self::SQL_FUNC_STRINDEXFROM => {
                contract(true, 2)
            }
        }
    }

    /// Whether functions built from this phrase aggregate over rows.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::SQL_FUNC_SUM
                | Self::SQL_FUNC_MAX
                | Self::SQL_FUNC_MIN
                | Self::SQL_FUNC_AVG
                | Self::SQL_FUNC_COUNT
                | Self::SQL_FUNC_STRAGG
        )
    }

    /// Whether this phrase is a chrono format pattern rather than SQL text.
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::SQL_DATE_PATTERN
                | Self::SQL_TIME_PATTERN
                | Self::SQL_DATETIME_PATTERN
                | Self::SQL_TIMESTAMP_PATTERN
        )
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generic (ANSI) phrase table used when a dialect has no override.
///
/// `None` means the phrase has no portable form.
pub fn generic_phrase(phrase: Phrase) -> Option<&'static str> {
    let t = match phrase {
        Phrase::SQL_NULL => "null",
        Phrase::SQL_RENAME_TABLE => " ",
        Phrase::SQL_RENAME_COLUMN => " AS ",
        Phrase::SQL_DATABASE_LINK => "@",
        Phrase::SQL_QUOTES_OPEN => "\"",
        Phrase::SQL_QUOTES_CLOSE => "\"",
        Phrase::SQL_CONCAT_EXPR => " || ",
        Phrase::SQL_PSEUDO_TABLE => return None,
        Phrase::SQL_FUNC_CONCAT => return None,
        Phrase::SQL_BOOLEAN_TRUE => "TRUE",
        Phrase::SQL_BOOLEAN_FALSE => "FALSE",
        Phrase::SQL_CURRENT_DATE => "CURRENT_DATE",
        Phrase::SQL_DATE_PATTERN => "%Y-%m-%d",
        Phrase::SQL_DATE_TEMPLATE => "DATE '{0}'",
        Phrase::SQL_CURRENT_TIME => "CURRENT_TIME",
        Phrase::SQL_TIME_PATTERN => "%H:%M:%S",
        Phrase::SQL_TIME_TEMPLATE => "TIME '{0}'",
        Phrase::SQL_CURRENT_TIMESTAMP => "CURRENT_TIMESTAMP",
        Phrase::SQL_DATETIME_PATTERN => "%Y-%m-%d %H:%M:%S",
        Phrase::SQL_DATETIME_TEMPLATE => "TIMESTAMP '{0}'",
        Phrase::SQL_TIMESTAMP_PATTERN => "%Y-%m-%d %H:%M:%S%.3f",
        Phrase::SQL_TIMESTAMP_TEMPLATE => "TIMESTAMP '{0}'",
        Phrase::SQL_FUNC_COALESCE => "coalesce(?, {0})",
        Phrase::SQL_FUNC_SUBSTRING => "substring(?, {0:INTEGER})",
        Phrase::SQL_FUNC_SUBSTRINGEX => "substring(?, {0:INTEGER}, {1:INTEGER})",
        Phrase::SQL_FUNC_REPLACE => "replace(?, {0}, {1})",
        Phrase::SQL_FUNC_REVERSE => "reverse(?)",
        Phrase::SQL_FUNC_STRINDEX => "position({0} in ?)",
        Phrase::SQL_FUNC_STRINDEXFROM => return None,
        Phrase::SQL_FUNC_LENGTH => "length(?)",
        Phrase::SQL_FUNC_UPPER => "upper(?)",
        Phrase::SQL_FUNC_LOWER => "lower(?)",
        Phrase::SQL_FUNC_TRIM => "trim(?)",
        Phrase::SQL_FUNC_LTRIM => "ltrim(?)",
        Phrase::SQL_FUNC_RTRIM => "rtrim(?)",
        Phrase::SQL_FUNC_ESCAPE => " escape '{0}'",
        Phrase::SQL_FUNC_ABS => "abs(?)",
        Phrase::SQL_FUNC_ROUND => "round(?, {0:INTEGER})",
        Phrase::SQL_FUNC_TRUNC => "trunc(?, {0:INTEGER})",
        Phrase::SQL_FUNC_CEILING => "ceiling(?)",
        Phrase::SQL_FUNC_FLOOR => "floor(?)",
        Phrase::SQL_FUNC_MODULO => "mod(?, {0})",
        Phrase::SQL_FUNC_FORMAT => return None,
        Phrase::SQL_FUNC_DAY => "extract(day from ?)",
        Phrase::SQL_FUNC_MONTH => "extract(month from ?)",
        Phrase::SQL_FUNC_YEAR => "extract(year from ?)",
        Phrase::SQL_FUNC_SUM => "sum(?)",
        Phrase::SQL_FUNC_MAX => "max(?)",
        Phrase::SQL_FUNC_MIN => "min(?)",
        Phrase::SQL_FUNC_AVG => "avg(?)",
        Phrase::SQL_FUNC_COUNT => "count(?)",
        Phrase::SQL_FUNC_STRAGG => return None,
        Phrase::SQL_FUNC_DECODE => "case ? {0} end",
        Phrase::SQL_FUNC_DECODE_SEP => " ",
        Phrase::SQL_FUNC_DECODE_PART => "when {0} then {1}",
        Phrase::SQL_FUNC_DECODE_ELSE => "else {0}",
    };
    Some(t)
}

/// A piece of a parsed phrase template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal SQL text copied verbatim.
    Text(&'a str),
    /// The `?` operand placeholder.
    Operand,
    /// An indexed `{n}` argument with an optional `:TYPE` coercion.
    Arg {
        index: usize,
        data_type: Option<DataType>,
    },
}

/// A phrase template split into substitution segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTemplate<'a> {
    pub segments: Vec<Segment<'a>>,
}

impl<'a> PhraseTemplate<'a> {
    /// Split a template into text, operand and argument segments.
    ///
    /// Braces that do not form a valid `{n}` / `{n:TYPE}` placeholder are kept as text.
    pub fn parse(template: &'a str) -> DbResult<Self> {
        let mut segments = Vec::new();
        let bytes = template.as_bytes();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'?' => {
                    if start < i {
                        segments.push(Segment::Text(&template[start..i]));
                    }
                    segments.push(Segment::Operand);
                    i += 1;
                    start = i;
                }
                b'{' => {
                    let Some(close) = template[i..].find('}') else {
                        i += 1;
                        continue;
                    };
                    let inner = &template[i + 1..i + close];
                    let (idx, ty) = match inner.split_once(':') {
                        Some((idx, ty)) => (idx, Some(ty)),
                        None => (inner, None),
                    };
                    let Ok(index) = idx.parse::<usize>() else {
                        i += 1;
                        continue;
                    };
                    let data_type = match ty {
                        Some(ty) => Some(ty.parse::<DataType>().map_err(|_| {
                            DbError::invalid_expression(format!(
                                "unknown type suffix '{ty}' in template \"{template}\""
                            ))
                        })?),
                        None => None,
                    };
                    if start < i {
                        segments.push(Segment::Text(&template[start..i]));
                    }
                    segments.push(Segment::Arg { index, data_type });
                    i += close + 1;
                    start = i;
                }
                _ => i += 1,
            }
        }
        if start < bytes.len() {
            segments.push(Segment::Text(&template[start..]));
        }
        Ok(Self { segments })
    }

    pub fn has_operand(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Operand))
    }

    /// Number of distinct `{n}` argument indices.
    pub fn arg_count(&self) -> usize {
        let mut seen: Vec<usize> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Arg { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Highest argument index referenced, if any.
    pub fn max_arg_index(&self) -> Option<usize> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Arg { index, .. } => Some(*index),
                _ => None,
            })
            .max()
    }
}

/// Replace `{n}` placeholders with the given raw strings (no literal formatting).
pub fn fill_template(template: &str, args: &[&str]) -> DbResult<String> {
    let parsed = PhraseTemplate::parse(template)?;
    let mut out = String::with_capacity(template.len() + 16);
    for seg in &parsed.segments {
        match seg {
            Segment::Text(t) => out.push_str(t),
            Segment::Operand => out.push('?'),
            Segment::Arg { index, .. } => {
                let arg = args.get(*index).ok_or_else(|| {
                    DbError::invalid_expression(format!(
                        "template \"{template}\" references missing argument {{{index}}}"
                    ))
                })?;
                out.push_str(arg);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_operand_and_typed_arg() {
        let t = PhraseTemplate::parse("substring(?, {0:INTEGER})").unwrap();
        assert_eq!(
            t.segments,
            vec![
                Segment::Text("substring("),
                Segment::Operand,
                Segment::Text(", "),
                Segment::Arg {
                    index: 0,
                    data_type: Some(DataType::Integer)
                },
                Segment::Text(")"),
            ]
        );
        assert!(t.has_operand());
        assert_eq!(t.arg_count(), 1);
    }

    #[test]
    fn parse_keeps_non_placeholder_braces() {
        let t = PhraseTemplate::parse("{fn now()}").unwrap();
        assert_eq!(t.segments, vec![Segment::Text("{fn now()}")]);
    }

    #[test]
    fn parse_rejects_unknown_type_suffix() {
        assert!(PhraseTemplate::parse("f(?, {0:GEOMETRY})").is_err());
    }

    #[test]
    fn generic_templates_honor_contracts() {
        for phrase in Phrase::ALL {
            let Some(template) = generic_phrase(phrase) else {
                continue;
            };
            if phrase.is_pattern() {
                continue;
            }
            let parsed = PhraseTemplate::parse(template).unwrap();
            let c = phrase.contract();
            assert_eq!(parsed.has_operand(), c.operand, "{phrase}");
            assert_eq!(parsed.arg_count(), c.args, "{phrase}");
        }
    }

    #[test]
    fn substringex_declares_two_args() {
        let t = PhraseTemplate::parse(generic_phrase(Phrase::SQL_FUNC_SUBSTRINGEX).unwrap()).unwrap();
        assert_eq!(t.arg_count(), 2);
    }

    #[test]
    fn stragg_has_no_generic_form() {
        assert_eq!(generic_phrase(Phrase::SQL_FUNC_STRAGG), None);
    }

    #[test]
    fn fill_template_reports_missing_arg() {
        assert_eq!(fill_template("DATE '{0}'", &["2024-01-01"]).unwrap(), "DATE '2024-01-01'");
        assert!(fill_template("when {0} then {1}", &["1"]).is_err());
    }
}
