//! SQL identifier quoting.
//!
//! An identifier is quoted when it collides with a reserved keyword of the
//! dialect or contains a character outside the plain identifier alphabet.
//! Names that already carry the dialect's quote characters are emitted as-is,
//! so quoting is idempotent.
//!
//! # Example
//! ```ignore
//! use empiredb::ident::QuoteCache;
//!
//! let dbms = empiredb::dbms::postgres();
//! let mut cache = QuoteCache::default();
//! let mut sql = String::new();
//! cache.append_name(dbms.as_ref(), &mut sql, "order");
//! assert_eq!(sql, "\"order\"");
//! ```

use crate::dbms::DbmsHandler;
use crate::phrase::Phrase;
use std::collections::HashMap;

/// Characters that force quoting wherever they appear in a name.
pub const FORBIDDEN_CHARS: &[char] = &[
    ' ', '-', '.', '+', '*', '/', ',', ';', ':', '(', ')', '\'', '"', '=', '<', '>', '%', '&',
    '|', '!', '?', '@', '#',
];

/// Decide from scratch whether `name` must be quoted.
///
/// Pure function of the name and the keyword list: the same inputs always
/// produce the same decision.
pub fn needs_quotes(name: &str, keywords: &[&str]) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return true;
    }
    if name.contains(FORBIDDEN_CHARS) {
        return true;
    }
    keywords.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// Whether `name` is already wrapped in the given quote characters.
pub fn is_quoted(name: &str, open: &str, close: &str) -> bool {
    !open.is_empty()
        && name.len() >= open.len() + close.len()
        && name.starts_with(open)
        && name.ends_with(close)
}

/// Append `name` wrapped in quotes, doubling embedded close-quote characters.
pub fn write_quoted(out: &mut String, name: &str, open: &str, close: &str) {
    out.push_str(open);
    if close.is_empty() {
        out.push_str(name);
    } else {
        let doubled = format!("{close}{close}");
        out.push_str(&name.replace(close, &doubled));
    }
    out.push_str(close);
}

/// Per build-pass cache of quoting decisions.
///
/// A fresh cache is created for every statement build; it only memoizes
/// [`needs_quotes`] and never changes its outcome.
#[derive(Debug, Default, Clone)]
pub struct QuoteCache {
    decisions: HashMap<String, bool>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quoting decision for `name` under `dbms`; already-quoted names never need quotes.
    pub fn needs_quotes(&mut self, dbms: &dyn DbmsHandler, name: &str) -> bool {
        if let Some(decision) = self.decisions.get(name) {
            return *decision;
        }
        let (open, close) = quote_chars(dbms);
        let decision = !is_quoted(name, open, close) && needs_quotes(name, dbms.reserved_keywords());
        self.decisions.insert(name.to_string(), decision);
        decision
    }

    /// Append `name` to `out`, quoted if required.
    pub fn append_name(&mut self, dbms: &dyn DbmsHandler, out: &mut String, name: &str) {
        if self.needs_quotes(dbms, name) {
            let (open, close) = quote_chars(dbms);
            write_quoted(out, name, open, close);
        } else {
            out.push_str(name);
        }
    }

    /// Number of distinct names decided in this pass.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

fn quote_chars(dbms: &dyn DbmsHandler) -> (&'static str, &'static str) {
    let open = dbms.phrase(Phrase::SQL_QUOTES_OPEN).unwrap_or("\"");
    let close = dbms.phrase(Phrase::SQL_QUOTES_CLOSE).unwrap_or(open);
    (open, close)
}

/// Quote `name` for `dbms` without a cache.
pub fn quote_name(dbms: &dyn DbmsHandler, name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    QuoteCache::new().append_name(dbms, &mut out, name);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbms;

    #[test]
    fn reserved_keyword_is_quoted() {
        let pg = dbms::postgres();
        let mut cache = QuoteCache::new();
        assert!(cache.needs_quotes(pg.as_ref(), "order"));
        assert!(!cache.needs_quotes(pg.as_ref(), "customer_id"));
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(needs_quotes("Order", &["ORDER"]));
        assert!(!needs_quotes("ordered", &["ORDER"]));
    }

    #[test]
    fn forbidden_characters_force_quotes() {
        for name in ["first name", "net-value", "a.b", "x+y"] {
            assert!(needs_quotes(name, &[]), "{name}");
        }
        assert!(needs_quotes("1st", &[]));
        assert!(!needs_quotes("plain_name$1", &[]));
    }

    #[test]
    fn quoting_twice_does_not_double_quote() {
        let pg = dbms::postgres();
        let mut cache = QuoteCache::new();
        let mut once = String::new();
        cache.append_name(pg.as_ref(), &mut once, "order");
        let mut twice = String::new();
        cache.append_name(pg.as_ref(), &mut twice, &once);
        assert_eq!(once, "\"order\"");
        assert_eq!(twice, once);
    }

    #[test]
    fn dialect_quote_characters_are_used() {
        let mysql = dbms::mysql();
        let mssql = dbms::sqlserver();
        assert_eq!(quote_name(mysql.as_ref(), "key"), "`key`");
        assert_eq!(quote_name(mssql.as_ref(), "order date"), "[order date]");
        assert_eq!(quote_name(mssql.as_ref(), "[order date]"), "[order date]");
    }

    #[test]
    fn embedded_close_quote_is_doubled() {
        let mut out = String::new();
        write_quoted(&mut out, "a\"b", "\"", "\"");
        assert_eq!(out, "\"a\"\"b\"");
    }

    #[test]
    fn decision_is_recomputable() {
        let pg = dbms::postgres();
        let mut a = QuoteCache::new();
        let mut b = QuoteCache::new();
        for name in ["user", "NAME", "first name", "id"] {
            assert_eq!(a.needs_quotes(pg.as_ref(), name), b.needs_quotes(pg.as_ref(), name));
            assert_eq!(
                a.needs_quotes(pg.as_ref(), name),
                needs_quotes(name, pg.reserved_keywords())
            );
        }
        assert_eq!(a.len(), 4);
    }
}
