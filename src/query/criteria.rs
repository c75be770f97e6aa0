//! Caller-built query criteria and their lucene rendering
//!
//! `Criteria` is not a planner: it only serialises the tree the caller built
//! into the engine's standard query syntax, escaping values on the way.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

/// Characters with meaning in the lucene query syntax, whitespace included
static SPECIAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([+\-&|!(){}\[\]^"~*?:\\/]|\s)"#).unwrap());

/// Clause that matches no document
const MATCH_NONE: &str = "(*:* -*:*)";

/// Query criteria tree
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Matches every document (`*:*`)
    All,
    /// Passed through untouched
    Raw(String),
    /// Field equals value
    Is { field: String, value: Value },
    /// Field contains the term
    Contains { field: String, value: String },
    StartsWith { field: String, value: String },
    EndsWith { field: String, value: String },
    /// Range; a missing bound is open
    Between {
        field: String,
        lower: Option<Value>,
        upper: Option<Value>,
        include_lower: bool,
        include_upper: bool,
    },
    /// Field equals any of the values
    In { field: String, values: Vec<Value> },
    /// Field has any value
    Exists(String),
    Boost(Box<Criteria>, f32),
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
    Not(Box<Criteria>),
}

impl Criteria {
    pub fn raw(query: impl Into<String>) -> Self {
        Self::Raw(query.into())
    }

    pub fn is(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Is {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::StartsWith {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EndsWith {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Inclusive range
    pub fn between(
        field: impl Into<String>,
        lower: Option<impl Into<Value>>,
        upper: Option<impl Into<Value>>,
    ) -> Self {
        Self::Between {
            field: field.into(),
            lower: lower.map(Into::into),
            upper: upper.map(Into::into),
            include_lower: true,
            include_upper: true,
        }
    }

    /// Inclusive date range, rendered in the engine's UTC format
    pub fn between_dates(
        field: impl Into<String>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        Self::between(field, from.map(format_date), to.map(format_date))
    }

    pub fn any_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(field.into())
    }

    pub fn and(self, other: Criteria) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            this => Self::And(vec![this, other]),
        }
    }

    pub fn or(self, other: Criteria) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            this => Self::Or(vec![this, other]),
        }
    }

    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn boost(self, factor: f32) -> Self {
        Self::Boost(Box::new(self), factor)
    }

    /// Render as a lucene query string
    pub fn to_query_string(&self) -> String {
        match self {
            Self::All => "*:*".to_string(),
            Self::Raw(query) => query.clone(),
            Self::Is { field, value } => match value {
                Value::Null => format!("-{}:[* TO *]", field),
                value => format!("{}:{}", field, render_term(value)),
            },
            Self::Contains { field, value } => format!("{}:*{}*", field, escape(value)),
            Self::StartsWith { field, value } => format!("{}:{}*", field, escape(value)),
            Self::EndsWith { field, value } => format!("{}:*{}", field, escape(value)),
            Self::Between {
                field,
                lower,
                upper,
                include_lower,
                include_upper,
            } => format!(
                "{}:{}{} TO {}{}",
                field,
                if *include_lower { '[' } else { '{' },
                render_bound(lower.as_ref()),
                render_bound(upper.as_ref()),
                if *include_upper { ']' } else { '}' },
            ),
            Self::In { values, .. } if values.is_empty() => MATCH_NONE.to_string(),
            Self::In { field, values } => {
                let terms: Vec<String> = values.iter().map(render_term).collect();
                format!("{}:({})", field, terms.join(" OR "))
            }
            Self::Exists(field) => format!("{}:[* TO *]", field),
            Self::Boost(inner, factor) => format!("{}^{}", inner.grouped(), factor),
            Self::And(parts) => join(parts, " AND "),
            Self::Or(parts) => join(parts, " OR "),
            Self::Not(inner) => format!("-{}", inner.grouped()),
        }
    }

    /// Rendering wrapped in parentheses when it is a compound
    fn grouped(&self) -> String {
        match self {
            Self::And(parts) | Self::Or(parts) if parts.len() > 1 => {
                format!("({})", self.to_query_string())
            }
            Self::Raw(_) => format!("({})", self.to_query_string()),
            _ => self.to_query_string(),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Escape lucene special characters in a term
pub fn escape(value: &str) -> String {
    SPECIAL_CHARS.replace_all(value, r"\$1").into_owned()
}

/// Format a timestamp the way the engine stores dates
pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn render_term(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().any(char::is_whitespace) => {
            format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
        }
        Value::String(s) => escape(s),
        other => escape(&other.to_string()),
    }
}

fn render_bound(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "*".to_string(),
        Some(Value::String(s)) => format!("\"{}\"", s.replace('"', "\\\"")),
        Some(other) => other.to_string(),
    }
}

fn join(parts: &[Criteria], separator: &str) -> String {
    match parts {
        [] => "*:*".to_string(),
        [single] => single.to_query_string(),
        parts => parts
            .iter()
            .map(Criteria::grouped)
            .collect::<Vec<_>>()
            .join(separator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_simple_terms() {
        assert_eq!(Criteria::All.to_query_string(), "*:*");
        assert_eq!(Criteria::is("name", "rust").to_query_string(), "name:rust");
        assert_eq!(Criteria::is("price", 10).to_query_string(), "price:10");
        assert_eq!(Criteria::is("inStock", true).to_query_string(), "inStock:true");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape("a+b:c"), r"a\+b\:c");
        assert_eq!(Criteria::is("path", "/usr/bin").to_query_string(), r"path:\/usr\/bin");
        assert_eq!(
            Criteria::is("title", "hello world").to_query_string(),
            "title:\"hello world\""
        );
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(Criteria::contains("name", "ust").to_query_string(), "name:*ust*");
        assert_eq!(Criteria::starts_with("name", "ru").to_query_string(), "name:ru*");
        assert_eq!(Criteria::ends_with("name", "st").to_query_string(), "name:*st");
        assert_eq!(Criteria::contains("name", "a b").to_query_string(), r"name:*a\ b*");
        assert_eq!(Criteria::starts_with("name", "a b").to_query_string(), r"name:a\ b*");
        assert_eq!(Criteria::ends_with("name", "a\tb").to_query_string(), "name:*a\\\tb");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(
            Criteria::between("price", Some(10), None::<i32>).to_query_string(),
            "price:[10 TO *]"
        );
        let exclusive = Criteria::Between {
            field: "price".to_string(),
            lower: Some(1.into()),
            upper: Some(5.into()),
            include_lower: false,
            include_upper: true,
        };
        assert_eq!(exclusive.to_query_string(), "price:{1 TO 5]");

        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Criteria::between_dates("created", Some(from), None).to_query_string(),
            "created:[\"2024-01-01T00:00:00.000Z\" TO *]"
        );
    }

    #[test]
    fn test_compounds() {
        let criteria = Criteria::is("cat", "book")
            .and(Criteria::is("inStock", true))
            .and(Criteria::is("author", "x").or(Criteria::is("author", "y")));
        assert_eq!(
            criteria.to_query_string(),
            "cat:book AND inStock:true AND (author:x OR author:y)"
        );

        let negated = Criteria::is("cat", "book").not();
        assert_eq!(negated.to_query_string(), "-cat:book");

        let boosted = Criteria::is("a", 1).or(Criteria::is("b", 2)).boost(2.0);
        assert_eq!(boosted.to_query_string(), "(a:1 OR b:2)^2");
    }

    #[test]
    fn test_in_and_exists() {
        assert_eq!(
            Criteria::any_of("id", ["1", "2"]).to_query_string(),
            "id:(1 OR 2)"
        );
        assert_eq!(
            Criteria::any_of("id", Vec::<String>::new()).to_query_string(),
            "(*:* -*:*)"
        );
        assert_eq!(
            Criteria::is("cat", "book")
                .or(Criteria::any_of("id", Vec::<String>::new()))
                .to_query_string(),
            "cat:book OR (*:* -*:*)"
        );
        assert_eq!(Criteria::exists("name").to_query_string(), "name:[* TO *]");
        assert_eq!(
            Criteria::is("name", Value::Null).to_query_string(),
            "-name:[* TO *]"
        );
    }
}
