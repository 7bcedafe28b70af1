use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of the select editor that disables the filter's effect.
pub const SELECT_ALL_VALUE: &str = "__all__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Text,
    Boolean,
    Number,
    Date,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

impl NumericOperator {
    pub const ALL: [NumericOperator; 6] = [
        NumericOperator::Eq,
        NumericOperator::NotEq,
        NumericOperator::Gt,
        NumericOperator::Gte,
        NumericOperator::Lt,
        NumericOperator::Lte,
    ];

    /// Token used on the wire (`filter_<id>_op`).
    pub fn as_str(self) -> &'static str {
        match self {
            NumericOperator::Eq => "=",
            NumericOperator::NotEq => "!=",
            NumericOperator::Gt => ">",
            NumericOperator::Gte => ">=",
            NumericOperator::Lt => "<",
            NumericOperator::Lte => "<=",
        }
    }

    /// Symbol shown on active-filter badges.
    pub fn symbol(self) -> &'static str {
        match self {
            NumericOperator::Eq => "=",
            NumericOperator::NotEq => "≠",
            NumericOperator::Gt => ">",
            NumericOperator::Gte => "≥",
            NumericOperator::Lt => "<",
            NumericOperator::Lte => "≤",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericOperator::Eq => "Igual a",
            NumericOperator::NotEq => "Distinto de",
            NumericOperator::Gt => "Mayor que",
            NumericOperator::Gte => "Mayor o igual que",
            NumericOperator::Lt => "Menor que",
            NumericOperator::Lte => "Menor o igual que",
        }
    }
}

impl fmt::Display for NumericOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericOperator {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumericOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseFilterError::UnknownOperator(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFilterError {
    #[error("unknown numeric operator `{0}`")]
    UnknownOperator(String),
    #[error("`{0}` is not a boolean filter value")]
    InvalidBoolean(String),
    #[error("`{0}` is not an ISO-8601 date")]
    InvalidDate(String),
}

/// Numeric filter as typed by the user. The number stays textual so that a
/// half-typed or out-of-range entry is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericFilter {
    pub op: Option<NumericOperator>,
    pub value: String,
}

impl NumericFilter {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            op: None,
            value: value.into(),
        }
    }

    pub fn with_op(op: NumericOperator, value: impl Into<String>) -> Self {
        Self {
            op: Some(op),
            value: value.into(),
        }
    }

    /// `"<op>:<value>"` when an operator is present, the bare value otherwise.
    pub fn encode(&self) -> String {
        match self.op {
            Some(op) => format!("{}:{}", op.as_str(), self.value),
            None => self.value.clone(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, ParseFilterError> {
        match raw.split_once(':') {
            Some((op, value)) => Ok(Self::with_op(op.parse()?, value)),
            None => Ok(Self::plain(raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FilterValue {
    Text(String),
    Boolean(bool),
    Date(DateTime<Utc>),
    Number(NumericFilter),
    Select(String),
}

impl FilterValue {
    /// Value a freshly added filter starts with.
    pub fn default_for(filter_type: FilterType, operators: bool, now: DateTime<Utc>) -> Self {
        match filter_type {
            FilterType::Text => FilterValue::Text(String::new()),
            FilterType::Boolean => FilterValue::Boolean(true),
            FilterType::Date => FilterValue::Date(now),
            FilterType::Number if operators => {
                FilterValue::Number(NumericFilter::with_op(NumericOperator::Eq, "0"))
            }
            FilterType::Number => FilterValue::Number(NumericFilter::plain("0")),
            FilterType::Select => FilterValue::Select(SELECT_ALL_VALUE.to_string()),
        }
    }

    /// Decodes the string form an editor or a caller hands over.
    pub fn parse(filter_type: FilterType, raw: &str) -> Result<Self, ParseFilterError> {
        match filter_type {
            FilterType::Text => Ok(FilterValue::Text(raw.to_string())),
            FilterType::Select => Ok(FilterValue::Select(raw.to_string())),
            FilterType::Boolean => match raw {
                "true" => Ok(FilterValue::Boolean(true)),
                "false" => Ok(FilterValue::Boolean(false)),
                other => Err(ParseFilterError::InvalidBoolean(other.to_string())),
            },
            FilterType::Number => NumericFilter::decode(raw).map(FilterValue::Number),
            FilterType::Date => parse_iso_datetime(raw)
                .map(FilterValue::Date)
                .ok_or_else(|| ParseFilterError::InvalidDate(raw.to_string())),
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            FilterValue::Text(_) => FilterType::Text,
            FilterValue::Boolean(_) => FilterType::Boolean,
            FilterValue::Date(_) => FilterType::Date,
            FilterValue::Number(_) => FilterType::Number,
            FilterValue::Select(_) => FilterType::Select,
        }
    }

    /// String form fed back into editors.
    pub fn raw(&self) -> String {
        match self {
            FilterValue::Text(text) | FilterValue::Select(text) => text.clone(),
            FilterValue::Boolean(flag) => flag.to_string(),
            FilterValue::Date(date) => date.to_rfc3339(),
            FilterValue::Number(numeric) => numeric.encode(),
        }
    }

    pub fn is_select_all(&self) -> bool {
        matches!(self, FilterValue::Select(value) if value == SELECT_ALL_VALUE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterValue,
}

impl ColumnFilter {
    pub fn new(id: impl Into<String>, value: FilterValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Accepts RFC 3339 timestamps, naive `yyyy-MM-ddTHH:mm:ss` and plain dates.
pub fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
