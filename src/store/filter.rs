//! Query filters
//!
//! A filter is a conjunction of field conditions; an empty filter matches
//! every document.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ID_FIELD;

/// Field comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// Equals
    #[serde(rename = "eq")]
    Eq,

    /// Not equals
    #[serde(rename = "neq")]
    Neq,

    /// Greater than
    #[serde(rename = "gt")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "gte")]
    Gte,

    /// Less than
    #[serde(rename = "lt")]
    Lt,

    /// Less than or equal
    #[serde(rename = "lte")]
    Lte,

    /// Value is one of a list
    #[serde(rename = "in")]
    In,

    /// Field is present
    #[serde(rename = "exists")]
    Exists,
}

/// One field condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub comparator: Comparator,
    pub value: Value,
}

impl Condition {
    fn matches(&self, doc: &Value) -> bool {
        let field_value = match doc.get(&self.field) {
            Some(v) => v,
            None => return self.comparator == Comparator::Exists && self.value == Value::Bool(false),
        };

        match self.comparator {
            Comparator::Eq => field_value == &self.value,
            Comparator::Neq => field_value != &self.value,
            Comparator::Gt => compare_values(Some(field_value), Some(&self.value)) == Ordering::Greater,
            Comparator::Gte => compare_values(Some(field_value), Some(&self.value)) != Ordering::Less,
            Comparator::Lt => compare_values(Some(field_value), Some(&self.value)) == Ordering::Less,
            Comparator::Lte => compare_values(Some(field_value), Some(&self.value)) != Ordering::Greater,
            Comparator::In => self
                .value
                .as_array()
                .map(|list| list.contains(field_value))
                .unwrap_or(false),
            Comparator::Exists => self.value != Value::Bool(false),
        }
    }
}

/// A conjunction of field conditions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Single equality filter
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, Comparator::Eq, value)
    }

    /// Filter on the document identifier
    pub fn by_id(id: i64) -> Self {
        Self::eq(ID_FIELD, id)
    }

    /// Add a condition (builder style)
    pub fn and(mut self, field: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            comparator,
            value: value.into(),
        });
        self
    }

    /// Whether this filter has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check a document against every condition
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Ordering between two optional JSON values; numbers and strings order
/// naturally, anything else compares equal
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
