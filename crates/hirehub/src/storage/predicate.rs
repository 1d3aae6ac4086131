use chrono::{DateTime, Utc};

use super::records::{Document, FieldValue};

/// Storage-level filter expression. Text comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    /// Substring match; for tag fields any tag may contain the needle.
    Contains {
        field: &'static str,
        needle: String,
    },
    Equals {
        field: &'static str,
        value: String,
    },
    /// Set intersection for tag fields, set membership for text fields.
    AnyOf {
        field: &'static str,
        values: Vec<String>,
    },
    /// Inclusive numeric range; records without the field never match.
    Range {
        field: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
    Flag {
        field: &'static str,
        value: bool,
    },
    /// Half-open `[from, to)` timestamp range.
    TimeRange {
        field: &'static str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    Exists {
        field: &'static str,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction that drops `All` terms and collapses trivial cases.
    pub fn and(terms: Vec<Predicate>) -> Predicate {
        let mut terms: Vec<Predicate> = terms
            .into_iter()
            .filter(|term| *term != Predicate::All)
            .collect();
        match terms.len() {
            0 => Predicate::All,
            1 => terms.remove(0),
            _ => Predicate::And(terms),
        }
    }

    pub fn any_text_contains(fields: &[&'static str], needle: &str) -> Predicate {
        Predicate::Or(
            fields
                .iter()
                .map(|field| Predicate::Contains {
                    field: *field,
                    needle: needle.to_string(),
                })
                .collect(),
        )
    }

    pub fn matches<D: Document + ?Sized>(&self, doc: &D) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Contains { field, needle } => {
                let needle = fold(needle);
                match doc.field(field) {
                    Some(FieldValue::Text(text)) => fold(text).contains(&needle),
                    Some(FieldValue::Tags(tags)) => {
                        tags.iter().any(|tag| fold(tag).contains(&needle))
                    }
                    _ => false,
                }
            }
            Predicate::Equals { field, value } => {
                let value = fold(value);
                match doc.field(field) {
                    Some(FieldValue::Text(text)) => fold(text) == value,
                    Some(FieldValue::Tags(tags)) => tags.iter().any(|tag| fold(tag) == value),
                    _ => false,
                }
            }
            Predicate::AnyOf { field, values } => {
                let values: Vec<String> = values.iter().map(|value| fold(value)).collect();
                match doc.field(field) {
                    Some(FieldValue::Text(text)) => values.contains(&fold(text)),
                    Some(FieldValue::Tags(tags)) => {
                        tags.iter().any(|tag| values.contains(&fold(tag)))
                    }
                    _ => false,
                }
            }
            Predicate::Range { field, min, max } => match doc.field(field) {
                Some(FieldValue::Number(number)) => {
                    min.map_or(true, |min| number >= min) && max.map_or(true, |max| number <= max)
                }
                _ => false,
            },
            Predicate::Flag { field, value } => {
                matches!(doc.field(field), Some(FieldValue::Flag(flag)) if flag == *value)
            }
            Predicate::TimeRange { field, from, to } => matches!(
                doc.field(field),
                Some(FieldValue::Timestamp(at)) if at >= *from && at < *to
            ),
            Predicate::Exists { field } => doc.field(field).is_some(),
            Predicate::And(terms) => terms.iter().all(|term| term.matches(doc)),
            Predicate::Or(terms) => terms.iter().any(|term| term.matches(doc)),
        }
    }
}

/// Case folding shared by every text comparison.
fn fold(text: &str) -> String {
    text.to_lowercase()
}
