//! Column data types: header declaration, value-based inference and validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::recognize::{header_has_keyword, header_tokens};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(?:https?://|www\.)[^\s/$.?#][^\s]*$").unwrap());

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}|\d{8})(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .unwrap()
});

static PHONE_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-().]").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{5,14}$|^0\d{6,14}$").unwrap());

static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{3,10}$").unwrap());

/// Header keywords that declare a column's type, checked in this order.
const DECLARATIONS: &[(DataType, &[&str])] = &[
    (DataType::Email, &["email", "mail", "courriel"]),
    (DataType::Phone, &["phone", "tel", "telephone", "mobile", "cell", "gsm"]),
    (DataType::Date, &["date", "time", "created", "updated", "birth", "dob", "timestamp"]),
    (DataType::Url, &["url", "link", "website", "http"]),
    (DataType::PostalCode, &["postal", "zip", "postcode"]),
];

/// Value-based inference candidates, in priority order.
const INFERENCE_ORDER: &[DataType] = &[
    DataType::Email,
    DataType::Url,
    DataType::Date,
    DataType::Numeric,
    DataType::Phone,
];

/// Inferred or declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Email,
    Url,
    Date,
    Numeric,
    Phone,
    PostalCode,
    Categorical,
    Text,
    /// No populated values.
    Empty,
}

impl DataType {
    /// Whether a populated value conforms to this type.
    pub fn validate(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            DataType::Email => EMAIL_RE.is_match(value),
            DataType::Url => URL_RE.is_match(value),
            DataType::Date => DATE_RE.is_match(value),
            DataType::Numeric => is_numeric(value),
            DataType::Phone => PHONE_RE.is_match(&PHONE_STRIP_RE.replace_all(value, "")),
            DataType::PostalCode => {
                let compact: String = value
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '-')
                    .collect();
                POSTAL_CODE_RE.is_match(&compact.to_uppercase())
            }
            DataType::Categorical | DataType::Text | DataType::Empty => true,
        }
    }

    /// Free-form or label-like columns.
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Categorical | DataType::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Email => "email",
            DataType::Url => "url",
            DataType::Date => "date",
            DataType::Numeric => "numeric",
            DataType::Phone => "phone",
            DataType::PostalCode => "postal_code",
            DataType::Categorical => "categorical",
            DataType::Text => "text",
            DataType::Empty => "empty",
        }
    }
}

/// Parse as a finite number, allowing thousands separators.
pub fn is_numeric(value: &str) -> bool {
    parse_number(value).is_some()
}

/// Parse a number, allowing `1,234.5` style thousands separators.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<f64>() {
        return n.is_finite().then_some(n);
    }
    let grouped = trimmed.contains(',')
        && trimmed
            .split('.')
            .next()
            .is_some_and(|int| int.split(',').skip(1).all(|g| g.len() == 3));
    if grouped {
        trimmed.replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite())
    } else {
        None
    }
}

/// Type declared by the header, if any keyword matches.
pub fn declared_type(header: &str) -> Option<DataType> {
    let tokens = header_tokens(header);
    DECLARATIONS
        .iter()
        .find(|(_, keywords)| header_has_keyword(&tokens, keywords))
        .map(|(data_type, _)| *data_type)
}

/// Thresholds for value-based inference.
#[derive(Debug, Clone, Copy)]
pub struct InferenceThresholds {
    /// Share of values a type must validate to win.
    pub match_ratio: f64,
    /// Upper bound on distinct values for a categorical column.
    pub categorical_max_unique: usize,
    /// Upper bound on distinct/populated for a categorical column.
    pub categorical_max_ratio: f64,
}

/// Infer a type from populated (trimmed) values.
pub fn infer_type(values: &[String], unique_count: usize, thresholds: InferenceThresholds) -> DataType {
    if values.is_empty() {
        return DataType::Empty;
    }
    let total = values.len() as f64;
    for candidate in INFERENCE_ORDER {
        let matches = values.iter().filter(|v| candidate.validate(v)).count();
        if matches as f64 / total >= thresholds.match_ratio {
            return *candidate;
        }
    }
    let ratio = unique_count as f64 / total;
    if unique_count <= thresholds.categorical_max_unique && ratio <= thresholds.categorical_max_ratio {
        DataType::Categorical
    } else {
        DataType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> InferenceThresholds {
        InferenceThresholds {
            match_ratio: 0.6,
            categorical_max_unique: 20,
            categorical_max_ratio: 0.5,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validators() {
        assert!(DataType::Email.validate("a@x.com"));
        assert!(!DataType::Email.validate("not-an-email"));
        assert!(DataType::Url.validate("https://example.org/a?b=1"));
        assert!(DataType::Date.validate("2024-01-31"));
        assert!(DataType::Date.validate("31/01/2024"));
        assert!(DataType::Date.validate("2024-01-31T10:00:00Z"));
        assert!(!DataType::Date.validate("yesterday"));
        assert!(DataType::Phone.validate("+212 (6) 12-34-56-78"));
        assert!(DataType::Phone.validate("0612345678"));
        assert!(!DataType::Phone.validate("12"));
        assert!(DataType::PostalCode.validate("sw1a 1aa"));
        assert!(DataType::Numeric.validate("1,234.5"));
        assert!(!DataType::Numeric.validate("12,34"));
    }

    #[test]
    fn test_declared_type() {
        assert_eq!(declared_type("Contact Email"), Some(DataType::Email));
        assert_eq!(declared_type("mobile_no"), Some(DataType::Phone));
        assert_eq!(declared_type("date_of_birth"), Some(DataType::Date));
        assert_eq!(declared_type("zip"), Some(DataType::PostalCode));
        assert_eq!(declared_type("hotel"), None);
        assert_eq!(declared_type("amount"), None);
    }

    #[test]
    fn test_infer_priority() {
        let t = thresholds();
        assert_eq!(infer_type(&strings(&["a@x.com", "b@y.org"]), 2, t), DataType::Email);
        assert_eq!(infer_type(&strings(&["1", "2", "3.5"]), 3, t), DataType::Numeric);
        assert_eq!(
            infer_type(&strings(&["2020-01-01", "2021-02-02", "x"]), 3, t),
            DataType::Date
        );
        assert_eq!(infer_type(&[], 0, t), DataType::Empty);
    }

    #[test]
    fn test_infer_categorical_vs_text() {
        let t = thresholds();
        let repeated = strings(&["red", "blue", "red", "blue", "red", "red"]);
        assert_eq!(infer_type(&repeated, 2, t), DataType::Categorical);
        let distinct = strings(&["alpha", "beta", "gamma"]);
        assert_eq!(infer_type(&distinct, 3, t), DataType::Text);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("1,234,567"), Some(1234567.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("abc"), None);
    }
}
