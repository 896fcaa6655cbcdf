//! Rule-based recognizer: regular expressions, keyword lists and header context.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::header::{header_has_keyword, header_tokens};
use super::lexicon::{GENDERS, JOB_TITLES, MEDICAL_TERMS, NATIONALITIES, RELIGIONS};
use super::recognizer::{EntityHit, Recognizer, Span, resolve_overlaps};
use crate::error::RecognizerError;

/// Pattern recognizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Hits scoring below this are discarded.
    pub min_score: f64,
    /// Added to a rule's base score when the header carries a context word.
    pub context_boost: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            min_score: 0.6,
            context_boost: 0.35,
        }
    }
}

enum Matcher {
    /// Regex; capture group 1 is the span when present, else the whole match.
    Pattern {
        regex: Regex,
        validate: Option<fn(&str) -> bool>,
    },
    /// Whole-word, case-insensitive keyword occurrences.
    Keywords(Vec<&'static str>),
}

struct Rule {
    label: &'static str,
    matcher: Matcher,
    base_score: f64,
    context: &'static [&'static str],
}

fn pattern(label: &'static str, re: &str, base_score: f64, context: &'static [&'static str]) -> Rule {
    Rule {
        label,
        matcher: Matcher::Pattern {
            regex: Regex::new(re).unwrap(),
            validate: None,
        },
        base_score,
        context,
    }
}

fn validated(
    label: &'static str,
    re: &str,
    validate: fn(&str) -> bool,
    base_score: f64,
    context: &'static [&'static str],
) -> Rule {
    Rule {
        label,
        matcher: Matcher::Pattern {
            regex: Regex::new(re).unwrap(),
            validate: Some(validate),
        },
        base_score,
        context,
    }
}

fn keywords(
    label: &'static str,
    words: Vec<&'static str>,
    base_score: f64,
    context: &'static [&'static str],
) -> Rule {
    Rule {
        label,
        matcher: Matcher::Keywords(words),
        base_score,
        context,
    }
}

// =============================================================================
// RULES
// =============================================================================
// Compiled once on first use. Base scores below the default minimum (0.6)
// only fire when the header supplies context.

const DATE_RE: &str = r"\b(?:\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4})(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?\b";

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        pattern(
            "EMAIL_ADDRESS",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            0.9,
            &["email", "mail", "courriel"],
        ),
        pattern(
            "IP_ADDRESS",
            r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
            0.6,
            &["ip", "host", "address"],
        ),
        pattern(
            "PHONE_NUMBER",
            r"\+\d{1,3}[\s.-]?(?:\(?\d{1,4}\)?[\s.-]?){2,5}\d{2,4}\b",
            0.7,
            &["phone", "tel", "telephone", "mobile", "cell", "gsm", "contact", "fax"],
        ),
        pattern(
            "PHONE_NUMBER",
            r"\b0\d(?:[\s.-]?\d{2}){4}\b",
            0.5,
            &["phone", "tel", "telephone", "mobile", "cell", "gsm", "contact", "fax"],
        ),
        pattern(
            "PHONE_NUMBER",
            r"\(?\b\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b",
            0.45,
            &["phone", "tel", "telephone", "mobile", "cell", "gsm", "contact", "fax"],
        ),
        validated(
            "CREDIT_CARD",
            r"\b(?:\d[ -]?){12,18}\d\b",
            luhn_valid,
            0.65,
            &["card", "credit", "cc", "payment"],
        ),
        validated(
            "IBAN_CODE",
            r"\b[A-Z]{2}\d{2}(?:\s?[A-Z0-9]){11,30}\b",
            iban_valid,
            0.85,
            &["iban", "bank", "account", "rib"],
        ),
        pattern(
            "CIN",
            r"\b[A-Z]{1,2}\d{5,7}\b",
            0.5,
            &["cin", "cni", "identity", "national", "id"],
        ),
        pattern("PASSPORT", r"\b[A-Z]\d{7}\b", 0.4, &["passport", "passeport"]),
        pattern(
            "DRIVER_LICENSE",
            r"\b[A-Z]{1,2}[-/]?\d{6,8}\b",
            0.3,
            &["driver", "driving", "licence", "license", "permis"],
        ),
        pattern(
            "INSURANCE_NUMBER",
            r"\b\d{9,13}\b",
            0.3,
            &["insurance", "cnss", "ssn", "social", "amo", "mutuelle"],
        ),
        pattern("TIN", r"\b\d{15}\b", 0.35, &["tax", "tin", "fiscal", "vat"]),
        pattern(
            "INTERNAL_ID",
            r"(?i)\b(?:EMP|STF|USR)-\d{4,6}\b",
            0.75,
            &["employee", "staff", "internal"],
        ),
        pattern("BANK_ACCOUNT", r"\b\d{10,24}\b", 0.25, &["account", "rib", "bank"]),
        pattern(
            "POSTAL_CODE",
            r"\b\d{5}(?:-\d{4})?\b",
            0.3,
            &["zip", "postal", "postcode", "cp"],
        ),
        pattern(
            "DATE_TIME",
            DATE_RE,
            0.65,
            &["created", "updated", "timestamp", "time", "datetime"],
        ),
        pattern(
            "DATE_OF_BIRTH",
            DATE_RE,
            0.35,
            &["birth", "dob", "born", "naissance", "birthday"],
        ),
        pattern("AGE", r"^\s*(\d{1,3})\s*$", 0.3, &["age"]),
        pattern(
            "INCOME",
            r"(?i)^\s*[$€£]?\s*(\d{1,3}(?:[ ,]\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*(?:[$€£]|mad|eur|usd|dh)?\s*$",
            0.3,
            &["income", "salary", "salaire", "wage", "revenue", "pay"],
        ),
        pattern(
            "BLOOD_TYPE",
            r"(?i)(?:^|[\s,;(])((?:AB|A|B|O)\s?[+-])(?:$|[\s,;)])",
            0.45,
            &["blood", "sanguin", "group"],
        ),
        pattern(
            "PERSON",
            r"^\s*(\p{Lu}[\p{Ll}'’-]+(?:\s+\p{Lu}[\p{Ll}'’-]+){0,3})\s*$",
            0.3,
            &["name", "nom", "prenom", "surname", "firstname", "lastname", "fullname"],
        ),
        pattern(
            "LOCATION",
            r"(?i)\b\d{1,5}\s+(?:[a-z]+\s+){0,4}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|rue|bd)\b",
            0.7,
            &["address", "street", "adresse"],
        ),
        pattern(
            "LOCATION",
            r"^\s*(\S.*?)\s*$",
            0.25,
            &["city", "street", "ville", "adresse", "town", "location", "addr"],
        ),
        keywords("GENDER", GENDERS.to_vec(), 0.4, &["gender", "sex", "genre"]),
        keywords(
            "NATIONALITY",
            NATIONALITIES.to_vec(),
            0.45,
            &["nationality", "citizenship", "nationalite"],
        ),
        keywords("RELIGION", RELIGIONS.to_vec(), 0.5, &["religion", "faith", "belief"]),
        keywords(
            "MEDICAL_CONDITION",
            MEDICAL_TERMS.to_vec(),
            0.6,
            &["diagnosis", "condition", "medical", "disease", "health", "illness"],
        ),
        keywords(
            "JOB_TITLE",
            JOB_TITLES.iter().map(|(title, _)| *title).collect(),
            0.45,
            &["job", "title", "occupation", "profession", "position", "role", "poste"],
        ),
    ]
});

// =============================================================================
// VALIDATORS
// =============================================================================

/// Luhn checksum over the digits of a card number.
fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// ISO 13616 mod-97 check.
fn iban_valid(candidate: &str) -> bool {
    let compact: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    if !(15..=34).contains(&compact.len()) {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    let mut remainder: u32 = 0;
    for ch in tail.chars().chain(head.chars()) {
        let value = match ch.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }
    remainder == 1
}

// =============================================================================
// RECOGNIZER
// =============================================================================

/// Built-in recognizer combining regex and keyword rules with header context.
#[derive(Debug, Clone, Default)]
pub struct PatternRecognizer {
    config: RecognizerConfig,
}

impl PatternRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RecognizerConfig) -> Self {
        Self { config }
    }

    fn analyze_tokens(&self, tokens: &[String], value: &str) -> Vec<EntityHit> {
        let mut hits = Vec::new();
        for rule in RULES.iter() {
            let score = if header_has_keyword(tokens, rule.context) {
                (rule.base_score + self.config.context_boost).min(1.0)
            } else {
                rule.base_score
            };
            if score < self.config.min_score {
                continue;
            }
            for span in rule_spans(rule, value) {
                hits.push(EntityHit::new(rule.label, Some(span), score));
            }
        }
        resolve_overlaps(hits, value.len())
    }
}

fn rule_spans(rule: &Rule, value: &str) -> Vec<Span> {
    match &rule.matcher {
        Matcher::Pattern { regex, validate } => regex
            .captures_iter(value)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .filter(|m| validate.is_none_or(|check| check(m.as_str())))
            .map(|m| Span {
                start: m.start(),
                end: m.end(),
            })
            .collect(),
        Matcher::Keywords(words) => keyword_spans(words, value),
    }
}

fn keyword_spans(words: &[&str], value: &str) -> Vec<Span> {
    let trimmed = value.trim();
    let lower = value.to_lowercase();
    // Lowercasing can change byte lengths outside ASCII; fall back to a
    // whole-value span in that case.
    let offsets_stable = lower.len() == value.len();
    let mut spans = Vec::new();

    for word in words {
        if word.len() <= 2 {
            if trimmed.eq_ignore_ascii_case(word) {
                let start = value.len() - value.trim_start().len();
                spans.push(Span {
                    start,
                    end: start + trimmed.len(),
                });
            }
            continue;
        }
        for (start, _) in lower.match_indices(word) {
            let end = start + word.len();
            let before = lower[..start].chars().next_back();
            let after = lower[end..].chars().next();
            if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric) {
                continue;
            }
            if offsets_stable {
                spans.push(Span { start, end });
            } else {
                spans.push(Span {
                    start: 0,
                    end: value.len(),
                });
            }
        }
    }
    spans
}

impl Recognizer for PatternRecognizer {
    fn analyze(&self, column: &str, value: &str) -> Result<Vec<EntityHit>, RecognizerError> {
        Ok(self.analyze_tokens(&header_tokens(column), value))
    }

    fn name(&self) -> &str {
        "pattern"
    }

    fn analyze_column(
        &self,
        column: &str,
        values: &[String],
    ) -> Result<Vec<Vec<EntityHit>>, RecognizerError> {
        let tokens = header_tokens(column);
        Ok(values
            .iter()
            .map(|v| self.analyze_tokens(&tokens, v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(column: &str, value: &str) -> Vec<String> {
        PatternRecognizer::new()
            .analyze(column, value)
            .unwrap()
            .into_iter()
            .map(|h| h.label)
            .collect()
    }

    #[test]
    fn test_email_detected_anywhere() {
        assert_eq!(labels("notes", "contact a@x.com today"), vec!["EMAIL_ADDRESS"]);
        assert!(labels("email", "not-an-email").is_empty());
    }

    #[test]
    fn test_email_span() {
        let hits = PatternRecognizer::new()
            .analyze("notes", "mail me: bob@example.org")
            .unwrap();
        assert_eq!(hits.len(), 1);
        let span = hits[0].span.unwrap();
        assert_eq!(&"mail me: bob@example.org"[span.start..span.end], "bob@example.org");
    }

    #[test]
    fn test_context_enables_weak_rules() {
        assert_eq!(labels("age", "34"), vec!["AGE"]);
        assert!(labels("quantity", "34").is_empty());
        assert_eq!(labels("zip_code", "90210"), vec!["POSTAL_CODE"]);
        assert!(labels("amount", "90210").is_empty());
    }

    #[test]
    fn test_date_of_birth_beats_date_time_in_birth_columns() {
        assert_eq!(labels("date_of_birth", "1985-03-12"), vec!["DATE_OF_BIRTH"]);
        assert_eq!(labels("created_at", "2024-01-02"), vec!["DATE_TIME"]);
    }

    #[test]
    fn test_phone_numbers() {
        assert_eq!(labels("notes", "+212 6 12 34 56 78"), vec!["PHONE_NUMBER"]);
        assert_eq!(labels("phone", "0612345678"), vec!["PHONE_NUMBER"]);
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111 1111 1111 1111"));
        assert!(!luhn_valid("4111 1111 1111 1112"));
        assert_eq!(labels("notes", "card 4111 1111 1111 1111"), vec!["CREDIT_CARD"]);
    }

    #[test]
    fn test_iban() {
        assert!(iban_valid("GB82 WEST 1234 5698 7654 32"));
        assert!(!iban_valid("GB82 WEST 1234 5698 7654 33"));
        assert_eq!(labels("notes", "GB82WEST12345698765432"), vec!["IBAN_CODE"]);
    }

    #[test]
    fn test_keyword_rules() {
        assert_eq!(labels("gender", "Female"), vec!["GENDER"]);
        assert_eq!(labels("gender", "F"), vec!["GENDER"]);
        assert_eq!(labels("diagnosis", "Type 2 diabetes"), vec!["MEDICAL_CONDITION"]);
        assert_eq!(labels("job_title", "Senior Software Engineer"), vec!["JOB_TITLE"]);
    }

    #[test]
    fn test_person_requires_name_header() {
        assert_eq!(labels("full_name", "Ada Lovelace"), vec!["PERSON"]);
        assert!(labels("product", "Ada Lovelace").is_empty());
    }

    #[test]
    fn test_blood_type() {
        assert_eq!(labels("blood_type", "AB+"), vec!["BLOOD_TYPE"]);
        assert!(labels("grade", "A+").is_empty());
    }

    #[test]
    fn test_internal_id() {
        assert_eq!(labels("ref", "EMP-00123"), vec!["INTERNAL_ID"]);
    }
}
