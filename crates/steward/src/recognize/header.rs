//! Header-name analysis: tokenization and fuzzy matching against entity synonyms.

use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};

/// Header synonyms per entity label.
static HEADER_SYNONYMS: &[(&str, &[&str])] = &[
    ("EMAIL_ADDRESS", &["email", "e_mail", "mail", "email_address", "courriel"]),
    ("PHONE_NUMBER", &["phone", "telephone", "tel", "mobile", "cell", "phone_number", "gsm"]),
    (
        "PERSON",
        &["name", "full_name", "first_name", "last_name", "surname", "given_name", "nom", "prenom"],
    ),
    ("LOCATION", &["address", "street", "city", "location", "adresse", "ville"]),
    ("POSTAL_CODE", &["zip", "zipcode", "zip_code", "postal_code", "postcode"]),
    ("DATE_OF_BIRTH", &["dob", "birth_date", "date_of_birth", "birthdate", "birthday"]),
    ("DATE_TIME", &["date", "datetime", "timestamp", "created_at", "updated_at"]),
    ("AGE", &["age"]),
    ("JOB_TITLE", &["job", "job_title", "occupation", "profession", "position"]),
    ("GENDER", &["gender", "sex"]),
    ("NATIONALITY", &["nationality", "citizenship"]),
    ("RELIGION", &["religion", "faith"]),
    ("CIN", &["cin", "cni", "national_id", "id_card"]),
    ("PASSPORT", &["passport", "passport_number"]),
    ("DRIVER_LICENSE", &["driver_license", "driving_licence", "license_number"]),
    ("INSURANCE_NUMBER", &["insurance_number", "ssn", "social_security", "cnss"]),
    ("TIN", &["tin", "tax_id", "tax_number"]),
    ("IBAN_CODE", &["iban"]),
    ("BANK_ACCOUNT", &["bank_account", "account_number", "rib"]),
    ("CREDIT_CARD", &["credit_card", "card_number", "cc_number"]),
    ("IP_ADDRESS", &["ip", "ip_address"]),
    ("INCOME", &["income", "salary", "wage", "revenue"]),
    ("MEDICAL_CONDITION", &["diagnosis", "condition", "disease", "medical_condition"]),
    ("BLOOD_TYPE", &["blood_type", "blood_group"]),
];

/// Synonyms shorter than this only match exactly.
const MIN_FUZZY_LEN: usize = 5;

/// A header that resembles a known entity synonym.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub label: String,
    pub synonym: String,
    pub similarity: f64,
}

/// Split a header into lowercase word tokens.
///
/// Splits on any non-alphanumeric character and on camelCase boundaries:
/// `"dateOfBirth"` and `"date-of-birth"` both become `["date", "of", "birth"]`.
pub fn header_tokens(header: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in header.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Whether any header token matches one of `keywords`.
///
/// Keywords of four or more characters also match as a token prefix
/// (`"zip"` needs an exact token, `"birth"` matches `"birthdate"`).
pub fn header_has_keyword(tokens: &[String], keywords: &[&str]) -> bool {
    tokens.iter().any(|token| {
        keywords
            .iter()
            .any(|kw| token == kw || (kw.len() >= 4 && token.starts_with(kw)))
    })
}

/// Header matcher with a configurable similarity threshold.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    threshold: f64,
}

impl Default for HeaderMatcher {
    fn default() -> Self {
        Self { threshold: 0.92 }
    }
}

impl HeaderMatcher {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Best entity label for a header, if any synonym is close enough.
    pub fn match_header(&self, header: &str) -> Option<HeaderMatch> {
        let tokens = header_tokens(header);
        if tokens.is_empty() {
            return None;
        }
        let joined = tokens.join("_");

        let mut best: Option<HeaderMatch> = None;
        for (label, synonyms) in HEADER_SYNONYMS {
            for synonym in synonyms.iter() {
                let similarity = self.similarity(&joined, &tokens, synonym);
                if similarity < self.threshold {
                    continue;
                }
                let better = best.as_ref().is_none_or(|b| similarity > b.similarity);
                if better {
                    best = Some(HeaderMatch {
                        label: label.to_string(),
                        synonym: synonym.to_string(),
                        similarity,
                    });
                }
            }
        }
        best
    }

    fn similarity(&self, joined: &str, tokens: &[String], synonym: &str) -> f64 {
        if joined == synonym {
            return 1.0;
        }
        // Single-word synonyms may match any one token of a compound header,
        // slightly below an exact whole-header match.
        if !synonym.contains('_') && tokens.iter().any(|t| t == synonym) {
            return 0.97;
        }
        if synonym.len() < MIN_FUZZY_LEN || joined.len() < MIN_FUZZY_LEN {
            return 0.0;
        }
        jaro_winkler::similarity(joined.chars(), synonym.chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_tokens() {
        assert_eq!(header_tokens("dateOfBirth"), vec!["date", "of", "birth"]);
        assert_eq!(header_tokens("Email Address"), vec!["email", "address"]);
        assert_eq!(header_tokens("zip-code_2"), vec!["zip", "code", "2"]);
        assert!(header_tokens("__").is_empty());
    }

    #[test]
    fn test_header_has_keyword() {
        let tokens = header_tokens("BirthDate");
        assert!(header_has_keyword(&tokens, &["birth"]));
        assert!(!header_has_keyword(&header_tokens("agent"), &["age"]));
        assert!(header_has_keyword(&header_tokens("age"), &["age"]));
    }

    #[test]
    fn test_match_exact_and_token() {
        let matcher = HeaderMatcher::default();
        assert_eq!(matcher.match_header("email").unwrap().label, "EMAIL_ADDRESS");
        assert_eq!(matcher.match_header("Customer Email").unwrap().label, "EMAIL_ADDRESS");
        assert_eq!(matcher.match_header("DateOfBirth").unwrap().label, "DATE_OF_BIRTH");
        assert_eq!(matcher.match_header("age").unwrap().label, "AGE");
    }

    #[test]
    fn test_match_fuzzy() {
        let matcher = HeaderMatcher::default();
        let m = matcher.match_header("telephone_no").unwrap();
        assert_eq!(m.label, "PHONE_NUMBER");
    }

    #[test]
    fn test_no_match_for_short_lookalikes() {
        let matcher = HeaderMatcher::default();
        assert!(matcher.match_header("page").is_none());
        assert!(matcher.match_header("quantity").is_none());
    }
}
