//! Catalogue of entity labels and their privacy treatment.

use serde::{Deserialize, Serialize};

use crate::recommend::Action;
use crate::recommend::Action::{Generalize, Mask};

use self::PrivacyClass::{Pii, Sii};
use self::RiskLevel::{High, Low, Medium};

/// Personally identifying vs. sensitive (special category) information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrivacyClass {
    Pii,
    Sii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Privacy treatment of one entity label.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityInfo {
    pub label: &'static str,
    pub class: PrivacyClass,
    pub gdpr_category: &'static str,
    pub risk: RiskLevel,
    pub default_action: Action,
    pub description: &'static str,
}

const fn entry(
    label: &'static str,
    class: PrivacyClass,
    gdpr_category: &'static str,
    risk: RiskLevel,
    default_action: Action,
    description: &'static str,
) -> EntityInfo {
    EntityInfo {
        label,
        class,
        gdpr_category,
        risk,
        default_action,
        description,
    }
}

/// Every label a recognizer may emit.
pub static CATALOG: &[EntityInfo] = &[
    entry("PERSON", Pii, "identity", High, Mask, "full or partial personal name"),
    entry("EMAIL_ADDRESS", Pii, "identifier", High, Mask, "email address"),
    entry("PHONE_NUMBER", Pii, "contact", High, Mask, "telephone or mobile number"),
    entry("LOCATION", Pii, "location", Medium, Mask, "street address, city or place"),
    entry("POSTAL_CODE", Pii, "location", Medium, Mask, "postal or zip code"),
    entry("IP_ADDRESS", Pii, "identifier", Medium, Mask, "IPv4 address"),
    entry("CIN", Pii, "identifier", High, Mask, "national identity card number"),
    entry("PASSPORT", Pii, "identifier", High, Mask, "passport number"),
    entry("DRIVER_LICENSE", Pii, "identifier", High, Mask, "driving licence number"),
    entry("INSURANCE_NUMBER", Pii, "identifier", High, Mask, "social or health insurance number"),
    entry("INTERNAL_ID", Pii, "identifier", Medium, Mask, "employee or internal identifier"),
    entry("TIN", Pii, "financial", High, Mask, "tax identification number"),
    entry("IBAN_CODE", Pii, "financial", High, Mask, "international bank account number"),
    entry("BANK_ACCOUNT", Pii, "financial", High, Mask, "domestic bank account number"),
    entry("CREDIT_CARD", Pii, "financial", High, Mask, "payment card number"),
    entry("DATE_TIME", Pii, "temporal", Medium, Generalize, "date or timestamp"),
    entry("DATE_OF_BIRTH", Pii, "temporal", High, Generalize, "date of birth"),
    entry("AGE", Pii, "demographic", Medium, Generalize, "age in years"),
    entry("JOB_TITLE", Pii, "professional", Low, Generalize, "job title or occupation"),
    entry("INCOME", Sii, "financial", High, Generalize, "salary or income amount"),
    entry("GENDER", Sii, "sensitive", Medium, Mask, "gender or sex"),
    entry("NATIONALITY", Sii, "sensitive", Medium, Mask, "nationality or citizenship"),
    entry("RELIGION", Sii, "sensitive", High, Mask, "religious belief"),
    entry("MEDICAL_CONDITION", Sii, "health", High, Mask, "diagnosis or medical condition"),
    entry("BLOOD_TYPE", Sii, "health", High, Mask, "blood group"),
];

/// Alternative spellings emitted by some recognizers.
const ALIASES: &[(&str, &str)] = &[
    ("MIBAN_CODE", "IBAN_CODE"),
    ("EMAIL", "EMAIL_ADDRESS"),
    ("PHONE", "PHONE_NUMBER"),
    ("US_PASSPORT", "PASSPORT"),
    ("US_DRIVER_LICENSE", "DRIVER_LICENSE"),
];

/// Map a label to its canonical catalogue spelling.
pub fn canonical_label(label: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(label))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(label)
}

/// Look up a label (or alias) in the catalogue.
pub fn lookup(label: &str) -> Option<&'static EntityInfo> {
    let label = canonical_label(label);
    CATALOG.iter().find(|e| e.label.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_alias() {
        assert_eq!(lookup("EMAIL_ADDRESS").unwrap().gdpr_category, "identifier");
        assert_eq!(lookup("MIBAN_CODE").unwrap().label, "IBAN_CODE");
        assert!(lookup("SPACESHIP").is_none());
    }

    #[test]
    fn test_generalize_labels() {
        for label in ["DATE_TIME", "DATE_OF_BIRTH", "AGE", "JOB_TITLE"] {
            assert_eq!(lookup(label).unwrap().default_action, Action::Generalize);
        }
        assert_eq!(lookup("PERSON").unwrap().default_action, Action::Mask);
    }

    #[test]
    fn test_labels_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.label != a.label), "{}", a.label);
        }
    }
}
