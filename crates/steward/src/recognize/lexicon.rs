//! Word lists used by keyword recognizers and by job-title generalization.

/// Job titles and the broader occupational group they generalize to.
pub static JOB_TITLES: &[(&str, &str)] = &[
    ("software engineer", "engineering"),
    ("software developer", "engineering"),
    ("developer", "engineering"),
    ("engineer", "engineering"),
    ("data scientist", "engineering"),
    ("data engineer", "engineering"),
    ("data analyst", "business"),
    ("devops engineer", "engineering"),
    ("architect", "engineering"),
    ("technician", "engineering"),
    ("programmer", "engineering"),
    ("doctor", "healthcare"),
    ("physician", "healthcare"),
    ("surgeon", "healthcare"),
    ("nurse", "healthcare"),
    ("pharmacist", "healthcare"),
    ("dentist", "healthcare"),
    ("midwife", "healthcare"),
    ("teacher", "education"),
    ("professor", "education"),
    ("lecturer", "education"),
    ("researcher", "education"),
    ("student", "education"),
    ("accountant", "finance"),
    ("auditor", "finance"),
    ("banker", "finance"),
    ("financial analyst", "finance"),
    ("cashier", "finance"),
    ("manager", "management"),
    ("director", "management"),
    ("ceo", "management"),
    ("cto", "management"),
    ("cfo", "management"),
    ("supervisor", "management"),
    ("project manager", "management"),
    ("sales representative", "sales"),
    ("salesperson", "sales"),
    ("sales manager", "sales"),
    ("marketing manager", "sales"),
    ("consultant", "business"),
    ("analyst", "business"),
    ("lawyer", "legal"),
    ("attorney", "legal"),
    ("judge", "legal"),
    ("paralegal", "legal"),
    ("police officer", "public service"),
    ("firefighter", "public service"),
    ("soldier", "public service"),
    ("civil servant", "public service"),
    ("driver", "transport"),
    ("pilot", "transport"),
    ("mechanic", "trades"),
    ("electrician", "trades"),
    ("plumber", "trades"),
    ("carpenter", "trades"),
    ("farmer", "agriculture"),
    ("chef", "hospitality"),
    ("cook", "hospitality"),
    ("waiter", "hospitality"),
    ("receptionist", "administration"),
    ("secretary", "administration"),
    ("administrator", "administration"),
    ("clerk", "administration"),
    ("designer", "creative"),
    ("journalist", "creative"),
    ("writer", "creative"),
    ("artist", "creative"),
];

pub static MEDICAL_TERMS: &[&str] = &[
    "diabetes",
    "asthma",
    "hypertension",
    "cancer",
    "hiv",
    "aids",
    "tuberculosis",
    "depression",
    "anxiety",
    "epilepsy",
    "alzheimer",
    "arthritis",
    "covid-19",
    "hepatitis",
    "obesity",
    "stroke",
    "migraine",
    "bipolar disorder",
    "schizophrenia",
    "anemia",
];

pub static NATIONALITIES: &[&str] = &[
    "moroccan", "french", "american", "british", "german", "spanish", "italian",
    "portuguese", "dutch", "belgian", "swiss", "canadian", "mexican", "brazilian",
    "argentinian", "chinese", "japanese", "korean", "indian", "pakistani",
    "egyptian", "algerian", "tunisian", "nigerian", "senegalese", "turkish",
    "russian", "ukrainian", "polish", "swedish", "norwegian", "australian",
];

pub static RELIGIONS: &[&str] = &[
    "muslim", "christian", "catholic", "protestant", "orthodox", "jewish",
    "buddhist", "hindu", "sikh", "atheist", "agnostic",
];

pub static GENDERS: &[&str] = &[
    "male", "female", "man", "woman", "m", "f", "non-binary", "homme", "femme",
];

/// Broader group for a job title, if the title is known.
///
/// Exact matches win; otherwise the longest known title contained in the
/// value is used, so "senior software engineer" maps like "software engineer".
pub fn job_category(title: &str) -> Option<&'static str> {
    let normalized = title.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if let Some((_, category)) = JOB_TITLES.iter().find(|(t, _)| *t == normalized) {
        return Some(category);
    }
    JOB_TITLES
        .iter()
        .filter(|(t, _)| contains_words(&normalized, t))
        .max_by_key(|(t, _)| t.len())
        .map(|(_, category)| *category)
}

/// Whether `haystack` contains `needle` on word boundaries.
pub(crate) fn contains_words(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_category_exact_and_contained() {
        assert_eq!(job_category("Nurse"), Some("healthcare"));
        assert_eq!(job_category("Senior Software Engineer"), Some("engineering"));
        assert_eq!(job_category("Head Chef"), Some("hospitality"));
        assert_eq!(job_category("Astronaut"), None);
    }

    #[test]
    fn test_contains_words_respects_boundaries() {
        assert!(contains_words("chief cook", "cook"));
        assert!(!contains_words("cookbook author", "cook"));
    }
}
