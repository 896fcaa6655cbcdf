//! Reference data used to enrich columns with derived attributes.

use crate::recognize::{header_has_keyword, header_tokens};

/// External lookup table for the enrich action.
///
/// Implementations must be thread-safe: the apply engine queries one
/// shared instance from several columns at once.
pub trait ReferenceLookup: Send + Sync {
    /// Short name, used as the suffix of the derived column.
    fn name(&self) -> &str;

    /// Whether a header names this reference's domain.
    fn applies_to_header(&self, header: &str) -> bool;

    /// Derived value for a raw cell, if the cell resolves.
    fn lookup(&self, value: &str) -> Option<String>;
}

/// (name, ISO 3166-1 alpha-2, alpha-3)
static COUNTRIES: &[(&str, &str, &str)] = &[
    ("afghanistan", "AF", "AFG"),
    ("albania", "AL", "ALB"),
    ("algeria", "DZ", "DZA"),
    ("argentina", "AR", "ARG"),
    ("australia", "AU", "AUS"),
    ("austria", "AT", "AUT"),
    ("bangladesh", "BD", "BGD"),
    ("belgium", "BE", "BEL"),
    ("brazil", "BR", "BRA"),
    ("bulgaria", "BG", "BGR"),
    ("cameroon", "CM", "CMR"),
    ("canada", "CA", "CAN"),
    ("chile", "CL", "CHL"),
    ("china", "CN", "CHN"),
    ("colombia", "CO", "COL"),
    ("croatia", "HR", "HRV"),
    ("czechia", "CZ", "CZE"),
    ("denmark", "DK", "DNK"),
    ("egypt", "EG", "EGY"),
    ("ethiopia", "ET", "ETH"),
    ("finland", "FI", "FIN"),
    ("france", "FR", "FRA"),
    ("germany", "DE", "DEU"),
    ("ghana", "GH", "GHA"),
    ("greece", "GR", "GRC"),
    ("hungary", "HU", "HUN"),
    ("india", "IN", "IND"),
    ("indonesia", "ID", "IDN"),
    ("iran", "IR", "IRN"),
    ("iraq", "IQ", "IRQ"),
    ("ireland", "IE", "IRL"),
    ("israel", "IL", "ISR"),
    ("italy", "IT", "ITA"),
    ("ivory coast", "CI", "CIV"),
    ("japan", "JP", "JPN"),
    ("jordan", "JO", "JOR"),
    ("kenya", "KE", "KEN"),
    ("lebanon", "LB", "LBN"),
    ("libya", "LY", "LBY"),
    ("malaysia", "MY", "MYS"),
    ("mali", "ML", "MLI"),
    ("mauritania", "MR", "MRT"),
    ("mexico", "MX", "MEX"),
    ("morocco", "MA", "MAR"),
    ("netherlands", "NL", "NLD"),
    ("new zealand", "NZ", "NZL"),
    ("nigeria", "NG", "NGA"),
    ("norway", "NO", "NOR"),
    ("pakistan", "PK", "PAK"),
    ("peru", "PE", "PER"),
    ("philippines", "PH", "PHL"),
    ("poland", "PL", "POL"),
    ("portugal", "PT", "PRT"),
    ("qatar", "QA", "QAT"),
    ("romania", "RO", "ROU"),
    ("russia", "RU", "RUS"),
    ("saudi arabia", "SA", "SAU"),
    ("senegal", "SN", "SEN"),
    ("singapore", "SG", "SGP"),
    ("south africa", "ZA", "ZAF"),
    ("south korea", "KR", "KOR"),
    ("spain", "ES", "ESP"),
    ("sweden", "SE", "SWE"),
    ("switzerland", "CH", "CHE"),
    ("thailand", "TH", "THA"),
    ("tunisia", "TN", "TUN"),
    ("turkey", "TR", "TUR"),
    ("ukraine", "UA", "UKR"),
    ("united arab emirates", "AE", "ARE"),
    ("united kingdom", "GB", "GBR"),
    ("united states", "US", "USA"),
    ("vietnam", "VN", "VNM"),
];

/// Common alternative names.
static COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("usa", "US"),
    ("united states of america", "US"),
    ("america", "US"),
    ("uk", "GB"),
    ("great britain", "GB"),
    ("england", "GB"),
    ("holland", "NL"),
    ("maroc", "MA"),
    ("côte d'ivoire", "CI"),
    ("korea", "KR"),
    ("uae", "AE"),
    ("czech republic", "CZ"),
    ("türkiye", "TR"),
];

/// Resolves country names and ISO codes to ISO 3166-1 alpha-2 codes.
#[derive(Debug, Clone, Default)]
pub struct CountryReference;

impl ReferenceLookup for CountryReference {
    fn name(&self) -> &str {
        "iso_code"
    }

    fn applies_to_header(&self, header: &str) -> bool {
        header_has_keyword(&header_tokens(header), &["country", "countries", "pays"])
    }

    fn lookup(&self, value: &str) -> Option<String> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if let Some((_, code)) = COUNTRY_ALIASES.iter().find(|(alias, _)| *alias == normalized) {
            return Some(code.to_string());
        }
        COUNTRIES
            .iter()
            .find(|(name, alpha2, alpha3)| {
                *name == normalized
                    || alpha2.eq_ignore_ascii_case(&normalized)
                    || alpha3.eq_ignore_ascii_case(&normalized)
            })
            .map(|(_, alpha2, _)| alpha2.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_lookup() {
        let reference = CountryReference;
        assert_eq!(reference.lookup("Morocco").as_deref(), Some("MA"));
        assert_eq!(reference.lookup(" fra ").as_deref(), Some("FR"));
        assert_eq!(reference.lookup("USA").as_deref(), Some("US"));
        assert_eq!(reference.lookup("gb").as_deref(), Some("GB"));
        assert_eq!(reference.lookup("Atlantis"), None);
        assert_eq!(reference.lookup(""), None);
    }

    #[test]
    fn test_header_applies() {
        let reference = CountryReference;
        assert!(reference.applies_to_header("Country"));
        assert!(reference.applies_to_header("country_of_residence"));
        assert!(!reference.applies_to_header("county"));
    }
}
