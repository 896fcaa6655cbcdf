//! Rule-based candidate actions from column profiles.
//!
//! Each rule looks at one profile independently and may propose one action.
//! A column can end up with several candidates; "keep" is never listed.

use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::recommendation::{
    BucketExample, CategorizeEvidence, DropEvidence, EnrichEvidence, Evidence, FillCandidates,
    GeneralizeEvidence, MaskEvidence, Recommendation,
};
use super::{Action, ReferenceLookup};
use crate::apply::GeneralizeStrategy;
use crate::input::{Cell, Column, Dataset};
use crate::profile::{ColumnProfile, DataType, DatasetProfile};
use crate::quality::round1;
use crate::recognize::{EntityInfo, catalog, header_has_keyword, header_tokens};

/// Header words that mark a column for generalization.
const SENSITIVE_HEADER_KEYWORDS: &[&str] = &[
    "age", "birth", "born", "dob", "date", "year", "job", "occupation", "profession", "salary",
    "income",
];

/// Header words that mark numeric values as years.
const YEAR_HEADER_KEYWORDS: &[&str] = &["year", "birth", "born", "dob"];

const JOB_HEADER_KEYWORDS: &[&str] = &["job", "occupation", "profession", "position"];

const ENRICH_SUGGESTIONS: &[&str] = &[
    "join an external reference source",
    "derive attributes from a related field",
    "add a semantic tag",
];

/// Number of bucket examples in generalize evidence.
const PREVIEW_SIZE: usize = 3;

/// Recommendation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Missing ratio at which drop replaces fill.
    pub drop_threshold: f64,
    /// Fewest sampled values carrying a label before mask is proposed.
    pub min_entity_hits: usize,
    /// Smallest share of sampled values carrying a label.
    pub min_entity_share: f64,
    /// Largest distinct/rows ratio for categorize.
    pub categorize_ratio: f64,
    pub max_categories: usize,
    /// Share of values a reference must resolve for enrich.
    pub enrich_match_ratio: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            drop_threshold: 0.5,
            min_entity_hits: 1,
            min_entity_share: 0.3,
            categorize_ratio: 0.05,
            max_categories: 50,
            enrich_match_ratio: 0.8,
        }
    }
}

/// Proposes candidate actions per column.
pub struct RecommendationEngine {
    config: RecommendConfig,
    reference: Arc<dyn ReferenceLookup>,
}

impl RecommendationEngine {
    pub fn new(reference: Arc<dyn ReferenceLookup>) -> Self {
        Self::with_config(reference, RecommendConfig::default())
    }

    pub fn with_config(reference: Arc<dyn ReferenceLookup>, config: RecommendConfig) -> Self {
        Self { config, reference }
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Candidates for every profiled column, keyed by column name in
    /// dataset order.
    pub fn recommend_dataset(
        &self,
        profile: &DatasetProfile,
        dataset: &Dataset,
    ) -> IndexMap<String, Vec<Recommendation>> {
        let per_column: Vec<(String, Vec<Recommendation>)> = profile
            .columns
            .par_iter()
            .filter_map(|p| {
                let column = dataset.column(&p.name)?;
                Some((p.name.clone(), self.recommend(p, column)))
            })
            .collect();

        let proposed: usize = per_column.iter().map(|(_, r)| r.len()).sum();
        tracing::debug!(columns = per_column.len(), proposed, "generated recommendations");

        per_column.into_iter().collect()
    }

    /// Candidates for one column, ordered fill, generalize, mask, drop,
    /// categorize, enrich.
    pub fn recommend(&self, profile: &ColumnProfile, column: &Column) -> Vec<Recommendation> {
        let mask = self.suggest_mask(profile);
        let generalize = if mask.is_none() {
            self.suggest_generalize(profile, column)
        } else {
            None
        };

        let mut recommendations: Vec<Recommendation> = [
            self.suggest_fill(profile),
            generalize,
            mask,
            self.suggest_drop(profile),
            self.suggest_categorize(profile),
            self.suggest_enrich(profile, column),
        ]
        .into_iter()
        .flatten()
        .collect();

        recommendations.sort_by_key(|r| r.action);
        recommendations
    }

    fn suggest_fill(&self, profile: &ColumnProfile) -> Option<Recommendation> {
        let missing = profile.missing_ratio();
        if missing <= 0.0 || missing >= self.config.drop_threshold {
            return None;
        }

        let mut candidates = IndexMap::new();
        let suggested = match profile.numeric.as_ref().filter(|_| profile.is_numeric()) {
            Some(numeric) => {
                candidates.insert("mean".to_string(), Cell::Number(numeric.mean));
                candidates.insert("median".to_string(), Cell::Number(numeric.median));
                candidates.insert("min".to_string(), Cell::Number(numeric.min));
                candidates.insert("max".to_string(), Cell::Number(numeric.max));
                "median"
            }
            None => {
                let mode = profile.text.as_ref().and_then(|t| t.most_common.clone())?;
                candidates.insert("mode".to_string(), Cell::Text(mode));
                "mode"
            }
        };

        let missing_percentage = round1(missing * 100.0);
        Some(Recommendation::new(
            &profile.name,
            format!(
                "{}% of values are missing; fill them with the column {}",
                missing_percentage, suggested
            ),
            Evidence::Fill(FillCandidates {
                missing_percentage,
                candidates,
                suggested: suggested.to_string(),
            }),
        ))
    }

    fn suggest_drop(&self, profile: &ColumnProfile) -> Option<Recommendation> {
        let missing = profile.missing_ratio();
        if profile.row_count == 0 || missing < self.config.drop_threshold {
            return None;
        }
        let missing_percentage = round1(missing * 100.0);
        Some(Recommendation::new(
            &profile.name,
            format!("{}% of values are missing", missing_percentage),
            Evidence::Drop(DropEvidence {
                missing_percentage,
                threshold_percentage: round1(self.config.drop_threshold * 100.0),
            }),
        ))
    }

    /// The dominant label, if it is frequent enough to act on.
    ///
    /// A header pointing at the same label halves the share required.
    fn dominant_entity(&self, profile: &ColumnProfile) -> Option<(&'static EntityInfo, bool)> {
        let entities = &profile.entities;
        let dominant = entities.dominant()?;
        let info = catalog::lookup(&dominant.label)?;
        let header_confirmed = entities
            .header_match
            .as_ref()
            .is_some_and(|m| catalog::canonical_label(&m.label) == info.label);
        let min_share = if header_confirmed {
            self.config.min_entity_share / 2.0
        } else {
            self.config.min_entity_share
        };
        (dominant.count >= self.config.min_entity_hits && entities.dominant_share() >= min_share)
            .then_some((info, header_confirmed))
    }

    fn suggest_mask(&self, profile: &ColumnProfile) -> Option<Recommendation> {
        let (info, header_confirmed) = self.dominant_entity(profile)?;
        if info.default_action != Action::Mask {
            return None;
        }
        let entity_percentage = round1(profile.entities.dominant_share() * 100.0);
        Some(Recommendation::new(
            &profile.name,
            format!(
                "{}% of sampled values contain {} ({} data)",
                entity_percentage, info.label, info.gdpr_category
            ),
            Evidence::Mask(MaskEvidence {
                label: info.label.to_string(),
                gdpr_category: info.gdpr_category.to_string(),
                privacy_class: info.class,
                risk: info.risk,
                entity_percentage,
                top_entities: profile.entities.top.clone(),
                header_confirmed,
            }),
        ))
    }

    fn suggest_generalize(&self, profile: &ColumnProfile, column: &Column) -> Option<Recommendation> {
        if profile.non_null_count == 0 {
            return None;
        }
        let tokens = header_tokens(&profile.name);
        let header_sensitive = header_has_keyword(&tokens, SENSITIVE_HEADER_KEYWORDS);

        let entity = self
            .dominant_entity(profile)
            .map(|(info, _)| info)
            .filter(|info| info.default_action == Action::Generalize);
        let header_entity = profile
            .entities
            .header_match
            .as_ref()
            .and_then(|m| catalog::lookup(&m.label))
            .filter(|info| info.default_action == Action::Generalize);
        let trigger = entity.or(header_entity);
        if !header_sensitive && trigger.is_none() {
            return None;
        }

        let strategy = choose_strategy(profile, column, &tokens, trigger)?;
        let examples = preview(column, strategy);
        let reason = match trigger {
            Some(info) => format!(
                "Column holds {} ({} data); coarsen values by {}",
                info.label,
                info.gdpr_category,
                strategy_name(strategy)
            ),
            None => format!(
                "Header '{}' suggests sensitive values; coarsen values by {}",
                profile.name,
                strategy_name(strategy)
            ),
        };

        Some(Recommendation::new(
            &profile.name,
            reason,
            Evidence::Generalize(GeneralizeEvidence {
                strategy,
                label: trigger.map(|info| info.label.to_string()),
                gdpr_category: trigger.map(|info| info.gdpr_category.to_string()),
                header_sensitive,
                examples,
            }),
        ))
    }

    fn suggest_categorize(&self, profile: &ColumnProfile) -> Option<Recommendation> {
        if profile.row_count == 0 || profile.unique_count == 0 || !profile.data_type.is_textual() {
            return None;
        }
        let ratio = profile.unique_count as f64 / profile.row_count as f64;
        if ratio > self.config.categorize_ratio || profile.unique_count > self.config.max_categories {
            return None;
        }
        Some(Recommendation::new(
            &profile.name,
            format!(
                "{} distinct values across {} rows; encode them as category codes",
                profile.unique_count, profile.row_count
            ),
            Evidence::Categorize(CategorizeEvidence {
                unique_count: profile.unique_count,
                uniqueness_ratio: ratio,
                example_categories: profile.top_categories.iter().map(|c| c.value.clone()).collect(),
            }),
        ))
    }

    fn suggest_enrich(&self, profile: &ColumnProfile, column: &Column) -> Option<Recommendation> {
        if profile.non_null_count == 0 {
            return None;
        }
        let header_match = self.reference.applies_to_header(&profile.name);
        if !header_match && profile.is_numeric() {
            return None;
        }

        let (mut populated, mut resolved) = (0usize, 0usize);
        for value in column.populated_text() {
            populated += 1;
            if self.reference.lookup(&value).is_some() {
                resolved += 1;
            }
        }
        let match_ratio = if populated == 0 { 0.0 } else { resolved as f64 / populated as f64 };
        if !header_match && match_ratio < self.config.enrich_match_ratio {
            return None;
        }

        let reference = self.reference.name().to_string();
        let match_percentage = round1(match_ratio * 100.0);
        Some(Recommendation::new(
            &profile.name,
            format!(
                "{}% of values resolve in the {} reference",
                match_percentage, reference
            ),
            Evidence::Enrich(EnrichEvidence {
                derived_column: format!("{}_{}", profile.name, reference),
                reference,
                match_percentage,
                header_match,
                suggestions: ENRICH_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            }),
        ))
    }
}

/// Bucketing for a column flagged for generalization.
fn choose_strategy(
    profile: &ColumnProfile,
    column: &Column,
    tokens: &[String],
    trigger: Option<&EntityInfo>,
) -> Option<GeneralizeStrategy> {
    let label = trigger.map(|info| info.label);
    if profile.data_type == DataType::Date || matches!(label, Some("DATE_TIME" | "DATE_OF_BIRTH")) {
        return Some(GeneralizeStrategy::Decade);
    }
    if profile.is_numeric() {
        let years = profile
            .numeric
            .as_ref()
            .is_some_and(|n| n.min >= 1000.0 && n.max <= 2999.0);
        return Some(if years && header_has_keyword(tokens, YEAR_HEADER_KEYWORDS) {
            GeneralizeStrategy::Decade
        } else {
            GeneralizeStrategy::DEFAULT_BAND
        });
    }
    if label == Some("JOB_TITLE") || header_has_keyword(tokens, JOB_HEADER_KEYWORDS) {
        return Some(GeneralizeStrategy::JobCategory);
    }
    let values: Vec<String> = column.populated_text().collect();
    GeneralizeStrategy::infer(values.iter().map(String::as_str))
}

fn preview(column: &Column, strategy: GeneralizeStrategy) -> Vec<BucketExample> {
    let mut examples: Vec<BucketExample> = Vec::with_capacity(PREVIEW_SIZE);
    for value in column.populated_text() {
        if examples.len() == PREVIEW_SIZE {
            break;
        }
        if examples.iter().any(|e| e.value == value) {
            continue;
        }
        let bucket = strategy.bucket_or_other(&value);
        examples.push(BucketExample { value, bucket });
    }
    examples
}

fn strategy_name(strategy: GeneralizeStrategy) -> String {
    match strategy {
        GeneralizeStrategy::NumericBand { width } => format!("{}-wide bands", width),
        GeneralizeStrategy::JobCategory => "job category".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profiler;
    use crate::recognize::PatternRecognizer;
    use crate::recommend::CountryReference;

    fn recommend(column: Column) -> Vec<Recommendation> {
        let dataset = Dataset::from_columns(vec![column]).unwrap();
        let profile = Profiler::new(Arc::new(PatternRecognizer::new())).profile(&dataset);
        let engine = RecommendationEngine::new(Arc::new(CountryReference));
        engine.recommend(&profile.columns[0], &dataset.columns()[0])
    }

    fn actions(recs: &[Recommendation]) -> Vec<Action> {
        recs.iter().map(|r| r.action).collect()
    }

    #[test]
    fn test_email_column_gets_mask_and_fill() {
        let recs = recommend(Column::from_strs(
            "email",
            &["a@x.com", "", "b@x.com", "not-an-email"],
        ));
        assert_eq!(actions(&recs), vec![Action::Fill, Action::Mask]);

        let Evidence::Mask(mask) = &recs[1].evidence else {
            panic!("expected mask evidence");
        };
        assert_eq!(mask.label, "EMAIL_ADDRESS");
        assert_eq!(mask.gdpr_category, "identifier");

        let Evidence::Fill(fill) = &recs[0].evidence else {
            panic!("expected fill evidence");
        };
        assert_eq!(fill.missing_percentage, 25.0);
        assert_eq!(fill.suggested, "mode");
        assert_eq!(fill.candidates["mode"], Cell::text("a@x.com"));
    }

    #[test]
    fn test_numeric_age_is_generalized_not_masked() {
        let recs = recommend(Column::from_strs("age", &["34", "51", "29", "42", "38"]));
        assert_eq!(actions(&recs), vec![Action::Generalize]);
        let Evidence::Generalize(evidence) = &recs[0].evidence else {
            panic!("expected generalize evidence");
        };
        assert_eq!(evidence.strategy, GeneralizeStrategy::DEFAULT_BAND);
        assert_eq!(evidence.examples[0].value, "34");
        assert_eq!(evidence.examples[0].bucket, "30-39");
    }

    #[test]
    fn test_extreme_age_previews_as_other() {
        let recs = recommend(Column::from_strs("age", &["34", "-1e300", "29", "42", "38"]));
        let generalize = recs.iter().find(|r| r.action == Action::Generalize).unwrap();
        let Evidence::Generalize(evidence) = &generalize.evidence else {
            panic!("expected generalize evidence");
        };
        let extreme = evidence.examples.iter().find(|e| e.value == "-1e300").unwrap();
        assert_eq!(extreme.bucket, "other");
    }

    #[test]
    fn test_numeric_fill_candidates() {
        let recs = recommend(Column::new(
            "score",
            vec![
                Cell::text("1"),
                Cell::text("2"),
                Cell::text("3"),
                Cell::Null,
            ],
        ));
        assert_eq!(actions(&recs), vec![Action::Fill]);
        let Evidence::Fill(fill) = &recs[0].evidence else {
            panic!("expected fill evidence");
        };
        assert_eq!(fill.suggested, "median");
        let keys: Vec<&str> = fill.candidates.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["mean", "median", "min", "max"]);
        assert_eq!(fill.candidates["median"], Cell::Number(2.0));
    }

    #[test]
    fn test_sparse_column_is_dropped_not_filled() {
        let recs = recommend(Column::new(
            "notes",
            vec![Cell::Null, Cell::Null, Cell::text(""), Cell::text("hello")],
        ));
        assert_eq!(actions(&recs), vec![Action::Drop]);
    }

    #[test]
    fn test_low_cardinality_is_categorized() {
        let values: Vec<&str> = (0..100).map(|i| if i % 2 == 0 { "red" } else { "blue" }).collect();
        let recs = recommend(Column::from_strs("colour", &values));
        assert_eq!(actions(&recs), vec![Action::Categorize]);
        let Evidence::Categorize(evidence) = &recs[0].evidence else {
            panic!("expected categorize evidence");
        };
        assert_eq!(evidence.unique_count, 2);
        assert_eq!(evidence.example_categories, vec!["red", "blue"]);
    }

    #[test]
    fn test_country_column_is_enriched() {
        let recs = recommend(Column::from_strs(
            "country",
            &["Morocco", "France", "Spain", "Atlantis"],
        ));
        let enrich = recs.iter().find(|r| r.action == Action::Enrich).unwrap();
        let Evidence::Enrich(evidence) = &enrich.evidence else {
            panic!("expected enrich evidence");
        };
        assert!(evidence.header_match);
        assert_eq!(evidence.derived_column, "country_iso_code");
        assert_eq!(evidence.match_percentage, 75.0);
    }

    #[test]
    fn test_clean_identifier_gets_nothing() {
        let recs = recommend(Column::from_strs("sku", &["A-100", "B-200", "C-300"]));
        assert!(recs.is_empty());
    }

    #[test]
    fn test_birth_date_generalized_by_decade() {
        let recs = recommend(Column::from_strs(
            "date_of_birth",
            &["1985-03-12", "1990-07-01", "1979-12-31"],
        ));
        let generalize = recs.iter().find(|r| r.action == Action::Generalize).unwrap();
        let Evidence::Generalize(evidence) = &generalize.evidence else {
            panic!("expected generalize evidence");
        };
        assert_eq!(evidence.strategy, GeneralizeStrategy::Decade);
        assert_eq!(evidence.examples[0].bucket, "1980s");
        assert!(!recs.iter().any(|r| r.action == Action::Mask));
    }
}
