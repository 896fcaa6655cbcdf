//! Main Steward struct and public API.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::apply::{ApplicationReport, ApplyConfig, ApplyEngine};
use crate::error::{Result, StewardError};
use crate::input::{Dataset, Parser, ParserConfig, SourceMetadata};
use crate::judge::{ColumnBrief, Judge, JudgeAdapter, JudgeConfig, JudgeVerdict};
use crate::merge::{ColumnFeedback, Decision, MergePolicy, merge};
use crate::profile::{ColumnProfile, DatasetProfile, ProfileConfig, Profiler};
use crate::quality::{DatasetSummary, QualityConfig, QualityReport, QualityScorer};
use crate::recognize::{PatternRecognizer, Recognizer, RecognizerConfig};
use crate::recommend::{
    CountryReference, Recommendation, RecommendConfig, RecommendationEngine, ReferenceLookup,
};

/// Configuration for every pipeline stage.
///
/// Every section is optional in TOML; missing keys take their defaults.
///
/// ```toml
/// merge_policy = "manual_first"
///
/// [recommend]
/// drop_threshold = 0.4
///
/// [judge]
/// timeout_secs = 10
/// max_in_flight = 2
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    pub parser: ParserConfig,
    pub recognizer: RecognizerConfig,
    pub profile: ProfileConfig,
    pub quality: QualityConfig,
    pub recommend: RecommendConfig,
    pub judge: JudgeConfig,
    pub apply: ApplyConfig,
    pub merge_policy: MergePolicy,
}

impl StewardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| StewardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Result of the quality operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResponse {
    pub summary: DatasetSummary,
    pub quality: QualityReport,
    pub profile: DatasetProfile,
}

/// Candidates and, when a judge ran, its verdict for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRecommendations {
    pub candidates: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<JudgeVerdict>,
    pub profile: ColumnProfile,
}

/// Result of the recommend operation, keyed by column name in column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub summary: DatasetSummary,
    pub columns: IndexMap<String, ColumnRecommendations>,
}

impl RecommendResponse {
    /// Feedback that accepts every judge plan; columns without one are
    /// left out and default to keep.
    pub fn feedback_from_verdicts(&self) -> IndexMap<String, ColumnFeedback> {
        self.columns
            .iter()
            .filter_map(|(name, column)| {
                let plan = column.judge.as_ref()?.plan()?;
                Some((name.clone(), ColumnFeedback::judge(plan.clone())))
            })
            .collect()
    }

    /// Number of columns with at least one candidate.
    pub fn flagged_columns(&self) -> usize {
        self.columns.values().filter(|c| !c.candidates.is_empty()).count()
    }
}

/// Result of the apply operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    #[serde(skip)]
    pub dataset: Dataset,
    pub report: ApplicationReport,
    pub decisions: Vec<Decision>,
}

/// The Steward pipeline: profile, score, recommend, judge, merge, apply.
///
/// Collaborators are shared trait objects so one instance can serve many
/// datasets concurrently; no state is kept between calls.
pub struct Steward {
    config: StewardConfig,
    parser: Parser,
    recognizer: Arc<dyn Recognizer>,
    reference: Arc<dyn ReferenceLookup>,
    judge: Option<Arc<dyn Judge>>,
}

impl Steward {
    /// Create a new Steward instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(StewardConfig::default())
    }

    pub fn with_config(config: StewardConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let recognizer = Arc::new(PatternRecognizer::with_config(config.recognizer.clone()));
        Self {
            config,
            parser,
            recognizer,
            reference: Arc::new(CountryReference),
            judge: None,
        }
    }

    /// Replace the built-in pattern recognizer.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Replace the built-in country reference.
    pub fn with_reference(mut self, reference: Arc<dyn ReferenceLookup>) -> Self {
        self.reference = reference;
        self
    }

    /// Enable judge arbitration in [`Steward::recommend_with_judge`].
    pub fn with_judge(mut self, judge: Arc<dyn Judge>) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn config(&self) -> &StewardConfig {
        &self.config
    }

    pub fn has_judge(&self) -> bool {
        self.judge.is_some()
    }

    /// Parse a delimited file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Parse delimited bytes.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Dataset> {
        self.parser.parse_bytes(bytes)
    }

    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        Profiler::with_config(Arc::clone(&self.recognizer), self.config.profile.clone()).profile(dataset)
    }

    /// Quality score with the profiling breakdown behind it.
    pub fn quality(&self, dataset: &Dataset) -> QualityResponse {
        let profile = self.profile(dataset);
        let quality = QualityScorer::with_config(self.config.quality.clone()).score(&profile);
        tracing::debug!(
            score = quality.overall_score,
            category = ?quality.category,
            "scored dataset quality"
        );
        QualityResponse {
            summary: summarize(dataset),
            quality,
            profile,
        }
    }

    /// Candidate actions for every column, without a judge.
    pub fn recommend(&self, dataset: &Dataset) -> RecommendResponse {
        let profile = self.profile(dataset);
        let engine = RecommendationEngine::with_config(Arc::clone(&self.reference), self.config.recommend.clone());
        let mut candidates = engine.recommend_dataset(&profile, dataset);

        let columns = profile
            .columns
            .into_iter()
            .map(|column_profile| {
                let name = column_profile.name.clone();
                let column = ColumnRecommendations {
                    candidates: candidates.swap_remove(&name).unwrap_or_default(),
                    judge: None,
                    profile: column_profile,
                };
                (name, column)
            })
            .collect();

        RecommendResponse {
            summary: summarize(dataset),
            columns,
        }
    }

    /// Candidates plus a judge verdict for every column that has any.
    ///
    /// Without a configured judge this is [`Steward::recommend`]. Judge
    /// failures degrade single columns to `NoPlan`; only cancellation fails
    /// the whole call.
    pub async fn recommend_with_judge(
        &self,
        dataset: &Dataset,
        cancel: &CancellationToken,
    ) -> Result<RecommendResponse> {
        let mut response = self.recommend(dataset);
        let Some(judge) = &self.judge else {
            return Ok(response);
        };

        let briefs: Vec<ColumnBrief> = response
            .columns
            .values()
            .map(|c| ColumnBrief::new(&c.profile, c.candidates.clone()))
            .collect();
        let verdicts = JudgeAdapter::new(Arc::clone(judge))
            .judge_columns(briefs, cancel)
            .await?;

        for (name, verdict) in verdicts {
            if let Some(column) = response.columns.get_mut(&name) {
                column.judge = Some(verdict);
            }
        }
        Ok(response)
    }

    /// One final decision per column of `dataset`.
    pub fn merge(&self, dataset: &Dataset, feedback: &IndexMap<String, ColumnFeedback>) -> Result<Vec<Decision>> {
        merge(&dataset.headers(), feedback, self.config.merge_policy)
    }

    /// Merge feedback and rewrite the dataset accordingly.
    pub fn apply(&self, dataset: &Dataset, feedback: &IndexMap<String, ColumnFeedback>) -> Result<ApplyResponse> {
        let decisions = self.merge(dataset, feedback)?;
        let engine = ApplyEngine::with_config(
            Arc::clone(&self.recognizer),
            Arc::clone(&self.reference),
            self.config.apply.clone(),
        );
        let (transformed, report) = engine.apply(dataset, &decisions)?;
        Ok(ApplyResponse {
            dataset: transformed,
            report,
            decisions,
        })
    }
}

impl Default for Steward {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(dataset: &Dataset) -> DatasetSummary {
    DatasetSummary {
        row_count: dataset.row_count(),
        column_count: dataset.column_count(),
        size_bytes: dataset.estimated_size_bytes(),
        analyzed_at: Utc::now(),
    }
}
