//! The recognizer seam: anything that can find named entities in a value.

use serde::{Deserialize, Serialize};

use crate::error::RecognizerError;

/// Byte range of a hit within the analyzed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One detected entity.
///
/// A hit without a span classifies the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityHit {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    pub score: f64,
}

impl EntityHit {
    pub fn new(label: impl Into<String>, span: Option<Span>, score: f64) -> Self {
        Self {
            label: label.into(),
            span,
            score,
        }
    }
}

/// Named-entity recognizer.
///
/// Implementations must be thread-safe (Send + Sync): one instance is built
/// at startup and shared by every profiling and masking task.
pub trait Recognizer: Send + Sync {
    /// Find entities in one value. `column` is the header, used as context.
    fn analyze(&self, column: &str, value: &str) -> Result<Vec<EntityHit>, RecognizerError>;

    /// Get the name of this recognizer (for logging/debugging).
    fn name(&self) -> &str;

    /// Analyze many values of one column; one hit list per value.
    fn analyze_column(
        &self,
        column: &str,
        values: &[String],
    ) -> Result<Vec<Vec<EntityHit>>, RecognizerError> {
        values.iter().map(|v| self.analyze(column, v)).collect()
    }
}

/// Keep a non-overlapping subset of hits.
///
/// Longer spans win over shorter ones, then higher scores; span-less hits
/// cover the whole value of `value_len` bytes. The result is sorted by start.
pub fn resolve_overlaps(mut hits: Vec<EntityHit>, value_len: usize) -> Vec<EntityHit> {
    let whole = Span {
        start: 0,
        end: value_len,
    };
    hits.sort_by(|a, b| {
        let (sa, sb) = (a.span.unwrap_or(whole), b.span.unwrap_or(whole));
        sb.len()
            .cmp(&sa.len())
            .then(b.score.total_cmp(&a.score))
            .then(sa.start.cmp(&sb.start))
    });

    let mut kept: Vec<EntityHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        let span = hit.span.unwrap_or(whole);
        if kept
            .iter()
            .all(|k| !k.span.unwrap_or(whole).overlaps(&span))
        {
            kept.push(hit);
        }
    }
    kept.sort_by_key(|h| h.span.unwrap_or(whole).start);
    kept
}

/// A recognizer that never finds anything; profiling runs on types alone.
#[derive(Debug, Clone, Default)]
pub struct NullRecognizer;

impl Recognizer for NullRecognizer {
    fn analyze(&self, _column: &str, _value: &str) -> Result<Vec<EntityHit>, RecognizerError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(label: &str, start: usize, end: usize, score: f64) -> EntityHit {
        EntityHit::new(label, Some(Span { start, end }), score)
    }

    #[test]
    fn test_longer_span_wins() {
        let hits = vec![hit("POSTAL_CODE", 4, 9, 0.9), hit("PHONE_NUMBER", 0, 12, 0.7)];
        let kept = resolve_overlaps(hits, 12);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, "PHONE_NUMBER");
    }

    #[test]
    fn test_equal_span_higher_score_wins() {
        let hits = vec![hit("DATE_TIME", 0, 10, 0.6), hit("DATE_OF_BIRTH", 0, 10, 0.75)];
        let kept = resolve_overlaps(hits, 10);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, "DATE_OF_BIRTH");
    }

    #[test]
    fn test_disjoint_spans_are_kept_in_order() {
        let hits = vec![hit("EMAIL_ADDRESS", 10, 20, 0.9), hit("PERSON", 0, 5, 0.7)];
        let kept = resolve_overlaps(hits, 20);
        let labels: Vec<_> = kept.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["PERSON", "EMAIL_ADDRESS"]);
    }

    #[test]
    fn test_spanless_hit_covers_value() {
        let hits = vec![
            EntityHit::new("GENDER", None, 0.8),
            hit("PERSON", 0, 2, 0.9),
        ];
        let kept = resolve_overlaps(hits, 6);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, "GENDER");
    }
}
