//! Bucketing rules for the generalize action.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::profile::parse_number;
use crate::recognize::lexicon::{JOB_TITLES, job_category};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());
static YEAR_MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());
static DECADE_BUCKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3}0s$").unwrap());
static MONTH_BUCKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());
static BAND_BUCKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d+)-(-?\d+)$").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Largest band index, 2^62, read exactly as an f64.
const BAND_LIMIT: f64 = 4_611_686_018_427_387_904.0;

/// Label for values no bucket covers.
pub const OTHER_BUCKET: &str = "other";

/// How values are coarsened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneralizeStrategy {
    /// Dates and years to their decade, `"1980s"`.
    Decade,
    /// Dates to their year.
    Year,
    /// Dates to year and month, `"1985-03"`.
    Month,
    /// Numbers to fixed-width bands, `"30-39"`.
    NumericBand { width: u32 },
    /// Job titles to their broader category.
    JobCategory,
}

impl GeneralizeStrategy {
    pub const DEFAULT_BAND: GeneralizeStrategy = GeneralizeStrategy::NumericBand { width: 10 };

    /// Bucket for one trimmed value, if the value can be read.
    pub fn bucket(&self, value: &str) -> Option<String> {
        let value = value.trim();
        match self {
            GeneralizeStrategy::Decade => {
                parse_year_month(value).map(|(year, _)| format!("{}s", year - year.rem_euclid(10)))
            }
            GeneralizeStrategy::Year => parse_year_month(value).map(|(year, _)| year.to_string()),
            GeneralizeStrategy::Month => parse_year_month(value)
                .and_then(|(year, month)| month.map(|m| format!("{:04}-{:02}", year, m))),
            GeneralizeStrategy::NumericBand { width } => {
                let width = i64::from((*width).max(1));
                let n = parse_number(value)?;
                let band = (n / width as f64).floor();
                // Bands whose bounds leave the i64 range fall into `other`.
                if !band.is_finite() || band.abs() >= BAND_LIMIT {
                    return None;
                }
                let low = (band as i64).checked_mul(width)?;
                let high = low.checked_add(width - 1)?;
                Some(format!("{}-{}", low, high))
            }
            GeneralizeStrategy::JobCategory => job_category(value).map(str::to_string),
        }
    }

    /// Bucket for one value, falling back to [`OTHER_BUCKET`].
    pub fn bucket_or_other(&self, value: &str) -> String {
        self.bucket(value).unwrap_or_else(|| OTHER_BUCKET.to_string())
    }

    /// Whether `value` is already an output of this strategy.
    pub fn is_bucket(&self, value: &str) -> bool {
        let value = value.trim();
        if value == OTHER_BUCKET {
            return true;
        }
        match self {
            GeneralizeStrategy::Decade => DECADE_BUCKET_RE.is_match(value),
            GeneralizeStrategy::Year => YEAR_RE.is_match(value),
            GeneralizeStrategy::Month => MONTH_BUCKET_RE.is_match(value),
            GeneralizeStrategy::NumericBand { width } => band_width(value) == Some(*width),
            GeneralizeStrategy::JobCategory => JOB_TITLES.iter().any(|(_, category)| *category == value),
        }
    }

    /// Strategy whose buckets make up every value, if any.
    ///
    /// Used on columns that were generalized before, so that applying the
    /// same action again leaves them as they are.
    pub fn from_buckets<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let values: Vec<&str> = values
            .into_iter()
            .map(str::trim)
            .filter(|v| *v != OTHER_BUCKET)
            .collect();
        let first = values.first()?;
        let candidates = [
            Some(GeneralizeStrategy::Decade),
            band_width(first).map(|width| GeneralizeStrategy::NumericBand { width }),
            Some(GeneralizeStrategy::JobCategory),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|strategy| values.iter().all(|v| strategy.is_bucket(v)))
    }

    /// Whether the strategy reads dates.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            GeneralizeStrategy::Decade | GeneralizeStrategy::Year | GeneralizeStrategy::Month
        )
    }

    /// Pick a strategy from the populated values alone.
    ///
    /// Dates (or plausible years) win over plain numbers; numbers over job
    /// titles. `None` when fewer than half of the values fit any strategy.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let (mut total, mut dates, mut years, mut numbers, mut jobs) = (0, 0, 0, 0, 0);
        for value in values {
            let value = value.trim();
            total += 1;
            if parse_date(value).is_some() || YEAR_MONTH_RE.is_match(value) {
                dates += 1;
            } else if YEAR_RE.is_match(value) && parse_year_month(value).is_some() {
                years += 1;
            }
            if parse_number(value).is_some() {
                numbers += 1;
            } else if job_category(value).is_some() {
                jobs += 1;
            }
        }
        if total == 0 {
            return None;
        }
        let majority = |n: usize| n * 2 > total;
        if majority(dates) || (dates > 0 && majority(dates + years)) {
            Some(GeneralizeStrategy::Decade)
        } else if majority(numbers) {
            Some(GeneralizeStrategy::DEFAULT_BAND)
        } else if majority(jobs) {
            Some(GeneralizeStrategy::JobCategory)
        } else {
            None
        }
    }
}

impl fmt::Display for GeneralizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralizeStrategy::Decade => f.write_str("decade"),
            GeneralizeStrategy::Year => f.write_str("year"),
            GeneralizeStrategy::Month => f.write_str("month"),
            GeneralizeStrategy::NumericBand { width } => write!(f, "{}", width),
            GeneralizeStrategy::JobCategory => f.write_str("job"),
        }
    }
}

impl FromStr for GeneralizeStrategy {
    type Err = String;

    /// Parse a decision value: `decade`, `year`, `month`, `job` or a band width.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decade" => Ok(GeneralizeStrategy::Decade),
            "year" => Ok(GeneralizeStrategy::Year),
            "month" => Ok(GeneralizeStrategy::Month),
            "job" | "category" => Ok(GeneralizeStrategy::JobCategory),
            "band" => Ok(GeneralizeStrategy::DEFAULT_BAND),
            other => match other.parse::<u32>() {
                Ok(width) if width > 0 => Ok(GeneralizeStrategy::NumericBand { width }),
                _ => Err(format!("unknown generalization '{}'", s)),
            },
        }
    }
}

/// Width of a `low-high` band label.
fn band_width(value: &str) -> Option<u32> {
    let caps = BAND_BUCKET_RE.captures(value)?;
    let low = caps[1].parse::<i64>().ok()?;
    let high = caps[2].parse::<i64>().ok()?;
    let width = high.checked_sub(low)?.checked_add(1)?;
    (width > 0 && low.rem_euclid(width) == 0)
        .then(|| u32::try_from(width).ok())
        .flatten()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Year and, when present, month of a date-like value.
fn parse_year_month(value: &str) -> Option<(i32, Option<u32>)> {
    if let Some(date) = parse_date(value) {
        return Some((date.year(), Some(date.month())));
    }
    if let Some(caps) = YEAR_MONTH_RE.captures(value) {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps[2].parse::<u32>().ok().filter(|m| (1..=12).contains(m))?;
        return Some((year, Some(month)));
    }
    YEAR_RE
        .captures(value)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .filter(|year| (1000..=2999).contains(year))
        .map(|year| (year, None))
}
