//! Core types shared across Data Atlas: dataset records and their categorical
//! attributes, canned analytics, search request/response shapes, and users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size used when a search request does not specify `limit`.
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound for `relevanceScore`.
pub const MAX_RELEVANCE: u8 = 100;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

// ---------------------------------------------------------------------------
// Categorical attributes
// ---------------------------------------------------------------------------

/// Generates a lowercase-serialized enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        stringify!($name).to_ascii_lowercase(),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

string_enum!(
    /// Where a dataset is published.
    Source {
        Kaggle => "kaggle",
        Github => "github",
        HuggingFace => "huggingface",
        Government => "government",
    }
);

string_enum!(
    /// File format of the downloadable payload.
    Format {
        Csv => "csv",
        Json => "json",
        Parquet => "parquet",
        Excel => "excel",
    }
);

string_enum!(
    /// Pre-assigned quality label. Never computed by the pipeline.
    Quality {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
);

string_enum!(
    /// Size bucket filter. Boundaries are half-open: `[0, 10 MiB)`, `[10 MiB, 1 GiB)`, `[1 GiB, ∞)`.
    SizeBucket {
        Small => "small",
        Medium => "medium",
        Large => "large",
        All => "all",
    }
);

string_enum!(
    /// Rolling freshness window relative to "now" at query time.
    Freshness {
        Day => "day",
        Week => "week",
        Month => "month",
        Year => "year",
        All => "all",
    }
);

impl SizeBucket {
    /// Whether `size_bytes` falls in this bucket. `All` accepts everything.
    pub fn contains(self, size_bytes: u64) -> bool {
        match self {
            SizeBucket::Small => size_bytes < 10 * MIB,
            SizeBucket::Medium => (10 * MIB..GIB).contains(&size_bytes),
            SizeBucket::Large => size_bytes >= GIB,
            SizeBucket::All => true,
        }
    }
}

impl Freshness {
    /// Window length in days, `None` for `All`.
    pub fn days(self) -> Option<i64> {
        match self {
            Freshness::Day => Some(1),
            Freshness::Week => Some(7),
            Freshness::Month => Some(30),
            Freshness::Year => Some(365),
            Freshness::All => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset records
// ---------------------------------------------------------------------------

/// A static catalog entry describing a downloadable data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub source: Source,
    pub format: Format,
    /// Human-readable size, e.g. `"2.4 GB"`.
    pub size: String,
    pub size_bytes: u64,
    /// Integer 0–100 used purely for sort order.
    pub relevance_score: u8,
    pub quality_score: Quality,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub author: String,
    pub license: String,
}

/// Column type reported in the canned EDA metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Number,
    Boolean,
    Date,
    Object,
}

impl ColumnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Date => "date",
            ColumnKind::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnType {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub null_count: u64,
    pub unique_count: u64,
}

/// Shape and cleanliness summary for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetrics {
    pub rows: u64,
    pub columns: u32,
    pub missing_percent: f64,
    pub duplicate_percent: f64,
    pub column_types: Vec<ColumnType>,
    #[serde(default)]
    pub sample_data: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub column1: String,
    pub column2: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MlTask {
    Classification,
    Regression,
    Clustering,
    TimeSeries,
}

impl MlTask {
    pub fn as_str(self) -> &'static str {
        match self {
            MlTask::Classification => "classification",
            MlTask::Regression => "regression",
            MlTask::Clustering => "clustering",
            MlTask::TimeSeries => "time-series",
        }
    }
}

/// Pre-baked ML task suggestion for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlRecommendation {
    pub task: MlTask,
    /// Percentage, 0–100.
    pub confidence: u8,
    pub suggested_models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    pub reasoning: String,
}

/// Canned analytics attached to a dataset id in the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAnalytics {
    pub metrics: DatasetMetrics,
    #[serde(default)]
    pub correlations: Vec<Correlation>,
    #[serde(default)]
    pub distributions: Vec<Distribution>,
    pub ml_recommendation: MlRecommendation,
}

/// A dataset record merged with its analytics, as served by the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetDetails {
    #[serde(flatten)]
    pub dataset: Dataset,
    #[serde(flatten)]
    pub analytics: DatasetAnalytics,
}

// ---------------------------------------------------------------------------
// Search request / response
// ---------------------------------------------------------------------------

/// Structured filters. Empty or absent fields apply no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    #[serde(deserialize_with = "null_as_empty")]
    pub format: Vec<Format>,
    #[serde(deserialize_with = "null_as_empty")]
    pub source: Vec<Source>,
    #[serde(deserialize_with = "null_as_empty")]
    pub quality: Vec<Quality>,
    pub size: Option<SizeBucket>,
    pub freshness: Option<Freshness>,
}

/// Explicit `null` for a list filter means the same as an absent one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SearchFilters {
    /// True when no field constrains the result set.
    pub fn is_empty(&self) -> bool {
        self.format.is_empty()
            && self.source.is_empty()
            && self.quality.is_empty()
            && matches!(self.size, None | Some(SizeBucket::All))
            && matches!(self.freshness, None | Some(Freshness::All))
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub description: Option<String>,
    pub filters: Option<SearchFilters>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SearchRequest {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// One page of ranked search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub datasets: Vec<Dataset>,
    pub total: usize,
    pub page: u32,
    pub total_pages: usize,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Kaggle,
    Github,
    HuggingFace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccount {
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub connected_accounts: Vec<ConnectedAccount>,
    pub saved_datasets: Vec<String>,
}
