//! Static reference catalog: the fixed collection of dataset records the search
//! pipeline reads from, plus canned per-dataset analytics for the detail view.
//!
//! A catalog is validated once when it is loaded. After that it is immutable and
//! can be shared freely behind an `Arc`.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::types::{Dataset, DatasetAnalytics, DatasetDetails, MAX_RELEVANCE};

/// The demo catalog compiled into every binary.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Deserialize)]
struct CatalogFile {
    datasets: Vec<Dataset>,
    #[serde(default)]
    analytics: HashMap<String, DatasetAnalytics>,
}

/// Immutable, validated dataset collection.
#[derive(Debug, Clone)]
pub struct Catalog {
    datasets: Vec<Dataset>,
    analytics: HashMap<String, DatasetAnalytics>,
}

impl Catalog {
    /// The embedded demo catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        debug!(path = %path.display(), "Loading catalog file");
        let content = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.datasets, file.analytics)
    }

    /// Build a catalog from records already in memory.
    pub fn new(
        datasets: Vec<Dataset>,
        analytics: HashMap<String, DatasetAnalytics>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for d in &datasets {
            if !seen.insert(d.id.as_str()) {
                return Err(CatalogError::DuplicateId(d.id.clone()));
            }
            if d.relevance_score > MAX_RELEVANCE {
                return Err(CatalogError::ScoreOutOfRange {
                    id: d.id.clone(),
                    score: d.relevance_score,
                });
            }
        }
        if let Some(orphan) = analytics.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(CatalogError::OrphanAnalytics(orphan.clone()));
        }

        info!(datasets = datasets.len(), analytics = analytics.len(), "Catalog loaded");
        Ok(Self { datasets, analytics })
    }

    /// Every record, in catalog order.
    pub fn all_datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Number of records that carry analytics.
    pub fn analytics_count(&self) -> usize {
        self.analytics.len()
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// The record merged with its analytics. `None` when either is missing.
    pub fn details(&self, id: &str) -> Option<DatasetDetails> {
        let dataset = self.get(id)?;
        let analytics = self.analytics.get(id)?;
        Some(DatasetDetails { dataset: dataset.clone(), analytics: analytics.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_loads_and_has_details() {
        let catalog = Catalog::builtin().expect("builtin catalog must be valid");
        assert!(catalog.len() >= 10);
        let details = catalog.details("ds-001").expect("ds-001 has analytics");
        assert_eq!(details.dataset.title, "California Housing Prices");
        assert!(details.analytics.ml_recommendation.target_column.is_some());
    }

    #[test]
    fn details_missing_for_dataset_without_analytics() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.get("ds-006").is_some());
        assert!(catalog.details("ds-006").is_none());
        assert!(catalog.details("nope").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let catalog = Catalog::builtin().unwrap();
        let mut datasets = catalog.all_datasets().to_vec();
        datasets.push(datasets[0].clone());
        let err = Catalog::new(datasets, HashMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "ds-001"));
    }

    #[test]
    fn score_above_hundred_is_rejected() {
        let catalog = Catalog::builtin().unwrap();
        let mut datasets = catalog.all_datasets().to_vec();
        datasets[2].relevance_score = 101;
        let err = Catalog::new(datasets, HashMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::ScoreOutOfRange { score: 101, .. }));
    }

    #[test]
    fn orphan_analytics_are_rejected() {
        let catalog = Catalog::builtin().unwrap();
        let analytics = catalog.details("ds-001").unwrap().analytics;
        let mut map = HashMap::new();
        map.insert("ghost".to_string(), analytics);
        let err = Catalog::new(catalog.all_datasets().to_vec(), map).unwrap_err();
        assert!(matches!(err, CatalogError::OrphanAnalytics(id) if id == "ghost"));
    }

    #[test]
    fn from_path_reads_file_and_reports_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUILTIN_CATALOG.as_bytes()).unwrap();
        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.len(), Catalog::builtin().unwrap().len());

        let err = Catalog::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn garbage_json_is_a_parse_error() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
