//! Dataset search pipeline: text match → description boost → categorical, size and
//! freshness filters → stable relevance sort → pagination.
//!
//! This is the single implementation shared by the HTTP route and the CLI. It never
//! mutates the input collection; the boost step scores per-call copies.

use chrono::{DateTime, Duration, Utc};
use std::time::Instant;
use tracing::debug;

use crate::boost::RelevanceBooster;
use crate::error::SearchError;
use crate::types::{Dataset, SearchFilters, SearchRequest, SearchResponse, MAX_RELEVANCE};

/// Parse a raw request body into a [`SearchRequest`], rejecting shapes the pipeline
/// cannot run (`page == 0`, `limit == 0`, unknown categorical values).
pub fn parse_request(body: &str) -> Result<SearchRequest, SearchError> {
    let request: SearchRequest = if body.trim().is_empty() {
        SearchRequest::default()
    } else {
        serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))?
    };
    validate_request(&request)?;
    Ok(request)
}

/// Check pagination bounds on an already-deserialized request.
pub fn validate_request(request: &SearchRequest) -> Result<(), SearchError> {
    if request.page() == 0 {
        return Err(SearchError::Malformed("page must be at least 1".into()));
    }
    if request.limit() == 0 {
        return Err(SearchError::Malformed("limit must be greater than 0".into()));
    }
    Ok(())
}

/// Run the pipeline against `collection` using the current wall clock.
pub fn search(
    collection: &[Dataset],
    request: &SearchRequest,
    booster: &dyn RelevanceBooster,
) -> SearchResponse {
    search_at(collection, request, booster, Utc::now())
}

/// Run the pipeline with an explicit "now" for the freshness window.
pub fn search_at(
    collection: &[Dataset],
    request: &SearchRequest,
    booster: &dyn RelevanceBooster,
    now: DateTime<Utc>,
) -> SearchResponse {
    let start = Instant::now();

    let query = request.query.as_deref().unwrap_or("").to_lowercase();
    let mut results: Vec<Dataset> = if query.is_empty() {
        collection.to_vec()
    } else {
        collection.iter().filter(|d| matches_text(d, &query)).cloned().collect()
    };

    if let Some(description) = request.description.as_deref().filter(|s| !s.is_empty()) {
        for d in &mut results {
            let bumped = d.relevance_score as u16 + booster.boost(d, description) as u16;
            d.relevance_score = bumped.min(MAX_RELEVANCE as u16) as u8;
        }
    }

    if let Some(filters) = request.filters.as_ref().filter(|f| !f.is_empty()) {
        results.retain(|d| passes_filters(d, filters, now));
    }

    // Vec::sort_by is stable: equal scores keep collection order.
    results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    let response = paginate(results, request.page(), request.limit());

    debug!(
        query = query.as_str(),
        total = response.total,
        page = response.page,
        returned = response.datasets.len(),
        time_us = start.elapsed().as_micros() as u64,
        "Search complete"
    );

    response
}

/// Case-insensitive substring match on title, description, or any tag.
/// `query_lower` must already be lowercased.
fn matches_text(d: &Dataset, query_lower: &str) -> bool {
    d.title.to_lowercase().contains(query_lower)
        || d.description.to_lowercase().contains(query_lower)
        || d.tags.iter().any(|t| t.to_lowercase().contains(query_lower))
}

fn passes_filters(d: &Dataset, filters: &SearchFilters, now: DateTime<Utc>) -> bool {
    if !filters.format.is_empty() && !filters.format.contains(&d.format) {
        return false;
    }
    if !filters.source.is_empty() && !filters.source.contains(&d.source) {
        return false;
    }
    if !filters.quality.is_empty() && !filters.quality.contains(&d.quality_score) {
        return false;
    }
    if let Some(bucket) = filters.size {
        if !bucket.contains(d.size_bytes) {
            return false;
        }
    }
    if let Some(days) = filters.freshness.and_then(|f| f.days()) {
        let cutoff = now - Duration::days(days);
        if d.last_updated < cutoff {
            return false;
        }
    }
    true
}

fn paginate(results: Vec<Dataset>, page: u32, limit: u32) -> SearchResponse {
    let total = results.len();
    let limit = limit.max(1) as usize;
    let total_pages = total.div_ceil(limit);
    let start = (page.max(1) as usize - 1).saturating_mul(limit);

    let datasets = if start >= total {
        Vec::new()
    } else {
        results.into_iter().skip(start).take(limit).collect()
    };

    SearchResponse { datasets, total, page, total_pages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boost::{FixedBooster, NoBoost};
    use crate::types::{Format, Freshness, Quality, SizeBucket, Source};
    use chrono::TimeZone;

    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * MIB;

    fn dataset(id: &str, title: &str, tags: &[&str], score: u8) -> Dataset {
        Dataset {
            id: id.into(),
            title: title.into(),
            description: format!("{title} dataset"),
            source: Source::Kaggle,
            format: Format::Csv,
            size: "1 MB".into(),
            size_bytes: MIB,
            relevance_score: score,
            quality_score: Quality::High,
            download_url: format!("https://example.test/{id}"),
            preview_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            last_updated: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            author: "tester".into(),
            license: "MIT".into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn ids(resp: &SearchResponse) -> Vec<&str> {
        resp.datasets.iter().map(|d| d.id.as_str()).collect()
    }

    fn housing_and_covid() -> Vec<Dataset> {
        vec![
            dataset("a", "Housing Prices", &["real-estate"], 80),
            dataset("b", "COVID Cases", &["health"], 95),
        ]
    }

    fn with_filters(filters: SearchFilters) -> SearchRequest {
        SearchRequest { filters: Some(filters), ..Default::default() }
    }

    #[test]
    fn query_matches_title_case_insensitively() {
        let req = SearchRequest { query: Some("HOUSING".into()), ..Default::default() };
        let resp = search_at(&housing_and_covid(), &req, &NoBoost, now());
        assert_eq!(ids(&resp), vec!["a"]);
        assert_eq!(resp.total, 1);
        assert_eq!(resp.total_pages, 1);
    }

    #[test]
    fn query_matches_tags_and_description() {
        let data = housing_and_covid();
        let by_tag = SearchRequest { query: Some("estate".into()), ..Default::default() };
        assert_eq!(ids(&search_at(&data, &by_tag, &NoBoost, now())), vec!["a"]);

        let by_desc = SearchRequest { query: Some("cases dataset".into()), ..Default::default() };
        assert_eq!(ids(&search_at(&data, &by_desc, &NoBoost, now())), vec!["b"]);
    }

    #[test]
    fn empty_request_returns_everything_ranked() {
        let resp = search_at(&housing_and_covid(), &SearchRequest::default(), &NoBoost, now());
        assert_eq!(ids(&resp), vec!["b", "a"]);
        assert_eq!(resp.total, 2);
    }

    #[test]
    fn second_page_of_one_holds_lower_scored_record() {
        let req = SearchRequest { page: Some(2), limit: Some(1), ..Default::default() };
        let resp = search_at(&housing_and_covid(), &req, &NoBoost, now());
        assert_eq!(ids(&resp), vec!["a"]);
        assert_eq!(resp.total, 2);
        assert_eq!(resp.total_pages, 2);
        assert_eq!(resp.page, 2);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let req = SearchRequest { page: Some(9), limit: Some(1), ..Default::default() };
        let resp = search_at(&housing_and_covid(), &req, &NoBoost, now());
        assert!(resp.datasets.is_empty());
        assert_eq!(resp.total, 2);
        assert_eq!(resp.total_pages, 2);
    }

    #[test]
    fn no_matches_gives_zero_pages() {
        let req = SearchRequest { query: Some("zebra".into()), ..Default::default() };
        let resp = search_at(&housing_and_covid(), &req, &NoBoost, now());
        assert_eq!(resp.total, 0);
        assert_eq!(resp.total_pages, 0);
        assert!(resp.datasets.is_empty());
    }

    #[test]
    fn total_does_not_depend_on_pagination() {
        let data: Vec<Dataset> =
            (0..7).map(|i| dataset(&format!("d{i}"), "Sales", &[], 50 + i as u8)).collect();
        for (page, limit) in [(1, 3), (2, 3), (3, 3), (4, 3), (1, 7), (1, 100)] {
            let req = SearchRequest { page: Some(page), limit: Some(limit), ..Default::default() };
            let resp = search_at(&data, &req, &NoBoost, now());
            assert_eq!(resp.total, 7);
            assert_eq!(resp.total_pages, 7usize.div_ceil(limit as usize));
        }
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let data = vec![
            dataset("first", "Alpha", &[], 70),
            dataset("top", "Beta", &[], 90),
            dataset("second", "Gamma", &[], 70),
            dataset("third", "Delta", &[], 70),
        ];
        let resp = search_at(&data, &SearchRequest::default(), &NoBoost, now());
        assert_eq!(ids(&resp), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn format_filter_keeps_only_listed_formats() {
        let mut data = housing_and_covid();
        data[1].format = Format::Json;
        let req = with_filters(SearchFilters { format: vec![Format::Csv], ..Default::default() });
        let resp = search_at(&data, &req, &NoBoost, now());
        assert!(resp.datasets.iter().all(|d| d.format == Format::Csv));
        assert_eq!(ids(&resp), vec!["a"]);
    }

    #[test]
    fn categorical_filters_or_within_and_across() {
        let mut data = vec![
            dataset("k-high", "One", &[], 10),
            dataset("g-high", "Two", &[], 20),
            dataset("k-low", "Three", &[], 30),
            dataset("h-high", "Four", &[], 40),
        ];
        data[1].source = Source::Github;
        data[2].quality_score = Quality::Low;
        data[3].source = Source::HuggingFace;

        let req = with_filters(SearchFilters {
            source: vec![Source::Kaggle, Source::Github],
            quality: vec![Quality::High],
            ..Default::default()
        });
        let resp = search_at(&data, &req, &NoBoost, now());
        assert_eq!(ids(&resp), vec!["g-high", "k-high"]);
    }

    #[test]
    fn size_buckets_split_at_exact_boundaries() {
        let mut data = vec![
            dataset("tiny", "T", &[], 10),
            dataset("ten-mib", "M", &[], 20),
            dataset("one-gib", "L", &[], 30),
        ];
        data[0].size_bytes = 10 * MIB - 1;
        data[1].size_bytes = 10 * MIB;
        data[2].size_bytes = GIB;

        let run = |bucket| {
            let req = with_filters(SearchFilters { size: Some(bucket), ..Default::default() });
            search_at(&data, &req, &NoBoost, now())
                .datasets
                .into_iter()
                .map(|d| d.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(SizeBucket::Small), vec!["tiny"]);
        assert_eq!(run(SizeBucket::Medium), vec!["ten-mib"]);
        assert_eq!(run(SizeBucket::Large), vec!["one-gib"]);
        assert_eq!(run(SizeBucket::All).len(), 3);
    }

    #[test]
    fn freshness_cutoff_is_inclusive() {
        let mut data = vec![
            dataset("edge", "Edge", &[], 50),
            dataset("stale", "Stale", &[], 60),
            dataset("fresh", "Fresh", &[], 40),
        ];
        data[0].last_updated = now() - Duration::days(7);
        data[1].last_updated = now() - Duration::days(7) - Duration::seconds(1);
        data[2].last_updated = now() - Duration::hours(3);

        let week = with_filters(SearchFilters { freshness: Some(Freshness::Week), ..Default::default() });
        assert_eq!(ids(&search_at(&data, &week, &NoBoost, now())), vec!["edge", "fresh"]);

        let day = with_filters(SearchFilters { freshness: Some(Freshness::Day), ..Default::default() });
        assert_eq!(ids(&search_at(&data, &day, &NoBoost, now())), vec!["fresh"]);

        let all = with_filters(SearchFilters { freshness: Some(Freshness::All), ..Default::default() });
        assert_eq!(search_at(&data, &all, &NoBoost, now()).total, 3);
    }

    #[test]
    fn description_boost_is_capped_and_leaves_input_untouched() {
        let data = housing_and_covid();
        let req = SearchRequest { description: Some("prices by region".into()), ..Default::default() };
        let resp = search_at(&data, &req, &FixedBooster(9), now());

        let scores: Vec<u8> = resp.datasets.iter().map(|d| d.relevance_score).collect();
        assert_eq!(scores, vec![100, 89]);
        assert_eq!(data[0].relevance_score, 80);
        assert_eq!(data[1].relevance_score, 95);
    }

    #[test]
    fn empty_description_skips_boost() {
        let req = SearchRequest { description: Some(String::new()), ..Default::default() };
        let resp = search_at(&housing_and_covid(), &req, &FixedBooster(5), now());
        let scores: Vec<u8> = resp.datasets.iter().map(|d| d.relevance_score).collect();
        assert_eq!(scores, vec![95, 80]);
    }

    #[test]
    fn boost_can_reorder_results() {
        let data = housing_and_covid();
        struct FavorA;
        impl RelevanceBooster for FavorA {
            fn boost(&self, d: &Dataset, _: &str) -> u8 {
                if d.id == "a" { 20 } else { 0 }
            }
            fn name(&self) -> &str {
                "favor-a"
            }
        }
        let req = SearchRequest { description: Some("homes".into()), ..Default::default() };
        let resp = search_at(&data, &req, &FavorA, now());
        assert_eq!(ids(&resp), vec!["a", "b"]);
    }

    #[test]
    fn parse_request_accepts_empty_body_and_defaults() {
        let req = parse_request("").unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 20);

        let req = parse_request(r#"{"query":"housing","filters":{"format":["csv"],"size":"small"}}"#)
            .unwrap();
        assert_eq!(req.query.as_deref(), Some("housing"));
        assert_eq!(req.filters.unwrap().size, Some(SizeBucket::Small));
    }

    #[test]
    fn parse_request_rejects_malformed_bodies() {
        for body in [
            "{not json",
            r#"{"page":0}"#,
            r#"{"limit":0}"#,
            r#"{"page":-1}"#,
            r#"{"filters":{"format":["xml"]}}"#,
            r#"{"filters":{"freshness":"decade"}}"#,
        ] {
            let err = parse_request(body).unwrap_err();
            assert!(matches!(err, SearchError::Malformed(_)), "{body} -> {err}");
        }
    }

    #[test]
    fn null_list_filters_apply_no_constraint() {
        let req = parse_request(
            r#"{"filters":{"format":null,"source":null,"quality":null,"size":null,"freshness":null}}"#,
        )
        .unwrap();
        let filters = req.filters.as_ref().unwrap();
        assert!(filters.format.is_empty());
        assert!(filters.is_empty());

        let resp = search_at(&housing_and_covid(), &req, &NoBoost, now());
        assert_eq!(resp.total, 2);
    }

    #[test]
    fn builtin_catalog_csv_filter() {
        let catalog = crate::catalog::Catalog::builtin().unwrap();
        let req = with_filters(SearchFilters { format: vec![Format::Csv], ..Default::default() });
        let resp = search_at(catalog.all_datasets(), &req, &NoBoost, now());
        assert!(resp.total > 0);
        assert!(resp.datasets.iter().all(|d| d.format == Format::Csv));
    }
}
