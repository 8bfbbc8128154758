//! Search service
//!
//! The provider surface the host application calls: list searchable areas,
//! and run a search across issues and comments.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use super::entity::{AccessLevels, SearchArea, SearchRequest, SearchResult, SearchSettings};
use super::merge::{decorate_comment, decorate_issue, merge_results};
use super::query::{SearchCriteria, SortKey, build_query};
use super::repository::SearchRepository;
use super::repository_trait::SearchRepositoryTrait;
use crate::error::Result;

/// Service for issue and comment search
#[derive(Clone)]
pub struct SearchService {
    repository: Arc<dyn SearchRepositoryTrait>,
    settings: SearchSettings,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    /// Create a service over a SQLite pool
    pub fn new(pool: SqlitePool, settings: SearchSettings) -> Self {
        Self::with_repository(Arc::new(SearchRepository::new(pool)), settings)
    }

    /// Create a service over any store
    pub fn with_repository(
        repository: Arc<dyn SearchRepositoryTrait>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Areas this provider can search, keyed by area key
    pub fn searchable_areas() -> Vec<(&'static str, &'static str)> {
        SearchArea::ALL
            .iter()
            .map(|area| (area.key(), area.label()))
            .collect()
    }

    /// Intersect requested area keys with the supported areas
    ///
    /// Absent areas select nothing. The result is in merge order
    /// (issues before comments) without duplicates.
    pub fn select_areas(&self, requested: Option<&[String]>) -> Vec<SearchArea> {
        let Some(requested) = requested else {
            return Vec::new();
        };

        SearchArea::ALL
            .into_iter()
            .filter(|area| requested.iter().any(|key| key == area.key()))
            .collect()
    }

    /// Run a search on behalf of a caller holding `access_levels`
    ///
    /// Returns an empty list when the tracker is disabled, no supported area
    /// was requested, or the text is blank. Store failures are returned as
    /// errors.
    pub async fn search(
        &self,
        request: &SearchRequest,
        access_levels: &AccessLevels,
    ) -> Result<Vec<SearchResult>> {
        if !self.settings.enabled {
            debug!("Issue tracker disabled; skipping search");
            return Ok(Vec::new());
        }

        let areas = self.select_areas(request.areas.as_deref());
        if areas.is_empty() {
            debug!(requested = ?request.areas, "No searchable areas requested");
            return Ok(Vec::new());
        }

        let text = request.text.trim();
        if text.is_empty() {
            debug!("Blank query text");
            return Ok(Vec::new());
        }

        let criteria = SearchCriteria {
            text: text.to_string(),
            phrase: request.phrase,
            ordering: request.ordering,
            access_levels: access_levels.clone(),
            search_issue_text: self.settings.search_issue_text,
        };
        let wants_issues = areas.contains(&SearchArea::Issues);
        let wants_comments = areas.contains(&SearchArea::Comments);

        debug!(
            phrase = %criteria.phrase,
            ordering = %criteria.ordering,
            issues = wants_issues,
            comments = wants_comments,
            "Searching issue tracker"
        );

        let issues = async {
            if !wants_issues {
                return Ok(Vec::new());
            }
            let query = build_query(SearchArea::Issues, &criteria);
            self.repository.search_issues(&query).await
        };
        let comments = async {
            if !wants_comments {
                return Ok(Vec::new());
            }
            let query = build_query(SearchArea::Comments, &criteria);
            self.repository.search_comments(&query).await
        };
        let (issue_rows, comment_rows) = tokio::try_join!(issues, comments)?;

        debug!(
            issues = issue_rows.len(),
            comments = comment_rows.len(),
            "Fetched search rows"
        );

        let target = self.settings.target.as_str();
        let issue_results = issue_rows
            .into_iter()
            .map(|row| decorate_issue(row, target))
            .collect();
        let comment_results = comment_rows
            .into_iter()
            .map(|row| decorate_comment(row, target))
            .collect();

        Ok(merge_results(
            issue_results,
            comment_results,
            SortKey::from(criteria.ordering),
            wants_issues && wants_comments,
        ))
    }
}
