//! In-memory search store
//!
//! Holds issue and comment records in vectors and answers search queries by
//! evaluating the predicate tree directly. Mirrors the SQLite repository's
//! joins: a comment sees its issue's title, project and classification.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{CommentRow, IssueRow};
use super::predicate::{Column, SearchRecord};
use super::query::SearchQuery;
use super::repository_trait::SearchRepositoryTrait;
use crate::domain::specification::{AndSpecification, Specification};
use crate::error::Result;

/// An issue with its project name and classification access level resolved
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub project: Option<String>,
    pub access: Option<i64>,
    pub created: DateTime<Utc>,
}

impl IssueRecord {
    pub fn new(id: i64, title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            text: String::new(),
            project: None,
            access: None,
            created,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_access(mut self, access: i64) -> Self {
        self.access = Some(access);
        self
    }
}

impl SearchRecord for IssueRecord {
    fn field(&self, column: Column) -> Option<&str> {
        match column {
            Column::IssueTitle => Some(self.title.as_str()),
            Column::IssueText => Some(self.text.as_str()),
            Column::CommentText => None,
        }
    }

    fn access_level(&self) -> Option<i64> {
        self.access
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: i64,
    pub issue_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl CommentRecord {
    pub fn new(id: i64, issue_id: i64, text: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id,
            issue_id,
            text: text.into(),
            created,
        }
    }
}

/// A comment joined with its parent issue; the issue may be missing
struct JoinedComment {
    comment: CommentRecord,
    issue: Option<IssueRecord>,
}

impl SearchRecord for JoinedComment {
    fn field(&self, column: Column) -> Option<&str> {
        match column {
            Column::CommentText => Some(self.comment.text.as_str()),
            Column::IssueTitle => self.issue.as_ref().map(|issue| issue.title.as_str()),
            Column::IssueText => self.issue.as_ref().map(|issue| issue.text.as_str()),
        }
    }

    fn access_level(&self) -> Option<i64> {
        self.issue.as_ref().and_then(|issue| issue.access)
    }
}

/// Search store backed by vectors
#[derive(Debug, Clone, Default)]
pub struct MemorySearchRepository {
    issues: Vec<IssueRecord>,
    comments: Vec<CommentRecord>,
}

impl MemorySearchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, issue: IssueRecord) -> Self {
        self.issues.push(issue);
        self
    }

    pub fn with_comment(mut self, comment: CommentRecord) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

#[async_trait]
impl SearchRepositoryTrait for MemorySearchRepository {
    async fn search_issues(&self, query: &SearchQuery) -> Result<Vec<IssueRow>> {
        let spec: AndSpecification<IssueRecord> =
            query.access.clone().and(query.matching.clone());

        let mut rows: Vec<IssueRow> = self
            .issues
            .iter()
            .filter(|issue| spec.is_satisfied_by(*issue))
            .map(|issue| IssueRow {
                id: issue.id,
                title: issue.title.clone(),
                section: issue.project.clone(),
                created: issue.created,
                text: issue.text.clone(),
            })
            .collect();

        rows.sort_by(|a, b| query.sort.compare(a, b));
        Ok(rows)
    }

    async fn search_comments(&self, query: &SearchQuery) -> Result<Vec<CommentRow>> {
        let spec: AndSpecification<JoinedComment> =
            query.access.clone().and(query.matching.clone());
        let issues: HashMap<i64, &IssueRecord> =
            self.issues.iter().map(|issue| (issue.id, issue)).collect();

        let mut rows: Vec<CommentRow> = self
            .comments
            .iter()
            .map(|comment| JoinedComment {
                comment: comment.clone(),
                issue: issues.get(&comment.issue_id).map(|issue| (*issue).clone()),
            })
            .filter(|joined| spec.is_satisfied_by(joined))
            .filter_map(|joined| {
                let issue = joined.issue?;
                Some(CommentRow {
                    id: joined.comment.id,
                    issue_id: joined.comment.issue_id,
                    title: issue.title,
                    section: issue.project,
                    created: joined.comment.created,
                    text: joined.comment.text,
                })
            })
            .collect();

        rows.sort_by(|a, b| query.sort.compare(a, b));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::entity::{AccessLevels, PhraseMode, SearchArea, SearchOrdering};
    use crate::domain::search::query::{SearchCriteria, build_query};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, day, 9, 0, 0).unwrap()
    }

    fn criteria(text: &str, ordering: SearchOrdering) -> SearchCriteria {
        SearchCriteria {
            text: text.to_string(),
            phrase: PhraseMode::Any,
            ordering,
            access_levels: AccessLevels::new([1]),
            search_issue_text: true,
        }
    }

    fn store() -> MemorySearchRepository {
        MemorySearchRepository::new()
            .with_issue(
                IssueRecord::new(1, "Printer jam", at(1))
                    .with_text("paper stuck")
                    .with_project("Hardware")
                    .with_access(1),
            )
            .with_issue(
                IssueRecord::new(2, "Secret printer", at(2))
                    .with_project("Hardware")
                    .with_access(3),
            )
            .with_issue(IssueRecord::new(3, "Unclassified printer", at(3)))
            .with_comment(CommentRecord::new(10, 1, "printer again", at(4)))
            .with_comment(CommentRecord::new(11, 2, "printer leak", at(5)))
            .with_comment(CommentRecord::new(12, 99, "orphan printer", at(6)))
    }

    #[tokio::test]
    async fn test_issue_search_filters_access() {
        let repo = store();
        let query = build_query(
            SearchArea::Issues,
            &criteria("PRINTER", SearchOrdering::Newest),
        );

        let rows = repo.search_issues(&query).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(rows[0].section.as_deref(), Some("Hardware"));
    }

    #[tokio::test]
    async fn test_comment_search_uses_parent_classification() {
        let repo = store();
        let query = build_query(
            SearchArea::Comments,
            &criteria("printer", SearchOrdering::Newest),
        );

        let rows = repo.search_comments(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 10);
        assert_eq!(rows[0].issue_id, 1);
        assert_eq!(rows[0].title, "Printer jam");
    }

    #[tokio::test]
    async fn test_rows_are_sorted_by_query_key() {
        let repo = MemorySearchRepository::new()
            .with_issue(IssueRecord::new(1, "b bug", at(1)).with_access(1))
            .with_issue(IssueRecord::new(2, "A bug", at(2)).with_access(1))
            .with_issue(IssueRecord::new(3, "c bug", at(3)).with_access(1));

        let alpha = build_query(SearchArea::Issues, &criteria("bug", SearchOrdering::Alpha));
        let rows = repo.search_issues(&alpha).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1, 3]);

        let oldest = build_query(SearchArea::Issues, &criteria("bug", SearchOrdering::Oldest));
        let rows = repo.search_issues(&oldest).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_counts() {
        let repo = store();
        assert_eq!(repo.issue_count(), 3);
        assert_eq!(repo.comment_count(), 3);
    }
}
