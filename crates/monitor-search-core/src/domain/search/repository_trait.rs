//! Repository trait for search persistence
//!
//! Abstracts over the store that holds issues and comments (SQLite, in-memory).

use async_trait::async_trait;

use crate::error::Result;

use super::entity::{CommentRow, IssueRow};
use super::query::SearchQuery;

/// Read-only access to searchable issue tracker records
///
/// Implementations return rows that satisfy `query.filter()`, ordered by
/// `query.sort`. Store failures are returned as errors, never swallowed.
#[async_trait]
pub trait SearchRepositoryTrait: Send + Sync {
    /// Issues matching the query
    async fn search_issues(&self, query: &SearchQuery) -> Result<Vec<IssueRow>>;

    /// Comments matching the query, joined with their issue and project
    async fn search_comments(&self, query: &SearchQuery) -> Result<Vec<CommentRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn SearchRepositoryTrait) {}
}
