//! Search domain module
//!
//! Search provider for the issue tracker: issues and their comments.
//!
//! # Architecture
//!
//! - **Entities**: `SearchRequest`, `SearchResult`, `SearchSettings`
//! - **Predicates**: `Predicate` trees compiled to parameterised SQL or
//!   evaluated in memory
//! - **Repository**: `SearchRepository` (SQLite) and `MemorySearchRepository`
//! - **Service**: `SearchService` for area selection, dispatch and merging
//!
//! # Example
//!
//! ```ignore
//! use monitor_search_core::domain::search::{
//!     AccessLevels, PhraseMode, SearchRequest, SearchService, SearchSettings,
//! };
//!
//! let service = SearchService::new(pool.clone(), SearchSettings::default());
//!
//! let request = SearchRequest::new("crash on save")
//!     .with_phrase(PhraseMode::All)
//!     .with_all_areas();
//! let results = service.search(&request, &AccessLevels::new([1])).await?;
//! ```

pub mod entity;
pub mod memory;
pub mod merge;
pub mod predicate;
pub mod query;
pub mod repository;
pub mod repository_trait;
pub mod service;

// Re-export main types
pub use entity::{
    AccessLevels, CommentRow, IssueRow, PhraseMode, SearchArea, SearchOrdering, SearchRequest,
    SearchResult, SearchSettings,
};
pub use memory::{CommentRecord, IssueRecord, MemorySearchRepository};
pub use merge::{comment_href, issue_href, merge_results};
pub use predicate::{BindValue, Column, Predicate, SearchRecord, SqlFragment};
pub use query::{SearchCriteria, SearchQuery, SortKey, build_query};
pub use repository::SearchRepository;
pub use repository_trait::SearchRepositoryTrait;
pub use service::SearchService;
