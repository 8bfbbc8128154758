//! Search entity and related types
//!
//! Defines the request, settings, row and result types for issue tracker search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Areas of the issue tracker that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchArea {
    /// Issues, matched on title and (optionally) body
    Issues,
    /// Comments, matched on their body
    Comments,
}

impl SearchArea {
    /// Every supported area, in merge order
    pub const ALL: [SearchArea; 2] = [SearchArea::Issues, SearchArea::Comments];

    /// Area key as used by the host application
    pub fn key(&self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::Comments => "comments",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Issues => "Issues",
            Self::Comments => "Comments",
        }
    }

    /// Look up an area by its key; keys are matched exactly
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|area| area.key() == key)
    }
}

impl fmt::Display for SearchArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// How the query text is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseMode {
    /// Any whitespace-separated word must match
    Any,
    /// Every whitespace-separated word must match
    All,
    /// The whole text is one literal substring
    #[default]
    Exact,
}

impl PhraseMode {
    /// Parse a phrase option; anything other than `any`/`all` is an exact match
    pub fn parse(value: &str) -> Self {
        match value {
            "any" => Self::Any,
            "all" => Self::All,
            _ => Self::Exact,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for PhraseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrdering {
    /// Most recent first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// There is no popularity metric; ordered like `Newest`
    Popular,
    /// Title, case-insensitive
    Alpha,
    /// Project name, case-insensitive
    Category,
}

impl SearchOrdering {
    /// Parse an ordering option; unrecognised values fall back to `Newest`
    pub fn parse(value: &str) -> Self {
        match value {
            "oldest" => Self::Oldest,
            "popular" => Self::Popular,
            "alpha" => Self::Alpha,
            "category" => Self::Category,
            _ => Self::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Popular => "popular",
            Self::Alpha => "alpha",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for SearchOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// View access levels the caller is authorised for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLevels(Vec<i64>);

impl AccessLevels {
    pub fn new(levels: impl IntoIterator<Item = i64>) -> Self {
        let mut levels: Vec<i64> = levels.into_iter().collect();
        levels.sort_unstable();
        levels.dedup();
        Self(levels)
    }

    pub fn contains(&self, level: i64) -> bool {
        self.0.binary_search(&level).is_ok()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A search request as handed over by the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Raw query text; trimmed before use
    pub text: String,

    /// Phrase matching mode
    pub phrase: PhraseMode,

    /// Result ordering
    pub ordering: SearchOrdering,

    /// Requested area keys. `None` means the host did not restrict the
    /// search to a set of areas, which this provider answers with no results.
    pub areas: Option<Vec<String>>,
}

impl SearchRequest {
    /// Create a request with default phrase and ordering and no areas
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            phrase: PhraseMode::default(),
            ordering: SearchOrdering::default(),
            areas: None,
        }
    }

    /// Set the phrase mode
    pub fn with_phrase(mut self, phrase: PhraseMode) -> Self {
        self.phrase = phrase;
        self
    }

    /// Set the ordering
    pub fn with_ordering(mut self, ordering: SearchOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Restrict to the given area keys
    pub fn with_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.areas = Some(areas.into_iter().map(Into::into).collect());
        self
    }

    /// Request every supported area
    pub fn with_all_areas(self) -> Self {
        self.with_areas(SearchArea::ALL.iter().map(|area| area.key()))
    }
}

/// Provider settings, built once from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Whether the backing issue tracker is enabled
    pub enabled: bool,
    /// Include issue bodies when matching issues
    pub search_issue_text: bool,
    /// Passed through verbatim as each result's `browsernav`
    pub target: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            search_issue_text: true,
            target: "0".to_string(),
        }
    }
}

/// Issue row as produced by the store
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct IssueRow {
    pub id: i64,
    pub title: String,
    pub section: Option<String>,
    pub created: DateTime<Utc>,
    pub text: String,
}

/// Comment row as produced by the store, joined with its issue and project
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub issue_id: i64,
    /// Parent issue title
    pub title: String,
    /// Parent issue's project name
    pub section: Option<String>,
    pub created: DateTime<Utc>,
    pub text: String,
}

/// A decorated result ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub section: Option<String>,
    pub created: DateTime<Utc>,
    pub text: String,
    pub href: String,
    pub browsernav: String,
}
