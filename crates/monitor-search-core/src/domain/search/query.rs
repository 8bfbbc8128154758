//! Query building
//!
//! Turns query text and phrase mode into a match predicate for one area, and
//! pairs it with the access check and the ordering key.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::entity::{
    AccessLevels, CommentRow, IssueRow, PhraseMode, SearchArea, SearchOrdering, SearchResult,
};
use super::predicate::{Column, Predicate};

/// Inputs shared by the per-area queries of one search
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    /// Trimmed, non-empty query text
    pub text: String,
    pub phrase: PhraseMode,
    pub ordering: SearchOrdering,
    pub access_levels: AccessLevels,
    /// Whether issue bodies take part in matching
    pub search_issue_text: bool,
}

/// Everything a store needs to run one area's search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub area: SearchArea,
    /// Access-control clause
    pub access: Predicate,
    /// Text match clause
    pub matching: Predicate,
    pub sort: SortKey,
}

impl SearchQuery {
    /// Full WHERE predicate: access check AND text match
    pub fn filter(&self) -> Predicate {
        Predicate::And(vec![self.access.clone(), self.matching.clone()])
    }
}

/// Build the query for one area
pub fn build_query(area: SearchArea, criteria: &SearchCriteria) -> SearchQuery {
    SearchQuery {
        area,
        access: Predicate::AccessIn(criteria.access_levels.as_slice().to_vec()),
        matching: match_predicate(area, criteria),
        sort: SortKey::from(criteria.ordering),
    }
}

/// Match predicate for one area
///
/// `any`/`all` split the text on whitespace and OR/AND the per-word tests;
/// every other phrase mode tests the whole text as one substring.
pub fn match_predicate(area: SearchArea, criteria: &SearchCriteria) -> Predicate {
    let columns = match_columns(area, criteria.search_issue_text);
    let word_test = |word: &str| {
        Predicate::Or(
            columns
                .iter()
                .map(|column| Predicate::contains(*column, word))
                .collect(),
        )
    };

    match criteria.phrase {
        PhraseMode::Any => Predicate::Or(criteria.text.split_whitespace().map(word_test).collect()),
        PhraseMode::All => {
            Predicate::And(criteria.text.split_whitespace().map(word_test).collect())
        }
        PhraseMode::Exact => word_test(criteria.text.as_str()),
    }
}

fn match_columns(area: SearchArea, search_issue_text: bool) -> Vec<Column> {
    match area {
        SearchArea::Issues if search_issue_text => vec![Column::IssueTitle, Column::IssueText],
        SearchArea::Issues => vec![Column::IssueTitle],
        SearchArea::Comments => vec![Column::CommentText],
    }
}

/// Sort key derived from the requested ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TitleAsc,
    SectionAsc,
    CreatedAsc,
    CreatedDesc,
}

impl From<SearchOrdering> for SortKey {
    fn from(ordering: SearchOrdering) -> Self {
        match ordering {
            SearchOrdering::Alpha => Self::TitleAsc,
            SearchOrdering::Category => Self::SectionAsc,
            SearchOrdering::Oldest => Self::CreatedAsc,
            SearchOrdering::Newest | SearchOrdering::Popular => Self::CreatedDesc,
        }
    }
}

impl SortKey {
    /// ORDER BY clause for an area's query
    ///
    /// Comments sort by their parent issue's title and project, but by their
    /// own creation time. Timestamps are compared as instants through
    /// `julianday`, since stored text may be `YYYY-MM-DD HH:MM:SS` or RFC 3339.
    pub fn order_by(&self, area: SearchArea) -> &'static str {
        match (self, area) {
            (Self::TitleAsc, _) => "i.title COLLATE NOCASE ASC",
            (Self::SectionAsc, _) => "p.name COLLATE NOCASE ASC",
            (Self::CreatedAsc, SearchArea::Issues) => "julianday(i.created) ASC",
            (Self::CreatedAsc, SearchArea::Comments) => "julianday(c.created) ASC",
            (Self::CreatedDesc, SearchArea::Issues) => "julianday(i.created) DESC",
            (Self::CreatedDesc, SearchArea::Comments) => "julianday(c.created) DESC",
        }
    }

    /// Compare two items under this key
    pub fn compare<T: SortFields>(&self, a: &T, b: &T) -> Ordering {
        match self {
            Self::TitleAsc => cmp_ignore_ascii_case(a.sort_title(), b.sort_title()),
            Self::SectionAsc => cmp_ignore_ascii_case(
                a.sort_section().unwrap_or_default(),
                b.sort_section().unwrap_or_default(),
            ),
            Self::CreatedAsc => a.sort_created().cmp(&b.sort_created()),
            Self::CreatedDesc => b.sort_created().cmp(&a.sort_created()),
        }
    }
}

/// Byte-wise comparison after ASCII lowercasing, like `strcasecmp`
fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|byte| byte.to_ascii_lowercase())
        .cmp(b.bytes().map(|byte| byte.to_ascii_lowercase()))
}

/// Fields a [`SortKey`] compares
pub trait SortFields {
    fn sort_title(&self) -> &str;
    fn sort_section(&self) -> Option<&str>;
    fn sort_created(&self) -> DateTime<Utc>;
}

impl SortFields for IssueRow {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn sort_section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    fn sort_created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl SortFields for CommentRow {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn sort_section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    fn sort_created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl SortFields for SearchResult {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn sort_section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    fn sort_created(&self) -> DateTime<Utc> {
        self.created
    }
}
