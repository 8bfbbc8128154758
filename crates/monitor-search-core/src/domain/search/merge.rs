//! Result decoration and merging

use super::entity::{CommentRow, IssueRow, SearchResult};
use super::query::SortKey;

/// Route of the issue view in the host application
pub const ISSUE_VIEW_ROUTE: &str = "index.php?option=com_monitor&view=issue";

/// Prefix distinguishing comment results from issue results
pub const COMMENT_TITLE_PREFIX: &str = "Re: ";

/// Link to an issue
pub fn issue_href(issue_id: i64) -> String {
    format!("{}&id={}", ISSUE_VIEW_ROUTE, issue_id)
}

/// Link to a comment: its issue's view, anchored at the comment
pub fn comment_href(issue_id: i64, comment_id: i64) -> String {
    format!("{}#comment-{}", issue_href(issue_id), comment_id)
}

pub fn decorate_issue(row: IssueRow, target: &str) -> SearchResult {
    SearchResult {
        href: issue_href(row.id),
        title: row.title,
        section: row.section,
        created: row.created,
        text: row.text,
        browsernav: target.to_string(),
    }
}

pub fn decorate_comment(row: CommentRow, target: &str) -> SearchResult {
    SearchResult {
        href: comment_href(row.issue_id, row.id),
        title: format!("{}{}", COMMENT_TITLE_PREFIX, row.title),
        section: row.section,
        created: row.created,
        text: row.text,
        browsernav: target.to_string(),
    }
}

/// Concatenate issue and comment results
///
/// Each list arrives in store order. When both areas were searched the
/// combined list is re-sorted so the two kinds interleave; otherwise the
/// store order is kept as is.
pub fn merge_results(
    issues: Vec<SearchResult>,
    comments: Vec<SearchResult>,
    sort: SortKey,
    resort: bool,
) -> Vec<SearchResult> {
    let mut results = issues;
    results.extend(comments);

    if resort {
        results.sort_by(|a, b| sort.compare(a, b));
    }

    results
}
