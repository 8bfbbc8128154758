//! Search repository for database operations
//!
//! Compiles search queries to parameterised SQL against the issue tracker schema.

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::query::QueryAs;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use super::entity::{CommentRow, IssueRow, SearchArea};
use super::predicate::BindValue;
use super::query::SearchQuery;
use super::repository_trait::SearchRepositoryTrait;
use crate::error::{Error, Result};

const ISSUES_SELECT: &str = r#"
    SELECT i.id, i.title, p.name AS section, i.created, i.text
    FROM issues AS i
    LEFT JOIN projects AS p ON i.project_id = p.id
    LEFT JOIN issue_classifications AS cl ON i.classification = cl.id
"#;

const COMMENTS_SELECT: &str = r#"
    SELECT c.id, c.created, c.text, c.issue_id, i.title, p.name AS section
    FROM comments AS c
    LEFT JOIN issues AS i ON c.issue_id = i.id
    LEFT JOIN projects AS p ON i.project_id = p.id
    LEFT JOIN issue_classifications AS cl ON i.classification = cl.id
"#;

/// Repository for search database operations
#[derive(Debug, Clone)]
pub struct SearchRepository {
    pool: SqlitePool,
}

impl SearchRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Full statement for a query: base select, WHERE, ORDER BY
    ///
    /// Only placeholders reach the SQL text; user input lives in the binds.
    pub fn statement(query: &SearchQuery) -> (String, Vec<BindValue>) {
        let base = match query.area {
            SearchArea::Issues => ISSUES_SELECT,
            SearchArea::Comments => COMMENTS_SELECT,
        };
        let filter = query.filter().to_sql();
        let sql = format!(
            "{}    WHERE {}\n    ORDER BY {}",
            base,
            filter.sql,
            query.sort.order_by(query.area)
        );
        (sql, filter.binds)
    }
}

fn bind_all<'q, O>(
    mut statement: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    binds: Vec<BindValue>,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in binds {
        statement = match value {
            BindValue::Text(text) => statement.bind(text),
            BindValue::Int(number) => statement.bind(number),
        };
    }
    statement
}

#[async_trait]
impl SearchRepositoryTrait for SearchRepository {
    async fn search_issues(&self, query: &SearchQuery) -> Result<Vec<IssueRow>> {
        let (sql, binds) = Self::statement(query);
        tracing::trace!(sql = %sql, binds = binds.len(), "Searching issues");

        bind_all(sqlx::query_as::<_, IssueRow>(&sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)
    }

    async fn search_comments(&self, query: &SearchQuery) -> Result<Vec<CommentRow>> {
        let (sql, binds) = Self::statement(query);
        tracing::trace!(sql = %sql, binds = binds.len(), "Searching comments");

        bind_all(sqlx::query_as::<_, CommentRow>(&sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::entity::{AccessLevels, PhraseMode, SearchOrdering};
    use crate::domain::search::query::{SearchCriteria, build_query};

    fn criteria(text: &str) -> SearchCriteria {
        SearchCriteria {
            text: text.to_string(),
            phrase: PhraseMode::Any,
            ordering: SearchOrdering::Alpha,
            access_levels: AccessLevels::new([1]),
            search_issue_text: true,
        }
    }

    #[test]
    fn test_issue_statement_shape() {
        let query = build_query(SearchArea::Issues, &criteria("o'brien crash"));
        let (sql, binds) = SearchRepository::statement(&query);

        assert!(sql.contains("FROM issues AS i"));
        assert!(sql.contains("WHERE (cl.access IN (?) AND ("));
        assert!(sql.trim_end().ends_with("ORDER BY i.title COLLATE NOCASE ASC"));
        assert!(!sql.contains("o'brien"), "user text must only travel as a bind");
        assert_eq!(binds[0], BindValue::Int(1));
        assert_eq!(binds.len(), 5);
    }

    #[test]
    fn test_comment_statement_shape() {
        let query = build_query(SearchArea::Comments, &criteria("crash"));
        let (sql, binds) = SearchRepository::statement(&query);

        assert!(sql.contains("FROM comments AS c"));
        assert!(sql.contains(r"c.text LIKE ? ESCAPE '\'"));
        assert!(!sql.contains("i.text LIKE"));
        assert_eq!(
            binds,
            vec![BindValue::Int(1), BindValue::Text("%crash%".to_string())]
        );
    }
}
