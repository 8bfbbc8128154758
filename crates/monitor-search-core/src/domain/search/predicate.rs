//! Typed match predicates
//!
//! A small AND/OR tree whose leaves are column containment tests and the
//! access-level check. The tree compiles to a parameterised SQL fragment and
//! can also be evaluated directly against in-memory records.

use crate::domain::specification::Specification;

/// Columns a predicate can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    IssueTitle,
    IssueText,
    CommentText,
}

impl Column {
    /// Qualified column name in the search queries
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::IssueTitle => "i.title",
            Self::IssueText => "i.text",
            Self::CommentText => "c.text",
        }
    }
}

/// Qualified access-level column of the issue classification join
pub const ACCESS_COLUMN: &str = "cl.access";

/// Record that predicates can be evaluated against
pub trait SearchRecord {
    /// Value of a text column, if the record has it
    fn field(&self, column: Column) -> Option<&str>;

    /// Access level of the record's classification, if classified
    fn access_level(&self) -> Option<i64>;
}

/// Boolean match expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive literal substring test
    Contains { column: Column, needle: String },
    /// Classification access level is one of the given levels
    AccessIn(Vec<i64>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(column: Column, needle: impl Into<String>) -> Self {
        Self::Contains {
            column,
            needle: needle.into(),
        }
    }

    /// Compile to a SQL boolean expression with `?` placeholders
    pub fn to_sql(&self) -> SqlFragment {
        let mut fragment = SqlFragment::default();
        self.write_sql(&mut fragment);
        fragment
    }

    fn write_sql(&self, out: &mut SqlFragment) {
        match self {
            Self::Contains { column, needle } => {
                out.sql.push_str(column.sql_name());
                out.sql.push_str(r" LIKE ? ESCAPE '\'");
                out.binds
                    .push(BindValue::Text(format!("%{}%", escape_like(needle))));
            }
            Self::AccessIn(levels) if levels.is_empty() => out.sql.push_str("0 = 1"),
            Self::AccessIn(levels) => {
                out.sql.push_str(ACCESS_COLUMN);
                out.sql.push_str(" IN (");
                for (i, level) in levels.iter().enumerate() {
                    if i > 0 {
                        out.sql.push_str(", ");
                    }
                    out.sql.push('?');
                    out.binds.push(BindValue::Int(*level));
                }
                out.sql.push(')');
            }
            Self::And(parts) => write_group(parts, " AND ", "1 = 1", out),
            Self::Or(parts) => write_group(parts, " OR ", "0 = 1", out),
        }
    }
}

fn write_group(parts: &[Predicate], glue: &str, empty: &str, out: &mut SqlFragment) {
    match parts {
        [] => out.sql.push_str(empty),
        [only] => only.write_sql(out),
        _ => {
            out.sql.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.sql.push_str(glue);
                }
                part.write_sql(out);
            }
            out.sql.push(')');
        }
    }
}

/// Escape LIKE wildcards so user text is matched literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// ASCII case folding, the same folding SQLite applies for LIKE and NOCASE
fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

impl<R: SearchRecord> Specification<R> for Predicate {
    fn is_satisfied_by(&self, record: &R) -> bool {
        match self {
            Self::Contains { column, needle } => record
                .field(*column)
                .is_some_and(|value| contains_ignore_ascii_case(value, needle)),
            Self::AccessIn(levels) => record
                .access_level()
                .is_some_and(|level| levels.contains(&level)),
            Self::And(parts) => parts.iter().all(|p| p.is_satisfied_by(record)),
            Self::Or(parts) => parts.iter().any(|p| p.is_satisfied_by(record)),
        }
    }
}

/// Value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

/// SQL text plus the values for its placeholders, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        title: &'static str,
        text: &'static str,
        access: Option<i64>,
    }

    impl SearchRecord for Row {
        fn field(&self, column: Column) -> Option<&str> {
            match column {
                Column::IssueTitle => Some(self.title),
                Column::IssueText => Some(self.text),
                Column::CommentText => None,
            }
        }

        fn access_level(&self) -> Option<i64> {
            self.access
        }
    }

    #[test]
    fn test_contains_compiles_to_escaped_like() {
        let fragment = Predicate::contains(Column::IssueTitle, "100%_done").to_sql();

        assert_eq!(fragment.sql, r"i.title LIKE ? ESCAPE '\'");
        assert_eq!(
            fragment.binds,
            vec![BindValue::Text(r"%100\%\_done%".to_string())]
        );
    }

    #[test]
    fn test_access_in_compiles_placeholders() {
        let fragment = Predicate::AccessIn(vec![1, 2, 5]).to_sql();

        assert_eq!(fragment.sql, "cl.access IN (?, ?, ?)");
        assert_eq!(
            fragment.binds,
            vec![BindValue::Int(1), BindValue::Int(2), BindValue::Int(5)]
        );
    }

    #[test]
    fn test_empty_access_never_matches() {
        assert_eq!(Predicate::AccessIn(Vec::new()).to_sql().sql, "0 = 1");

        let row = Row {
            title: "a",
            text: "b",
            access: Some(1),
        };
        assert!(!Predicate::AccessIn(Vec::new()).is_satisfied_by(&row));
    }

    #[test]
    fn test_nested_groups_are_parenthesised() {
        let predicate = Predicate::And(vec![
            Predicate::AccessIn(vec![1]),
            Predicate::Or(vec![
                Predicate::contains(Column::IssueTitle, "foo"),
                Predicate::contains(Column::IssueText, "foo"),
            ]),
        ]);

        let fragment = predicate.to_sql();
        assert_eq!(
            fragment.sql,
            r"(cl.access IN (?) AND (i.title LIKE ? ESCAPE '\' OR i.text LIKE ? ESCAPE '\'))"
        );
        assert_eq!(fragment.binds.len(), 3);
    }

    #[test]
    fn test_single_member_group_is_unwrapped() {
        let predicate = Predicate::Or(vec![Predicate::contains(Column::CommentText, "x")]);
        assert_eq!(predicate.to_sql().sql, r"c.text LIKE ? ESCAPE '\'");
        assert_eq!(Predicate::And(Vec::new()).to_sql().sql, "1 = 1");
    }

    #[test]
    fn test_evaluation_is_case_insensitive() {
        let row = Row {
            title: "Login CRASH",
            text: "stack trace attached",
            access: Some(1),
        };

        assert!(Predicate::contains(Column::IssueTitle, "crash").is_satisfied_by(&row));
        assert!(Predicate::contains(Column::IssueText, "Stack Trace").is_satisfied_by(&row));
        assert!(!Predicate::contains(Column::CommentText, "crash").is_satisfied_by(&row));
    }

    #[test]
    fn test_evaluation_treats_wildcards_literally() {
        let row = Row {
            title: "progress 50 percent",
            text: "",
            access: Some(1),
        };

        assert!(!Predicate::contains(Column::IssueTitle, "50%").is_satisfied_by(&row));
        assert!(!Predicate::contains(Column::IssueTitle, "p_ogress").is_satisfied_by(&row));
    }

    #[test]
    fn test_unclassified_record_fails_access() {
        let row = Row {
            title: "a",
            text: "b",
            access: None,
        };
        assert!(!Predicate::AccessIn(vec![1, 2]).is_satisfied_by(&row));
    }
}
