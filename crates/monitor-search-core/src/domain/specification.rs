//! Specification pattern for composable record filters
//!
//! A specification is a predicate object. The search predicate tree implements
//! it so the same match rules can be evaluated against in-memory records as
//! well as compiled to SQL.

use std::sync::Arc;

/// Core specification trait
pub trait Specification<T>: Send + Sync {
    /// Check if the entity satisfies this specification
    fn is_satisfied_by(&self, entity: &T) -> bool;

    /// Combine with another specification using AND
    fn and<S: Specification<T> + 'static>(self, other: S) -> AndSpecification<T>
    where
        Self: Sized + 'static,
    {
        AndSpecification {
            left: Arc::new(self),
            right: Arc::new(other),
        }
    }
}

/// AND composite specification
pub struct AndSpecification<T> {
    left: Arc<dyn Specification<T>>,
    right: Arc<dyn Specification<T>>,
}

impl<T> Specification<T> for AndSpecification<T>
where
    T: Send + Sync,
{
    fn is_satisfied_by(&self, entity: &T) -> bool {
        self.left.is_satisfied_by(entity) && self.right.is_satisfied_by(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ticket {
        title: String,
        access: i64,
    }

    struct TitleContains(&'static str);

    impl Specification<Ticket> for TitleContains {
        fn is_satisfied_by(&self, ticket: &Ticket) -> bool {
            ticket.title.contains(self.0)
        }
    }

    struct PublicOnly;

    impl Specification<Ticket> for PublicOnly {
        fn is_satisfied_by(&self, ticket: &Ticket) -> bool {
            ticket.access == 1
        }
    }

    fn ticket(title: &str, access: i64) -> Ticket {
        Ticket {
            title: title.to_string(),
            access,
        }
    }

    #[test]
    fn test_and_specification() {
        let spec = TitleContains("crash").and(PublicOnly);

        assert!(spec.is_satisfied_by(&ticket("crash on save", 1)));
        assert!(!spec.is_satisfied_by(&ticket("crash on save", 3)));
        assert!(!spec.is_satisfied_by(&ticket("slow start", 1)));
    }

    #[test]
    fn test_chained_and() {
        let spec = TitleContains("crash")
            .and(TitleContains("save"))
            .and(PublicOnly);

        assert!(spec.is_satisfied_by(&ticket("crash on save", 1)));
        assert!(!spec.is_satisfied_by(&ticket("crash on load", 1)));
        assert!(!spec.is_satisfied_by(&ticket("crash on save", 2)));
    }
}
