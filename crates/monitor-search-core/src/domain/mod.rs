//! Domain layer
//!
//! Contains the search provider logic and its building blocks.

pub mod search;
pub mod specification;
