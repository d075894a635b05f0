//! URL handling module for Path-Mirror
//!
//! This module provides URL canonicalization (the visited-set key) and the
//! scope predicate that keeps a crawl on the seed's host and path prefix.

mod normalize;
mod scope;

pub use normalize::canonicalize_url;
pub use scope::{is_in_scope, ScopeFilter};
