//! Query string filtering, ordering and deduplication.
//!
//! A rewrite scans the query once, filters each parameter through the
//! configured predicates, places survivors in an ordered side table and
//! assembles the result, all inside a caller-provided [`Arena`].
//!
//! [`Arena`]: crate::arena::Arena

pub mod assembler;
pub mod filter;
pub mod params;
pub mod rewrite;
pub mod scanner;

#[cfg(test)]
mod params_test;

pub use filter::{Filter, Glob, Mode, PatternCompileError, Predicate, Scope};
pub use params::{Param, ParamTable, Placement};
pub use rewrite::{clean, sort, strip_query, RewriteError, CLEAN, SORT, SORT_UNIQ};
