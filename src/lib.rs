#[path = "shared/arena/mod.rs"]
pub mod arena;
#[path = "shared/sort/mod.rs"]
pub mod sort;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod config;
pub mod http;

pub use arena::Arena;
pub use http::query::{
    clean, sort as sort_query, strip_query, Filter, Mode, PatternCompileError, Scope,
};
