//! Case suites for the query string rewriter.
//!
//! Each file drives the public API end to end: scenarios, algebraic
//! properties, arena exhaustion, configuration and concurrent sharing.


pub mod support;
