// Shared test support code for the case suites.

pub mod common;

pub use common::*;
