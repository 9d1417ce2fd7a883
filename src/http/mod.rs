// HTTP module: request URL helpers.

pub mod query;
