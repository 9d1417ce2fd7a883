use super::{Buffer, Config, FilterSpec, Logs, NamedFilter, PredicateSpec, QueryStringBox};
use crate::http::query::{Mode, Scope};
use std::collections::HashMap;
use std::sync::Arc;

/// Creates a new test configuration with two filters:
/// `marketing` drops tracking parameters, `whitelist` keeps `id` and `page`.
pub fn new_test_config() -> Config {
    let specs = [
        (
            "marketing",
            FilterSpec {
                sort: true,
                uniq: true,
                scope: Scope::Name,
                mode: Some(Mode::Drop),
                predicates: vec![
                    PredicateSpec::Exact("gclid".to_string()),
                    PredicateSpec::Glob("utm_*".to_string()),
                    PredicateSpec::Regex("^fb_".to_string()),
                ],
            },
        ),
        (
            "whitelist",
            FilterSpec {
                sort: true,
                uniq: false,
                scope: Scope::Name,
                mode: Some(Mode::Keep),
                predicates: vec![
                    PredicateSpec::Exact("id".to_string()),
                    PredicateSpec::Exact("page".to_string()),
                ],
            },
        ),
    ];

    let mut filters = HashMap::new();
    for (name, spec) in specs {
        let filter = spec.compile().expect("test filter must compile");
        filters.insert(
            name.to_string(),
            Arc::new(NamedFilter {
                name: name.to_string(),
                mode: spec.mode.unwrap_or(Mode::Keep),
                filter,
            }),
        );
    }

    Config {
        querystring: QueryStringBox {
            env: super::TEST.to_string(),
            logs: Some(Logs {
                level: Some("debug".to_string()),
            }),
            buffer: Some(Buffer { capacity: 4096 }),
            filters,
            filters_raw: None,
        },
    }
}
