// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::http::query::{Filter, Mode, Scope};

pub const PROD: &str = "prod";
#[allow(dead_code)]
pub const DEV: &str = "dev";
#[allow(dead_code)]
pub const TEST: &str = "test";

/// Arena size used when the config does not set one.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryString {
    #[serde(rename = "querystring")]
    pub querystring: QueryStringBox,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryStringBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub buffer: Option<Buffer>,
    #[serde(skip)]
    pub filters: HashMap<String, Arc<NamedFilter>>,
    #[serde(rename = "filters")]
    filters_raw: Option<HashMap<String, FilterSpec>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Buffer {
    pub capacity: usize,
}

/// A filter as written in YAML.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub sort: bool,
    #[serde(default)]
    pub uniq: bool,
    #[serde(rename = "match", default)]
    pub scope: Scope,
    pub mode: Option<Mode>,
    /// Written as `- exact: gclid`, one single-key map per predicate.
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub predicates: Vec<PredicateSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateSpec {
    Exact(String),
    Glob(String),
    Regex(String),
}

/// A compiled filter and the mode it is applied with by default.
#[derive(Debug)]
pub struct NamedFilter {
    pub name: String,
    pub mode: Mode,
    pub filter: Filter,
}

impl FilterSpec {
    /// Builds the runtime filter, predicates in declaration order.
    pub fn compile(&self) -> Result<Filter> {
        let mut filter = Filter::new(self.sort, self.uniq, self.scope);
        for p in &self.predicates {
            match p {
                PredicateSpec::Exact(s) => filter.add_exact(s.as_str()),
                PredicateSpec::Glob(g) => filter.add_glob(g.as_str()),
                PredicateSpec::Regex(r) => filter.add_regex(r)?,
            }
        }
        Ok(filter)
    }
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    #[allow(dead_code)]
    fn is_dev(&self) -> bool;
    #[allow(dead_code)]
    fn is_test(&self) -> bool;
    fn buffer_capacity(&self) -> usize;
    fn filter(&self, name: &str) -> Option<Arc<NamedFilter>>;
    fn filter_names(&self) -> Vec<&str>;
}

// Config type alias for convenience
pub type Config = QueryString;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.querystring.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.querystring.env == PROD
    }

    fn is_dev(&self) -> bool {
        self.querystring.env == DEV
    }

    fn is_test(&self) -> bool {
        self.querystring.env == TEST
    }

    fn buffer_capacity(&self) -> usize {
        self.querystring
            .buffer
            .as_ref()
            .map(|b| b.capacity)
            .unwrap_or(DEFAULT_BUFFER_CAPACITY)
    }

    fn filter(&self, name: &str) -> Option<Arc<NamedFilter>> {
        self.querystring.filters.get(name).map(Arc::clone)
    }

    fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.querystring.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            querystring: QueryStringBox {
                env: DEV.to_string(),
                logs: None,
                buffer: None,
                filters: HashMap::new(),
                filters_raw: None,
            },
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        // Read file
        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::parse(&data).with_context(|| format!("load config from {:?}", abs_path))
    }

    /// Parses YAML and compiles every named filter.
    pub fn parse(data: &str) -> Result<Self> {
        let mut cfg: QueryString = serde_yaml::from_str(data).context("unmarshal yaml")?;

        if let Some(buffer) = &cfg.querystring.buffer {
            if buffer.capacity == 0 {
                anyhow::bail!("buffer.capacity must be greater than zero");
            }
        }

        if let Some(mut filters_raw) = cfg.querystring.filters_raw.take() {
            let mut processed = HashMap::with_capacity(filters_raw.len());
            for (name, spec) in filters_raw.drain() {
                let filter = spec
                    .compile()
                    .with_context(|| format!("compile filter {:?}", name))?;
                let named = NamedFilter {
                    name: name.clone(),
                    mode: spec.mode.unwrap_or(Mode::Keep),
                    filter,
                };
                processed.insert(name, Arc::new(named));
            }
            cfg.querystring.filters = processed;
        }

        Ok(cfg)
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
