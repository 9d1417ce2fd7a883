// Main entrypoint for the querystring command line tool.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use querystring::config::{Config, ConfigTrait, NamedFilter};
use querystring::http::query::{self, Filter, Mode};
use querystring::Arena;

const CONFIG_PATH: &str = "cfg/querystring.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/querystring.cfg.local.yaml";

/// querystring - filter, sort and deduplicate URL query parameters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,

    /// Named filter from the config file
    #[arg(short, long, value_name = "NAME", conflicts_with_all = ["strip", "clean", "sort"])]
    filter: Option<String>,

    /// Overrides the filter's mode
    #[arg(short, long, value_parser = ["keep", "drop"])]
    mode: Option<String>,

    /// Print only the query string
    #[arg(long, requires = "filter")]
    extract: bool,

    /// Remove the query string
    #[arg(long, conflicts_with_all = ["clean", "sort"])]
    strip: bool,

    /// Drop empty and nameless parameters
    #[arg(long, conflicts_with = "sort")]
    clean: bool,

    /// Sort parameters
    #[arg(long)]
    sort: bool,

    /// With --sort, drop repeated parameters
    #[arg(long, requires = "sort")]
    uniq: bool,

    /// URLs to rewrite; read from stdin, one per line, when omitted
    urls: Vec<String>,
}

enum Action {
    Strip,
    Clean,
    Sort { uniq: bool },
    Apply { named: Arc<NamedFilter>, mode: Mode, extract: bool },
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config, then to
/// built-in defaults when neither file exists.
fn load_cfg(path: Option<PathBuf>) -> Result<Config> {
    if let Some(custom_path) = path {
        return Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path));
    }

    for candidate in [CONFIG_PATH_LOCAL, CONFIG_PATH] {
        if PathBuf::from(candidate).exists() {
            return Config::load(candidate)
                .with_context(|| format!("failed to load config from {}", candidate));
        }
    }

    Ok(Config::default())
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_ref())
        .map(|s| s.as_str())
        .unwrap_or("warn");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .init();
    }
}

fn resolve_action(args: &Args, cfg: &Config) -> Result<Action> {
    if args.strip {
        return Ok(Action::Strip);
    }
    if args.clean {
        return Ok(Action::Clean);
    }
    if args.sort {
        return Ok(Action::Sort { uniq: args.uniq });
    }

    let name = args
        .filter
        .as_deref()
        .context("one of --filter, --strip, --clean or --sort is required")?;
    let named = cfg.filter(name).with_context(|| {
        format!(
            "unknown filter {:?} (configured: {})",
            name,
            cfg.filter_names().join(", ")
        )
    })?;
    let mode = args.mode.as_deref().map(Mode::from_name).unwrap_or(named.mode);

    Ok(Action::Apply {
        named,
        mode,
        extract: args.extract,
    })
}

fn rewrite<'r>(action: &Action, arena: &mut Arena<'r>, url: &'r str) -> Option<&'r str> {
    match action {
        Action::Strip => Some(query::strip_query(url)),
        Action::Clean => Some(query::clean(arena, url)),
        Action::Sort { uniq } => Some(query::sort(arena, url, *uniq)),
        Action::Apply {
            named,
            mode,
            extract,
        } => {
            let filter: &Filter = &named.filter;
            if *extract {
                filter.extract(arena, url, *mode)
            } else {
                Some(filter.apply(arena, url, *mode))
            }
        }
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let cfg = load_cfg(args.cfg.clone())?;

    // Configure logger (must be done after config is loaded)
    configure_logger(&cfg);

    let action = resolve_action(&args, &cfg)?;
    let capacity = cfg.buffer_capacity();
    info!(
        component = "main",
        event = "started",
        buffer_capacity = capacity,
        filters = cfg.filter_names().len(),
        "querystring ready"
    );

    let mut buf = vec![0u8; capacity];
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut emit = |url: &str| -> Result<()> {
        // One fresh arena per URL over the same backing buffer.
        let mut arena = Arena::new(&mut buf);
        let res = rewrite(&action, &mut arena, url);
        debug!(
            component = "main",
            event = "rewritten",
            input = url,
            output = res.unwrap_or_default(),
            arena_used = arena.used(),
        );
        writeln!(out, "{}", res.unwrap_or_default()).context("write to stdout")
    };

    if args.urls.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("read from stdin")?;
            emit(line.trim_end_matches('\r'))?;
        }
    } else {
        for url in &args.urls {
            emit(url)?;
        }
    }

    out.flush().context("flush stdout")?;
    Ok(())
}
