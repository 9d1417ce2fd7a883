//! Query parameter predicates and filter configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Whitelist or blacklist semantics for a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A predicate match retains the parameter.
    Keep,
    /// A predicate match removes the parameter.
    Drop,
}

impl Mode {
    /// Parses `"keep"` or `"drop"`.
    ///
    /// # Panics
    /// Any other name is a caller bug and panics.
    pub fn from_name(name: &str) -> Self {
        match name {
            "keep" => Mode::Keep,
            "drop" => Mode::Drop,
            other => panic!("unknown filtering mode: {other:?}"),
        }
    }

    #[inline]
    pub fn is_keep(self) -> bool {
        self == Mode::Keep
    }
}

/// Part of a parameter used for matching and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The name only, `a` in `a=1`.
    #[default]
    Name,
    /// The whole `name=value` token.
    #[serde(alias = "whole")]
    Param,
}

impl Scope {
    /// Parses `"name"` or `"param"` (`"whole"` is accepted as an alias).
    ///
    /// # Panics
    /// Any other name is a caller bug and panics.
    pub fn from_name(name: &str) -> Self {
        match name {
            "name" => Scope::Name,
            "param" | "whole" => Scope::Param,
            other => panic!("unknown matching type: {other:?}"),
        }
    }
}

/// Raised by [`Filter::add_regex`] when the pattern does not compile.
#[derive(Debug, Clone, thiserror::Error)]
#[error("regex error ({message}): '{pattern}' pos {offset}")]
pub struct PatternCompileError {
    pub pattern: String,
    pub message: String,
    /// Byte offset of the error in `pattern`.
    pub offset: usize,
}

impl PatternCompileError {
    fn new(pattern: &str, err: regex::Error) -> Self {
        let (message, offset) = match regex_syntax::Parser::new().parse(pattern) {
            Err(regex_syntax::Error::Parse(e)) => (e.kind().to_string(), e.span().start.offset),
            Err(regex_syntax::Error::Translate(e)) => {
                (e.kind().to_string(), e.span().start.offset)
            }
            // Size limits and the like have no position.
            _ => (err.to_string(), 0),
        };
        Self {
            pattern: pattern.to_string(),
            message,
            offset,
        }
    }
}

/// Shell-style pattern, matched like `fnmatch(3)` without flags.
///
/// The pattern is rewritten into `glob` crate syntax when added. Whatever
/// the crate still rejects is kept and only reported when used.
#[derive(Debug)]
pub struct Glob {
    source: String,
    compiled: Result<glob::Pattern, glob::PatternError>,
}

impl Glob {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = glob::Pattern::new(&fnmatch_to_glob(&source));
        Self { source, compiled }
    }

    /// Hands `source` to the `glob` crate as is.
    pub fn verbatim(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = glob::Pattern::new(&source);
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `Err` carries the reason the pattern cannot be evaluated.
    pub fn try_matches(&self, s: &str) -> Result<bool, &glob::PatternError> {
        self.compiled.as_ref().map(|p| p.matches(s))
    }
}

/// Rewrites an `fnmatch` pattern into the `glob` crate dialect.
///
/// Runs of `*` collapse into one, `\c` becomes the literal `c`, and a `[`
/// without a closing `]` is a literal `[`. `^` negates a set like `!`.
pub(crate) fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push('*');
            }
            '\\' if i + 1 < chars.len() => {
                push_literal(&mut out, chars[i + 1]);
                i += 2;
            }
            '[' => match set_end(&chars, i) {
                Some(end) => {
                    push_set(&mut out, &chars[i + 1..end]);
                    i = end + 1;
                }
                None => {
                    push_literal(&mut out, '[');
                    i += 1;
                }
            },
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Index of the `]` closing the set opened at `open`.
fn set_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!' | '^')) {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn push_literal(out: &mut String, c: char) {
    match c {
        '?' | '*' | '[' => {
            out.push('[');
            out.push(c);
            out.push(']');
        }
        _ => out.push(c),
    }
}

/// Emits the set whose members (between the brackets) are `body`.
fn push_set(out: &mut String, body: &[char]) {
    let (negate, body) = match body.first() {
        Some('!' | '^') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut close = false;
    let mut items = Vec::with_capacity(body.len());
    let mut k = 0;
    while k < body.len() {
        let c = match body[k] {
            '\\' if k + 1 < body.len() => {
                k += 1;
                body[k]
            }
            c => c,
        };
        k += 1;
        if c == ']' {
            close = true;
        } else {
            items.push(c);
        }
    }

    if !negate && items.len() + usize::from(close) == 1 {
        match items.first() {
            Some(&c) => push_literal(out, c),
            None => out.push(']'),
        }
        return;
    }

    // `]` must lead the set and a leading `!` would negate it.
    if !negate && !close && items.first() == Some(&'!') {
        items.rotate_left(1);
    }
    out.push('[');
    if negate {
        out.push('!');
    }
    if close {
        out.push(']');
    }
    out.extend(items);
    out.push(']');
}

/// One name or token predicate.
#[derive(Debug)]
pub enum Predicate {
    Exact(String),
    Glob(Glob),
    Regex(Regex),
}

impl Predicate {
    /// Whether `span` hits this predicate.
    ///
    /// `mode` only matters for a glob that cannot be evaluated: it then
    /// counts as a hit in keep mode and as a miss in drop mode, so it never
    /// removes a parameter on its own.
    pub fn matches(&self, span: &str, mode: Mode) -> bool {
        match self {
            Predicate::Exact(s) => s.as_bytes() == span.as_bytes(),
            Predicate::Regex(re) => re.is_match(span),
            Predicate::Glob(g) => match g.try_matches(span) {
                Ok(hit) => hit,
                Err(err) => {
                    error!(
                        component = "querystring",
                        event = "glob_match_failed",
                        pattern = %g.as_str(),
                        error = %err,
                        mode = ?mode,
                        "querystring: failed to match glob, keeping parameter"
                    );
                    mode.is_keep()
                }
            },
        }
    }
}

/// Filter configuration: an ordered predicate list and ordering flags.
///
/// Built once, then shared read-only between any number of concurrent
/// rewrites.
#[derive(Debug)]
pub struct Filter {
    predicates: Vec<Predicate>,
    sort: bool,
    uniq: bool,
    scope: Scope,
}

impl Filter {
    pub const fn new(sort: bool, uniq: bool, scope: Scope) -> Self {
        Self {
            predicates: Vec::new(),
            sort,
            uniq,
            scope,
        }
    }

    /// Appends a predicate; predicates are tried in the order added.
    pub fn add_predicate(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn add_exact(&mut self, name: impl Into<String>) {
        self.add_predicate(Predicate::Exact(name.into()));
    }

    pub fn add_glob(&mut self, pattern: impl Into<String>) {
        self.add_predicate(Predicate::Glob(Glob::new(pattern)));
    }

    /// Compiles and appends a regex. On error the filter is left unchanged.
    pub fn add_regex(&mut self, pattern: &str) -> Result<(), PatternCompileError> {
        let re = Regex::new(pattern).map_err(|e| PatternCompileError::new(pattern, e))?;
        self.add_predicate(Predicate::Regex(re));
        Ok(())
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sort(&self) -> bool {
        self.sort
    }

    pub fn uniq(&self) -> bool {
        self.uniq
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Decides whether a parameter whose comparison span is `span` survives.
    ///
    /// An empty span never survives. With no predicates everything else
    /// does. Otherwise the first matching predicate yields `mode`, and no
    /// match yields its opposite.
    pub fn matches(&self, span: &str, mode: Mode) -> bool {
        if span.is_empty() {
            return false;
        }
        if self.predicates.is_empty() {
            return true;
        }
        let keep = mode.is_keep();
        if self.predicates.iter().any(|p| p.matches(span, mode)) {
            keep
        } else {
            !keep
        }
    }
}
