//! URL rewriting entry points.

use tracing::debug;

use super::assembler::assemble;
use super::filter::{Filter, Mode, Scope};
use super::params::ParamTable;
use super::scanner::Scanner;
use crate::arena::{align_up, Arena, Cursor, Exhausted};

/// Removes empty and nameless parameters, keeps the original order.
pub static CLEAN: Filter = Filter::new(false, false, Scope::Param);
/// Sorts parameters by whole token.
pub static SORT: Filter = Filter::new(true, false, Scope::Param);
/// Sorts parameters by whole token and drops repeated ones.
pub static SORT_UNIQ: Filter = Filter::new(true, true, Scope::Param);

/// Why a rewrite gave up and returned its input.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Exhausted(#[from] Exhausted),
    #[error("rewritten url is not valid utf-8")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Drops the query string, `?` included. No-op without one.
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(qs) => &url[..qs],
        None => url,
    }
}

/// Applies [`CLEAN`] in keep mode.
pub fn clean<'r, 'a: 'r>(arena: &mut Arena<'a>, url: &'r str) -> &'r str {
    CLEAN.apply(arena, url, Mode::Keep)
}

/// Applies [`SORT`] or [`SORT_UNIQ`] in keep mode.
pub fn sort<'r, 'a: 'r>(arena: &mut Arena<'a>, url: &'r str, uniq: bool) -> &'r str {
    let filter = if uniq { &SORT_UNIQ } else { &SORT };
    filter.apply(arena, url, Mode::Keep)
}

impl Filter {
    /// Rewrites the query string of `url`.
    ///
    /// The result lives in `arena`, or is a slice of `url` when there is
    /// nothing to build. If the arena is too small the original `url` is
    /// returned untouched.
    pub fn apply<'r, 'a: 'r>(&self, arena: &mut Arena<'a>, url: &'r str, mode: Mode) -> &'r str {
        let Some(qs) = url.find('?') else {
            return url;
        };
        if qs + 1 == url.len() {
            return &url[..qs];
        }

        match self.rewrite(arena, url, qs, mode) {
            Ok(res) => res,
            Err(err) => {
                debug!(
                    component = "querystring",
                    event = "rewrite_fallback",
                    url_len = url.len(),
                    capacity = arena.capacity(),
                    error = %err,
                    "querystring: returning url unchanged"
                );
                url
            }
        }
    }

    /// Like [`Filter::apply`] but only returns the query, without `?`.
    ///
    /// `None` when `url` has no query. `Some("")` when every parameter was
    /// filtered out.
    pub fn extract<'r, 'a: 'r>(
        &self,
        arena: &mut Arena<'a>,
        url: &'r str,
        mode: Mode,
    ) -> Option<&'r str> {
        let qs = url.find('?')?;
        if qs + 1 == url.len() {
            return None;
        }
        let res = self.apply(arena, &url[qs..], mode);
        Some(res.strip_prefix('?').unwrap_or(res))
    }

    fn rewrite<'a>(
        &self,
        arena: &mut Arena<'a>,
        url: &str,
        qs: usize,
        mode: Mode,
    ) -> Result<&'a str, RewriteError> {
        let bytes = url.as_bytes();
        // The output is never longer than the input, so the descriptor
        // table can start right after url + NUL.
        let table_at = align_up(url.len() + 1).ok_or(Exhausted {
            requested: usize::MAX,
            available: arena.remaining(),
        })?;

        let mut res = arena.reserve();
        let len = {
            let (text, slots) = res.split_at_mut(table_at)?;
            let mut out = Cursor::new(text);
            out.put(&bytes[..qs])?;

            let mut table = ParamTable::new(slots);
            for param in Scanner::new(url, qs + 1, self.scope()) {
                if self.matches(param.cmp_str(url), mode) {
                    table.insert(bytes, param, self.sort(), self.uniq())?;
                }
            }
            assemble(&mut out, &table, bytes)?
        };

        let committed: &'a [u8] = res.commit(len + 1)?;
        Ok(std::str::from_utf8(&committed[..len])?)
    }
}
