//! Query string tokenizer.

use super::filter::Scope;
use super::params::Param;

/// Yields one [`Param`] per `&`-delimited token, left to right.
///
/// Offsets are relative to the full URL, not to the query, so descriptors
/// can be resolved against the caller's input later on. A trailing `&` does
/// not produce an empty token; inner empty tokens do.
pub struct Scanner<'u> {
    url: &'u [u8],
    pos: usize,
    scope: Scope,
}

impl<'u> Scanner<'u> {
    /// Scans `url[start..]`, where `start` is the byte right after `?`.
    pub fn new(url: &'u str, start: usize, scope: Scope) -> Self {
        Self {
            url: url.as_bytes(),
            pos: start,
            scope,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Param;

    fn next(&mut self) -> Option<Param> {
        if self.pos >= self.url.len() {
            return None;
        }

        let start = self.pos;
        let mut eq = None;
        while self.pos < self.url.len() && self.url[self.pos] != b'&' {
            if eq.is_none() && self.url[self.pos] == b'=' {
                eq = Some(self.pos);
            }
            self.pos += 1;
        }

        let val_len = self.pos - start;
        let cmp_len = match eq {
            Some(at) if at == start => 0,
            Some(at) if self.scope == Scope::Name => at - start,
            _ => val_len,
        };

        if self.pos < self.url.len() {
            // skip '&'
            self.pos += 1;
        }

        Some(Param {
            val: start,
            val_len,
            cmp_len,
        })
    }
}
