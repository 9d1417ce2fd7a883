//! Serializes an ordered parameter table back into a query string.

use super::params::ParamTable;
use crate::arena::{Cursor, Exhausted};

/// Appends `?tok0&tok1...` and a terminating NUL to `out`.
///
/// Nothing is appended but the NUL when the table is empty, so the output
/// ends without a dangling `?`. Returns the text length, NUL excluded.
pub fn assemble(out: &mut Cursor<'_>, table: &ParamTable<'_>, url: &[u8]) -> Result<usize, Exhausted> {
    let mut sep = b'?';
    for param in table.iter() {
        out.put_byte(sep)?;
        out.put(param.token(url))?;
        sep = b'&';
    }
    let len = out.position();
    out.put_byte(0)?;
    Ok(len)
}
