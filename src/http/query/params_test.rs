#[cfg(test)]
mod tests {
    use crate::http::query::params::{Param, ParamTable, Placement, SLOT};
    use rand::Rng;

    /// Builds whole-token params for `tokens` laid out as `t0&t1&...`.
    fn layout(tokens: &[&str]) -> (String, Vec<Param>) {
        let url = tokens.join("&");
        let mut params = Vec::new();
        let mut off = 0;
        for t in tokens {
            params.push(Param {
                val: off,
                val_len: t.len(),
                cmp_len: t.len(),
            });
            off += t.len() + 1;
        }
        (url, params)
    }

    fn tokens<'u>(table: &ParamTable<'_>, url: &'u str) -> Vec<&'u str> {
        table
            .iter()
            .map(|p| std::str::from_utf8(p.token(url.as_bytes())).unwrap())
            .collect()
    }

    #[test]
    fn test_append_without_sort() {
        let (url, params) = layout(&["c", "a", "b"]);
        let mut region = vec![0u8; 8 * SLOT];
        let mut table = ParamTable::new(&mut region);
        for p in params {
            table.insert(url.as_bytes(), p, false, false).unwrap();
        }
        assert_eq!(tokens(&table, &url), ["c", "a", "b"]);
    }

    #[test]
    fn test_sorted_insert() {
        let (url, params) = layout(&["d", "b", "a", "c", "ab"]);
        let mut region = vec![0u8; 8 * SLOT];
        let mut table = ParamTable::new(&mut region);
        for p in params {
            table.insert(url.as_bytes(), p, true, false).unwrap();
        }
        assert_eq!(tokens(&table, &url), ["a", "ab", "b", "c", "d"]);
    }

    /// Sorted inserts end up in the order of a stable sort by name.
    #[test]
    fn test_sorted_insert_agrees_with_stable_sort() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let toks: Vec<String> = (0..rng.gen_range(1..24))
                .map(|i| {
                    let len = rng.gen_range(1..4);
                    let name: String = (0..len).map(|_| rng.gen_range('a'..='c')).collect();
                    format!("{name}={i}")
                })
                .collect();
            let url = toks.join("&");

            let mut region = vec![0u8; toks.len() * SLOT];
            let mut table = ParamTable::new(&mut region);
            let mut off = 0;
            for t in &toks {
                let p = Param {
                    val: off,
                    val_len: t.len(),
                    cmp_len: t.find('=').unwrap(),
                };
                table.insert(url.as_bytes(), p, true, false).unwrap();
                off += t.len() + 1;
            }

            let mut want: Vec<&str> = toks.iter().map(String::as_str).collect();
            want.sort_by_key(|t| t.split('=').next().unwrap());
            assert_eq!(tokens(&table, &url), want, "{url}");
        }
    }

    #[test]
    fn test_sorted_insert_is_stable_for_equal_names() {
        let url = "b=1&a=1&b=2&a=2&b=3";
        let mut region = vec![0u8; 8 * SLOT];
        let mut table = ParamTable::new(&mut region);
        for (i, tok) in url.split('&').enumerate() {
            let p = Param {
                val: i * 4,
                val_len: tok.len(),
                cmp_len: 1,
            };
            table.insert(url.as_bytes(), p, true, false).unwrap();
        }
        assert_eq!(
            tokens(&table, url),
            ["a=1", "a=2", "b=1", "b=2", "b=3"]
        );
    }

    #[test]
    fn test_uniq_with_sort_drops_any_duplicate() {
        let (url, params) = layout(&["a", "b", "a", "c", "b"]);
        let mut region = vec![0u8; 8 * SLOT];
        let mut table = ParamTable::new(&mut region);
        let placed: Vec<Placement> = params
            .into_iter()
            .map(|p| table.insert(url.as_bytes(), p, true, true).unwrap())
            .collect();
        assert_eq!(placed[2], Placement::Duplicate);
        assert_eq!(placed[4], Placement::Duplicate);
        assert_eq!(tokens(&table, &url), ["a", "b", "c"]);
    }

    #[test]
    fn test_uniq_without_sort_only_checks_previous() {
        let (url, params) = layout(&["a", "a", "b", "a"]);
        let mut region = vec![0u8; 8 * SLOT];
        let mut table = ParamTable::new(&mut region);
        for p in params {
            table.insert(url.as_bytes(), p, false, true).unwrap();
        }
        assert_eq!(tokens(&table, &url), ["a", "b", "a"]);
    }

    #[test]
    fn test_insert_fails_when_full() {
        let (url, params) = layout(&["a", "b", "a"]);
        let mut region = vec![0u8; 2 * SLOT + SLOT - 1];
        let mut table = ParamTable::new(&mut region);
        assert_eq!(table.capacity(), 2);
        table.insert(url.as_bytes(), params[0], true, true).unwrap();
        table.insert(url.as_bytes(), params[1], true, true).unwrap();
        // Full even though this one would be a duplicate.
        assert!(table.insert(url.as_bytes(), params[2], true, true).is_err());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_get_bounds() {
        let (url, params) = layout(&["x"]);
        let mut region = vec![0u8; SLOT];
        let mut table = ParamTable::new(&mut region);
        assert!(table.get(0).is_none());
        table.insert(url.as_bytes(), params[0], false, false).unwrap();
        assert_eq!(table.get(0), Some(params[0]));
        assert!(table.get(1).is_none());
    }
}
